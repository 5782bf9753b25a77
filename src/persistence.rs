//! Saving and loading game snapshots.
//!
//! Snapshots are stored as pretty-printed JSON wrapped in a small header
//! carrying a format tag and version, checked on load.

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::game::Snapshot;

/// Format tag written into every save file.
pub const FORMAT: &str = "landlord-snapshot";

/// Current format version.
pub const VERSION: u32 = 1;

/// Errors from reading or writing save files.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// File could not be read or written.
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
    /// The file is not valid JSON for a snapshot.
    #[error("malformed save file: {0}")]
    Json(#[from] serde_json::Error),
    /// The header names a different format.
    #[error("not a landlord save file (format {0:?})")]
    Format(String),
    /// The header names an unsupported version.
    #[error("unsupported save file version {0} (expected {VERSION})")]
    Version(u32),
}

#[derive(Serialize)]
struct SaveFileRef<'a> {
    format: &'a str,
    version: u32,
    snapshot: &'a Snapshot,
}

#[derive(Deserialize)]
struct SaveFile {
    format: String,
    version: u32,
    snapshot: Snapshot,
}

/// Encode a snapshot with its header.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_json(snapshot: &Snapshot) -> Result<String, PersistenceError> {
    let file = SaveFileRef {
        format: FORMAT,
        version: VERSION,
        snapshot,
    };
    Ok(serde_json::to_string_pretty(&file)?)
}

/// Decode a snapshot, checking its header.
///
/// # Errors
///
/// Returns an error for malformed JSON or a header mismatch.
pub fn from_json(json: &str) -> Result<Snapshot, PersistenceError> {
    let file: SaveFile = serde_json::from_str(json)?;
    if file.format != FORMAT {
        return Err(PersistenceError::Format(file.format));
    }
    if file.version != VERSION {
        return Err(PersistenceError::Version(file.version));
    }
    Ok(file.snapshot)
}

/// Write a snapshot to a file.
///
/// # Errors
///
/// Returns an error if serialization or file I/O fails.
pub fn save_snapshot(snapshot: &Snapshot, path: &Path) -> Result<(), PersistenceError> {
    fs::write(path, to_json(snapshot)?)?;
    log::debug!("saved snapshot to {}", path.display());
    Ok(())
}

/// Read a snapshot from a file.
///
/// The snapshot is not checked for consistency here; pass it to
/// [`GameSession::restore`](crate::game::GameSession::restore).
///
/// # Errors
///
/// Returns an error if the file cannot be read or its header is wrong.
pub fn load_snapshot(path: &Path) -> Result<Snapshot, PersistenceError> {
    let json = fs::read_to_string(path)?;
    from_json(&json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{GameSession, RuleConfig, SeededRandomness};
    use tempfile::tempdir;

    fn snapshot() -> Snapshot {
        GameSession::new(&["Ada", "Bo"], RuleConfig::default(), SeededRandomness::new(3))
            .unwrap()
            .snapshot()
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("game.json");
        let original = snapshot();

        save_snapshot(&original, &path).unwrap();
        let loaded = load_snapshot(&path).unwrap();
        assert_eq!(loaded, original);
    }

    #[test]
    fn test_wrong_format_rejected() {
        let json = to_json(&snapshot()).unwrap().replace(FORMAT, "something-else");
        assert!(matches!(
            from_json(&json),
            Err(PersistenceError::Format(f)) if f == "something-else"
        ));
    }

    #[test]
    fn test_wrong_version_rejected() {
        let json = to_json(&snapshot())
            .unwrap()
            .replacen("\"version\": 1", "\"version\": 99", 1);
        assert!(matches!(from_json(&json), Err(PersistenceError::Version(99))));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            load_snapshot(&dir.path().join("nope.json")),
            Err(PersistenceError::Io(_))
        ));
    }
}
