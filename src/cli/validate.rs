//! Snapshot validation command implementation.

use super::CliError;
use landlord::game::{check_invariants, SeededRandomness};
use landlord::persistence::load_snapshot;
use landlord::GameSession;
use std::path::Path;

/// Execute the validate command.
///
/// # Errors
///
/// Returns an error if the file cannot be loaded or any check fails.
pub(crate) fn execute(snapshot: &Path) -> Result<(), CliError> {
    println!("Validating: {}", snapshot.display());
    println!();

    let loaded = load_snapshot(snapshot)?;
    print_check("Save file header", true);

    let session = GameSession::from_snapshot(loaded, SeededRandomness::new(0));
    print_check("Board, decks and turn order", session.is_ok());
    let session = session?;

    let violations = check_invariants(&session);
    print_check("Game invariants", violations.is_empty());
    for violation in &violations {
        println!("    - {}", violation.message);
    }
    if !violations.is_empty() {
        return Err(CliError::new(format!(
            "{} invariant violation(s) found",
            violations.len()
        )));
    }

    println!();
    println!("Summary:");
    println!("  Players:      {}", session.players().len());
    println!("  Still in:     {}", session.order().len());
    println!("  Turns played: {}", session.turn_number());
    match session.winner() {
        Some(winner) => println!("  Winner:       player {winner}"),
        None => println!("  Next to move: player {}", session.current_player()),
    }
    println!();
    println!("Validation successful!");

    Ok(())
}

fn print_check(name: &str, ok: bool) {
    println!("  [{}] {name}", if ok { "OK" } else { "FAIL" });
}
