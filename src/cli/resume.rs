//! Resume command implementation.

use super::output::{format_text, seat_names};
use super::{seed_or_now, CliError};
use landlord::game::SeededRandomness;
use landlord::persistence::load_snapshot;
use landlord::simulation::Simulation;
use landlord::{GameSession, Strategy};
use std::path::Path;

/// Execute the resume command.
///
/// # Errors
///
/// Returns an error if the snapshot cannot be loaded or restored, or the
/// strategy count does not match its players.
pub(crate) fn execute(
    snapshot: &Path,
    strategies: Vec<Strategy>,
    turns: u32,
    seed: Option<u64>,
) -> Result<(), CliError> {
    let seed = seed_or_now(seed);
    let session = GameSession::restore(load_snapshot(snapshot)?, SeededRandomness::new(seed))?;

    let strategies = if strategies.is_empty() {
        vec![Strategy::Balanced; session.players().len()]
    } else {
        strategies
    };

    let already_played = session.turn_number();
    println!(
        "Resuming {} at turn {already_played} with seed {seed}...",
        snapshot.display()
    );
    println!();

    let max_turns = already_played.saturating_add(turns);
    let result = Simulation::resume(session, &strategies, max_turns, seed)?.run()?;
    print!("{}", format_text(&result, &seat_names(&strategies)));

    Ok(())
}
