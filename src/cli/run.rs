//! Run command implementation.

use super::output::{describe_event, format_text, seat_names, JsonGameResult};
use super::{seed_or_now, CliError, OutputFormat};
use landlord::persistence::save_snapshot;
use landlord::simulation::{Simulation, SimulationConfig};
use landlord::{RuleConfig, Strategy};
use std::fs;
use std::path::PathBuf;

/// Execute the run command.
///
/// # Errors
///
/// Returns an error if the rules file is unreadable, the game cannot start,
/// or the snapshot cannot be saved.
pub(crate) fn execute(
    strategies: &[Strategy],
    seed: Option<u64>,
    turns: u32,
    format: OutputFormat,
    save: Option<PathBuf>,
    rules: Option<PathBuf>,
    quiet: bool,
) -> Result<(), CliError> {
    let rules = match rules {
        Some(path) => {
            let json = fs::read_to_string(&path).map_err(|e| {
                CliError::new(format!("Failed to read {}: {e}", path.display()))
            })?;
            serde_json::from_str::<RuleConfig>(&json)?
        }
        None => RuleConfig::default(),
    };

    let seed = seed_or_now(seed);
    let config = SimulationConfig {
        rules,
        max_turns: turns,
    };
    let names = seat_names(strategies);
    let narrate = !quiet && format == OutputFormat::Text;

    if narrate {
        println!("Running game with seed {seed}...");
        println!("Players: {}", names.join(", "));
        println!();
    }

    let mut simulation = Simulation::new(seed, strategies, &config)?;
    while !simulation.is_finished() {
        let events = simulation.step()?;
        if narrate {
            for event in &events {
                println!("{}", describe_event(event, simulation.session().board(), &names));
            }
        }
    }
    let result = simulation.result();

    if let Some(save_path) = save {
        save_snapshot(&simulation.session().snapshot(), &save_path)?;
        if narrate {
            println!();
            println!("Game state saved to: {}", save_path.display());
        }
    }

    match format {
        OutputFormat::Text => {
            if narrate {
                println!();
            }
            print!("{}", format_text(&result, &names));
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&JsonGameResult::from_game_result(&result, &names))?;
            println!("{json}");
        }
    }

    Ok(())
}
