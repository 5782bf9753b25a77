//! Tournament command implementation.

use super::output::{format_tournament_csv, format_tournament_text, seat_names, JsonTournamentResult};
use super::{seed_or_now, CliError, TournamentFormat};
use indicatif::{ProgressBar, ProgressStyle};
use landlord::simulation::{run_batch, SimulationConfig};
use landlord::Strategy;
use std::time::Instant;

/// Execute the tournament command.
///
/// # Errors
///
/// Returns an error if the progress bar template or output encoding fails.
pub(crate) fn execute(
    strategies: &[Strategy],
    games: u64,
    seed: Option<u64>,
    threads: Option<usize>,
    turns: Option<u32>,
    format: TournamentFormat,
    progress: bool,
) -> Result<(), CliError> {
    // Set thread pool size if specified
    if let Some(num_threads) = threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()
            .ok(); // Ignore error if already initialized
    }

    let base_seed = seed_or_now(seed);

    let mut config = SimulationConfig::default();
    if let Some(t) = turns {
        config.max_turns = t;
    }

    let pb = if progress {
        let pb = ProgressBar::new(games);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} games ({per_sec})")
                .map_err(|e| CliError::new(format!("Bad progress template: {e}")))?
                .progress_chars("=>-"),
        );
        pb
    } else {
        ProgressBar::hidden()
    };

    let start = Instant::now();
    let stats = run_batch(base_seed, games, strategies, &config, || pb.inc(1));
    pb.finish_with_message("done");
    let duration = start.elapsed();

    #[allow(clippy::cast_precision_loss)]
    let games_per_sec = if duration.as_secs_f64() > 0.0 {
        stats.games as f64 / duration.as_secs_f64()
    } else {
        0.0
    };

    let names = seat_names(strategies);
    match format {
        TournamentFormat::Text => {
            println!();
            print!("{}", format_tournament_text(&stats, &names));
            println!();
            println!("Duration: {:.2}s ({games_per_sec:.0} games/sec)", duration.as_secs_f64());
        }
        TournamentFormat::Json => {
            let json = serde_json::to_string_pretty(&JsonTournamentResult::from_stats(&stats, &names))?;
            println!("{json}");
        }
        TournamentFormat::Csv => {
            print!("{}", format_tournament_csv(&stats, &names));
        }
    }

    Ok(())
}
