//! Landlord CLI - run, batch and inspect automated games.

// Allow print in the CLI binary
#![allow(clippy::print_stdout, clippy::print_stderr)]

mod cli;

use clap::{Parser, Subcommand};
use landlord::Strategy;
use simplelog::{ColorChoice, ConfigBuilder, LevelFilter, TermLogger, TerminalMode};
use std::process::ExitCode;

/// Landlord - a deterministic property-trading game engine
#[derive(Parser, Debug)]
#[command(name = "landlord")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Print engine diagnostics
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a single game between strategies
    Run {
        /// Player strategies (2-8 required)
        #[arg(required = true, num_args = 2..=8, value_enum)]
        strategies: Vec<Strategy>,

        /// Random seed (default: random)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Maximum turns (default: 1000)
        #[arg(short, long, default_value = "1000")]
        turns: u32,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,

        /// Save the final game state to a file
        #[arg(long)]
        save: Option<std::path::PathBuf>,

        /// Rule overrides as a JSON file
        #[arg(long)]
        rules: Option<std::path::PathBuf>,

        /// Suppress turn-by-turn output
        #[arg(short, long)]
        quiet: bool,
    },

    /// Run mass parallel games and aggregate statistics
    Tournament {
        /// Player strategies (2-8 required)
        #[arg(required = true, num_args = 2..=8, value_enum)]
        strategies: Vec<Strategy>,

        /// Number of games to run (default: 1000)
        #[arg(short, long, default_value = "1000")]
        games: u64,

        /// Starting seed (increments for each game)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Parallel threads (default: CPU count)
        #[arg(short = 'j', long)]
        threads: Option<usize>,

        /// Maximum turns per game (default: 1000)
        #[arg(short = 't', long)]
        turns: Option<u32>,

        /// Output format: text, json, or csv
        #[arg(short, long, default_value = "text")]
        format: cli::TournamentFormat,

        /// Show progress bar
        #[arg(short, long)]
        progress: bool,
    },

    /// Continue a saved game
    Resume {
        /// Snapshot file written by `run --save`
        #[arg(required = true)]
        snapshot: std::path::PathBuf,

        /// Player strategies (default: balanced for everyone)
        #[arg(long, value_enum, num_args = 1..)]
        strategies: Vec<Strategy>,

        /// Further turns to play (default: 1000)
        #[arg(short, long, default_value = "1000")]
        turns: u32,

        /// Random seed for the continued game (default: random)
        #[arg(short, long)]
        seed: Option<u64>,
    },

    /// Check a snapshot file for consistency
    Validate {
        /// Snapshot file to validate
        #[arg(required = true)]
        snapshot: std::path::PathBuf,
    },
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    let config = ConfigBuilder::new().set_time_level(LevelFilter::Off).build();
    // Only fails if a logger is already installed.
    let _ = TermLogger::init(level, config, TerminalMode::Stderr, ColorChoice::Auto);
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    let result = match args.command {
        Commands::Run {
            strategies,
            seed,
            turns,
            format,
            save,
            rules,
            quiet,
        } => cli::run::execute(&strategies, seed, turns, format, save, rules, quiet),

        Commands::Tournament {
            strategies,
            games,
            seed,
            threads,
            turns,
            format,
            progress,
        } => cli::tournament::execute(&strategies, games, seed, threads, turns, format, progress),

        Commands::Resume {
            snapshot,
            strategies,
            turns,
            seed,
        } => cli::resume::execute(&snapshot, strategies, turns, seed),

        Commands::Validate { snapshot } => cli::validate::execute(&snapshot),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
