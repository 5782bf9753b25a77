//! Full automated games over many seeds.
//!
//! Run with: cargo test --release simulation

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use landlord::game::{check_invariants, SeededRandomness};
use landlord::persistence::{load_snapshot, save_snapshot};
use landlord::simulation::{run_batch, Simulation};
use landlord::{run_game, GameSession, SimulationConfig, Strategy};
use tempfile::tempdir;

const MIXED: [Strategy; 3] = [Strategy::Aggressive, Strategy::Balanced, Strategy::Cautious];

#[test]
fn test_same_seed_same_result() {
    let config = SimulationConfig::default();
    let a = run_game(42, &MIXED, &config).unwrap();
    let b = run_game(42, &MIXED, &config).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_different_seeds_differ() {
    let config = SimulationConfig::default();
    let results: Vec<_> = (0..8)
        .map(|seed| run_game(seed, &MIXED, &config).unwrap())
        .collect();
    assert!(results
        .windows(2)
        .any(|w| w[0].player_stats != w[1].player_stats));
}

#[test]
fn test_many_seeds_finish_cleanly() {
    let config = SimulationConfig::default();
    for seed in 0..40 {
        let result = run_game(seed, &[Strategy::Aggressive, Strategy::Aggressive], &config)
            .unwrap_or_else(|e| panic!("seed {seed}: {e}"));
        assert!(result.turns_played <= config.max_turns);
        assert!(result.winner.is_some(), "seed {seed} has no winner");

        let bankrupt = result
            .player_stats
            .iter()
            .filter(|s| s.bankrupt_turn.is_some())
            .count();
        assert_eq!(bankrupt, result.elimination_order.len());
        if result.decisive {
            let winner = result.winner.unwrap();
            assert!(!result.elimination_order.contains(&winner));
            assert_eq!(result.elimination_order.len(), 1);
        }
    }
}

#[test]
fn test_eight_player_game() {
    let strategies = [Strategy::Balanced; 8];
    let mut simulation = Simulation::new(7, &strategies, &SimulationConfig::default()).unwrap();
    while !simulation.is_finished() {
        simulation.step().unwrap();
        assert!(check_invariants(simulation.session()).is_empty());
    }
    assert_eq!(simulation.result().player_stats.len(), 8);
}

#[test]
fn test_bankrupt_players_hold_nothing() {
    let config = SimulationConfig::default();
    for seed in 100..110 {
        let mut simulation = Simulation::new(seed, &MIXED, &config).unwrap();
        while !simulation.is_finished() {
            simulation.step().unwrap();
        }
        for player in simulation.session().players() {
            if player.bankrupt {
                assert!(player.owned.is_empty());
                assert_eq!(player.balance, 0);
                assert!(player.jail_free.is_none());
            }
        }
    }
}

#[test]
fn test_save_resume_matches_uninterrupted_state() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("midgame.json");
    let config = SimulationConfig {
        max_turns: 40,
        ..SimulationConfig::default()
    };

    let mut simulation = Simulation::new(9, &MIXED, &config).unwrap();
    while !simulation.is_finished() {
        simulation.step().unwrap();
    }
    save_snapshot(&simulation.session().snapshot(), &path).unwrap();

    let loaded = load_snapshot(&path).unwrap();
    assert_eq!(loaded, simulation.session().snapshot());

    let session = GameSession::restore(loaded, SeededRandomness::new(9)).unwrap();
    assert_eq!(session.turn_number(), simulation.session().turn_number());
    assert_eq!(session.order(), simulation.session().order());

    let resumed = Simulation::resume(session, &MIXED, 80, 9).unwrap();
    let result = resumed.run().unwrap();
    assert!(result.turns_played <= 80);
}

#[test]
fn test_batch_matches_individual_games() {
    let config = SimulationConfig {
        max_turns: 200,
        ..SimulationConfig::default()
    };
    let strategies = [Strategy::Aggressive, Strategy::Cautious];
    let stats = run_batch(500, 16, &strategies, &config, || {});

    let mut wins = [0u64; 2];
    for seed in 500..516 {
        let result = run_game(seed, &strategies, &config).unwrap();
        wins[usize::from(result.winner.unwrap())] += 1;
    }
    assert_eq!(stats.games, 16);
    assert_eq!(stats.wins, wins.to_vec());
}
