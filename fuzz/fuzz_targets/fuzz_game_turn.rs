#![no_main]

//! Full game turn fuzzer.
//!
//! This fuzz target drives a session through whole turns:
//! 1. Dice come from the fuzzer
//! 2. Every decision is answered with a fuzzer-chosen legal action
//! 3. Management operations run between turns
//! 4. Invariants are checked after every step
//!
//! This catches integration bugs that the ledger fuzzer misses.

use arbitrary::Arbitrary;
use landlord::game::{check_invariants, GameSession, RuleConfig, ScriptedRandomness, Step};
use landlord::Action;
use libfuzzer_sys::fuzz_target;

/// A fuzzer-generated between-turns operation.
#[derive(Arbitrary, Debug, Clone, Copy)]
enum FuzzOp {
    Build { space: u8 },
    Hotel { space: u8 },
    Sell { space: u8 },
    Mortgage { space: u8 },
    Unmortgage { space: u8 },
    Pass,
}

/// Structured input for full game fuzzing.
#[derive(Arbitrary, Debug)]
struct GameInput {
    /// Number of players (mapped into 2-8).
    players: u8,
    /// Starting cash.
    stake: u16,
    /// Free Parking collects taxes.
    jackpot: bool,
    /// Dice, one pair per roll.
    rolls: Vec<(u8, u8)>,
    /// Index into the legal actions of each decision.
    answers: Vec<u8>,
    /// Operations for the player whose turn just ended.
    ops: Vec<FuzzOp>,
}

fuzz_target!(|input: GameInput| {
    let players = usize::from(input.players % 7) + 2;
    let names: Vec<String> = (0..players).map(|i| format!("P{i}")).collect();
    let rules = RuleConfig {
        starting_stake: u32::from(input.stake),
        free_parking_jackpot: input.jackpot,
        ..RuleConfig::default()
    };
    let rolls = input
        .rolls
        .iter()
        .take(500)
        .map(|&(a, b)| (a % 6 + 1, b % 6 + 1));
    let Ok(mut game) = GameSession::new(&names, rules, ScriptedRandomness::new(rolls)) else {
        return;
    };

    let mut answers = input.answers.iter().copied().cycle();
    let mut ops = input.ops.iter().copied().cycle();

    for _ in 0..2000 {
        match game.advance().expect("standard board never fails") {
            Step::Decision(_) => {
                let actions = game.legal_actions();
                let pick = usize::from(answers.next().unwrap_or(0)) % actions.len();
                if game.decide(actions[pick]).is_err() {
                    let fallback = if actions.contains(&Action::Decline) {
                        Action::Decline
                    } else if actions.contains(&Action::DeclareBankruptcy) {
                        Action::DeclareBankruptcy
                    } else {
                        Action::RollForDoubles
                    };
                    game.decide(fallback).expect("fallback answers always apply");
                }
            }
            Step::TurnComplete => {
                let player = game.current_player();
                let _ = match ops.next().unwrap_or(FuzzOp::Pass) {
                    FuzzOp::Build { space } => game.build_house(player, space % 40),
                    FuzzOp::Hotel { space } => game.build_hotel(player, space % 40),
                    FuzzOp::Sell { space } => game.sell_house(player, space % 40),
                    FuzzOp::Mortgage { space } => game.mortgage(player, space % 40),
                    FuzzOp::Unmortgage { space } => game.unmortgage(player, space % 40),
                    FuzzOp::Pass => Ok(0),
                };
                game.end_turn().expect("turn is complete");
            }
            Step::GameOver { .. } => break,
        }

        let violations = check_invariants(&game);
        assert!(violations.is_empty(), "Invariant violations: {violations:?}");
    }
});
