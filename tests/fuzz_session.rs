//! Fuzzing tests that drive sessions with arbitrary dice and answers.
//!
//! Run with: PROPTEST_CASES=100000 cargo test --release fuzz_session

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use proptest::prelude::*;

use landlord::game::{check_invariants, ScriptedRandomness};
use landlord::{Action, GameSession, RuleConfig, Step};

/// Fallback answers when the chosen one is refused.
fn fallback(actions: &[Action]) -> Action {
    if actions.contains(&Action::Decline) {
        Action::Decline
    } else if actions.contains(&Action::DeclareBankruptcy) {
        Action::DeclareBankruptcy
    } else {
        Action::RollForDoubles
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(2000))]

    /// Random legal answers and random management never panic or break an
    /// invariant.
    #[test]
    fn fuzz_random_play(
        rolls in prop::collection::vec((1u8..=6, 1u8..=6), 0..300),
        choices in prop::collection::vec(any::<u8>(), 1..400),
        players in 2usize..=6,
        stake in 0u32..2000,
        jackpot in any::<bool>(),
    ) {
        let names: Vec<String> = (0..players).map(|i| format!("P{i}")).collect();
        let rules = RuleConfig {
            starting_stake: stake,
            free_parking_jackpot: jackpot,
            ..RuleConfig::default()
        };
        let mut game = GameSession::new(&names, rules, ScriptedRandomness::new(rolls)).unwrap();

        for &choice in &choices {
            match game.advance().unwrap() {
                Step::Decision(_) => {
                    let actions = game.legal_actions();
                    prop_assert!(!actions.is_empty());
                    let action = actions[usize::from(choice) % actions.len()];
                    if game.decide(action).is_err() {
                        prop_assert!(game.pending().is_some());
                        game.decide(fallback(&actions)).unwrap();
                    }
                    prop_assert!(game.pending().is_none());
                }
                Step::TurnComplete => {
                    let player = game.current_player();
                    let space = choice % 40;
                    let _ = match choice % 5 {
                        0 => game.build_house(player, space),
                        1 => game.mortgage(player, space),
                        2 => game.unmortgage(player, space),
                        3 => game.sell_house(player, space),
                        _ => Ok(0),
                    };
                    game.end_turn().unwrap();
                }
                Step::GameOver { winner } => {
                    prop_assert!(winner.is_some());
                    prop_assert_eq!(game.order().len(), 1);
                    break;
                }
            }

            let violations = check_invariants(&game);
            prop_assert!(violations.is_empty(), "{violations:?}");
        }
    }
}
