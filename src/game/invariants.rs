//! Game invariants - sanity checks that detect bugs.
//!
//! None of these should ever trigger in a correctly implemented game. They
//! tie the ledger, the bank, the decks and the players together: buildings
//! are conserved, ownership is recorded on both sides, and bankrupt players
//! hold nothing.

use std::collections::BTreeSet;

use crate::game::{DeckId, GameSession, OwnableKind, SpaceId};

/// Invariant violation error.
#[derive(Debug, Clone)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub message: String,
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invariant violation: {}", self.message)
    }
}

impl std::error::Error for InvariantViolation {}

/// Check all game invariants.
///
/// Returns a list of violations found, or empty if all invariants hold.
#[must_use]
pub fn check_invariants(game: &GameSession) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();
    let mut fail = |message: String| violations.push(InvariantViolation { message });

    // Building conservation. A hotel's four houses went back to the bank.
    let (houses, hotels) = game.ledger.buildings_total();
    if game.bank.houses() + houses != game.rules.bank_houses {
        fail(format!(
            "Houses not conserved: {} in bank + {houses} on board != {}",
            game.bank.houses(),
            game.rules.bank_houses
        ));
    }
    if game.bank.hotels() + hotels != game.rules.bank_hotels {
        fail(format!(
            "Hotels not conserved: {} in bank + {hotels} on board != {}",
            game.bank.hotels(),
            game.rules.bank_hotels
        ));
    }

    for (space, state) in game.ledger.iter() {
        if state.houses > 4 {
            fail(format!("Space {space} has {} houses", state.houses));
        }
        if state.hotel && state.houses > 0 {
            fail(format!("Space {space} has a hotel and {} houses", state.houses));
        }
        if state.mortgaged && state.is_developed() {
            fail(format!("Mortgaged space {space} carries buildings"));
        }
        if state.mortgaged && state.owner.is_none() {
            fail(format!("Unowned space {space} is mortgaged"));
        }
        let buildable = game
            .board
            .ownable(space)
            .is_ok_and(|o| matches!(o.kind, OwnableKind::Property { .. }));
        if !buildable && state.is_developed() {
            fail(format!("Space {space} cannot carry buildings but does"));
        }

        match state.owner {
            Some(owner) => {
                let recorded = game.player(owner).is_some_and(|p| p.owns(space));
                if !recorded {
                    fail(format!(
                        "Ledger says player {owner} owns {space}, player disagrees"
                    ));
                }
                if game.bank.is_unsold(space) {
                    fail(format!("Owned space {space} is in the unsold pool"));
                }
            }
            None => {
                if !game.bank.is_unsold(space) {
                    fail(format!("Unowned space {space} missing from the unsold pool"));
                }
            }
        }
    }

    let mut held: [BTreeSet<usize>; 2] = [BTreeSet::new(), BTreeSet::new()];
    for player in &game.players {
        for &space in &player.owned {
            if game.ledger.owner(space) != Some(player.id) {
                fail(format!(
                    "Player {} lists space {space} the ledger does not give them",
                    player.id
                ));
            }
        }
        for &space in &player.mortgaged {
            let flagged = game.ledger.state(space).is_ok_and(|s| s.mortgaged);
            if !player.owns(space) || !flagged {
                fail(format!(
                    "Player {} mortgage record for {space} is inconsistent",
                    player.id
                ));
            }
        }
        if usize::from(player.position) >= game.board.ring_len() {
            fail(format!(
                "Player {} is off the board at {}",
                player.id, player.position
            ));
        }

        let in_order = game.order.contains(&player.id);
        if player.bankrupt {
            if !player.owned.is_empty() {
                fail(format!(
                    "Bankrupt player {} still owns {} spaces",
                    player.id,
                    player.owned.len()
                ));
            }
            if player.jail_free.is_some() {
                fail(format!("Bankrupt player {} holds a jail-free card", player.id));
            }
            if in_order {
                fail(format!("Bankrupt player {} is still in turn order", player.id));
            }
        } else if !in_order {
            fail(format!("Player {} is missing from turn order", player.id));
        }

        if let Some(token) = player.jail_free {
            let slot = usize::from(token.deck == DeckId::CommunityChest);
            if !held[slot].insert(token.card) {
                fail(format!("Jail-free card {token:?} held twice"));
            }
        }
    }

    for (slot, deck) in [DeckId::Chance, DeckId::CommunityChest].into_iter().enumerate() {
        let recorded: BTreeSet<usize> = game.deck(deck).held().collect();
        if recorded != held[slot] {
            fail(format!(
                "{deck:?} deck holds {recorded:?} out of circulation, players hold {:?}",
                held[slot]
            ));
        }
    }

    let unowned: BTreeSet<SpaceId> = game
        .ledger
        .iter()
        .filter(|(_, state)| state.owner.is_none())
        .map(|(space, _)| space)
        .collect();
    let unsold: BTreeSet<SpaceId> = game.bank.unsold().collect();
    if unowned != unsold {
        fail(format!(
            "Unsold pool {unsold:?} differs from unowned spaces {unowned:?}"
        ));
    }

    if game.active != (game.order.len() > 1) {
        fail(format!(
            "Active flag {} with {} players in turn order",
            game.active,
            game.order.len()
        ));
    }

    violations
}

/// Assert all game invariants hold, panicking if any are violated.
///
/// Only active in debug builds. No-op in release builds.
///
/// # Panics
///
/// Panics with detailed message if any invariant is violated.
#[cfg(debug_assertions)]
pub fn assert_invariants(game: &GameSession) {
    let violations = check_invariants(game);
    if !violations.is_empty() {
        let messages: Vec<_> = violations.iter().map(|v| v.message.as_str()).collect();
        panic!("Game invariant violations:\n  - {}", messages.join("\n  - "));
    }
}

/// No-op in release builds.
#[cfg(not(debug_assertions))]
pub fn assert_invariants(_game: &GameSession) {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{RuleConfig, SeededRandomness};

    fn create_valid_game() -> GameSession {
        GameSession::new(&["Ada", "Bo", "Cy"], RuleConfig::default(), SeededRandomness::new(5))
            .unwrap()
    }

    #[test]
    fn test_valid_game_passes() {
        let game = create_valid_game();
        let violations = check_invariants(&game);
        assert!(violations.is_empty(), "{violations:?}");
    }

    #[test]
    fn test_awarded_space_passes() {
        let mut game = create_valid_game();
        game.award(1, 39, 400).unwrap();
        assert!(check_invariants(&game).is_empty());
    }

    #[test]
    fn test_house_leak_detected() {
        let mut game = create_valid_game();
        game.bank.take_house().unwrap();

        let violations = check_invariants(&game);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("Houses not conserved"));
    }

    #[test]
    fn test_one_sided_ownership_detected() {
        let mut game = create_valid_game();
        game.players[0].owned.insert(1);

        let violations = check_invariants(&game);
        assert!(violations
            .iter()
            .any(|v| v.message.contains("ledger does not give them")));
    }

    #[test]
    fn test_bankrupt_owner_detected() {
        let mut game = create_valid_game();
        game.award(2, 5, 200).unwrap();
        game.players[2].bankrupt = true;

        let violations = check_invariants(&game);
        assert!(violations
            .iter()
            .any(|v| v.message.contains("Bankrupt player 2 still owns")));
        assert!(violations
            .iter()
            .any(|v| v.message.contains("still in turn order")));
    }

    #[test]
    fn test_untracked_jail_card_detected() {
        let mut game = create_valid_game();
        game.players[0].jail_free = Some(crate::game::JailFreeToken {
            deck: DeckId::Chance,
            card: 8,
        });

        let violations = check_invariants(&game);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("Chance deck"));
    }

    #[test]
    fn test_bankruptcy_keeps_invariants() {
        let mut game = create_valid_game();
        game.award(1, 1, 60).unwrap();
        game.award(1, 3, 60).unwrap();
        game.build_house(1, 1).unwrap();
        game.handle_bankruptcy(1).unwrap();
        let violations = check_invariants(&game);
        assert!(violations.is_empty(), "{violations:?}");
    }
}
