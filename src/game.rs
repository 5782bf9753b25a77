//! Game layer for Landlord.
//!
//! Implements the rules of the property-trading game:
//! - Board ring with street, railroad, utility, tax, card and corner spaces
//! - Property ledger (ownership, mortgages, houses and hotels)
//! - Bank inventory and unsold pool
//! - Chance and Community Chest decks
//! - Turn state machine and game session

mod bank;
mod board;
mod cards;
mod dice;
mod invariants;
mod ledger;
mod player;
mod rules;
mod session;
mod turn;

pub use bank::Bank;
pub use board::{Board, ColorGroup, Ownable, OwnableKind, Space, SpaceKind, RING_LENGTH};
pub use cards::{Card, CardEffect, CardId, Deck, DeckId, NearestKind};
pub use dice::{DiceRoll, Randomness, ScriptedRandomness, SeededRandomness};
pub use invariants::{assert_invariants, check_invariants, InvariantViolation};
pub use ledger::{Ledger, OwnableState};
pub use player::{JailFreeToken, Money, Player, PlayerId};
pub use rules::RuleConfig;
pub use session::{
    validate, Creditor, Debt, GameEvent, GameSession, Release, Snapshot, MAX_PLAYERS, MIN_PLAYERS,
};
pub use turn::{Action, Arrival, Decision, Step, TurnState};

/// Board index of a space.
pub type SpaceId = u8;
