// Allow unwrap in tests (test code is not production)
#![cfg_attr(test, allow(clippy::unwrap_used))]
//! Landlord: a deterministic rules engine for a property-trading board game.
//!
//! This crate provides the complete rules of the classic 40-space game:
//! - Turn state machine that pauses for player decisions
//! - Property ledger with mortgages, houses and hotels
//! - Bank inventory, card decks and debts
//! - Snapshots for saving and resuming games
//! - Seeded automated play for batch simulation
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │     CLI / Simulation Runner         │
//! ├─────────────────────────────────────┤
//! │   GameSession (turn engine, debts)  │
//! ├─────────────────────────────────────┤
//! │  Board · Ledger · Bank · Decks      │
//! └─────────────────────────────────────┘
//! ```

pub mod error;
pub mod game;
pub mod persistence;
pub mod simulation;

pub use error::{ConfigError, RuleError, RuleResult};

// Re-export key game types at crate root for convenience
pub use game::{
    Action, Board, Decision, GameEvent, GameSession, Money, PlayerId, RuleConfig, SpaceId, Step,
};
pub use simulation::{run_game, GameResult, SimulationConfig, Strategy};
