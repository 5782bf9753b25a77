//! Dice and deck-shuffle randomness.
//!
//! All nondeterminism in a session flows through [`Randomness`], so tests can
//! script exact rolls and card orders.

use std::collections::VecDeque;
use std::fmt;

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::game::CardId;

/// The outcome of throwing two dice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceRoll {
    /// First die (1-6).
    pub first: u8,
    /// Second die (1-6).
    pub second: u8,
}

impl DiceRoll {
    /// Create a roll from two die faces.
    #[must_use]
    pub const fn new(first: u8, second: u8) -> Self {
        Self { first, second }
    }

    /// Sum of both dice.
    #[must_use]
    pub const fn total(self) -> u8 {
        self.first + self.second
    }

    /// Whether both dice show the same face.
    #[must_use]
    pub const fn is_double(self) -> bool {
        self.first == self.second
    }
}

impl fmt::Display for DiceRoll {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} + {} = {}", self.first, self.second, self.total())
    }
}

/// Source of dice rolls and deck shuffles.
pub trait Randomness: fmt::Debug + Send {
    /// Throw two dice.
    fn roll(&mut self) -> DiceRoll;

    /// Put a deck's draw pile into a new order.
    fn shuffle(&mut self, cards: &mut [CardId]);
}

/// Seeded pseudo-random source for real games.
#[derive(Debug, Clone)]
pub struct SeededRandomness {
    rng: SmallRng,
}

impl SeededRandomness {
    /// Create a source from a seed. The same seed yields the same game.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl Randomness for SeededRandomness {
    fn roll(&mut self) -> DiceRoll {
        DiceRoll::new(self.rng.gen_range(1..=6), self.rng.gen_range(1..=6))
    }

    fn shuffle(&mut self, cards: &mut [CardId]) {
        cards.shuffle(&mut self.rng);
    }
}

/// Scripted source that replays fixed rolls and never reorders decks.
///
/// Once the script runs out it keeps returning `fallback`.
#[derive(Debug, Clone)]
pub struct ScriptedRandomness {
    rolls: VecDeque<DiceRoll>,
    fallback: DiceRoll,
}

impl ScriptedRandomness {
    /// Replay the given rolls in order, then 1+2 forever.
    #[must_use]
    pub fn new(rolls: impl IntoIterator<Item = (u8, u8)>) -> Self {
        Self {
            rolls: rolls
                .into_iter()
                .map(|(first, second)| DiceRoll::new(first, second))
                .collect(),
            fallback: DiceRoll::new(1, 2),
        }
    }

    /// Append more rolls to the script.
    pub fn push(&mut self, first: u8, second: u8) {
        self.rolls.push_back(DiceRoll::new(first, second));
    }

    /// Rolls left in the script.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.rolls.len()
    }
}

impl Randomness for ScriptedRandomness {
    fn roll(&mut self) -> DiceRoll {
        self.rolls.pop_front().unwrap_or(self.fallback)
    }

    fn shuffle(&mut self, _cards: &mut [CardId]) {}
}
