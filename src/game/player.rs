//! Player state management.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{RuleError, RuleResult};
use crate::game::{CardId, DeckId, SpaceId};

/// Unique identifier for a player.
pub type PlayerId = u8;

/// Currency units. Balances never go below zero.
pub type Money = u32;

/// A held "get out of jail free" card, remembering where it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JailFreeToken {
    /// Deck the card belongs to.
    pub deck: DeckId,
    /// The card within that deck.
    pub card: CardId,
}

/// State for a single player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Unique identifier for this player.
    pub id: PlayerId,
    /// Display name.
    pub name: String,
    /// Cash on hand.
    pub balance: Money,
    /// Board index of the player's token.
    pub position: SpaceId,
    /// Number of turns started.
    pub turns_taken: u32,
    /// Doubles rolled in a row during the current turn sequence.
    pub consecutive_doubles: u8,
    /// Whether the player is in jail.
    pub in_jail: bool,
    /// Jail turns served so far.
    pub jail_turns: u8,
    /// Held jail-free card, if any.
    pub jail_free: Option<JailFreeToken>,
    /// Ownable spaces held by the player. This is the authoritative edge.
    pub owned: BTreeSet<SpaceId>,
    /// Subset of `owned` that is mortgaged.
    pub mortgaged: BTreeSet<SpaceId>,
    /// Whether the player has been removed by bankruptcy.
    pub bankrupt: bool,
}

impl Player {
    /// Create a new player on Go with the given starting stake.
    #[must_use]
    pub fn new(id: PlayerId, name: impl Into<String>, balance: Money) -> Self {
        Self {
            id,
            name: name.into(),
            balance,
            position: 0,
            turns_taken: 0,
            consecutive_doubles: 0,
            in_jail: false,
            jail_turns: 0,
            jail_free: None,
            owned: BTreeSet::new(),
            mortgaged: BTreeSet::new(),
            bankrupt: false,
        }
    }

    /// Add cash.
    pub fn add(&mut self, amount: Money) {
        self.balance = self.balance.saturating_add(amount);
    }

    /// Remove cash, refusing if the balance cannot cover it.
    ///
    /// # Errors
    ///
    /// Returns `InsufficientFunds` and leaves the balance untouched.
    pub fn subtract(&mut self, amount: Money) -> RuleResult<()> {
        if self.balance < amount {
            return Err(RuleError::InsufficientFunds {
                needed: amount,
                available: self.balance,
            });
        }
        self.balance -= amount;
        Ok(())
    }

    /// Whether the player can pay `amount` right now.
    #[must_use]
    pub const fn can_afford(&self, amount: Money) -> bool {
        self.balance >= amount
    }

    /// Whether the player holds the space.
    #[must_use]
    pub fn owns(&self, space: SpaceId) -> bool {
        self.owned.contains(&space)
    }

    /// Put the player in jail at the given index.
    pub fn send_to_jail(&mut self, jail: SpaceId) {
        self.position = jail;
        self.in_jail = true;
        self.jail_turns = 0;
        self.consecutive_doubles = 0;
    }

    /// Let the player out of jail.
    pub fn release(&mut self) {
        self.in_jail = false;
        self.jail_turns = 0;
    }
}
