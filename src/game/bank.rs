//! Bank inventory: houses, hotels and the pool of unsold ownables.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{Building, RuleError, RuleResult};
use crate::game::SpaceId;

/// Finite building stock and unsold spaces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bank {
    houses: u32,
    hotels: u32,
    unsold: BTreeSet<SpaceId>,
}

impl Bank {
    /// A bank holding the given stock with every listed space unsold.
    #[must_use]
    pub fn new(houses: u32, hotels: u32, unsold: impl IntoIterator<Item = SpaceId>) -> Self {
        Self {
            houses,
            hotels,
            unsold: unsold.into_iter().collect(),
        }
    }

    /// Houses still in the bank.
    #[must_use]
    pub const fn houses(&self) -> u32 {
        self.houses
    }

    /// Hotels still in the bank.
    #[must_use]
    pub const fn hotels(&self) -> u32 {
        self.hotels
    }

    /// Take one house.
    ///
    /// # Errors
    ///
    /// Returns `NoInventory` when no houses are left.
    pub fn take_house(&mut self) -> RuleResult<()> {
        self.take_houses(1)
    }

    /// Take several houses at once, or none.
    ///
    /// # Errors
    ///
    /// Returns `NoInventory` when fewer than `count` houses are left.
    pub fn take_houses(&mut self, count: u32) -> RuleResult<()> {
        if self.houses < count {
            return Err(RuleError::NoInventory(Building::House));
        }
        self.houses -= count;
        Ok(())
    }

    /// Return one house.
    pub fn return_house(&mut self) {
        self.return_houses(1);
    }

    /// Return several houses.
    pub fn return_houses(&mut self, count: u32) {
        self.houses += count;
    }

    /// Take one hotel.
    ///
    /// # Errors
    ///
    /// Returns `NoInventory` when no hotels are left.
    pub fn take_hotel(&mut self) -> RuleResult<()> {
        if self.hotels == 0 {
            return Err(RuleError::NoInventory(Building::Hotel));
        }
        self.hotels -= 1;
        Ok(())
    }

    /// Return one hotel.
    pub fn return_hotel(&mut self) {
        self.hotels += 1;
    }

    /// Whether the space has never been bought or was returned.
    #[must_use]
    pub fn is_unsold(&self, space: SpaceId) -> bool {
        self.unsold.contains(&space)
    }

    /// Spaces in the unsold pool.
    pub fn unsold(&self) -> impl Iterator<Item = SpaceId> + '_ {
        self.unsold.iter().copied()
    }

    /// Remove a space from the pool when it is bought.
    pub fn remove_unsold(&mut self, space: SpaceId) -> bool {
        self.unsold.remove(&space)
    }

    /// Put a space back into the pool.
    pub fn return_unsold(&mut self, space: SpaceId) {
        self.unsold.insert(space);
    }
}
