//! Property ledger: ownership, mortgages and development.
//!
//! Every operation checks all of its guards before touching anything, so a
//! failed call leaves the ledger, the bank and the player exactly as they
//! were. The player's `owned` set is the authoritative ownership edge; the
//! `owner` stored here is a plain id used for rent lookups.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{RuleError, RuleResult};
use crate::game::{Bank, Board, ColorGroup, Money, OwnableKind, Player, PlayerId, SpaceId};

/// Mutable state of one ownable space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnableState {
    /// Current owner.
    pub owner: Option<PlayerId>,
    /// Whether the space is mortgaged.
    pub mortgaged: bool,
    /// Houses standing (0-4). Zero when a hotel stands.
    pub houses: u8,
    /// Whether a hotel stands.
    pub hotel: bool,
}

impl OwnableState {
    /// Development level: houses, or 5 for a hotel.
    #[must_use]
    pub const fn level(&self) -> u8 {
        if self.hotel { 5 } else { self.houses }
    }

    /// Whether any building stands.
    #[must_use]
    pub const fn is_developed(&self) -> bool {
        self.hotel || self.houses > 0
    }
}

/// Ownership and development state for every ownable on the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger {
    states: BTreeMap<SpaceId, OwnableState>,
}

impl Ledger {
    /// A ledger with every ownable on the board unowned.
    #[must_use]
    pub fn new(board: &Board) -> Self {
        Self {
            states: board
                .ownable_ids()
                .map(|id| (id, OwnableState::default()))
                .collect(),
        }
    }

    /// State of an ownable space.
    ///
    /// # Errors
    ///
    /// Returns `NotOwnable` if the space has no ledger entry.
    pub fn state(&self, space: SpaceId) -> RuleResult<&OwnableState> {
        self.states.get(&space).ok_or(RuleError::NotOwnable(space))
    }

    fn state_mut(&mut self, space: SpaceId) -> RuleResult<&mut OwnableState> {
        self.states.get_mut(&space).ok_or(RuleError::NotOwnable(space))
    }

    /// Owner of a space, if any.
    #[must_use]
    pub fn owner(&self, space: SpaceId) -> Option<PlayerId> {
        self.states.get(&space).and_then(|state| state.owner)
    }

    /// Iterate over every ownable's state.
    pub fn iter(&self) -> impl Iterator<Item = (SpaceId, &OwnableState)> {
        self.states.iter().map(|(&id, state)| (id, state))
    }

    /// Buy an unowned space at list price.
    ///
    /// # Errors
    ///
    /// `NotOwnable`, `AlreadyOwned`, or `InsufficientFunds`.
    pub fn purchase(
        &mut self,
        board: &Board,
        bank: &mut Bank,
        player: &mut Player,
        space: SpaceId,
    ) -> RuleResult<Money> {
        let price = board.ownable(space)?.price;
        let state = self.state_mut(space)?;
        if state.owner.is_some() {
            return Err(RuleError::AlreadyOwned(space));
        }
        player.subtract(price)?;

        state.owner = Some(player.id);
        player.owned.insert(space);
        bank.remove_unsold(space);
        Ok(price)
    }

    /// Hand an unsold space to a player for an agreed price, as an auction
    /// would.
    ///
    /// # Errors
    ///
    /// `NotOwnable`, `AlreadyOwned`, or `InsufficientFunds`.
    pub fn award(
        &mut self,
        bank: &mut Bank,
        player: &mut Player,
        space: SpaceId,
        price: Money,
    ) -> RuleResult<()> {
        let state = self.state_mut(space)?;
        if state.owner.is_some() {
            return Err(RuleError::AlreadyOwned(space));
        }
        player.subtract(price)?;

        state.owner = Some(player.id);
        player.owned.insert(space);
        bank.remove_unsold(space);
        Ok(())
    }

    /// Move `amount` from `payer` to `owner`, or nothing at all.
    ///
    /// # Errors
    ///
    /// `InsufficientFunds` if the payer cannot cover the full amount.
    pub fn pay_rent(payer: &mut Player, owner: &mut Player, amount: Money) -> RuleResult<()> {
        payer.subtract(amount)?;
        owner.add(amount);
        Ok(())
    }

    fn check_owner(&self, player: &Player, space: SpaceId) -> RuleResult<&OwnableState> {
        let state = self.state(space)?;
        if state.owner != Some(player.id) || !player.owns(space) {
            return Err(RuleError::NotOwned {
                player: player.id,
                space,
            });
        }
        Ok(state)
    }

    /// Mortgage an undeveloped space for its mortgage value.
    ///
    /// # Errors
    ///
    /// `NotOwned`, `AlreadyMortgaged`, or `HasDevelopment`.
    pub fn mortgage(
        &mut self,
        board: &Board,
        player: &mut Player,
        space: SpaceId,
    ) -> RuleResult<Money> {
        let state = self.check_owner(player, space)?;
        if state.mortgaged {
            return Err(RuleError::AlreadyMortgaged(space));
        }
        if state.is_developed() {
            return Err(RuleError::HasDevelopment(space));
        }
        let value = board.ownable(space)?.mortgage_value;

        self.state_mut(space)?.mortgaged = true;
        player.mortgaged.insert(space);
        player.add(value);
        Ok(value)
    }

    /// Cost of lifting a mortgage: value plus interest, rounded down.
    #[must_use]
    pub fn unmortgage_cost(mortgage_value: Money, interest_percent: u32) -> Money {
        let cost = u64::from(mortgage_value) * u64::from(100 + interest_percent) / 100;
        Money::try_from(cost).unwrap_or(Money::MAX)
    }

    /// Pay off a mortgage.
    ///
    /// # Errors
    ///
    /// `NotOwned`, `NotMortgaged`, or `InsufficientFunds`.
    pub fn unmortgage(
        &mut self,
        board: &Board,
        player: &mut Player,
        space: SpaceId,
        interest_percent: u32,
    ) -> RuleResult<Money> {
        let state = self.check_owner(player, space)?;
        if !state.mortgaged {
            return Err(RuleError::NotMortgaged(space));
        }
        let cost = Self::unmortgage_cost(board.ownable(space)?.mortgage_value, interest_percent);
        player.subtract(cost)?;

        self.state_mut(space)?.mortgaged = false;
        player.mortgaged.remove(&space);
        Ok(cost)
    }

    /// Whether `player` owns every space of a color group.
    #[must_use]
    pub fn has_monopoly(&self, board: &Board, player: PlayerId, group: ColorGroup) -> bool {
        let spaces = board.ownables_in_color_group(group);
        !spaces.is_empty()
            && spaces
                .iter()
                .all(|&space| self.owner(space) == Some(player))
    }

    /// Guards shared by house and hotel building. Returns the color group.
    fn check_buildable(
        &self,
        board: &Board,
        player: &Player,
        space: SpaceId,
    ) -> RuleResult<ColorGroup> {
        let state = self.check_owner(player, space)?;
        let group = board
            .ownable(space)?
            .group()
            .ok_or(RuleError::NotBuildable(space))?;
        if !self.has_monopoly(board, player.id, group) {
            return Err(RuleError::NoMonopoly {
                player: player.id,
                group,
            });
        }
        if state.mortgaged {
            return Err(RuleError::Mortgaged(space));
        }
        if state.hotel {
            return Err(RuleError::HasHotel(space));
        }
        Ok(group)
    }

    /// Build one house.
    ///
    /// Guards run in order: ownership, monopoly, mortgage, hotel, even
    /// distribution, affordability, bank stock.
    ///
    /// # Errors
    ///
    /// The first failing guard's error.
    pub fn build_house(
        &mut self,
        board: &Board,
        bank: &mut Bank,
        player: &mut Player,
        space: SpaceId,
    ) -> RuleResult<Money> {
        let group = self.check_buildable(board, player, space)?;
        let houses = self.state(space)?.houses;
        if houses >= 4 {
            return Err(RuleError::FullyBuilt(space));
        }

        let after = houses + 1;
        let uneven = board
            .ownables_in_color_group(group)
            .into_iter()
            .filter(|&sibling| sibling != space)
            .any(|sibling| {
                self.states
                    .get(&sibling)
                    .is_some_and(|s| after > s.level() + 1)
            });
        if uneven {
            return Err(RuleError::UnevenDistribution(space));
        }

        let price = group.house_price();
        if !player.can_afford(price) {
            return Err(RuleError::InsufficientFunds {
                needed: price,
                available: player.balance,
            });
        }
        bank.take_house()?;
        player.subtract(price)?;
        self.state_mut(space)?.houses = after;
        Ok(price)
    }

    /// Replace four houses with a hotel.
    ///
    /// # Errors
    ///
    /// `NotOwned`, `NoMonopoly`, `Mortgaged`, `HasHotel`, `NeedsFourHouses`,
    /// `InsufficientFunds`, or `NoInventory`.
    pub fn build_hotel(
        &mut self,
        board: &Board,
        bank: &mut Bank,
        player: &mut Player,
        space: SpaceId,
    ) -> RuleResult<Money> {
        let group = self.check_buildable(board, player, space)?;
        let houses = self.state(space)?.houses;
        if houses != 4 {
            return Err(RuleError::NeedsFourHouses { space, houses });
        }

        let price = group.house_price();
        if !player.can_afford(price) {
            return Err(RuleError::InsufficientFunds {
                needed: price,
                available: player.balance,
            });
        }
        bank.take_hotel()?;
        player.subtract(price)?;
        bank.return_houses(4);

        let state = self.state_mut(space)?;
        state.houses = 0;
        state.hotel = true;
        Ok(price)
    }

    /// Sell one building back to the bank at half the house price.
    ///
    /// A hotel is first broken back into four houses, which needs four
    /// houses from the bank.
    ///
    /// # Errors
    ///
    /// `NotOwned`, `NotBuildable`, `NoBuildings`, or `NoInventory`.
    pub fn sell_house(
        &mut self,
        board: &Board,
        bank: &mut Bank,
        player: &mut Player,
        space: SpaceId,
    ) -> RuleResult<Money> {
        let state = *self.check_owner(player, space)?;
        let group = board
            .ownable(space)?
            .group()
            .ok_or(RuleError::NotBuildable(space))?;
        if !state.is_developed() {
            return Err(RuleError::NoBuildings(space));
        }

        let mut houses = state.houses;
        if state.hotel {
            bank.take_houses(4)?;
            bank.return_hotel();
            houses = 4;
        }
        houses -= 1;
        bank.return_house();

        let entry = self.state_mut(space)?;
        entry.hotel = false;
        entry.houses = houses;

        let refund = group.house_price() / 2;
        player.add(refund);
        Ok(refund)
    }

    /// Rent owed for landing on `space`.
    ///
    /// `dice` is the roll that brought the tenant here, or a fresh roll for
    /// card arrivals. A utility reached by card always charges ten times the
    /// dice. Mortgaged and unowned spaces charge nothing.
    ///
    /// # Errors
    ///
    /// `NotOwnable` for spaces without a ledger entry.
    pub fn rent(&self, board: &Board, space: SpaceId, dice: u8, via_card: bool) -> RuleResult<Money> {
        let state = self.state(space)?;
        let Some(owner) = state.owner else {
            return Ok(0);
        };
        if state.mortgaged {
            return Ok(0);
        }

        let rent = match &board.ownable(space)?.kind {
            OwnableKind::Property { group, rents } => {
                let base = rents[usize::from(state.level())];
                if state.level() == 0 && self.has_monopoly(board, owner, *group) {
                    base * 2
                } else {
                    base
                }
            }
            OwnableKind::Railroad { base_rent } => {
                let owned = self.count_owned(board, owner, |kind| {
                    matches!(kind, OwnableKind::Railroad { .. })
                });
                base_rent << owned.saturating_sub(1)
            }
            OwnableKind::Utility => {
                let owned =
                    self.count_owned(board, owner, |kind| matches!(kind, OwnableKind::Utility));
                let multiplier = if via_card || owned >= 2 { 10 } else { 4 };
                Money::from(dice) * multiplier
            }
        };
        Ok(rent)
    }

    fn count_owned(
        &self,
        board: &Board,
        owner: PlayerId,
        matches: impl Fn(&OwnableKind) -> bool,
    ) -> u32 {
        let count = self
            .states
            .iter()
            .filter(|(_, state)| state.owner == Some(owner))
            .filter(|&(&id, _)| board.ownable(id).is_ok_and(|o| matches(&o.kind)))
            .count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }

    /// Houses and hotels standing on a player's spaces.
    #[must_use]
    pub fn buildings_of(&self, player: PlayerId) -> (u32, u32) {
        self.states
            .values()
            .filter(|state| state.owner == Some(player))
            .fold((0, 0), |(houses, hotels), state| {
                (houses + u32::from(state.houses), hotels + u32::from(state.hotel))
            })
    }

    /// Houses on hotel-free properties and hotels, across the whole board.
    #[must_use]
    pub fn buildings_total(&self) -> (u32, u32) {
        self.states.values().fold((0, 0), |(houses, hotels), state| {
            (houses + u32::from(state.houses), hotels + u32::from(state.hotel))
        })
    }

    /// Strip a space back to unowned, returning its buildings to the bank.
    ///
    /// Used when a bankrupt player's holdings go back to the bank.
    ///
    /// # Errors
    ///
    /// `NotOwnable` for spaces without a ledger entry.
    pub fn reset(&mut self, bank: &mut Bank, space: SpaceId) -> RuleResult<()> {
        let state = self.state_mut(space)?;
        bank.return_houses(u32::from(state.houses));
        if state.hotel {
            bank.return_hotel();
        }
        *state = OwnableState::default();
        bank.return_unsold(space);
        Ok(())
    }
}
