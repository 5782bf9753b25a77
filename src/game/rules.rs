//! Tunable rule constants.

use serde::{Deserialize, Serialize};

use crate::game::Money;

/// Constants that house rules commonly change.
///
/// Missing fields fall back to the standard values when deserializing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleConfig {
    /// Cash each player starts with.
    pub starting_stake: Money,
    /// Paid when passing or landing on Go.
    pub go_bonus: Money,
    /// Fee to leave jail.
    pub jail_fee: Money,
    /// On this jail turn a player who fails to roll doubles must pay.
    pub max_jail_turns: u8,
    /// Houses the bank starts with.
    pub bank_houses: u32,
    /// Hotels the bank starts with.
    pub bank_hotels: u32,
    /// Interest charged when lifting a mortgage.
    pub mortgage_interest_percent: u32,
    /// Taxes and fees go to a pool collected by whoever lands on Free Parking.
    pub free_parking_jackpot: bool,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            starting_stake: 1500,
            go_bonus: 200,
            jail_fee: 50,
            max_jail_turns: 3,
            bank_houses: 32,
            bank_hotels: 12,
            mortgage_interest_percent: 10,
            free_parking_jackpot: false,
        }
    }
}
