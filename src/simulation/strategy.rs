//! Built-in automated players.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::RuleResult;
use crate::game::{Action, Decision, GameSession, Money, PlayerId, SpaceId};

/// How an automated player answers decisions and develops property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Buys and builds whenever it can pay, pays its way out of jail.
    Aggressive,
    /// Keeps $200 in hand before buying or building.
    Balanced,
    /// Keeps $500 in hand and prefers rolling for doubles in jail.
    Cautious,
}

impl Strategy {
    /// Cash kept back before spending on property.
    #[must_use]
    pub const fn reserve(self) -> Money {
        match self {
            Strategy::Aggressive => 0,
            Strategy::Balanced => 200,
            Strategy::Cautious => 500,
        }
    }

    /// Lowercase name, as accepted on the command line.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Strategy::Aggressive => "aggressive",
            Strategy::Balanced => "balanced",
            Strategy::Cautious => "cautious",
        }
    }

    fn balance(session: &GameSession, player: PlayerId) -> Money {
        session.player(player).map_or(0, |p| p.balance)
    }

    /// Pick an answer without side effects. Debts are always paid here;
    /// [`Strategy::respond`] raises the cash first.
    #[must_use]
    pub fn choose(self, session: &GameSession, decision: &Decision) -> Action {
        match *decision {
            Decision::BuyOrDecline { player, price, .. } => {
                let balance = Self::balance(session, player);
                if balance >= price.saturating_add(self.reserve()) {
                    Action::Buy
                } else {
                    Action::Decline
                }
            }
            Decision::JailRelease {
                player,
                fee,
                can_pay,
                has_card,
            } => {
                if has_card {
                    return Action::UseJailCard;
                }
                let comfortable =
                    Self::balance(session, player) >= fee.saturating_add(self.reserve());
                match self {
                    Strategy::Aggressive if can_pay => Action::PayJailFee,
                    Strategy::Balanced if can_pay && comfortable => Action::PayJailFee,
                    _ => Action::RollForDoubles,
                }
            }
            Decision::RaiseFunds { debtor, amount, .. } => {
                if Self::balance(session, debtor) >= amount {
                    Action::PayDebt
                } else {
                    Action::DeclareBankruptcy
                }
            }
        }
    }

    /// Answer a decision, selling and mortgaging first if a debt needs it.
    ///
    /// # Errors
    ///
    /// Any error from [`GameSession::decide`].
    pub fn respond(self, session: &mut GameSession, decision: &Decision) -> RuleResult<()> {
        if let Decision::RaiseFunds { debtor, amount, .. } = *decision {
            raise_funds(session, debtor, amount);
        }
        let action = self.choose(session, decision);
        log::debug!("{} answers {decision:?} with {action:?}", self.name());
        session.decide(action)
    }

    /// Lift mortgages and build between turns, keeping the reserve.
    pub fn manage(self, session: &mut GameSession, player: PlayerId) {
        let reserve = self.reserve();
        let owned: Vec<SpaceId> = match session.player(player) {
            Some(p) if !p.bankrupt => p.owned.iter().copied().collect(),
            _ => return,
        };

        for &space in &owned {
            let Ok(ownable) = session.board().ownable(space) else {
                continue;
            };
            let mortgaged = session.ledger().state(space).is_ok_and(|s| s.mortgaged);
            let cost = crate::game::Ledger::unmortgage_cost(
                ownable.mortgage_value,
                session.rules().mortgage_interest_percent,
            );
            if !mortgaged || Self::balance(session, player) < cost.saturating_add(reserve) {
                continue;
            }
            if let Err(e) = session.unmortgage(player, space) {
                log::warn!("player {player}: unmortgage of {space} refused: {e}");
            }
        }

        loop {
            let mut candidates: Vec<(u8, SpaceId, Money)> = owned
                .iter()
                .filter_map(|&space| {
                    let group = session.board().ownable(space).ok()?.group()?;
                    let state = session.ledger().state(space).ok()?;
                    let buildable = !state.hotel
                        && !state.mortgaged
                        && session.ledger().has_monopoly(session.board(), player, group);
                    buildable.then_some((state.level(), space, group.house_price()))
                })
                .collect();
            candidates.sort_unstable();

            let built = candidates.into_iter().any(|(level, space, price)| {
                if Self::balance(session, player) < price.saturating_add(reserve) {
                    return false;
                }
                if level == 4 {
                    session.build_hotel(player, space).is_ok()
                } else {
                    session.build_house(player, space).is_ok()
                }
            });
            if !built {
                break;
            }
        }
    }
}

/// Sell buildings, then mortgage, until `amount` is in hand.
///
/// Returns whether the player can now pay.
pub fn raise_funds(session: &mut GameSession, player: PlayerId, amount: Money) -> bool {
    loop {
        let Some(p) = session.player(player) else {
            return false;
        };
        if p.balance >= amount {
            return true;
        }
        let owned: Vec<SpaceId> = p.owned.iter().copied().collect();

        if owned.iter().any(|&space| session.sell_house(player, space).is_ok()) {
            continue;
        }
        if !owned.iter().any(|&space| session.mortgage(player, space).is_ok()) {
            return false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{RuleConfig, SeededRandomness};

    fn session() -> GameSession {
        GameSession::new(&["a", "b"], RuleConfig::default(), SeededRandomness::new(1)).unwrap()
    }

    #[test]
    fn test_buy_respects_reserve() {
        let mut game = session();
        game.player_mut(0).unwrap().balance = 600;
        let offer = Decision::BuyOrDecline {
            player: 0,
            space: 39,
            price: 400,
        };
        assert_eq!(Strategy::Aggressive.choose(&game, &offer), Action::Buy);
        assert_eq!(Strategy::Balanced.choose(&game, &offer), Action::Buy);
        assert_eq!(Strategy::Cautious.choose(&game, &offer), Action::Decline);
    }

    #[test]
    fn test_jail_choices() {
        let game = session();
        let jail = Decision::JailRelease {
            player: 0,
            fee: 50,
            can_pay: true,
            has_card: false,
        };
        assert_eq!(Strategy::Aggressive.choose(&game, &jail), Action::PayJailFee);
        assert_eq!(Strategy::Balanced.choose(&game, &jail), Action::PayJailFee);
        assert_eq!(Strategy::Cautious.choose(&game, &jail), Action::RollForDoubles);

        let with_card = Decision::JailRelease {
            player: 0,
            fee: 50,
            can_pay: true,
            has_card: true,
        };
        assert_eq!(Strategy::Cautious.choose(&game, &with_card), Action::UseJailCard);
    }

    #[test]
    fn test_raise_funds_sells_then_mortgages() {
        let mut game = session();
        game.award(0, 1, 60).unwrap();
        game.award(0, 3, 60).unwrap();
        game.build_house(0, 1).unwrap();
        game.player_mut(0).unwrap().balance = 0;

        assert!(raise_funds(&mut game, 0, 40));
        assert_eq!(game.ledger().state(1).unwrap().houses, 0);
        assert!(game.player(0).unwrap().balance >= 40);

        assert!(!raise_funds(&mut game, 0, 10_000));
        assert_eq!(game.player(0).unwrap().mortgaged.len(), 2);
    }

    #[test]
    fn test_manage_builds_evenly() {
        let mut game = session();
        game.award(0, 37, 0).unwrap();
        game.award(0, 39, 0).unwrap();
        game.player_mut(0).unwrap().balance = 1000;

        Strategy::Balanced.manage(&mut game, 0);
        let levels: Vec<u8> = [37, 39]
            .iter()
            .map(|&s| game.ledger().state(s).unwrap().level())
            .collect();
        assert_eq!(levels, vec![2, 2]);
        assert_eq!(game.player(0).unwrap().balance, 200);
    }

    #[test]
    fn test_manage_lifts_mortgages_within_reserve() {
        let mut game = session();
        game.award(0, 5, 0).unwrap();
        game.mortgage(0, 5).unwrap();
        game.player_mut(0).unwrap().balance = 310;

        Strategy::Cautious.manage(&mut game, 0);
        assert!(game.ledger().state(5).unwrap().mortgaged);

        Strategy::Balanced.manage(&mut game, 0);
        assert!(!game.ledger().state(5).unwrap().mortgaged);
        assert_eq!(game.player(0).unwrap().balance, 200);
    }
}
