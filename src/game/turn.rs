//! Turn state machine.
//!
//! [`GameSession::advance`] drives the current player's turn until it needs
//! a decision or the turn is over. Re-entry for doubles and for card moves
//! is a transition back to an earlier state, never a recursive call, so a
//! turn always runs in bounded stack depth.

use serde::{Deserialize, Serialize};

use crate::error::{RuleError, RuleResult};
use crate::game::session::{Creditor, Release};
use crate::game::{
    CardEffect, CardId, DeckId, DiceRoll, GameEvent, GameSession, JailFreeToken, Money,
    NearestKind, OwnableKind, PlayerId, SpaceId, SpaceKind,
};

/// How a player reached the space being resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Arrival {
    /// Ordinary dice movement.
    Dice {
        /// Total of the roll that moved the player.
        total: u8,
    },
    /// Moved by a card to a named space, Go, or backwards.
    Card,
    /// Moved by an "advance to nearest" card.
    NearestCard(NearestKind),
}

/// Where the current turn is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnState {
    /// About to throw the dice.
    AwaitingRoll,
    /// Starting a turn in jail; a release decision is offered.
    InJail,
    /// Moving forward by a roll.
    Moving {
        /// The roll being applied.
        roll: DiceRoll,
    },
    /// Applying the effect of the space the player stands on.
    ResolvingLanding {
        /// How the player got there.
        arrival: Arrival,
    },
    /// Applying a drawn card.
    ResolvingCard {
        /// Deck the card came from.
        deck: DeckId,
        /// The card.
        card: CardId,
    },
    /// Nothing left to do this turn, apart from a possible extra turn.
    TurnComplete,
}

/// A choice the engine is waiting on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    /// The player stands on an unowned space.
    BuyOrDecline {
        /// Who may buy.
        player: PlayerId,
        /// The space.
        space: SpaceId,
        /// List price.
        price: Money,
    },
    /// The player starts a turn in jail.
    JailRelease {
        /// The prisoner.
        player: PlayerId,
        /// Release fee.
        fee: Money,
        /// Whether the fee is affordable.
        can_pay: bool,
        /// Whether a jail-free card is held.
        has_card: bool,
    },
    /// A debt must be paid or the debtor must go bankrupt.
    RaiseFunds {
        /// Who owes.
        debtor: PlayerId,
        /// Who is owed.
        creditor: Creditor,
        /// Amount owed.
        amount: Money,
    },
}

impl Decision {
    /// The player who has to answer.
    #[must_use]
    pub const fn player(&self) -> PlayerId {
        match *self {
            Decision::BuyOrDecline { player, .. } | Decision::JailRelease { player, .. } => player,
            Decision::RaiseFunds { debtor, .. } => debtor,
        }
    }
}

/// An answer to a [`Decision`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Buy the offered space at list price.
    Buy,
    /// Leave the space unsold.
    Decline,
    /// Pay the jail fee, then roll and move.
    PayJailFee,
    /// Spend a jail-free card, then roll and move.
    UseJailCard,
    /// Try for doubles.
    RollForDoubles,
    /// Pay the pending debt in full.
    PayDebt,
    /// Give up: remaining cash goes to the creditor and the player leaves.
    DeclareBankruptcy,
}

/// What [`GameSession::advance`] stopped at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Step {
    /// Waiting for [`GameSession::decide`].
    Decision(Decision),
    /// The turn is over; call [`GameSession::end_turn`].
    TurnComplete,
    /// One player is left.
    GameOver {
        /// The last player standing.
        winner: Option<PlayerId>,
    },
}

impl GameSession {
    /// Run the current turn until it needs input or finishes.
    ///
    /// # Errors
    ///
    /// Only on an inconsistent board or deck, which validation at startup
    /// rules out.
    pub fn advance(&mut self) -> RuleResult<Step> {
        loop {
            if let Some(step) = self.step()? {
                return Ok(step);
            }
        }
    }

    /// Perform one transition. Returns `Some` when control goes back to the
    /// caller.
    fn step(&mut self) -> RuleResult<Option<Step>> {
        if !self.active {
            return Ok(Some(Step::GameOver {
                winner: self.winner(),
            }));
        }
        if let Some(decision) = &self.pending {
            return Ok(Some(Step::Decision(decision.clone())));
        }
        if let Some(debt) = self.debts.front() {
            let decision = Decision::RaiseFunds {
                debtor: debt.debtor,
                creditor: debt.creditor,
                amount: debt.amount,
            };
            self.pending = Some(decision.clone());
            return Ok(Some(Step::Decision(decision)));
        }

        let player = self.current_player();
        log::debug!("player {player}: {:?}", self.state);
        match self.state {
            TurnState::AwaitingRoll => self.roll_to_move(player),
            TurnState::InJail => {
                let prisoner = self.player_state(player)?;
                let decision = Decision::JailRelease {
                    player,
                    fee: self.rules.jail_fee,
                    can_pay: prisoner.can_afford(self.rules.jail_fee),
                    has_card: prisoner.jail_free.is_some(),
                };
                self.pending = Some(decision.clone());
                return Ok(Some(Step::Decision(decision)));
            }
            TurnState::Moving { roll } => self.move_forward(player, roll)?,
            TurnState::ResolvingLanding { arrival } => {
                if let Some(decision) = self.resolve_landing(player, arrival)? {
                    self.pending = Some(decision.clone());
                    return Ok(Some(Step::Decision(decision)));
                }
            }
            TurnState::ResolvingCard { deck, card } => self.resolve_card(player, deck, card)?,
            TurnState::TurnComplete => {
                let free = !self.current_removed
                    && self.players.get(usize::from(player)).is_some_and(|p| !p.in_jail);
                if self.extra_turn && free {
                    self.extra_turn = false;
                    self.emit(GameEvent::ExtraTurn { player });
                    self.state = TurnState::AwaitingRoll;
                } else {
                    return Ok(Some(Step::TurnComplete));
                }
            }
        }
        Ok(None)
    }

    fn roll_to_move(&mut self, player: PlayerId) {
        let roll = self.rng.roll();
        self.emit(GameEvent::DiceRolled { player, roll });

        let Some(p) = self.players.get_mut(usize::from(player)) else {
            return;
        };
        if roll.is_double() {
            p.consecutive_doubles += 1;
            if p.consecutive_doubles >= 3 {
                log::debug!("player {player}: third double, straight to jail");
                self.send_to_jail(player);
                return;
            }
            self.extra_turn = true;
        } else {
            p.consecutive_doubles = 0;
            self.extra_turn = false;
        }
        self.state = TurnState::Moving { roll };
    }

    fn move_forward(&mut self, player: PlayerId, roll: DiceRoll) -> RuleResult<()> {
        let len = self.board.ring_len();
        let from = self.player_state(player)?.position;
        let sum = usize::from(from) + usize::from(roll.total());
        let to = SpaceId::try_from(sum % len).map_err(|_| RuleError::OutOfRange {
            index: sum % len,
            len,
        })?;
        if sum >= len {
            self.pay_go_bonus(player);
        }
        self.place(player, from, to);
        self.state = TurnState::ResolvingLanding {
            arrival: Arrival::Dice {
                total: roll.total(),
            },
        };
        Ok(())
    }

    /// Card move forward to `to`; pays the Go bonus when it crosses index 0.
    fn advance_to(&mut self, player: PlayerId, to: SpaceId, arrival: Arrival) -> RuleResult<()> {
        let from = self.player_state(player)?.position;
        if to < from {
            self.pay_go_bonus(player);
        }
        self.place(player, from, to);
        self.state = TurnState::ResolvingLanding { arrival };
        Ok(())
    }

    fn place(&mut self, player: PlayerId, from: SpaceId, to: SpaceId) {
        if let Some(p) = self.players.get_mut(usize::from(player)) {
            p.position = to;
        }
        self.emit(GameEvent::Moved { player, from, to });
    }

    fn pay_go_bonus(&mut self, player: PlayerId) {
        let amount = self.rules.go_bonus;
        if let Some(p) = self.players.get_mut(usize::from(player)) {
            p.add(amount);
        }
        self.emit(GameEvent::PassedGo { player, amount });
    }

    fn resolve_landing(
        &mut self,
        player: PlayerId,
        arrival: Arrival,
    ) -> RuleResult<Option<Decision>> {
        let position = self.player_state(player)?.position;
        let kind = self.board.space_at(usize::from(position))?.kind.clone();
        self.state = TurnState::TurnComplete;

        match kind {
            SpaceKind::Ownable(ownable) => match self.ledger.owner(position) {
                None => {
                    return Ok(Some(Decision::BuyOrDecline {
                        player,
                        space: position,
                        price: ownable.price,
                    }));
                }
                Some(owner) if owner == player => {}
                Some(owner) => self.collect_rent(player, owner, position, arrival)?,
            },
            SpaceKind::Tax { amount } => {
                self.emit(GameEvent::TaxCharged { player, amount });
                self.charge(player, Creditor::Bank, amount);
            }
            SpaceKind::CardDraw { deck } => {
                let rng = &mut self.rng;
                let drawn = match deck {
                    DeckId::Chance => self.chance.draw(rng.as_mut()),
                    DeckId::CommunityChest => self.community_chest.draw(rng.as_mut()),
                };
                if let Some((card, drawn)) = drawn {
                    self.emit(GameEvent::CardDrawn {
                        player,
                        deck,
                        label: drawn.label,
                    });
                    self.state = TurnState::ResolvingCard { deck, card };
                }
            }
            SpaceKind::GoToJail => self.send_to_jail(player),
            SpaceKind::FreeParking => {
                if self.rules.free_parking_jackpot && self.jackpot > 0 {
                    let amount = std::mem::take(&mut self.jackpot);
                    if let Some(p) = self.players.get_mut(usize::from(player)) {
                        p.add(amount);
                    }
                    self.emit(GameEvent::JackpotWon { player, amount });
                }
            }
            SpaceKind::Go | SpaceKind::Jail => {}
        }
        Ok(None)
    }

    fn collect_rent(
        &mut self,
        player: PlayerId,
        owner: PlayerId,
        space: SpaceId,
        arrival: Arrival,
    ) -> RuleResult<()> {
        if self.ledger.state(space)?.mortgaged {
            return Ok(());
        }
        let is_utility = matches!(self.board.ownable(space)?.kind, OwnableKind::Utility);
        let (dice, via_card) = match arrival {
            Arrival::Dice { total } => (total, false),
            Arrival::Card | Arrival::NearestCard(_) if is_utility => {
                let roll = self.rng.roll();
                self.emit(GameEvent::DiceRolled { player, roll });
                (roll.total(), true)
            }
            Arrival::Card | Arrival::NearestCard(_) => (0, true),
        };

        let mut rent = self.ledger.rent(&self.board, space, dice, via_card)?;
        if arrival == Arrival::NearestCard(NearestKind::Railroad) {
            rent *= 2;
        }
        if rent > 0 {
            self.emit(GameEvent::RentCharged {
                player,
                owner,
                space,
                amount: rent,
            });
            self.charge(player, Creditor::Player(owner), rent);
        }
        Ok(())
    }

    fn resolve_card(&mut self, player: PlayerId, deck: DeckId, card: CardId) -> RuleResult<()> {
        let effect = self
            .deck(deck)
            .card(card)
            .map(|c| c.effect.clone())
            .ok_or_else(|| RuleError::NotFound(format!("{deck:?} card {card}")))?;
        self.state = TurnState::TurnComplete;
        log::debug!("player {player}: resolving {effect:?}");

        match effect {
            CardEffect::AdvanceTo { space } => {
                let to = self
                    .board
                    .space_named(&space)
                    .map_err(|_| RuleError::InvalidDestination(space.clone()))?
                    .index;
                self.advance_to(player, to, Arrival::Card)?;
            }
            CardEffect::AdvanceToGo => self.advance_to(player, 0, Arrival::Card)?,
            CardEffect::AdvanceToNearest(kind) => {
                let from = self.player_state(player)?.position;
                let to = self
                    .board
                    .nearest(from, kind)
                    .ok_or_else(|| RuleError::InvalidDestination(format!("nearest {kind:?}")))?;
                self.advance_to(player, to, Arrival::NearestCard(kind))?;
            }
            CardEffect::GoToJail => self.send_to_jail(player),
            CardEffect::GetOutOfJailFree => {
                let p = self.player_state_mut(player)?;
                if p.jail_free.is_none() {
                    p.jail_free = Some(JailFreeToken { deck, card });
                    self.deck_mut(deck).hold(card);
                    self.emit(GameEvent::JailFreeCardKept { player });
                }
            }
            CardEffect::Pay(amount) => self.charge(player, Creditor::Bank, amount),
            CardEffect::Collect(amount) => {
                self.player_state_mut(player)?.add(amount);
                self.emit(GameEvent::Collected { player, amount });
            }
            CardEffect::PayEachPlayer(amount) => {
                for other in self.others(player) {
                    self.charge_partial(player, Creditor::Player(other), amount);
                }
            }
            CardEffect::CollectFromEachPlayer(amount) => {
                for other in self.others(player) {
                    self.charge_partial(other, Creditor::Player(player), amount);
                }
            }
            CardEffect::GoBack(steps) => {
                let len = self.board.ring_len();
                let from = self.player_state(player)?.position;
                let back = usize::from(steps) % len;
                let index = (usize::from(from) + len - back) % len;
                let to = SpaceId::try_from(index)
                    .map_err(|_| RuleError::OutOfRange { index, len })?;
                self.place(player, from, to);
                self.state = TurnState::ResolvingLanding {
                    arrival: Arrival::Card,
                };
            }
            CardEffect::Repairs {
                per_house,
                per_hotel,
            } => {
                let (houses, hotels) = self.ledger.buildings_of(player);
                let amount = houses * per_house + hotels * per_hotel;
                self.charge(player, Creditor::Bank, amount);
            }
        }
        Ok(())
    }

    fn others(&self, player: PlayerId) -> Vec<PlayerId> {
        self.order
            .iter()
            .copied()
            .filter(|&other| other != player)
            .collect()
    }

    /// Actions that answer the pending decision.
    #[must_use]
    pub fn legal_actions(&self) -> Vec<Action> {
        match &self.pending {
            None => Vec::new(),
            Some(Decision::BuyOrDecline { .. }) => vec![Action::Buy, Action::Decline],
            Some(Decision::JailRelease {
                can_pay, has_card, ..
            }) => {
                let mut actions = Vec::with_capacity(3);
                if *can_pay {
                    actions.push(Action::PayJailFee);
                }
                if *has_card {
                    actions.push(Action::UseJailCard);
                }
                actions.push(Action::RollForDoubles);
                actions
            }
            Some(Decision::RaiseFunds { .. }) => vec![Action::PayDebt, Action::DeclareBankruptcy],
        }
    }

    /// Answer the pending decision.
    ///
    /// On error the decision stays pending and nothing changes.
    ///
    /// # Errors
    ///
    /// `NoPendingDecision`, `IllegalAction`, or the failing guard's error
    /// (for example `InsufficientFunds` when buying or paying a debt).
    pub fn decide(&mut self, action: Action) -> RuleResult<()> {
        let Some(decision) = self.pending.clone() else {
            return Err(RuleError::NoPendingDecision);
        };
        if !self.legal_actions().contains(&action) {
            log::warn!("refused {action:?} for {decision:?}");
            return Err(RuleError::IllegalAction(action));
        }

        match (decision, action) {
            (Decision::BuyOrDecline { player, space, .. }, Action::Buy) => {
                let buyer = self
                    .players
                    .get_mut(usize::from(player))
                    .ok_or(RuleError::PlayerNotActive(player))?;
                let price = self
                    .ledger
                    .purchase(&self.board, &mut self.bank, buyer, space)?;
                log::info!("player {player} bought space {space} for ${price}");
                self.emit(GameEvent::Bought {
                    player,
                    space,
                    price,
                });
            }
            (Decision::BuyOrDecline { player, space, .. }, _) => {
                self.emit(GameEvent::Declined { player, space });
            }
            (Decision::JailRelease { player, fee, .. }, Action::PayJailFee) => {
                self.player_state_mut(player)?.subtract(fee)?;
                self.credit(Creditor::Bank, fee);
                self.release_and_roll(player, Release::Fee);
            }
            (Decision::JailRelease { player, .. }, Action::UseJailCard) => {
                let p = self.player_state_mut(player)?;
                if let Some(token) = p.jail_free.take() {
                    self.deck_mut(token.deck).return_jail_free_card(token.card);
                }
                self.release_and_roll(player, Release::Card);
            }
            (Decision::JailRelease { player, fee, .. }, _) => {
                self.roll_in_jail(player, fee)?;
            }
            (Decision::RaiseFunds { debtor, creditor, amount }, Action::PayDebt) => {
                self.player_state_mut(debtor)?.subtract(amount)?;
                self.credit(creditor, amount);
                self.debts.pop_front();
                self.emit(GameEvent::Paid {
                    payer: debtor,
                    payee: creditor,
                    amount,
                });
            }
            (Decision::RaiseFunds { debtor, creditor, .. }, _) => {
                self.debts.pop_front();
                let cash = std::mem::take(&mut self.player_state_mut(debtor)?.balance);
                if let Creditor::Player(to) = creditor {
                    self.player_state_mut(to)?.add(cash);
                }
                self.handle_bankruptcy_to(debtor, creditor)?;
            }
        }
        self.pending = None;
        Ok(())
    }

    fn release_and_roll(&mut self, player: PlayerId, how: Release) {
        if let Some(p) = self.players.get_mut(usize::from(player)) {
            p.release();
        }
        self.emit(GameEvent::Released { player, how });
        let roll = self.rng.roll();
        self.emit(GameEvent::DiceRolled { player, roll });
        self.extra_turn = false;
        self.state = TurnState::Moving { roll };
    }

    fn roll_in_jail(&mut self, player: PlayerId, fee: Money) -> RuleResult<()> {
        let roll = self.rng.roll();
        self.emit(GameEvent::DiceRolled { player, roll });
        self.extra_turn = false;

        let served = self.player_state(player)?.jail_turns;
        if roll.is_double() {
            self.player_state_mut(player)?.release();
            self.emit(GameEvent::Released {
                player,
                how: Release::Doubles,
            });
            self.state = TurnState::Moving { roll };
        } else if served >= self.rules.max_jail_turns {
            self.player_state_mut(player)?.release();
            self.emit(GameEvent::Released {
                player,
                how: Release::ServedTime,
            });
            self.charge(player, Creditor::Bank, fee);
            self.state = TurnState::Moving { roll };
        } else {
            self.state = TurnState::TurnComplete;
        }
        Ok(())
    }
}
