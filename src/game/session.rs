//! Game session: players, turn order, debts and bankruptcy.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::error::{Building, ConfigError, RuleError, RuleResult};
use crate::game::{
    check_invariants, Bank, Board, Deck, DeckId, DiceRoll, Ledger, Money, OwnableKind, Player,
    PlayerId, Randomness, RuleConfig, SpaceId,
};
use crate::game::{Decision, TurnState};

/// Fewest players a game can start with.
pub const MIN_PLAYERS: usize = 2;

/// Most players a game can start with.
pub const MAX_PLAYERS: usize = 8;

/// Who a payment is owed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Creditor {
    /// The bank (or the Free Parking pool under that house rule).
    Bank,
    /// Another player.
    Player(PlayerId),
}

/// A payment the debtor could not cover when it fell due.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Debt {
    /// Who owes.
    pub debtor: PlayerId,
    /// Who is owed.
    pub creditor: Creditor,
    /// Amount still owed.
    pub amount: Money,
}

/// How a prisoner got out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Release {
    /// Paid the fee.
    Fee,
    /// Used a jail-free card.
    Card,
    /// Rolled doubles.
    Doubles,
    /// Failed the last roll and paid the fee.
    ServedTime,
}

/// Notifications for a presentation layer, drained with
/// [`GameSession::take_events`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum GameEvent {
    TurnStarted { player: PlayerId, turn: u32 },
    DiceRolled { player: PlayerId, roll: DiceRoll },
    Moved { player: PlayerId, from: SpaceId, to: SpaceId },
    PassedGo { player: PlayerId, amount: Money },
    Bought { player: PlayerId, space: SpaceId, price: Money },
    Declined { player: PlayerId, space: SpaceId },
    Awarded { player: PlayerId, space: SpaceId, price: Money },
    RentCharged { player: PlayerId, owner: PlayerId, space: SpaceId, amount: Money },
    TaxCharged { player: PlayerId, amount: Money },
    CardDrawn { player: PlayerId, deck: DeckId, label: String },
    JailFreeCardKept { player: PlayerId },
    Collected { player: PlayerId, amount: Money },
    Paid { payer: PlayerId, payee: Creditor, amount: Money },
    DebtIncurred { debt: Debt },
    Jailed { player: PlayerId },
    Released { player: PlayerId, how: Release },
    JackpotWon { player: PlayerId, amount: Money },
    Built { player: PlayerId, space: SpaceId, building: Building },
    Sold { player: PlayerId, space: SpaceId, refund: Money },
    Mortgaged { player: PlayerId, space: SpaceId, amount: Money },
    Unmortgaged { player: PlayerId, space: SpaceId, cost: Money },
    ExtraTurn { player: PlayerId },
    Bankrupt { player: PlayerId, creditor: Creditor },
    GameWon { winner: PlayerId },
}

/// Everything needed to continue a game later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Rule constants.
    pub rules: RuleConfig,
    /// The board.
    pub board: Board,
    /// All players, bankrupt ones included, indexed by id.
    pub players: Vec<Player>,
    /// Active players in turn order.
    pub order: Vec<PlayerId>,
    /// Index into `order` of the player whose turn it is.
    pub current: usize,
    /// The current player went bankrupt this turn.
    pub current_removed: bool,
    /// Ownership and development.
    pub ledger: Ledger,
    /// Bank stock and unsold pool.
    pub bank: Bank,
    /// Chance deck with its draw order.
    pub chance: Deck,
    /// Community Chest deck with its draw order.
    pub community_chest: Deck,
    /// Turn state machine position.
    pub state: TurnState,
    /// The last move roll was a double.
    pub extra_turn: bool,
    /// Decision awaiting an answer.
    pub pending: Option<Decision>,
    /// Unpaid debts, oldest first.
    pub debts: VecDeque<Debt>,
    /// Free Parking pool.
    pub jackpot: Money,
    /// False once one player is left.
    pub active: bool,
    /// Turns started so far.
    pub turn_number: u32,
}

/// A running game.
///
/// The session owns the board, ledger, bank and decks exclusively; all
/// mutation goes through its methods.
#[derive(Debug)]
pub struct GameSession {
    pub(super) rules: RuleConfig,
    pub(super) board: Board,
    pub(super) players: Vec<Player>,
    pub(super) order: Vec<PlayerId>,
    pub(super) current: usize,
    pub(super) current_removed: bool,
    pub(super) ledger: Ledger,
    pub(super) bank: Bank,
    pub(super) chance: Deck,
    pub(super) community_chest: Deck,
    pub(super) state: TurnState,
    pub(super) extra_turn: bool,
    pub(super) pending: Option<Decision>,
    pub(super) debts: VecDeque<Debt>,
    pub(super) jackpot: Money,
    pub(super) active: bool,
    pub(super) turn_number: u32,
    pub(super) events: Vec<GameEvent>,
    pub(super) rng: Box<dyn Randomness>,
}

/// Check a board and its decks before play.
///
/// # Errors
///
/// The first structural problem found.
pub fn validate(board: &Board, chance: &Deck, community_chest: &Deck) -> Result<(), ConfigError> {
    board.validate()?;
    chance.validate(board)?;
    community_chest.validate(board)
}

impl GameSession {
    /// Start a game on the standard board with the standard decks.
    ///
    /// # Errors
    ///
    /// `PlayerCount` unless 2 to 8 names are given.
    pub fn new<S: AsRef<str>>(
        names: &[S],
        rules: RuleConfig,
        rng: impl Randomness + 'static,
    ) -> Result<Self, ConfigError> {
        Self::with_components(
            Board::standard(),
            Deck::chance(),
            Deck::community_chest(),
            names,
            rules,
            rng,
        )
    }

    /// Start a game with a custom board and decks.
    ///
    /// # Errors
    ///
    /// Any validation failure, or a bad player count.
    pub fn with_components<S: AsRef<str>>(
        board: Board,
        chance: Deck,
        community_chest: Deck,
        names: &[S],
        rules: RuleConfig,
        rng: impl Randomness + 'static,
    ) -> Result<Self, ConfigError> {
        validate(&board, &chance, &community_chest)?;
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&names.len()) {
            return Err(ConfigError::PlayerCount(names.len()));
        }

        let players: Vec<Player> = names
            .iter()
            .zip(0..)
            .map(|(name, id)| Player::new(id, name.as_ref(), rules.starting_stake))
            .collect();
        let order = players.iter().map(|p| p.id).collect();
        let bank = Bank::new(rules.bank_houses, rules.bank_hotels, board.ownable_ids());
        let ledger = Ledger::new(&board);

        let mut session = Self {
            rules,
            board,
            players,
            order,
            current: 0,
            current_removed: false,
            ledger,
            bank,
            chance,
            community_chest,
            state: TurnState::AwaitingRoll,
            extra_turn: false,
            pending: None,
            debts: VecDeque::new(),
            jackpot: 0,
            active: true,
            turn_number: 0,
            events: Vec::new(),
            rng: Box::new(rng),
        };
        session.begin_turn();
        log::info!("new game with {} players", session.players.len());
        Ok(session)
    }

    /// Rule constants in force.
    #[must_use]
    pub const fn rules(&self) -> &RuleConfig {
        &self.rules
    }

    /// The board.
    #[must_use]
    pub const fn board(&self) -> &Board {
        &self.board
    }

    /// All players, bankrupt ones included, indexed by id.
    #[must_use]
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// One player.
    #[must_use]
    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(usize::from(id))
    }

    /// Direct access to a player, bypassing the rules.
    ///
    /// Meant for setting up scenarios; the caller keeps the game consistent.
    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.get_mut(usize::from(id))
    }

    pub(super) fn player_state(&self, id: PlayerId) -> RuleResult<&Player> {
        self.players
            .get(usize::from(id))
            .filter(|p| !p.bankrupt)
            .ok_or(RuleError::PlayerNotActive(id))
    }

    pub(super) fn player_state_mut(&mut self, id: PlayerId) -> RuleResult<&mut Player> {
        self.players
            .get_mut(usize::from(id))
            .filter(|p| !p.bankrupt)
            .ok_or(RuleError::PlayerNotActive(id))
    }

    /// Active players in turn order.
    #[must_use]
    pub fn order(&self) -> &[PlayerId] {
        &self.order
    }

    /// The player whose turn it is.
    #[must_use]
    pub fn current_player(&self) -> PlayerId {
        self.order.get(self.current).copied().unwrap_or_default()
    }

    /// Ownership and development.
    #[must_use]
    pub const fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Bank stock and unsold pool.
    #[must_use]
    pub const fn bank(&self) -> &Bank {
        &self.bank
    }

    /// One of the two decks.
    #[must_use]
    pub const fn deck(&self, id: DeckId) -> &Deck {
        match id {
            DeckId::Chance => &self.chance,
            DeckId::CommunityChest => &self.community_chest,
        }
    }

    pub(super) fn deck_mut(&mut self, id: DeckId) -> &mut Deck {
        match id {
            DeckId::Chance => &mut self.chance,
            DeckId::CommunityChest => &mut self.community_chest,
        }
    }

    /// Turn state machine position.
    #[must_use]
    pub const fn state(&self) -> TurnState {
        self.state
    }

    /// Decision awaiting an answer, if any.
    #[must_use]
    pub const fn pending(&self) -> Option<&Decision> {
        self.pending.as_ref()
    }

    /// Unpaid debts, oldest first.
    pub fn debts(&self) -> impl Iterator<Item = &Debt> {
        self.debts.iter()
    }

    /// Free Parking pool.
    #[must_use]
    pub const fn jackpot(&self) -> Money {
        self.jackpot
    }

    /// Turns started so far, across all players.
    #[must_use]
    pub const fn turn_number(&self) -> u32 {
        self.turn_number
    }

    /// False once a single player is left.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// The last player standing, once the game is over.
    #[must_use]
    pub fn winner(&self) -> Option<PlayerId> {
        if self.active {
            None
        } else {
            self.order.first().copied()
        }
    }

    /// Drain the notifications raised since the last call.
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub(super) fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Cash plus property at list price (half for mortgaged spaces) plus
    /// buildings at cost.
    #[must_use]
    pub fn net_worth(&self, id: PlayerId) -> Money {
        let Some(player) = self.player(id) else {
            return 0;
        };
        let holdings: Money = player
            .owned
            .iter()
            .filter_map(|&space| {
                let ownable = self.board.ownable(space).ok()?;
                let state = self.ledger.state(space).ok()?;
                let land = if state.mortgaged {
                    ownable.price - ownable.mortgage_value
                } else {
                    ownable.price
                };
                let buildings = match ownable.kind {
                    OwnableKind::Property { group, .. } => {
                        group.house_price() * Money::from(state.level())
                    }
                    OwnableKind::Railroad { .. } | OwnableKind::Utility => 0,
                };
                Some(land + buildings)
            })
            .sum();
        player.balance + holdings
    }

    fn begin_turn(&mut self) {
        let id = self.current_player();
        self.turn_number += 1;
        self.extra_turn = false;
        self.current_removed = false;
        let turn = self.turn_number;
        if let Some(player) = self.players.get_mut(usize::from(id)) {
            player.turns_taken += 1;
            if player.in_jail {
                player.jail_turns += 1;
                self.state = TurnState::InJail;
            } else {
                self.state = TurnState::AwaitingRoll;
            }
        }
        self.emit(GameEvent::TurnStarted { player: id, turn });
    }

    /// Pass play to the next active player.
    ///
    /// # Errors
    ///
    /// `GameOver`, `DecisionPending`, or `TurnInProgress` if the current
    /// turn has not reached completion.
    pub fn end_turn(&mut self) -> RuleResult<()> {
        if !self.active {
            return Err(RuleError::GameOver);
        }
        if self.pending.is_some() || !self.debts.is_empty() {
            return Err(RuleError::DecisionPending);
        }
        if self.state != TurnState::TurnComplete {
            return Err(RuleError::TurnInProgress);
        }

        if self.current_removed {
            // The index already points at the next player.
            if self.current >= self.order.len() {
                self.current = 0;
            }
        } else {
            let outgoing = self.current_player();
            if let Some(player) = self.players.get_mut(usize::from(outgoing)) {
                player.consecutive_doubles = 0;
            }
            self.current = (self.current + 1) % self.order.len();
        }
        self.begin_turn();
        Ok(())
    }

    pub(super) fn send_to_jail(&mut self, player: PlayerId) {
        let jail = self.board.jail_index();
        if let Some(p) = self.players.get_mut(usize::from(player)) {
            p.send_to_jail(jail);
        }
        self.extra_turn = false;
        self.state = TurnState::TurnComplete;
        self.emit(GameEvent::Jailed { player });
    }

    pub(super) fn credit(&mut self, creditor: Creditor, amount: Money) {
        match creditor {
            Creditor::Bank => {
                if self.rules.free_parking_jackpot {
                    self.jackpot += amount;
                }
            }
            Creditor::Player(id) => {
                if let Some(player) = self.players.get_mut(usize::from(id)) {
                    player.add(amount);
                }
            }
        }
    }

    /// Collect `amount` from `debtor`, or queue a debt for all of it.
    pub(super) fn charge(&mut self, debtor: PlayerId, creditor: Creditor, amount: Money) {
        if amount == 0 {
            return;
        }
        let paid = match creditor {
            Creditor::Player(owner) => two_players(&mut self.players, debtor, owner)
                .is_some_and(|(payer, payee)| Ledger::pay_rent(payer, payee, amount).is_ok()),
            Creditor::Bank => {
                let paid = self
                    .players
                    .get_mut(usize::from(debtor))
                    .is_some_and(|payer| payer.subtract(amount).is_ok());
                if paid {
                    self.credit(Creditor::Bank, amount);
                }
                paid
            }
        };

        if paid {
            self.emit(GameEvent::Paid {
                payer: debtor,
                payee: creditor,
                amount,
            });
        } else {
            self.queue_debt(Debt {
                debtor,
                creditor,
                amount,
            });
        }
    }

    /// Collect what `debtor` can pay now and queue a debt for the rest.
    pub(super) fn charge_partial(&mut self, debtor: PlayerId, creditor: Creditor, amount: Money) {
        let available = self.player(debtor).map_or(0, |p| p.balance);
        let now = amount.min(available);
        if now > 0 {
            self.charge(debtor, creditor, now);
        }
        if amount > now {
            self.queue_debt(Debt {
                debtor,
                creditor,
                amount: amount - now,
            });
        }
    }

    fn queue_debt(&mut self, debt: Debt) {
        log::debug!("player {} owes {:?} ${}", debt.debtor, debt.creditor, debt.amount);
        self.debts.push_back(debt);
        self.emit(GameEvent::DebtIncurred { debt });
    }

    /// Remove a player from the game, returning everything they hold to
    /// the bank.
    ///
    /// # Errors
    ///
    /// `PlayerNotActive` if the player is unknown or already out.
    pub fn handle_bankruptcy(&mut self, player: PlayerId) -> RuleResult<()> {
        self.handle_bankruptcy_to(player, Creditor::Bank)
    }

    pub(super) fn handle_bankruptcy_to(
        &mut self,
        id: PlayerId,
        creditor: Creditor,
    ) -> RuleResult<()> {
        let player = self.player_state_mut(id)?;
        let owned = std::mem::take(&mut player.owned);
        player.mortgaged.clear();
        player.balance = 0;
        player.in_jail = false;
        player.jail_turns = 0;
        player.consecutive_doubles = 0;
        player.bankrupt = true;
        let token = player.jail_free.take();

        for space in owned {
            self.ledger.reset(&mut self.bank, space)?;
        }
        if let Some(token) = token {
            self.deck_mut(token.deck).return_jail_free_card(token.card);
        }

        if let Some(position) = self.order.iter().position(|&p| p == id) {
            self.order.remove(position);
            if position < self.current {
                self.current -= 1;
            } else if position == self.current {
                self.current_removed = true;
                self.extra_turn = false;
                self.state = TurnState::TurnComplete;
            }
            if self.current >= self.order.len() {
                self.current = 0;
            }
        }

        self.debts.retain(|debt| debt.debtor != id);
        for debt in &mut self.debts {
            if debt.creditor == Creditor::Player(id) {
                debt.creditor = Creditor::Bank;
            }
        }
        if self.pending.as_ref().is_some_and(|d| d.player() == id) {
            self.pending = None;
        }

        log::info!("player {id} is bankrupt (creditor {creditor:?})");
        self.emit(GameEvent::Bankrupt {
            player: id,
            creditor,
        });

        if self.order.len() <= 1 {
            self.active = false;
            self.pending = None;
            self.debts.clear();
            if let Some(&winner) = self.order.first() {
                log::info!("player {winner} wins");
                self.emit(GameEvent::GameWon { winner });
            }
        }
        Ok(())
    }

    fn open_for(&self, id: PlayerId) -> RuleResult<()> {
        if !self.active {
            return Err(RuleError::GameOver);
        }
        self.player_state(id).map(|_| ())
    }

    /// Build a house for `player` on `space`.
    ///
    /// # Errors
    ///
    /// Any ledger guard failure.
    pub fn build_house(&mut self, player: PlayerId, space: SpaceId) -> RuleResult<Money> {
        self.open_for(player)?;
        let owner = &mut self.players[usize::from(player)];
        let price = self
            .ledger
            .build_house(&self.board, &mut self.bank, owner, space)?;
        self.emit(GameEvent::Built {
            player,
            space,
            building: Building::House,
        });
        Ok(price)
    }

    /// Replace four houses with a hotel.
    ///
    /// # Errors
    ///
    /// Any ledger guard failure.
    pub fn build_hotel(&mut self, player: PlayerId, space: SpaceId) -> RuleResult<Money> {
        self.open_for(player)?;
        let owner = &mut self.players[usize::from(player)];
        let price = self
            .ledger
            .build_hotel(&self.board, &mut self.bank, owner, space)?;
        self.emit(GameEvent::Built {
            player,
            space,
            building: Building::Hotel,
        });
        Ok(price)
    }

    /// Sell one building back to the bank.
    ///
    /// # Errors
    ///
    /// Any ledger guard failure.
    pub fn sell_house(&mut self, player: PlayerId, space: SpaceId) -> RuleResult<Money> {
        self.open_for(player)?;
        let owner = &mut self.players[usize::from(player)];
        let refund = self
            .ledger
            .sell_house(&self.board, &mut self.bank, owner, space)?;
        self.emit(GameEvent::Sold {
            player,
            space,
            refund,
        });
        Ok(refund)
    }

    /// Mortgage a space.
    ///
    /// # Errors
    ///
    /// Any ledger guard failure.
    pub fn mortgage(&mut self, player: PlayerId, space: SpaceId) -> RuleResult<Money> {
        self.open_for(player)?;
        let owner = &mut self.players[usize::from(player)];
        let amount = self.ledger.mortgage(&self.board, owner, space)?;
        self.emit(GameEvent::Mortgaged {
            player,
            space,
            amount,
        });
        Ok(amount)
    }

    /// Lift a mortgage.
    ///
    /// # Errors
    ///
    /// Any ledger guard failure.
    pub fn unmortgage(&mut self, player: PlayerId, space: SpaceId) -> RuleResult<Money> {
        self.open_for(player)?;
        let interest = self.rules.mortgage_interest_percent;
        let owner = &mut self.players[usize::from(player)];
        let cost = self
            .ledger
            .unmortgage(&self.board, owner, space, interest)?;
        self.emit(GameEvent::Unmortgaged {
            player,
            space,
            cost,
        });
        Ok(cost)
    }

    /// Hand an unsold space to a player at an agreed price, as an auction
    /// would.
    ///
    /// # Errors
    ///
    /// `NotOwnable`, `AlreadyOwned`, or `InsufficientFunds`.
    pub fn award(&mut self, player: PlayerId, space: SpaceId, price: Money) -> RuleResult<()> {
        self.open_for(player)?;
        let buyer = &mut self.players[usize::from(player)];
        self.ledger.award(&mut self.bank, buyer, space, price)?;
        self.emit(GameEvent::Awarded {
            player,
            space,
            price,
        });
        Ok(())
    }

    /// Capture the full game state.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            rules: self.rules.clone(),
            board: self.board.clone(),
            players: self.players.clone(),
            order: self.order.clone(),
            current: self.current,
            current_removed: self.current_removed,
            ledger: self.ledger.clone(),
            bank: self.bank.clone(),
            chance: self.chance.clone(),
            community_chest: self.community_chest.clone(),
            state: self.state,
            extra_turn: self.extra_turn,
            pending: self.pending.clone(),
            debts: self.debts.clone(),
            jackpot: self.jackpot,
            active: self.active,
            turn_number: self.turn_number,
        }
    }

    /// Continue a game from a snapshot.
    ///
    /// # Errors
    ///
    /// A validation failure, or `Snapshot` if the record is inconsistent.
    pub fn restore(
        snapshot: Snapshot,
        rng: impl Randomness + 'static,
    ) -> Result<Self, ConfigError> {
        let session = Self::from_snapshot(snapshot, rng)?;
        let violations = check_invariants(&session);
        if let Some(first) = violations.first() {
            return Err(ConfigError::Snapshot(first.message.clone()));
        }
        Ok(session)
    }

    /// Rebuild a session after structural checks only, so the caller can
    /// inspect every invariant violation with [`check_invariants`].
    ///
    /// # Errors
    ///
    /// A board or deck validation failure, a bad player count, or a turn
    /// index outside the turn order.
    pub fn from_snapshot(
        snapshot: Snapshot,
        rng: impl Randomness + 'static,
    ) -> Result<Self, ConfigError> {
        validate(&snapshot.board, &snapshot.chance, &snapshot.community_chest)?;
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&snapshot.players.len()) {
            return Err(ConfigError::PlayerCount(snapshot.players.len()));
        }
        if snapshot.active && snapshot.current >= snapshot.order.len() {
            return Err(ConfigError::Snapshot(format!(
                "current index {} past turn order of {}",
                snapshot.current,
                snapshot.order.len()
            )));
        }

        Ok(Self {
            rules: snapshot.rules,
            board: snapshot.board,
            players: snapshot.players,
            order: snapshot.order,
            current: snapshot.current,
            current_removed: snapshot.current_removed,
            ledger: snapshot.ledger,
            bank: snapshot.bank,
            chance: snapshot.chance,
            community_chest: snapshot.community_chest,
            state: snapshot.state,
            extra_turn: snapshot.extra_turn,
            pending: snapshot.pending,
            debts: snapshot.debts,
            jackpot: snapshot.jackpot,
            active: snapshot.active,
            turn_number: snapshot.turn_number,
            events: Vec::new(),
            rng: Box::new(rng),
        })
    }
}

/// Borrow two distinct players mutably.
fn two_players(
    players: &mut [Player],
    a: PlayerId,
    b: PlayerId,
) -> Option<(&mut Player, &mut Player)> {
    let (a, b) = (usize::from(a), usize::from(b));
    if a == b || a.max(b) >= players.len() {
        return None;
    }
    if a < b {
        let (left, right) = players.split_at_mut(b);
        Some((&mut left[a], &mut right[0]))
    } else {
        let (left, right) = players.split_at_mut(a);
        Some((&mut right[0], &mut left[b]))
    }
}
