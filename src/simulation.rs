//! Automated play for Landlord games.
//!
//! Provides a pure function interface: `(seed, strategies) -> GameResult`
//!
//! The runner drives a [`GameSession`] with built-in strategies:
//! - Deterministic dice and shuffles from the seed
//! - Decisions answered by each player's [`Strategy`]
//! - Development managed between turns
//! - A turn limit, after which net worth decides the winner
//!
//! [`run_batch`] plays many seeds in parallel with rayon.

mod strategy;

pub use strategy::{raise_funds, Strategy};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::{ConfigError, RuleError};
use crate::game::{
    assert_invariants, GameEvent, GameSession, Money, PlayerId, RuleConfig, SeededRandomness, Step,
};

/// Configuration for automated games.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Rule constants.
    pub rules: RuleConfig,
    /// Turns (across all players) before the game is stopped.
    pub max_turns: u32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            rules: RuleConfig::default(),
            max_turns: 1000,
        }
    }
}

/// Statistics for a single player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStats {
    /// Player identifier.
    pub player_id: PlayerId,
    /// Strategy that played.
    pub strategy: Strategy,
    /// Cash at the end.
    pub final_balance: Money,
    /// Net worth at the end.
    pub final_net_worth: Money,
    /// Spaces owned at the end.
    pub properties_owned: usize,
    /// Turn the player went bankrupt (None if survived).
    pub bankrupt_turn: Option<u32>,
}

/// Final result of a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameResult {
    /// The winning player.
    pub winner: Option<PlayerId>,
    /// Whether the game ended by bankruptcy rather than the turn limit.
    pub decisive: bool,
    /// Total turns played.
    pub turns_played: u32,
    /// Per-player statistics.
    pub player_stats: Vec<PlayerStats>,
    /// Bankruptcy order (first eliminated is index 0).
    pub elimination_order: Vec<PlayerId>,
    /// The seed used for this game.
    pub seed: u64,
}

/// Error type for simulation runs.
#[derive(Debug, Error)]
pub enum SimulationError {
    /// The session could not be set up.
    #[error("invalid game setup: {0}")]
    Config(#[from] ConfigError),
    /// A rules call failed in a way the strategies never provoke.
    #[error("rules engine refused a strategy action: {0}")]
    Rule(#[from] RuleError),
    /// Strategy count does not match the players in a resumed game.
    #[error("{strategies} strategies given for {players} players")]
    StrategyCount {
        /// Strategies supplied.
        strategies: usize,
        /// Players in the session.
        players: usize,
    },
}

/// Run a complete game with the given seed and strategies.
///
/// # Determinism
///
/// Given the same seed, strategies and config, this function always produces
/// the same `GameResult`.
///
/// # Errors
///
/// Returns an error if the player count is outside 2-8.
pub fn run_game(
    seed: u64,
    strategies: &[Strategy],
    config: &SimulationConfig,
) -> Result<GameResult, SimulationError> {
    Simulation::new(seed, strategies, config)?.run()
}

/// A session driven by strategies, one step at a time.
#[derive(Debug)]
pub struct Simulation {
    session: GameSession,
    strategies: Vec<Strategy>,
    max_turns: u32,
    seed: u64,
    finished: bool,
    elimination_order: Vec<PlayerId>,
    bankrupt_turn: Vec<Option<u32>>,
}

impl Simulation {
    /// Start a new game.
    ///
    /// # Errors
    ///
    /// Returns an error if the player count is outside 2-8.
    pub fn new(
        seed: u64,
        strategies: &[Strategy],
        config: &SimulationConfig,
    ) -> Result<Self, SimulationError> {
        let names: Vec<String> = strategies
            .iter()
            .enumerate()
            .map(|(i, s)| format!("P{} ({})", i + 1, s.name()))
            .collect();
        let session =
            GameSession::new(&names, config.rules.clone(), SeededRandomness::new(seed))?;
        Self::resume(session, strategies, config.max_turns, seed)
    }

    /// Drive an existing session, for example one restored from a snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if there is not one strategy per player.
    pub fn resume(
        session: GameSession,
        strategies: &[Strategy],
        max_turns: u32,
        seed: u64,
    ) -> Result<Self, SimulationError> {
        let players = session.players().len();
        if strategies.len() != players {
            return Err(SimulationError::StrategyCount {
                strategies: strategies.len(),
                players,
            });
        }

        Ok(Self {
            finished: !session.is_active(),
            bankrupt_turn: vec![None; players],
            session,
            strategies: strategies.to_vec(),
            max_turns,
            seed,
            elimination_order: Vec::new(),
        })
    }

    /// The session being played.
    #[must_use]
    pub const fn session(&self) -> &GameSession {
        &self.session
    }

    /// Whether the game is over or the turn limit was reached.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.finished
    }

    fn strategy(&self, player: PlayerId) -> Strategy {
        self.strategies
            .get(usize::from(player))
            .copied()
            .unwrap_or(Strategy::Balanced)
    }

    /// Advance to the next decision or turn boundary and act on it.
    ///
    /// Returns the events raised along the way.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine refuses a strategy's action.
    pub fn step(&mut self) -> Result<Vec<GameEvent>, SimulationError> {
        if self.finished {
            return Ok(Vec::new());
        }

        match self.session.advance()? {
            Step::Decision(decision) => {
                self.strategy(decision.player())
                    .respond(&mut self.session, &decision)?;
            }
            Step::TurnComplete => {
                let player = self.session.current_player();
                self.strategy(player).manage(&mut self.session, player);
                if self.session.turn_number() >= self.max_turns {
                    log::info!("turn limit {} reached", self.max_turns);
                    self.finished = true;
                } else {
                    self.session.end_turn()?;
                }
            }
            Step::GameOver { .. } => self.finished = true,
        }
        if !self.session.is_active() {
            self.finished = true;
        }

        let events = self.session.take_events();
        let turn = self.session.turn_number();
        for event in &events {
            if let GameEvent::Bankrupt { player, .. } = *event {
                self.elimination_order.push(player);
                if let Some(slot) = self.bankrupt_turn.get_mut(usize::from(player)) {
                    *slot = Some(turn);
                }
            }
        }

        assert_invariants(&self.session);
        Ok(events)
    }

    /// Play to the end.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine refuses a strategy's action.
    pub fn run(mut self) -> Result<GameResult, SimulationError> {
        while !self.finished {
            self.step()?;
        }
        Ok(self.result())
    }

    /// Result as things stand.
    #[must_use]
    pub fn result(&self) -> GameResult {
        let session = &self.session;
        let player_stats: Vec<PlayerStats> = session
            .players()
            .iter()
            .map(|p| PlayerStats {
                player_id: p.id,
                strategy: self.strategy(p.id),
                final_balance: p.balance,
                final_net_worth: session.net_worth(p.id),
                properties_owned: p.owned.len(),
                bankrupt_turn: self.bankrupt_turn.get(usize::from(p.id)).copied().flatten(),
            })
            .collect();

        let decisive = !session.is_active();
        let winner = if decisive {
            session.winner()
        } else {
            // Highest net worth among survivors; ties go to the earlier seat.
            session
                .order()
                .iter()
                .copied()
                .max_by_key(|&id| (session.net_worth(id), std::cmp::Reverse(id)))
        };

        GameResult {
            winner,
            decisive,
            turns_played: session.turn_number(),
            player_stats,
            elimination_order: self.elimination_order.clone(),
            seed: self.seed,
        }
    }

    /// Hand back the session.
    #[must_use]
    pub fn into_session(self) -> GameSession {
        self.session
    }
}

/// Aggregate statistics over many games.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchStats {
    /// Games played.
    pub games: u64,
    /// Games ended by bankruptcy.
    pub decisive_games: u64,
    /// Total turns across all games.
    pub total_turns: u64,
    /// Wins per seat.
    pub wins: Vec<u64>,
    /// Bankruptcies per seat.
    pub bankruptcies: Vec<u64>,
    /// Sum of final net worth per seat.
    pub net_worth_sum: Vec<u64>,
    /// Seeds whose games failed, with the error.
    pub errors: Vec<(u64, String)>,
}

impl BatchStats {
    /// Empty stats for `players` seats.
    #[must_use]
    pub fn new(players: usize) -> Self {
        Self {
            wins: vec![0; players],
            bankruptcies: vec![0; players],
            net_worth_sum: vec![0; players],
            ..Self::default()
        }
    }

    /// Fold in one game.
    pub fn record(&mut self, result: &GameResult) {
        self.games += 1;
        self.total_turns += u64::from(result.turns_played);
        if result.decisive {
            self.decisive_games += 1;
        }
        if let Some(slot) = result.winner.and_then(|w| self.wins.get_mut(usize::from(w))) {
            *slot += 1;
        }
        for stats in &result.player_stats {
            let seat = usize::from(stats.player_id);
            if stats.bankrupt_turn.is_some() {
                if let Some(slot) = self.bankruptcies.get_mut(seat) {
                    *slot += 1;
                }
            }
            if let Some(slot) = self.net_worth_sum.get_mut(seat) {
                *slot += u64::from(stats.final_net_worth);
            }
        }
    }

    /// Combine two partial aggregates.
    #[must_use]
    pub fn merge(mut self, other: Self) -> Self {
        self.games += other.games;
        self.decisive_games += other.decisive_games;
        self.total_turns += other.total_turns;
        for (a, b) in self.wins.iter_mut().zip(other.wins) {
            *a += b;
        }
        for (a, b) in self.bankruptcies.iter_mut().zip(other.bankruptcies) {
            *a += b;
        }
        for (a, b) in self.net_worth_sum.iter_mut().zip(other.net_worth_sum) {
            *a += b;
        }
        self.errors.extend(other.errors);
        self
    }

    /// Win rate of a seat, as a percentage.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn win_rate(&self, seat: usize) -> f64 {
        if self.games == 0 {
            return 0.0;
        }
        self.wins.get(seat).copied().unwrap_or(0) as f64 / self.games as f64 * 100.0
    }

    /// Average game length in turns.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn average_turns(&self) -> f64 {
        if self.games == 0 {
            return 0.0;
        }
        self.total_turns as f64 / self.games as f64
    }
}

/// Play `games` games on consecutive seeds in parallel.
///
/// `on_done` is called once per finished game, from worker threads.
#[must_use]
pub fn run_batch(
    start_seed: u64,
    games: u64,
    strategies: &[Strategy],
    config: &SimulationConfig,
    on_done: impl Fn() + Sync,
) -> BatchStats {
    let players = strategies.len();
    (0..games)
        .into_par_iter()
        .map(|i| start_seed.wrapping_add(i))
        .fold(
            || BatchStats::new(players),
            |mut stats, seed| {
                match run_game(seed, strategies, config) {
                    Ok(result) => stats.record(&result),
                    Err(e) => stats.errors.push((seed, e.to_string())),
                }
                on_done();
                stats
            },
        )
        .reduce(|| BatchStats::new(players), BatchStats::merge)
}
