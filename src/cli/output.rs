//! Output formatting utilities for CLI.

use std::fmt::Write as _;

use landlord::game::{Board, Creditor, GameEvent, Release};
use landlord::simulation::{BatchStats, GameResult};
use landlord::{Money, PlayerId, Strategy};
use serde::Serialize;

/// JSON-serializable game result.
#[derive(Debug, Serialize)]
pub(super) struct JsonGameResult<'a> {
    /// Random seed used.
    pub(super) seed: u64,
    /// Winner player ID (null if none).
    pub(super) winner: Option<PlayerId>,
    /// Whether a bankruptcy decided the game.
    pub(super) decisive: bool,
    /// Total turns played.
    pub(super) turns_played: u32,
    /// Per-player results.
    pub(super) players: Vec<JsonPlayerResult<'a>>,
    /// Bankruptcy order.
    pub(super) elimination_order: &'a [PlayerId],
}

/// JSON-serializable player result.
#[derive(Debug, Serialize)]
pub(super) struct JsonPlayerResult<'a> {
    /// Player ID.
    pub(super) id: PlayerId,
    /// Display name.
    pub(super) name: &'a str,
    /// Strategy played.
    pub(super) strategy: Strategy,
    /// Cash at the end.
    pub(super) balance: Money,
    /// Net worth at the end.
    pub(super) net_worth: Money,
    /// Spaces owned at the end.
    pub(super) properties: usize,
    /// Turn bankrupted (null if survived).
    pub(super) bankrupt_turn: Option<u32>,
}

impl<'a> JsonGameResult<'a> {
    /// Create from a [`GameResult`].
    pub(super) fn from_game_result(result: &'a GameResult, names: &'a [String]) -> Self {
        Self {
            seed: result.seed,
            winner: result.winner,
            decisive: result.decisive,
            turns_played: result.turns_played,
            players: result
                .player_stats
                .iter()
                .map(|ps| JsonPlayerResult {
                    id: ps.player_id,
                    name: names
                        .get(usize::from(ps.player_id))
                        .map_or("Unknown", String::as_str),
                    strategy: ps.strategy,
                    balance: ps.final_balance,
                    net_worth: ps.final_net_worth,
                    properties: ps.properties_owned,
                    bankrupt_turn: ps.bankrupt_turn,
                })
                .collect(),
            elimination_order: &result.elimination_order,
        }
    }
}

fn name(names: &[String], id: PlayerId) -> &str {
    names.get(usize::from(id)).map_or("Unknown", String::as_str)
}

/// Format a game result as human-readable text.
pub(super) fn format_text(result: &GameResult, names: &[String]) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "Game Result (seed: {})", result.seed);
    match result.winner {
        Some(winner) if result.decisive => {
            let _ = writeln!(output, "  Winner: {}", name(names, winner));
        }
        Some(winner) => {
            let _ = writeln!(output, "  Leader at turn limit: {}", name(names, winner));
        }
        None => output.push_str("  Winner: none\n"),
    }
    let _ = writeln!(output, "  Turns: {}\n", result.turns_played);

    for stats in &result.player_stats {
        let _ = write!(
            output,
            "  {}: ${} cash, ${} net worth, {} properties",
            name(names, stats.player_id),
            stats.final_balance,
            stats.final_net_worth,
            stats.properties_owned
        );
        if let Some(turn) = stats.bankrupt_turn {
            let _ = write!(output, " [bankrupt turn {turn}]");
        }
        output.push('\n');
    }

    output
}

/// One line describing an event.
pub(super) fn describe_event(event: &GameEvent, board: &Board, names: &[String]) -> String {
    let space = |id: u8| {
        board
            .space_at(usize::from(id))
            .map_or_else(|_| format!("space {id}"), |s| s.name.clone())
    };
    let creditor = |c: Creditor| match c {
        Creditor::Bank => "the bank".to_string(),
        Creditor::Player(id) => name(names, id).to_string(),
    };

    match event {
        GameEvent::TurnStarted { player, turn } => {
            format!("-- Turn {turn}: {} --", name(names, *player))
        }
        GameEvent::DiceRolled { player, roll } => {
            format!("{} rolls {roll}", name(names, *player))
        }
        GameEvent::Moved { player, to, .. } => {
            format!("{} moves to {}", name(names, *player), space(*to))
        }
        GameEvent::PassedGo { player, amount } => {
            format!("{} passes Go and collects ${amount}", name(names, *player))
        }
        GameEvent::Bought {
            player,
            space: id,
            price,
        } => format!("{} buys {} for ${price}", name(names, *player), space(*id)),
        GameEvent::Declined { player, space: id } => {
            format!("{} declines {}", name(names, *player), space(*id))
        }
        GameEvent::Awarded {
            player,
            space: id,
            price,
        } => format!("{} is awarded {} for ${price}", name(names, *player), space(*id)),
        GameEvent::RentCharged {
            player,
            owner,
            space: id,
            amount,
        } => format!(
            "{} owes {} ${amount} rent on {}",
            name(names, *player),
            name(names, *owner),
            space(*id)
        ),
        GameEvent::TaxCharged { player, amount } => {
            format!("{} owes ${amount} tax", name(names, *player))
        }
        GameEvent::CardDrawn {
            player,
            deck,
            label,
        } => format!("{} draws {deck:?}: {label}", name(names, *player)),
        GameEvent::JailFreeCardKept { player } => {
            format!("{} keeps the card", name(names, *player))
        }
        GameEvent::Collected { player, amount } => {
            format!("{} collects ${amount}", name(names, *player))
        }
        GameEvent::Paid {
            payer,
            payee,
            amount,
        } => format!("{} pays ${amount} to {}", name(names, *payer), creditor(*payee)),
        GameEvent::DebtIncurred { debt } => format!(
            "{} is ${} short of paying {}",
            name(names, debt.debtor),
            debt.amount,
            creditor(debt.creditor)
        ),
        GameEvent::Jailed { player } => format!("{} goes to jail", name(names, *player)),
        GameEvent::Released { player, how } => {
            let how = match how {
                Release::Fee => "by paying the fee",
                Release::Card => "with a card",
                Release::Doubles => "by rolling doubles",
                Release::ServedTime => "after serving time",
            };
            format!("{} leaves jail {how}", name(names, *player))
        }
        GameEvent::JackpotWon { player, amount } => {
            format!("{} wins the ${amount} jackpot", name(names, *player))
        }
        GameEvent::Built {
            player,
            space: id,
            building,
        } => format!("{} builds a {building:?} on {}", name(names, *player), space(*id)),
        GameEvent::Sold {
            player,
            space: id,
            refund,
        } => format!(
            "{} sells a building on {} for ${refund}",
            name(names, *player),
            space(*id)
        ),
        GameEvent::Mortgaged {
            player,
            space: id,
            amount,
        } => format!("{} mortgages {} for ${amount}", name(names, *player), space(*id)),
        GameEvent::Unmortgaged {
            player,
            space: id,
            cost,
        } => format!("{} lifts the mortgage on {} for ${cost}", name(names, *player), space(*id)),
        GameEvent::ExtraTurn { player } => {
            format!("{} rolled doubles and goes again", name(names, *player))
        }
        GameEvent::Bankrupt { player, creditor: c } => {
            format!("{} is bankrupt to {}", name(names, *player), creditor(*c))
        }
        GameEvent::GameWon { winner } => format!("{} wins the game", name(names, *winner)),
    }
}

/// JSON-serializable tournament result.
#[derive(Debug, Serialize)]
pub(super) struct JsonTournamentResult<'a> {
    /// Total games played.
    pub(super) games: u64,
    /// Games ended by bankruptcy.
    pub(super) decisive_games: u64,
    /// Average game length.
    pub(super) average_turns: f64,
    /// Per-seat results.
    pub(super) players: Vec<JsonTournamentPlayer<'a>>,
    /// Failed games.
    pub(super) errors: &'a [(u64, String)],
}

/// Per-seat tournament result.
#[derive(Debug, Serialize)]
pub(super) struct JsonTournamentPlayer<'a> {
    /// Seat name.
    pub(super) name: &'a str,
    /// Games won.
    pub(super) wins: u64,
    /// Win rate in percent.
    pub(super) win_rate: f64,
    /// Times bankrupted.
    pub(super) bankruptcies: u64,
    /// Mean final net worth.
    pub(super) average_net_worth: f64,
}

#[allow(clippy::cast_precision_loss)]
fn average(sum: u64, games: u64) -> f64 {
    if games == 0 {
        0.0
    } else {
        sum as f64 / games as f64
    }
}

impl<'a> JsonTournamentResult<'a> {
    /// Create from aggregate stats.
    pub(super) fn from_stats(stats: &'a BatchStats, names: &'a [String]) -> Self {
        Self {
            games: stats.games,
            decisive_games: stats.decisive_games,
            average_turns: stats.average_turns(),
            players: names
                .iter()
                .enumerate()
                .map(|(seat, name)| JsonTournamentPlayer {
                    name,
                    wins: stats.wins.get(seat).copied().unwrap_or(0),
                    win_rate: stats.win_rate(seat),
                    bankruptcies: stats.bankruptcies.get(seat).copied().unwrap_or(0),
                    average_net_worth: average(
                        stats.net_worth_sum.get(seat).copied().unwrap_or(0),
                        stats.games,
                    ),
                })
                .collect(),
            errors: &stats.errors,
        }
    }
}

/// Format tournament stats as a text table.
pub(super) fn format_tournament_text(stats: &BatchStats, names: &[String]) -> String {
    let mut output = String::new();
    let _ = writeln!(
        output,
        "Tournament Results ({} games, {} decided by bankruptcy)",
        stats.games, stats.decisive_games
    );
    let _ = writeln!(output, "  Average length: {:.1} turns\n", stats.average_turns());
    let _ = writeln!(
        output,
        "  {:<20} {:>8} {:>8} {:>10} {:>12}",
        "Player", "Wins", "Win %", "Bankrupt", "Avg Worth"
    );
    for (seat, name) in names.iter().enumerate() {
        let _ = writeln!(
            output,
            "  {:<20} {:>8} {:>7.1}% {:>10} {:>12.0}",
            name,
            stats.wins.get(seat).copied().unwrap_or(0),
            stats.win_rate(seat),
            stats.bankruptcies.get(seat).copied().unwrap_or(0),
            average(stats.net_worth_sum.get(seat).copied().unwrap_or(0), stats.games),
        );
    }
    if !stats.errors.is_empty() {
        let _ = writeln!(output, "\n  {} games failed:", stats.errors.len());
        for (seed, error) in &stats.errors {
            let _ = writeln!(output, "    seed {seed}: {error}");
        }
    }
    output
}

/// Format tournament stats as CSV.
pub(super) fn format_tournament_csv(stats: &BatchStats, names: &[String]) -> String {
    let mut output = String::from("player,games,wins,win_rate,bankruptcies,avg_net_worth\n");
    for (seat, name) in names.iter().enumerate() {
        let _ = writeln!(
            output,
            "{name},{},{},{:.4},{},{:.2}",
            stats.games,
            stats.wins.get(seat).copied().unwrap_or(0),
            stats.win_rate(seat),
            stats.bankruptcies.get(seat).copied().unwrap_or(0),
            average(stats.net_worth_sum.get(seat).copied().unwrap_or(0), stats.games),
        );
    }
    output
}

/// Seat names like `P1 (aggressive)`.
pub(super) fn seat_names(strategies: &[Strategy]) -> Vec<String> {
    strategies
        .iter()
        .enumerate()
        .map(|(i, s)| format!("P{} ({})", i + 1, s.name()))
        .collect()
}
