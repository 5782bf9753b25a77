//! Error types for the rules engine.

use thiserror::Error;

use crate::game::{ColorGroup, Money, PlayerId, SpaceId};

/// A guard failure or protocol violation reported by a rules operation.
///
/// Every variant is recoverable: the operation that produced it left the
/// session unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    /// Board index past the end of the ring.
    #[error("space index {index} is outside the board (length {len})")]
    OutOfRange {
        /// The requested index.
        index: usize,
        /// Length of the ring.
        len: usize,
    },
    /// No space with the given name.
    #[error("no space named {0:?}")]
    NotFound(String),
    /// The payer cannot cover the amount.
    #[error("insufficient funds: needed ${needed}, available ${available}")]
    InsufficientFunds {
        /// Amount that had to be paid.
        needed: Money,
        /// Cash on hand.
        available: Money,
    },
    /// The player does not hold the space.
    #[error("player {player} does not own space {space}")]
    NotOwned {
        /// Acting player.
        player: PlayerId,
        /// Target space.
        space: SpaceId,
    },
    /// Someone already owns the space.
    #[error("space {0} is already owned")]
    AlreadyOwned(SpaceId),
    /// The space is already mortgaged.
    #[error("space {0} is already mortgaged")]
    AlreadyMortgaged(SpaceId),
    /// The space is not mortgaged.
    #[error("space {0} is not mortgaged")]
    NotMortgaged(SpaceId),
    /// Houses or a hotel must be sold first.
    #[error("space {0} still has houses or a hotel")]
    HasDevelopment(SpaceId),
    /// The player does not hold the whole color group.
    #[error("player {player} has no monopoly on {group:?}")]
    NoMonopoly {
        /// Acting player.
        player: PlayerId,
        /// Color group of the target space.
        group: ColorGroup,
    },
    /// Mortgaged spaces cannot be developed.
    #[error("space {0} is mortgaged")]
    Mortgaged(SpaceId),
    /// The space already carries a hotel.
    #[error("space {0} already has a hotel")]
    HasHotel(SpaceId),
    /// Four houses stand; the next step is a hotel.
    #[error("space {0} already has four houses")]
    FullyBuilt(SpaceId),
    /// Building here would break even distribution across the group.
    #[error("building on space {0} would leave its color group unevenly developed")]
    UnevenDistribution(SpaceId),
    /// The bank has run out of the requested building.
    #[error("the bank has no {0} left")]
    NoInventory(Building),
    /// A card names a space absent from the board.
    #[error("card destination {0:?} is not on the board")]
    InvalidDestination(String),
    /// The space cannot be bought, built on, or mortgaged.
    #[error("space {0} is not an ownable space")]
    NotOwnable(SpaceId),
    /// Only street properties carry houses.
    #[error("space {0} cannot carry buildings")]
    NotBuildable(SpaceId),
    /// Nothing to sell.
    #[error("space {0} has no buildings to sell")]
    NoBuildings(SpaceId),
    /// Houses are bought one at a time until four are in place.
    #[error("space {space} needs four houses before a hotel (has {houses})")]
    NeedsFourHouses {
        /// Target space.
        space: SpaceId,
        /// Houses currently standing.
        houses: u8,
    },
    /// The player is unknown or already bankrupt.
    #[error("player {0} is not active in this game")]
    PlayerNotActive(PlayerId),
    /// `decide` was called while no decision is pending.
    #[error("no decision is pending")]
    NoPendingDecision,
    /// The action does not answer the pending decision.
    #[error("action {0:?} is not legal here")]
    IllegalAction(crate::game::Action),
    /// A decision must be answered before play continues.
    #[error("a decision is pending")]
    DecisionPending,
    /// The turn has not reached completion yet.
    #[error("the current turn is still in progress")]
    TurnInProgress,
    /// The session has a winner.
    #[error("the game is over")]
    GameOver,
}

/// Building kind, for inventory errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Building {
    /// A house.
    House,
    /// A hotel.
    Hotel,
}

impl std::fmt::Display for Building {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Building::House => write!(f, "houses"),
            Building::Hotel => write!(f, "hotels"),
        }
    }
}

/// Malformed board or deck configuration, detected before play starts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The ring has the wrong number of spaces.
    #[error("board has {0} spaces, expected 40")]
    RingLength(usize),
    /// A space's stored index disagrees with its position.
    #[error("space at position {position} claims index {index}")]
    MisplacedSpace {
        /// Position in the ring.
        position: usize,
        /// Index stored on the space.
        index: SpaceId,
    },
    /// A corner is not the expected special space.
    #[error("corner {0} is not the expected special space")]
    Corner(SpaceId),
    /// Two spaces share a name.
    #[error("duplicate space name {0:?}")]
    DuplicateName(String),
    /// A color group has no properties.
    #[error("color group {0:?} has no properties")]
    EmptyColorGroup(ColorGroup),
    /// A card refers to a space that does not exist.
    #[error("card {card:?} refers to missing space {destination:?}")]
    MissingDestination {
        /// Card label.
        card: String,
        /// Space name the card refers to.
        destination: String,
    },
    /// A nearest-space card has no candidate on the board.
    #[error("card {0:?} has no matching space on the board")]
    NoNearestTarget(String),
    /// A deck has no cards.
    #[error("the {0:?} deck is empty")]
    EmptyDeck(crate::game::DeckId),
    /// Player count outside 2..=8.
    #[error("{0} players requested, expected 2 to 8")]
    PlayerCount(usize),
    /// A restored snapshot is internally inconsistent.
    #[error("snapshot is inconsistent: {0}")]
    Snapshot(String),
}

/// Result type for rules operations.
pub type RuleResult<T> = Result<T, RuleError>;
