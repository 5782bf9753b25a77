//! Board ring and space types.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, RuleError, RuleResult};
use crate::game::{DeckId, Money, NearestKind, SpaceId};

/// Number of spaces on the ring.
pub const RING_LENGTH: usize = 40;

/// Color groups of street properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ColorGroup {
    /// Mediterranean and Baltic.
    Brown,
    /// Oriental, Vermont, Connecticut.
    LightBlue,
    /// St. Charles, States, Virginia.
    Pink,
    /// St. James, Tennessee, New York.
    Orange,
    /// Kentucky, Indiana, Illinois.
    Red,
    /// Atlantic, Ventnor, Marvin Gardens.
    Yellow,
    /// Pacific, North Carolina, Pennsylvania.
    Green,
    /// Park Place and Boardwalk.
    DarkBlue,
}

impl ColorGroup {
    /// All color groups in board order.
    pub const ALL: [ColorGroup; 8] = [
        ColorGroup::Brown,
        ColorGroup::LightBlue,
        ColorGroup::Pink,
        ColorGroup::Orange,
        ColorGroup::Red,
        ColorGroup::Yellow,
        ColorGroup::Green,
        ColorGroup::DarkBlue,
    ];

    /// Price of one house (or of the hotel) on this group.
    #[must_use]
    pub const fn house_price(self) -> Money {
        match self {
            ColorGroup::Brown | ColorGroup::LightBlue => 50,
            ColorGroup::Pink | ColorGroup::Orange => 100,
            ColorGroup::Red | ColorGroup::Yellow => 150,
            ColorGroup::Green | ColorGroup::DarkBlue => 200,
        }
    }
}

/// What kind of ownable a space is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OwnableKind {
    /// A street property that can carry houses and a hotel.
    Property {
        /// Color group.
        group: ColorGroup,
        /// Rent with 0, 1, 2, 3, 4 houses and with a hotel.
        rents: [Money; 6],
    },
    /// A railroad. Rent doubles with each additional railroad owned.
    Railroad {
        /// Rent when one railroad is owned.
        base_rent: Money,
    },
    /// A utility. Rent is a multiple of the dice roll.
    Utility,
}

/// Purchase data for an ownable space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ownable {
    /// Kind and rent data.
    pub kind: OwnableKind,
    /// Purchase price.
    pub price: Money,
    /// Cash received for mortgaging.
    pub mortgage_value: Money,
}

impl Ownable {
    /// Color group, for street properties.
    #[must_use]
    pub const fn group(&self) -> Option<ColorGroup> {
        match self.kind {
            OwnableKind::Property { group, .. } => Some(group),
            OwnableKind::Railroad { .. } | OwnableKind::Utility => None,
        }
    }

    /// Whether the space is a railroad or utility of the given kind.
    #[must_use]
    pub const fn is_nearest_kind(&self, kind: NearestKind) -> bool {
        matches!(
            (&self.kind, kind),
            (OwnableKind::Railroad { .. }, NearestKind::Railroad)
                | (OwnableKind::Utility, NearestKind::Utility)
        )
    }
}

/// Variant data of a space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpaceKind {
    /// Start corner.
    Go,
    /// Jail corner (just visiting when landed on).
    Jail,
    /// Free Parking corner.
    FreeParking,
    /// Sends the player to jail.
    GoToJail,
    /// Pay a fixed tax.
    Tax {
        /// Amount owed.
        amount: Money,
    },
    /// Draw from a deck.
    CardDraw {
        /// Which deck.
        deck: DeckId,
    },
    /// Property, railroad or utility.
    Ownable(Ownable),
}

/// A single space on the ring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Space {
    /// Board index.
    pub index: SpaceId,
    /// Display name, unique on the board.
    pub name: String,
    /// Variant data.
    pub kind: SpaceKind,
}

impl Space {
    /// Ownable data, if the space can be bought.
    #[must_use]
    pub const fn ownable(&self) -> Option<&Ownable> {
        match &self.kind {
            SpaceKind::Ownable(ownable) => Some(ownable),
            _ => None,
        }
    }
}

/// The immutable board ring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    spaces: Vec<Space>,
}

impl Board {
    /// Build a board from spaces in ring order.
    ///
    /// The board is not checked here; call [`Board::validate`] before play.
    #[must_use]
    pub fn new(spaces: Vec<Space>) -> Self {
        Self { spaces }
    }

    /// The standard 40-space board.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn standard() -> Self {
        use ColorGroup::{Brown, DarkBlue, Green, LightBlue, Orange, Pink, Red, Yellow};

        let kinds: [(&str, SpaceKind); RING_LENGTH] = [
            ("Go", SpaceKind::Go),
            ("Mediterranean Avenue", street(Brown, 60, [2, 10, 30, 90, 160, 250])),
            ("Community Chest", SpaceKind::CardDraw { deck: DeckId::CommunityChest }),
            ("Baltic Avenue", street(Brown, 60, [4, 20, 60, 180, 320, 450])),
            ("Income Tax", SpaceKind::Tax { amount: 200 }),
            ("Reading Railroad", railroad()),
            ("Oriental Avenue", street(LightBlue, 100, [6, 30, 90, 270, 400, 550])),
            ("Chance", SpaceKind::CardDraw { deck: DeckId::Chance }),
            ("Vermont Avenue", street(LightBlue, 100, [6, 30, 90, 270, 400, 550])),
            ("Connecticut Avenue", street(LightBlue, 120, [8, 40, 100, 300, 450, 600])),
            ("Jail", SpaceKind::Jail),
            ("St. Charles Place", street(Pink, 140, [10, 50, 150, 450, 625, 750])),
            ("Electric Company", utility()),
            ("States Avenue", street(Pink, 140, [10, 50, 150, 450, 625, 750])),
            ("Virginia Avenue", street(Pink, 160, [12, 60, 180, 500, 700, 900])),
            ("Pennsylvania Railroad", railroad()),
            ("St. James Place", street(Orange, 180, [14, 70, 200, 550, 750, 950])),
            ("Community Chest 2", SpaceKind::CardDraw { deck: DeckId::CommunityChest }),
            ("Tennessee Avenue", street(Orange, 180, [14, 70, 200, 550, 750, 950])),
            ("New York Avenue", street(Orange, 200, [16, 80, 220, 600, 800, 1000])),
            ("Free Parking", SpaceKind::FreeParking),
            ("Kentucky Avenue", street(Red, 220, [18, 90, 250, 700, 875, 1050])),
            ("Chance 2", SpaceKind::CardDraw { deck: DeckId::Chance }),
            ("Indiana Avenue", street(Red, 220, [18, 90, 250, 700, 875, 1050])),
            ("Illinois Avenue", street(Red, 240, [20, 100, 300, 750, 925, 1100])),
            ("B. & O. Railroad", railroad()),
            ("Atlantic Avenue", street(Yellow, 260, [22, 110, 330, 800, 975, 1150])),
            ("Ventnor Avenue", street(Yellow, 260, [22, 110, 330, 800, 975, 1150])),
            ("Water Works", utility()),
            ("Marvin Gardens", street(Yellow, 280, [24, 120, 360, 850, 1025, 1200])),
            ("Go To Jail", SpaceKind::GoToJail),
            ("Pacific Avenue", street(Green, 300, [26, 130, 390, 900, 1100, 1275])),
            ("North Carolina Avenue", street(Green, 300, [26, 130, 390, 900, 1100, 1275])),
            ("Community Chest 3", SpaceKind::CardDraw { deck: DeckId::CommunityChest }),
            ("Pennsylvania Avenue", street(Green, 320, [28, 150, 450, 1000, 1200, 1400])),
            ("Short Line", railroad()),
            ("Chance 3", SpaceKind::CardDraw { deck: DeckId::Chance }),
            ("Park Place", street(DarkBlue, 350, [35, 175, 500, 1100, 1300, 1500])),
            ("Luxury Tax", SpaceKind::Tax { amount: 100 }),
            ("Boardwalk", street(DarkBlue, 400, [50, 200, 600, 1400, 1700, 2000])),
        ];

        let spaces = kinds
            .into_iter()
            .enumerate()
            .map(|(i, (name, kind))| Space {
                index: i as SpaceId,
                name: name.to_string(),
                kind,
            })
            .collect();

        Self { spaces }
    }

    /// Number of spaces on the ring.
    #[must_use]
    pub fn ring_len(&self) -> usize {
        self.spaces.len()
    }

    /// Space at a board index.
    ///
    /// # Errors
    ///
    /// Returns `OutOfRange` if `index` is past the end of the ring.
    pub fn space_at(&self, index: usize) -> RuleResult<&Space> {
        self.spaces.get(index).ok_or(RuleError::OutOfRange {
            index,
            len: self.spaces.len(),
        })
    }

    /// Space with the given name.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no space has that name.
    pub fn space_named(&self, name: &str) -> RuleResult<&Space> {
        self.spaces
            .iter()
            .find(|space| space.name == name)
            .ok_or_else(|| RuleError::NotFound(name.to_string()))
    }

    /// Ownable data for a space.
    ///
    /// # Errors
    ///
    /// Returns `OutOfRange` for a bad index or `NotOwnable` for special spaces.
    pub fn ownable(&self, space: SpaceId) -> RuleResult<&Ownable> {
        self.space_at(usize::from(space))?
            .ownable()
            .ok_or(RuleError::NotOwnable(space))
    }

    /// Ownable spaces of a color group, in board order.
    #[must_use]
    pub fn ownables_in_color_group(&self, group: ColorGroup) -> Vec<SpaceId> {
        self.spaces
            .iter()
            .filter(|space| space.ownable().and_then(Ownable::group) == Some(group))
            .map(|space| space.index)
            .collect()
    }

    /// All ownable spaces, in board order.
    pub fn ownable_ids(&self) -> impl Iterator<Item = SpaceId> + '_ {
        self.spaces
            .iter()
            .filter(|space| space.ownable().is_some())
            .map(|space| space.index)
    }

    /// Iterate over all spaces in ring order.
    pub fn iter(&self) -> impl Iterator<Item = &Space> {
        self.spaces.iter()
    }

    /// Index of the jail corner.
    #[must_use]
    pub fn jail_index(&self) -> SpaceId {
        self.spaces
            .iter()
            .find(|space| space.kind == SpaceKind::Jail)
            .map_or(10, |space| space.index)
    }

    /// First railroad or utility strictly ahead of `from`, wrapping past Go.
    #[must_use]
    pub fn nearest(&self, from: SpaceId, kind: NearestKind) -> Option<SpaceId> {
        let len = self.spaces.len();
        (1..=len)
            .map(|step| (usize::from(from) + step) % len)
            .find(|&i| {
                self.spaces[i]
                    .ownable()
                    .is_some_and(|ownable| ownable.is_nearest_kind(kind))
            })
            .and_then(|i| SpaceId::try_from(i).ok())
    }

    /// Check the ring structure.
    ///
    /// # Errors
    ///
    /// Returns the first structural problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.spaces.len() != RING_LENGTH {
            return Err(ConfigError::RingLength(self.spaces.len()));
        }

        let mut names = HashSet::new();
        for (position, space) in self.spaces.iter().enumerate() {
            if usize::from(space.index) != position {
                return Err(ConfigError::MisplacedSpace {
                    position,
                    index: space.index,
                });
            }
            if !names.insert(space.name.as_str()) {
                return Err(ConfigError::DuplicateName(space.name.clone()));
            }
        }

        let corners = [
            (0, SpaceKind::Go),
            (10, SpaceKind::Jail),
            (20, SpaceKind::FreeParking),
            (30, SpaceKind::GoToJail),
        ];
        for (index, kind) in corners {
            if self.spaces[usize::from(index)].kind != kind {
                return Err(ConfigError::Corner(index));
            }
        }

        for group in ColorGroup::ALL {
            if self.ownables_in_color_group(group).is_empty() {
                return Err(ConfigError::EmptyColorGroup(group));
            }
        }

        Ok(())
    }
}

const fn street(group: ColorGroup, price: Money, rents: [Money; 6]) -> SpaceKind {
    SpaceKind::Ownable(Ownable {
        kind: OwnableKind::Property { group, rents },
        price,
        mortgage_value: price / 2,
    })
}

const fn railroad() -> SpaceKind {
    SpaceKind::Ownable(Ownable {
        kind: OwnableKind::Railroad { base_rent: 25 },
        price: 200,
        mortgage_value: 100,
    })
}

const fn utility() -> SpaceKind {
    SpaceKind::Ownable(Ownable {
        kind: OwnableKind::Utility,
        price: 150,
        mortgage_value: 75,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_board_is_valid() {
        let board = Board::standard();
        assert_eq!(board.ring_len(), RING_LENGTH);
        assert!(board.validate().is_ok());
    }

    #[test]
    fn test_space_at_out_of_range() {
        let board = Board::standard();
        assert_eq!(
            board.space_at(40),
            Err(RuleError::OutOfRange { index: 40, len: 40 })
        );
        assert_eq!(board.space_at(39).unwrap().name, "Boardwalk");
    }

    #[test]
    fn test_space_named() {
        let board = Board::standard();
        assert_eq!(board.space_named("Illinois Avenue").unwrap().index, 24);
        assert_eq!(
            board.space_named("Marvin Gardenz"),
            Err(RuleError::NotFound("Marvin Gardenz".to_string()))
        );
    }

    #[test]
    fn test_color_groups() {
        let board = Board::standard();
        assert_eq!(board.ownables_in_color_group(ColorGroup::Brown), vec![1, 3]);
        assert_eq!(
            board.ownables_in_color_group(ColorGroup::LightBlue),
            vec![6, 8, 9]
        );
        assert_eq!(
            board.ownables_in_color_group(ColorGroup::DarkBlue),
            vec![37, 39]
        );
        assert_eq!(board.ownable_ids().count(), 28);
    }

    #[test]
    fn test_nearest_wraps_forward() {
        let board = Board::standard();
        assert_eq!(board.nearest(7, NearestKind::Railroad), Some(15));
        assert_eq!(board.nearest(36, NearestKind::Railroad), Some(5));
        assert_eq!(board.nearest(22, NearestKind::Utility), Some(28));
        assert_eq!(board.nearest(36, NearestKind::Utility), Some(12));
        // Strictly ahead, even when standing on one.
        assert_eq!(board.nearest(5, NearestKind::Railroad), Some(15));
    }

    #[test]
    fn test_validate_rejects_short_ring() {
        let mut spaces: Vec<Space> = Board::standard().iter().cloned().collect();
        spaces.pop();
        assert_eq!(
            Board::new(spaces).validate(),
            Err(ConfigError::RingLength(39))
        );
    }

    #[test]
    fn test_validate_rejects_wrong_corner() {
        let mut spaces: Vec<Space> = Board::standard().iter().cloned().collect();
        spaces[20].kind = SpaceKind::Tax { amount: 75 };
        assert_eq!(Board::new(spaces).validate(), Err(ConfigError::Corner(20)));
    }
}
