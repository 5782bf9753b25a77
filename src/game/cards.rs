//! Chance and Community Chest decks.
//!
//! A card's behaviour is the closed [`CardEffect`] enum; the label is only
//! for display. Decks are drawn without replacement and reshuffled when the
//! draw pile runs out. A jail-free card stays out of circulation while a
//! player holds it.

use std::collections::{BTreeSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::game::{Board, Money, Randomness};

/// Index of a card within its deck.
pub type CardId = usize;

/// The two decks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DeckId {
    /// Chance deck.
    Chance,
    /// Community Chest deck.
    CommunityChest,
}

/// Target of an "advance to nearest" card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NearestKind {
    /// Nearest railroad; the owner collects double rent.
    Railroad,
    /// Nearest utility; the owner collects ten times a fresh dice roll.
    Utility,
}

/// Effect of a card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CardEffect {
    /// Move forward to a named space, collecting the Go bonus if passing it.
    AdvanceTo {
        /// Destination name.
        space: String,
    },
    /// Move forward to Go.
    AdvanceToGo,
    /// Move forward to the nearest railroad or utility.
    AdvanceToNearest(NearestKind),
    /// Go directly to jail.
    GoToJail,
    /// Keep until needed to leave jail.
    GetOutOfJailFree,
    /// Pay the bank.
    Pay(Money),
    /// Collect from the bank.
    Collect(Money),
    /// Pay every other active player.
    PayEachPlayer(Money),
    /// Collect from every other active player.
    CollectFromEachPlayer(Money),
    /// Move backwards; never collects the Go bonus.
    GoBack(u8),
    /// Pay for every house and hotel owned.
    Repairs {
        /// Cost per house.
        per_house: Money,
        /// Cost per hotel.
        per_hotel: Money,
    },
}

/// A single card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    /// Text printed on the card.
    pub label: String,
    /// What the card does.
    pub effect: CardEffect,
}

impl Card {
    /// A card with the given text and effect.
    #[must_use]
    pub fn new(label: impl Into<String>, effect: CardEffect) -> Self {
        Self {
            label: label.into(),
            effect,
        }
    }
}

/// A deck with its current draw order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deck {
    id: DeckId,
    cards: Vec<Card>,
    draw_pile: VecDeque<CardId>,
    held: BTreeSet<CardId>,
}

impl Deck {
    /// Create a deck. The first draw shuffles it.
    #[must_use]
    pub fn new(id: DeckId, cards: Vec<Card>) -> Self {
        Self {
            id,
            cards,
            draw_pile: VecDeque::new(),
            held: BTreeSet::new(),
        }
    }

    /// The standard sixteen Chance cards.
    #[must_use]
    pub fn chance() -> Self {
        use CardEffect::{
            AdvanceTo, AdvanceToGo, AdvanceToNearest, Collect, GetOutOfJailFree, GoBack, GoToJail,
            Pay, PayEachPlayer, Repairs,
        };

        let advance = |space: &str| AdvanceTo {
            space: space.to_string(),
        };

        Self::new(
            DeckId::Chance,
            vec![
                Card::new("Advance to Boardwalk.", advance("Boardwalk")),
                Card::new("Advance to Go (Collect $200).", AdvanceToGo),
                Card::new("Advance to Illinois Avenue.", advance("Illinois Avenue")),
                Card::new("Advance to St. Charles Place.", advance("St. Charles Place")),
                Card::new(
                    "Advance to the nearest Railroad. Pay the owner twice the rental.",
                    AdvanceToNearest(NearestKind::Railroad),
                ),
                Card::new(
                    "Advance to the nearest Railroad. Pay the owner twice the rental.",
                    AdvanceToNearest(NearestKind::Railroad),
                ),
                Card::new(
                    "Advance to the nearest Utility. Pay the owner ten times a dice throw.",
                    AdvanceToNearest(NearestKind::Utility),
                ),
                Card::new("Bank pays you dividend of $50.", Collect(50)),
                Card::new("Get Out of Jail Free.", GetOutOfJailFree),
                Card::new("Go Back 3 Spaces.", GoBack(3)),
                Card::new("Go to Jail. Do not pass Go, do not collect $200.", GoToJail),
                Card::new(
                    "Make general repairs on all your property: $25 per house, $100 per hotel.",
                    Repairs {
                        per_house: 25,
                        per_hotel: 100,
                    },
                ),
                Card::new("Speeding fine $15.", Pay(15)),
                Card::new("Take a trip to Reading Railroad.", advance("Reading Railroad")),
                Card::new(
                    "You have been elected Chairman of the Board. Pay each player $50.",
                    PayEachPlayer(50),
                ),
                Card::new("Your building loan matures. Collect $150.", Collect(150)),
            ],
        )
    }

    /// The standard sixteen Community Chest cards.
    #[must_use]
    pub fn community_chest() -> Self {
        use CardEffect::{
            AdvanceToGo, Collect, CollectFromEachPlayer, GetOutOfJailFree, GoToJail, Pay, Repairs,
        };

        Self::new(
            DeckId::CommunityChest,
            vec![
                Card::new("Advance to Go (Collect $200).", AdvanceToGo),
                Card::new("Bank error in your favor. Collect $200.", Collect(200)),
                Card::new("Doctor's fees. Pay $50.", Pay(50)),
                Card::new("From sale of stock you get $50.", Collect(50)),
                Card::new("Get Out of Jail Free.", GetOutOfJailFree),
                Card::new("Go to Jail. Do not pass Go, do not collect $200.", GoToJail),
                Card::new("Holiday fund matures. Receive $100.", Collect(100)),
                Card::new("Income tax refund. Collect $20.", Collect(20)),
                Card::new(
                    "It is your birthday. Collect $10 from every player.",
                    CollectFromEachPlayer(10),
                ),
                Card::new("Life insurance matures. Collect $100.", Collect(100)),
                Card::new("Pay hospital fees of $100.", Pay(100)),
                Card::new("Pay school fees of $50.", Pay(50)),
                Card::new("Receive $25 consultancy fee.", Collect(25)),
                Card::new(
                    "You are assessed for street repairs: $40 per house, $115 per hotel.",
                    Repairs {
                        per_house: 40,
                        per_hotel: 115,
                    },
                ),
                Card::new(
                    "You have won second prize in a beauty contest. Collect $10.",
                    Collect(10),
                ),
                Card::new("You inherit $100.", Collect(100)),
            ],
        )
    }

    /// Which deck this is.
    #[must_use]
    pub const fn id(&self) -> DeckId {
        self.id
    }

    /// Card by id.
    #[must_use]
    pub fn card(&self, id: CardId) -> Option<&Card> {
        self.cards.get(id)
    }

    /// All cards in printed order.
    #[must_use]
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Cards left before the next reshuffle.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.draw_pile.len()
    }

    /// Cards currently held by players.
    pub fn held(&self) -> impl Iterator<Item = CardId> + '_ {
        self.held.iter().copied()
    }

    /// Draw the top card, reshuffling first if the pile is empty.
    ///
    /// Returns `None` only when every card is held by a player.
    pub fn draw(&mut self, rng: &mut dyn Randomness) -> Option<(CardId, Card)> {
        if self.draw_pile.is_empty() {
            self.reshuffle(rng);
        }
        let id = self.draw_pile.pop_front()?;
        let card = self.cards.get(id)?.clone();
        Some((id, card))
    }

    /// Take a drawn jail-free card out of circulation while a player holds it.
    pub fn hold(&mut self, card: CardId) {
        self.held.insert(card);
    }

    /// Put a used or forfeited jail-free card back into the reshuffle pool.
    pub fn return_jail_free_card(&mut self, card: CardId) {
        self.held.remove(&card);
    }

    fn reshuffle(&mut self, rng: &mut dyn Randomness) {
        let mut order: Vec<CardId> = (0..self.cards.len())
            .filter(|id| !self.held.contains(id))
            .collect();
        rng.shuffle(&mut order);
        log::debug!("reshuffled {:?} deck ({} cards)", self.id, order.len());
        self.draw_pile = order.into();
    }

    /// Check every card against the board.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` for an empty deck, a destination missing from
    /// the board, or a nearest-card with no candidate.
    pub fn validate(&self, board: &Board) -> Result<(), ConfigError> {
        if self.cards.is_empty() {
            return Err(ConfigError::EmptyDeck(self.id));
        }

        for card in &self.cards {
            match &card.effect {
                CardEffect::AdvanceTo { space } => {
                    if board.space_named(space).is_err() {
                        return Err(ConfigError::MissingDestination {
                            card: card.label.clone(),
                            destination: space.clone(),
                        });
                    }
                }
                CardEffect::AdvanceToNearest(kind) => {
                    if board.nearest(0, *kind).is_none() {
                        return Err(ConfigError::NoNearestTarget(card.label.clone()));
                    }
                }
                CardEffect::AdvanceToGo
                | CardEffect::GoToJail
                | CardEffect::GetOutOfJailFree
                | CardEffect::Pay(_)
                | CardEffect::Collect(_)
                | CardEffect::PayEachPlayer(_)
                | CardEffect::CollectFromEachPlayer(_)
                | CardEffect::GoBack(_)
                | CardEffect::Repairs { .. } => {}
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{ScriptedRandomness, SeededRandomness};

    #[test]
    fn test_standard_decks_validate() {
        let board = Board::standard();
        assert_eq!(Deck::chance().cards().len(), 16);
        assert_eq!(Deck::community_chest().cards().len(), 16);
        assert!(Deck::chance().validate(&board).is_ok());
        assert!(Deck::community_chest().validate(&board).is_ok());
    }

    #[test]
    fn test_draw_without_replacement_then_reshuffle() {
        let mut deck = Deck::chance();
        let mut rng = SeededRandomness::new(3);

        let mut seen: Vec<CardId> = (0..16).map(|_| deck.draw(&mut rng).unwrap().0).collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..16).collect::<Vec<_>>());
        assert_eq!(deck.remaining(), 0);

        deck.draw(&mut rng).unwrap();
        assert_eq!(deck.remaining(), 15);
    }

    #[test]
    fn test_held_card_skipped_until_returned() {
        let mut deck = Deck::community_chest();
        let mut rng = ScriptedRandomness::new([]);

        // Scripted shuffles keep printed order: card 4 is the jail-free card.
        for _ in 0..4 {
            deck.draw(&mut rng).unwrap();
        }
        let (id, card) = deck.draw(&mut rng).unwrap();
        assert_eq!(card.effect, CardEffect::GetOutOfJailFree);
        deck.hold(id);

        while deck.remaining() > 0 {
            deck.draw(&mut rng).unwrap();
        }
        for _ in 0..15 {
            let (next, _) = deck.draw(&mut rng).unwrap();
            assert_ne!(next, id);
        }

        deck.return_jail_free_card(id);
        assert_eq!(deck.held().count(), 0);
        let drawn: Vec<CardId> = (0..16).map(|_| deck.draw(&mut rng).unwrap().0).collect();
        assert!(drawn.contains(&id));
    }

    #[test]
    fn test_validate_rejects_missing_destination() {
        let deck = Deck::new(
            DeckId::Chance,
            vec![Card::new(
                "Advance to Nowhere.",
                CardEffect::AdvanceTo {
                    space: "Nowhere".to_string(),
                },
            )],
        );
        assert!(matches!(
            deck.validate(&Board::standard()),
            Err(ConfigError::MissingDestination { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_empty_deck() {
        let deck = Deck::new(DeckId::CommunityChest, Vec::new());
        assert_eq!(
            deck.validate(&Board::standard()),
            Err(ConfigError::EmptyDeck(DeckId::CommunityChest))
        );
    }
}
