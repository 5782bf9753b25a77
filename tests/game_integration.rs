//! Scenario tests for the turn engine.
//!
//! Every test drives a session with scripted dice and unshuffled decks, so
//! the exact sequence of moves, cards and payments is known in advance.
//!
//! Run with: cargo test game_integration

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use landlord::game::{
    check_invariants, Board, Card, CardEffect, Creditor, Deck, DeckId, GameEvent, JailFreeToken,
    NearestKind, Release, ScriptedRandomness, TurnState,
};
use landlord::{Action, Decision, GameSession, RuleConfig, RuleError, Step};

fn game(players: usize, rolls: &[(u8, u8)]) -> GameSession {
    let names: Vec<String> = (0..players).map(|i| format!("P{i}")).collect();
    GameSession::new(
        &names,
        RuleConfig::default(),
        ScriptedRandomness::new(rolls.iter().copied()),
    )
    .unwrap()
}

/// Session whose Chance deck holds only `cards`, in order.
fn with_chance(players: usize, cards: Vec<Card>, rolls: &[(u8, u8)]) -> GameSession {
    let names: Vec<String> = (0..players).map(|i| format!("P{i}")).collect();
    GameSession::with_components(
        Board::standard(),
        Deck::new(DeckId::Chance, cards),
        Deck::community_chest(),
        &names,
        RuleConfig::default(),
        ScriptedRandomness::new(rolls.iter().copied()),
    )
    .unwrap()
}

/// Session where player 0 starts the turn in jail, on jail turn `jail_turns`.
fn jailed(jail_turns: u8, rolls: &[(u8, u8)]) -> GameSession {
    let mut snapshot = game(2, &[]).snapshot();
    snapshot.players[0].send_to_jail(10);
    snapshot.players[0].jail_turns = jail_turns;
    snapshot.state = TurnState::InJail;
    GameSession::restore(snapshot, ScriptedRandomness::new(rolls.iter().copied())).unwrap()
}

fn balance(game: &GameSession, player: u8) -> u32 {
    game.player(player).unwrap().balance
}

fn position(game: &GameSession, player: u8) -> u8 {
    game.player(player).unwrap().position
}

fn assert_valid(game: &GameSession) {
    let violations = check_invariants(game);
    assert!(violations.is_empty(), "{violations:?}");
}

// =============================================================================
// Movement and Go
// =============================================================================

#[test]
fn test_passing_go_pays_bonus() {
    let mut g = game(2, &[(2, 3)]);
    g.player_mut(0).unwrap().position = 38;

    let step = g.advance().unwrap();
    assert_eq!(
        step,
        Step::Decision(Decision::BuyOrDecline {
            player: 0,
            space: 3,
            price: 60
        })
    );
    assert_eq!(position(&g, 0), 3);
    assert_eq!(balance(&g, 0), 1700);
    assert!(g.take_events().contains(&GameEvent::PassedGo {
        player: 0,
        amount: 200
    }));
}

#[test]
fn test_landing_on_go_pays_bonus() {
    let mut g = game(2, &[(2, 3)]);
    g.player_mut(0).unwrap().position = 35;

    assert_eq!(g.advance().unwrap(), Step::TurnComplete);
    assert_eq!(position(&g, 0), 0);
    assert_eq!(balance(&g, 0), 1700);
}

#[test]
fn test_declined_space_stays_unsold() {
    let mut g = game(2, &[(1, 2)]);
    assert!(matches!(g.advance().unwrap(), Step::Decision(_)));
    assert_eq!(g.legal_actions(), vec![Action::Buy, Action::Decline]);

    g.decide(Action::Decline).unwrap();
    assert_eq!(g.advance().unwrap(), Step::TurnComplete);
    assert!(g.bank().is_unsold(3));
    assert_eq!(g.ledger().owner(3), None);
    assert_eq!(balance(&g, 0), 1500);
}

#[test]
fn test_buy_transfers_ownership() {
    let mut g = game(2, &[(1, 2)]);
    g.advance().unwrap();
    g.decide(Action::Buy).unwrap();

    assert_eq!(g.ledger().owner(3), Some(0));
    assert!(g.player(0).unwrap().owns(3));
    assert!(!g.bank().is_unsold(3));
    assert_eq!(balance(&g, 0), 1440);
    assert_valid(&g);
}

#[test]
fn test_buy_without_funds_keeps_decision() {
    let mut g = game(2, &[(1, 2)]);
    g.player_mut(0).unwrap().balance = 50;
    g.advance().unwrap();

    assert_eq!(
        g.decide(Action::Buy),
        Err(RuleError::InsufficientFunds {
            needed: 60,
            available: 50
        })
    );
    assert!(g.pending().is_some());
    assert_eq!(balance(&g, 0), 50);

    g.decide(Action::Decline).unwrap();
    assert!(g.pending().is_none());
}

#[test]
fn test_illegal_action_refused() {
    let mut g = game(2, &[(1, 2)]);
    assert_eq!(g.decide(Action::Buy), Err(RuleError::NoPendingDecision));

    g.advance().unwrap();
    assert_eq!(
        g.decide(Action::PayDebt),
        Err(RuleError::IllegalAction(Action::PayDebt))
    );
}

#[test]
fn test_end_turn_guards() {
    let mut g = game(2, &[(1, 2)]);
    assert_eq!(g.end_turn(), Err(RuleError::TurnInProgress));

    g.advance().unwrap();
    assert_eq!(g.end_turn(), Err(RuleError::DecisionPending));

    g.decide(Action::Decline).unwrap();
    g.advance().unwrap();
    g.end_turn().unwrap();
    assert_eq!(g.current_player(), 1);
    assert_eq!(g.turn_number(), 2);
}

// =============================================================================
// Doubles
// =============================================================================

#[test]
fn test_doubles_grant_extra_roll() {
    let mut g = game(2, &[(3, 3), (1, 2)]);

    assert!(matches!(
        g.advance().unwrap(),
        Step::Decision(Decision::BuyOrDecline { space: 6, .. })
    ));
    g.decide(Action::Decline).unwrap();

    // Second roll of the same turn: 6 + 3 lands on Connecticut Avenue.
    assert!(matches!(
        g.advance().unwrap(),
        Step::Decision(Decision::BuyOrDecline { space: 9, .. })
    ));
    assert!(g
        .take_events()
        .contains(&GameEvent::ExtraTurn { player: 0 }));
    assert_eq!(g.current_player(), 0);
}

#[test]
fn test_third_double_goes_to_jail() {
    let mut g = game(2, &[(3, 3), (2, 2), (4, 4)]);

    g.advance().unwrap();
    g.decide(Action::Decline).unwrap();
    // (2, 2) lands on Jail, just visiting; (4, 4) is the third double.
    assert_eq!(g.advance().unwrap(), Step::TurnComplete);

    let p = g.player(0).unwrap();
    assert!(p.in_jail);
    assert_eq!(p.position, 10);
    assert_eq!(p.consecutive_doubles, 0);

    let events = g.take_events();
    assert!(events.contains(&GameEvent::Jailed { player: 0 }));
    let extra = events
        .iter()
        .filter(|e| matches!(e, GameEvent::ExtraTurn { .. }))
        .count();
    assert_eq!(extra, 2);

    g.end_turn().unwrap();
    assert_eq!(g.current_player(), 1);
}

// =============================================================================
// Jail
// =============================================================================

#[test]
fn test_go_to_jail_space() {
    let mut g = game(2, &[(2, 3)]);
    g.player_mut(0).unwrap().position = 25;

    assert_eq!(g.advance().unwrap(), Step::TurnComplete);
    let p = g.player(0).unwrap();
    assert!(p.in_jail);
    assert_eq!(p.position, 10);
    // Sent to jail without passing Go.
    assert_eq!(p.balance, 1500);
}

#[test]
fn test_jail_turn_offers_release() {
    let mut g = jailed(1, &[]);
    assert_eq!(
        g.advance().unwrap(),
        Step::Decision(Decision::JailRelease {
            player: 0,
            fee: 50,
            can_pay: true,
            has_card: false
        })
    );
    assert_eq!(
        g.legal_actions(),
        vec![Action::PayJailFee, Action::RollForDoubles]
    );
}

#[test]
fn test_pay_fee_then_move() {
    let mut g = jailed(1, &[(2, 4)]);
    g.advance().unwrap();
    g.decide(Action::PayJailFee).unwrap();

    assert!(matches!(
        g.advance().unwrap(),
        Step::Decision(Decision::BuyOrDecline { space: 16, .. })
    ));
    let p = g.player(0).unwrap();
    assert!(!p.in_jail);
    assert_eq!(p.balance, 1450);
}

#[test]
fn test_doubles_release_without_extra_turn() {
    let mut g = jailed(1, &[(5, 5), (6, 6)]);
    g.advance().unwrap();
    g.decide(Action::RollForDoubles).unwrap();

    // 10 + 10 = Free Parking; the release roll never grants another roll.
    assert_eq!(g.advance().unwrap(), Step::TurnComplete);
    assert_eq!(position(&g, 0), 20);
    assert_eq!(balance(&g, 0), 1500);
    assert!(g.take_events().contains(&GameEvent::Released {
        player: 0,
        how: Release::Doubles
    }));
}

#[test]
fn test_failed_roll_stays_in_jail() {
    let mut g = jailed(1, &[(1, 3)]);
    g.advance().unwrap();
    g.decide(Action::RollForDoubles).unwrap();

    assert_eq!(g.advance().unwrap(), Step::TurnComplete);
    let p = g.player(0).unwrap();
    assert!(p.in_jail);
    assert_eq!(p.position, 10);
}

#[test]
fn test_third_failed_roll_pays_and_moves() {
    let mut g = jailed(3, &[(1, 3)]);
    g.advance().unwrap();
    g.decide(Action::RollForDoubles).unwrap();

    assert!(matches!(
        g.advance().unwrap(),
        Step::Decision(Decision::BuyOrDecline { space: 14, .. })
    ));
    let p = g.player(0).unwrap();
    assert!(!p.in_jail);
    assert_eq!(p.balance, 1450);
    assert!(g.take_events().contains(&GameEvent::Released {
        player: 0,
        how: Release::ServedTime
    }));
}

#[test]
fn test_jail_card_used_and_returned() {
    let mut snapshot = game(2, &[]).snapshot();
    snapshot.players[0].send_to_jail(10);
    snapshot.players[0].jail_turns = 1;
    snapshot.players[0].jail_free = Some(JailFreeToken {
        deck: DeckId::Chance,
        card: 8,
    });
    snapshot.chance.hold(8);
    snapshot.state = TurnState::InJail;
    let mut g = GameSession::restore(snapshot, ScriptedRandomness::new([(2, 4)])).unwrap();

    assert!(matches!(
        g.advance().unwrap(),
        Step::Decision(Decision::JailRelease { has_card: true, .. })
    ));
    g.decide(Action::UseJailCard).unwrap();

    assert!(g.player(0).unwrap().jail_free.is_none());
    assert_eq!(g.deck(DeckId::Chance).held().count(), 0);
    assert!(matches!(
        g.advance().unwrap(),
        Step::Decision(Decision::BuyOrDecline { space: 16, .. })
    ));
    assert_eq!(balance(&g, 0), 1500);
}

// =============================================================================
// Rent, debts and bankruptcy
// =============================================================================

#[test]
fn test_rent_paid_to_owner() {
    let mut g = game(2, &[(1, 2)]);
    g.award(1, 3, 60).unwrap();

    assert_eq!(g.advance().unwrap(), Step::TurnComplete);
    assert_eq!(balance(&g, 0), 1496);
    assert_eq!(balance(&g, 1), 1444);
}

#[test]
fn test_mortgaged_space_charges_nothing() {
    let mut g = game(2, &[(1, 2)]);
    g.award(1, 3, 60).unwrap();
    g.mortgage(1, 3).unwrap();

    assert_eq!(g.advance().unwrap(), Step::TurnComplete);
    assert_eq!(balance(&g, 0), 1500);
}

#[test]
fn test_short_rent_bankrupts_and_ends_game() {
    let mut g = game(2, &[(1, 3)]);
    g.award(1, 37, 0).unwrap();
    g.award(1, 39, 0).unwrap();
    {
        let p = g.player_mut(0).unwrap();
        p.position = 35;
        p.balance = 40;
    }

    // Bare monopoly doubles Boardwalk's $50.
    assert_eq!(
        g.advance().unwrap(),
        Step::Decision(Decision::RaiseFunds {
            debtor: 0,
            creditor: Creditor::Player(1),
            amount: 100
        })
    );
    assert_eq!(
        g.decide(Action::PayDebt),
        Err(RuleError::InsufficientFunds {
            needed: 100,
            available: 40
        })
    );

    g.decide(Action::DeclareBankruptcy).unwrap();
    assert!(!g.is_active());
    assert_eq!(g.winner(), Some(1));
    assert_eq!(balance(&g, 1), 1540);
    assert!(g.player(0).unwrap().bankrupt);
    assert_eq!(g.order(), &[1]);
    assert_eq!(g.advance().unwrap(), Step::GameOver { winner: Some(1) });
    assert_eq!(g.end_turn(), Err(RuleError::GameOver));
    assert_valid(&g);
}

#[test]
fn test_debt_paid_after_raising_cash() {
    let mut g = game(2, &[(1, 3)]);
    g.award(1, 37, 0).unwrap();
    g.award(1, 39, 0).unwrap();
    g.award(0, 1, 0).unwrap();
    g.award(0, 3, 0).unwrap();
    {
        let p = g.player_mut(0).unwrap();
        p.position = 35;
        p.balance = 40;
    }

    assert!(matches!(
        g.advance().unwrap(),
        Step::Decision(Decision::RaiseFunds { amount: 100, .. })
    ));
    g.mortgage(0, 1).unwrap();
    g.mortgage(0, 3).unwrap();
    g.decide(Action::PayDebt).unwrap();

    assert_eq!(balance(&g, 0), 0);
    assert_eq!(balance(&g, 1), 1600);
    assert_eq!(g.debts().count(), 0);
    assert_eq!(g.advance().unwrap(), Step::TurnComplete);
    assert_valid(&g);
}

#[test]
fn test_bankrupt_current_player_passes_turn() {
    let mut g = game(3, &[(1, 3)]);
    g.award(1, 37, 0).unwrap();
    g.award(1, 39, 0).unwrap();
    g.award(0, 5, 0).unwrap();
    {
        let p = g.player_mut(0).unwrap();
        p.position = 35;
        p.balance = 40;
    }

    g.advance().unwrap();
    g.decide(Action::DeclareBankruptcy).unwrap();
    assert!(g.is_active());
    assert_eq!(g.order(), &[1, 2]);
    // Reading Railroad went back to the bank unowned.
    assert!(g.bank().is_unsold(5));

    assert_eq!(g.advance().unwrap(), Step::TurnComplete);
    g.end_turn().unwrap();
    assert_eq!(g.current_player(), 1);
    assert_valid(&g);
}

#[test]
fn test_tax_paid_to_bank() {
    let mut g = game(2, &[(1, 3)]);
    assert_eq!(g.advance().unwrap(), Step::TurnComplete);
    assert_eq!(balance(&g, 0), 1300);
    assert_eq!(g.jackpot(), 0);
}

#[test]
fn test_free_parking_jackpot() {
    let rules = RuleConfig {
        free_parking_jackpot: true,
        ..RuleConfig::default()
    };
    let mut g = GameSession::new(&["a", "b"], rules, ScriptedRandomness::new([(1, 3), (2, 3)]))
        .unwrap();
    g.player_mut(1).unwrap().position = 15;

    assert_eq!(g.advance().unwrap(), Step::TurnComplete);
    assert_eq!(g.jackpot(), 200);
    g.end_turn().unwrap();

    assert_eq!(g.advance().unwrap(), Step::TurnComplete);
    assert_eq!(position(&g, 1), 20);
    assert_eq!(balance(&g, 1), 1700);
    assert_eq!(g.jackpot(), 0);
}

// =============================================================================
// Cards
// =============================================================================

#[test]
fn test_unshuffled_chance_sends_to_boardwalk() {
    let mut g = game(2, &[(3, 4)]);
    assert_eq!(
        g.advance().unwrap(),
        Step::Decision(Decision::BuyOrDecline {
            player: 0,
            space: 39,
            price: 400
        })
    );
    // Chance at 7 to Boardwalk does not cross Go.
    assert_eq!(balance(&g, 0), 1500);
}

#[test]
fn test_advance_to_go_card() {
    let mut g = with_chance(2, vec![Card::new("Go", CardEffect::AdvanceToGo)], &[(3, 4)]);
    assert_eq!(g.advance().unwrap(), Step::TurnComplete);
    assert_eq!(position(&g, 0), 0);
    assert_eq!(balance(&g, 0), 1700);
}

#[test]
fn test_advance_past_go_card() {
    let card = Card::new(
        "St. Charles",
        CardEffect::AdvanceTo {
            space: "St. Charles Place".to_string(),
        },
    );
    let mut g = with_chance(2, vec![card], &[(3, 3)]);
    g.player_mut(0).unwrap().position = 30;

    // 30 + 6 = Chance 3 at 36, then around the board to 11.
    assert!(matches!(
        g.advance().unwrap(),
        Step::Decision(Decision::BuyOrDecline { space: 11, .. })
    ));
    assert_eq!(balance(&g, 0), 1700);
}

#[test]
fn test_go_back_card_lands_on_tax() {
    let mut g = with_chance(2, vec![Card::new("Back", CardEffect::GoBack(3))], &[(3, 4)]);
    assert_eq!(g.advance().unwrap(), Step::TurnComplete);
    assert_eq!(position(&g, 0), 4);
    assert_eq!(balance(&g, 0), 1300);
}

#[test]
fn test_nearest_railroad_pays_double() {
    let card = Card::new("Railroad", CardEffect::AdvanceToNearest(NearestKind::Railroad));
    let mut g = with_chance(2, vec![card], &[(3, 4)]);
    g.award(1, 15, 0).unwrap();

    assert_eq!(g.advance().unwrap(), Step::TurnComplete);
    assert_eq!(position(&g, 0), 15);
    assert_eq!(balance(&g, 0), 1450);
    assert_eq!(balance(&g, 1), 1550);
}

#[test]
fn test_nearest_unowned_railroad_offered() {
    let card = Card::new("Railroad", CardEffect::AdvanceToNearest(NearestKind::Railroad));
    let mut g = with_chance(2, vec![card], &[(3, 4)]);
    assert_eq!(
        g.advance().unwrap(),
        Step::Decision(Decision::BuyOrDecline {
            player: 0,
            space: 15,
            price: 200
        })
    );
}

#[test]
fn test_nearest_utility_rolls_for_rent() {
    let card = Card::new("Utility", CardEffect::AdvanceToNearest(NearestKind::Utility));
    let mut g = with_chance(2, vec![card], &[(3, 4), (2, 3)]);
    g.award(1, 12, 0).unwrap();

    assert_eq!(g.advance().unwrap(), Step::TurnComplete);
    assert_eq!(position(&g, 0), 12);
    assert_eq!(balance(&g, 0), 1450);
}

#[test]
fn test_mortgaged_utility_skips_rent_roll() {
    let card = Card::new("Utility", CardEffect::AdvanceToNearest(NearestKind::Utility));
    let mut g = with_chance(2, vec![card], &[(3, 4)]);
    g.award(1, 12, 0).unwrap();
    g.mortgage(1, 12).unwrap();

    assert_eq!(g.advance().unwrap(), Step::TurnComplete);
    assert_eq!(position(&g, 0), 12);
    assert_eq!(balance(&g, 0), 1500);
    let rolls = g
        .take_events()
        .iter()
        .filter(|e| matches!(e, GameEvent::DiceRolled { .. }))
        .count();
    assert_eq!(rolls, 1);
}

#[test]
fn test_go_back_into_community_chest_draws() {
    let mut g = with_chance(2, vec![Card::new("Back", CardEffect::GoBack(3))], &[(3, 4)]);
    g.player_mut(0).unwrap().position = 29;

    // Chance 3 sends the player back onto Community Chest 3, whose top
    // card is Advance to Go.
    assert_eq!(g.advance().unwrap(), Step::TurnComplete);
    assert_eq!(position(&g, 0), 0);
    assert_eq!(balance(&g, 0), 1700);
    let draws: Vec<DeckId> = g
        .take_events()
        .into_iter()
        .filter_map(|e| match e {
            GameEvent::CardDrawn { deck, .. } => Some(deck),
            _ => None,
        })
        .collect();
    assert_eq!(draws, vec![DeckId::Chance, DeckId::CommunityChest]);
    assert_valid(&g);
}

#[test]
fn test_jail_free_card_kept_out_of_deck() {
    let cards = vec![
        Card::new("Free", CardEffect::GetOutOfJailFree),
        Card::new("Dividend", CardEffect::Collect(10)),
    ];
    let mut g = with_chance(2, cards, &[(3, 4)]);

    assert_eq!(g.advance().unwrap(), Step::TurnComplete);
    assert_eq!(
        g.player(0).unwrap().jail_free,
        Some(JailFreeToken {
            deck: DeckId::Chance,
            card: 0
        })
    );
    assert_eq!(g.deck(DeckId::Chance).held().collect::<Vec<_>>(), vec![0]);
    assert_valid(&g);
}

#[test]
fn test_pay_each_player_card() {
    let card = Card::new("Chairman", CardEffect::PayEachPlayer(50));
    let mut g = with_chance(3, vec![card], &[(3, 4)]);

    assert_eq!(g.advance().unwrap(), Step::TurnComplete);
    assert_eq!(balance(&g, 0), 1400);
    assert_eq!(balance(&g, 1), 1550);
    assert_eq!(balance(&g, 2), 1550);
}

#[test]
fn test_collect_from_each_partial_debt() {
    let names = ["a", "b", "c"];
    let cc = Deck::new(
        DeckId::CommunityChest,
        vec![Card::new("Birthday", CardEffect::CollectFromEachPlayer(10))],
    );
    let mut g = GameSession::with_components(
        Board::standard(),
        Deck::chance(),
        cc,
        &names,
        RuleConfig::default(),
        ScriptedRandomness::new([(2, 3)]),
    )
    .unwrap();
    g.player_mut(0).unwrap().position = 12;
    g.player_mut(1).unwrap().balance = 5;

    // Player 1 hands over what they have and owes the rest.
    assert_eq!(
        g.advance().unwrap(),
        Step::Decision(Decision::RaiseFunds {
            debtor: 1,
            creditor: Creditor::Player(0),
            amount: 5
        })
    );
    assert_eq!(balance(&g, 0), 1515);

    g.decide(Action::DeclareBankruptcy).unwrap();
    assert_eq!(g.order(), &[0, 2]);
    assert_eq!(g.advance().unwrap(), Step::TurnComplete);
    g.end_turn().unwrap();
    assert_eq!(g.current_player(), 2);
    assert_valid(&g);
}

#[test]
fn test_repairs_card_counts_buildings() {
    let card = Card::new(
        "Repairs",
        CardEffect::Repairs {
            per_house: 25,
            per_hotel: 100,
        },
    );
    let mut g = with_chance(2, vec![card], &[(3, 4)]);
    g.award(0, 1, 0).unwrap();
    g.award(0, 3, 0).unwrap();
    g.build_house(0, 1).unwrap();
    g.build_house(0, 3).unwrap();
    assert_eq!(balance(&g, 0), 1400);

    assert_eq!(g.advance().unwrap(), Step::TurnComplete);
    assert_eq!(balance(&g, 0), 1350);
}

// =============================================================================
// Development and mortgages
// =============================================================================

#[test]
fn test_even_building_enforced() {
    let mut g = game(2, &[]);
    g.award(0, 1, 0).unwrap();
    assert!(matches!(
        g.build_house(0, 1),
        Err(RuleError::NoMonopoly { .. })
    ));

    g.award(0, 3, 0).unwrap();
    g.build_house(0, 1).unwrap();
    assert_eq!(g.build_house(0, 1), Err(RuleError::UnevenDistribution(1)));
    g.build_house(0, 3).unwrap();
    g.build_house(0, 1).unwrap();
    assert_eq!(g.ledger().state(1).unwrap().houses, 2);
}

#[test]
fn test_hotel_returns_houses_to_bank() {
    let mut g = game(2, &[]);
    g.award(0, 1, 0).unwrap();
    g.award(0, 3, 0).unwrap();
    for _ in 0..4 {
        g.build_house(0, 1).unwrap();
        g.build_house(0, 3).unwrap();
    }
    assert_eq!(g.bank().houses(), 24);

    g.build_hotel(0, 1).unwrap();
    assert_eq!(g.bank().houses(), 28);
    assert_eq!(g.bank().hotels(), 11);
    assert_eq!(g.build_house(0, 1), Err(RuleError::HasHotel(1)));
    assert_valid(&g);

    // Selling the hotel breaks it into four houses, then sells one.
    let refund = g.sell_house(0, 1).unwrap();
    assert_eq!(refund, 25);
    assert_eq!(g.ledger().state(1).unwrap().houses, 3);
    assert_eq!(g.bank().houses(), 25);
    assert_eq!(g.bank().hotels(), 12);
    assert_valid(&g);
}

#[test]
fn test_mortgage_round_trip_costs_interest() {
    let mut g = game(2, &[]);
    g.award(0, 1, 60).unwrap();

    assert_eq!(g.mortgage(0, 1).unwrap(), 30);
    assert_eq!(balance(&g, 0), 1470);
    assert_eq!(g.mortgage(0, 1), Err(RuleError::AlreadyMortgaged(1)));

    assert_eq!(g.unmortgage(0, 1).unwrap(), 33);
    assert_eq!(balance(&g, 0), 1437);
    assert_eq!(g.unmortgage(0, 1), Err(RuleError::NotMortgaged(1)));
}

#[test]
fn test_developed_space_cannot_be_mortgaged() {
    let mut g = game(2, &[]);
    g.award(0, 1, 0).unwrap();
    g.award(0, 3, 0).unwrap();
    g.build_house(0, 1).unwrap();

    assert_eq!(g.mortgage(0, 1), Err(RuleError::HasDevelopment(1)));
    assert!(matches!(g.mortgage(1, 1), Err(RuleError::NotOwned { .. })));
}

// =============================================================================
// Snapshots
// =============================================================================

#[test]
fn test_snapshot_mid_decision_resumes() {
    let mut g = game(2, &[(1, 2)]);
    let offer = g.advance().unwrap();

    let restored = g.snapshot();
    let mut resumed = GameSession::restore(restored, ScriptedRandomness::new([])).unwrap();
    assert_eq!(resumed.advance().unwrap(), offer);
    resumed.decide(Action::Buy).unwrap();
    assert_eq!(resumed.ledger().owner(3), Some(0));
}
