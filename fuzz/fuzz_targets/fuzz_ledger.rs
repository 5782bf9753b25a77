#![no_main]

//! Ledger fuzzer.
//!
//! Applies arbitrary purchase, development and mortgage calls straight to a
//! ledger and bank, checking that every refusal leaves state untouched and
//! that buildings are conserved.

use arbitrary::Arbitrary;
use landlord::game::{Bank, Board, Ledger, Player};
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
enum LedgerOp {
    Purchase { player: bool, space: u8 },
    Build { player: bool, space: u8 },
    Hotel { player: bool, space: u8 },
    Sell { player: bool, space: u8 },
    Mortgage { player: bool, space: u8 },
    Unmortgage { player: bool, space: u8 },
}

#[derive(Arbitrary, Debug)]
struct LedgerInput {
    cash: [u16; 2],
    houses: u8,
    hotels: u8,
    ops: Vec<LedgerOp>,
}

fuzz_target!(|input: LedgerInput| {
    let board = Board::standard();
    let houses = u32::from(input.houses % 40);
    let hotels = u32::from(input.hotels % 16);
    let mut bank = Bank::new(houses, hotels, board.ownable_ids());
    let mut ledger = Ledger::new(&board);
    let mut players = [
        Player::new(0, "a", u32::from(input.cash[0]) * 4),
        Player::new(1, "b", u32::from(input.cash[1]) * 4),
    ];

    for op in input.ops.iter().take(300) {
        let before = (ledger.clone(), bank.clone(), players.clone());
        let result = match *op {
            LedgerOp::Purchase { player, space } => {
                let p = &mut players[usize::from(player)];
                ledger.purchase(&board, &mut bank, p, space % 40)
            }
            LedgerOp::Build { player, space } => {
                let p = &mut players[usize::from(player)];
                ledger.build_house(&board, &mut bank, p, space % 40)
            }
            LedgerOp::Hotel { player, space } => {
                let p = &mut players[usize::from(player)];
                ledger.build_hotel(&board, &mut bank, p, space % 40)
            }
            LedgerOp::Sell { player, space } => {
                let p = &mut players[usize::from(player)];
                ledger.sell_house(&board, &mut bank, p, space % 40)
            }
            LedgerOp::Mortgage { player, space } => {
                let p = &mut players[usize::from(player)];
                ledger.mortgage(&board, p, space % 40)
            }
            LedgerOp::Unmortgage { player, space } => {
                let p = &mut players[usize::from(player)];
                ledger.unmortgage(&board, p, space % 40, 10)
            }
        };

        if result.is_err() {
            assert_eq!((&ledger, &bank, &players), (&before.0, &before.1, &before.2));
        }

        let (on_board_houses, on_board_hotels) = ledger.buildings_total();
        assert_eq!(bank.houses() + on_board_houses, houses);
        assert_eq!(bank.hotels() + on_board_hotels, hotels);
        for (space, state) in ledger.iter() {
            assert!(state.houses <= 4, "space {space} over-built");
            assert!(!(state.mortgaged && state.is_developed()));
        }
    }
});
