//! Property tests for the coin board generator and the board rules.
//!
//! Only postconditions are asserted: the exact pot, the cell count, the
//! tier's denominations, and box ownership following enclosure.

use boxbet::core::{
    coin_board::{generate_board, tier_for_pot},
    Board, EdgePosition,
};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Bets whose pot every tier can lay out: multiples of 50 from 500 to 54350
fn arb_bet() -> impl Strategy<Value = u64> {
    (10u64..=1_087).prop_map(|steps| steps * 50)
}

proptest! {
    #[test]
    fn board_holds_exactly_the_pot(bet in arb_bet(), seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let board = generate_board(bet, &mut rng).unwrap();
        let tier = tier_for_pot(bet * 2);

        prop_assert_eq!(board.total(), bet * 2);
        prop_assert_eq!(board.grid_size, tier.grid_size);
        prop_assert_eq!(board.cell_count(), tier.grid_size * tier.grid_size);
        prop_assert!(board.denominations.iter().all(|row| row.len() == tier.grid_size));
        prop_assert!(board
            .denominations
            .iter()
            .flatten()
            .all(|value| tier.denominations.contains(value)));
    }

    #[test]
    fn odd_hundreds_are_rejected(bet in (1u64..=500).prop_map(|n| n * 100 + 25)) {
        let mut rng = StdRng::seed_from_u64(bet);
        prop_assert!(generate_board(bet, &mut rng).is_err());
    }

    #[test]
    fn owned_iff_enclosed_in_any_order(seed in any::<u64>(), grid in 1usize..=5) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut board = Board::new(vec![vec![100; grid]; grid]);
        let mut edges = board.free_edges();
        edges.shuffle(&mut rng);
        let total_edges = edges.len();

        for (i, edge) in edges.into_iter().enumerate() {
            let owner = if i % 2 == 0 { "a" } else { "b" };
            let captured = board.place(edge, owner).unwrap();
            prop_assert!(captured.len() <= 2);
            prop_assert!(board.place(edge, owner).is_err());

            for row in 0..grid {
                for col in 0..grid {
                    prop_assert_eq!(
                        board.coin(row, col).unwrap().owner_id.is_some(),
                        board.is_enclosed(row, col)
                    );
                }
            }
            prop_assert_eq!(board.is_complete(), i + 1 == total_edges);
        }

        prop_assert!(board.free_edges().is_empty());
        prop_assert!(!board.has_edge(&EdgePosition::horizontal(grid + 1, 0)));
    }
}
