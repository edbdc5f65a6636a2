use rand::seq::SliceRandom;
use rand::Rng;

use super::MAX_REPAIR_ATTEMPTS;
use crate::error::GameError;

/// A pot-size bracket: grid dimension and the denominations it may use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardTier {
    /// Largest pot (inclusive) this tier covers
    pub max_pot: u64,
    /// Boxes per side
    pub grid_size: usize,
    /// Allowed face values, ascending
    pub denominations: &'static [u64],
}

impl BoardTier {
    pub fn cells(&self) -> usize {
        self.grid_size * self.grid_size
    }

    fn min_denomination(&self) -> u64 {
        self.denominations[0]
    }

    fn max_denomination(&self) -> u64 {
        self.denominations[self.denominations.len() - 1]
    }
}

/// Tiers in ascending pot order. Pots below the first bracket use the
/// smallest board and pots above the last bracket use the largest.
pub const BOARD_TIERS: [BoardTier; 4] = [
    BoardTier {
        max_pot: 5_000,
        grid_size: 3,
        denominations: &[100, 200, 500, 1_000],
    },
    BoardTier {
        max_pot: 10_000,
        grid_size: 4,
        denominations: &[100, 200, 500, 1_000, 2_000],
    },
    BoardTier {
        max_pot: 20_000,
        grid_size: 5,
        denominations: &[100, 200, 500, 1_000, 2_000, 5_000],
    },
    BoardTier {
        max_pot: u64::MAX,
        grid_size: 5,
        denominations: &[100, 200, 500, 1_000, 2_000, 5_000],
    },
];

/// Pick the tier for a pot
pub fn tier_for_pot(pot: u64) -> &'static BoardTier {
    BOARD_TIERS
        .iter()
        .find(|tier| pot <= tier.max_pot)
        .unwrap_or(&BOARD_TIERS[BOARD_TIERS.len() - 1])
}

/// Generated grid of denominations for a room
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoinBoard {
    pub grid_size: usize,
    /// Row-major denominations, `grid_size` rows of `grid_size` values
    pub denominations: Vec<Vec<u64>>,
}

impl CoinBoard {
    pub fn total(&self) -> u64 {
        self.denominations.iter().flatten().sum()
    }

    pub fn cell_count(&self) -> usize {
        self.denominations.iter().map(Vec::len).sum()
    }
}

/// Generate the coin board for a room where each player stakes `bet`.
///
/// The board holds exactly `2 * bet` spread over `grid_size²` boxes, in a
/// uniformly shuffled order.
///
/// # Errors
///
/// `InvalidBet` for a zero bet, `UnreachablePot` if the tier's
/// denominations cannot add up to the pot, `BoardGeneration` if the
/// partition did not land on the exact pot.
pub fn generate_board<R: Rng + ?Sized>(bet: u64, rng: &mut R) -> Result<CoinBoard, GameError> {
    if bet == 0 {
        return Err(GameError::InvalidBet);
    }

    let tier = tier_for_pot(bet.saturating_mul(2));
    let pot = bet.checked_mul(2).ok_or(GameError::UnreachablePot {
        pot: u64::MAX,
        cells: tier.cells(),
    })?;

    tracing::debug!(
        "Generating {}x{} board for pot {}",
        tier.grid_size,
        tier.grid_size,
        pot
    );

    let mut values = partition_pot(pot, tier)?;
    values.shuffle(rng);

    let denominations = values
        .chunks(tier.grid_size)
        .map(<[u64]>::to_vec)
        .collect();

    Ok(CoinBoard {
        grid_size: tier.grid_size,
        denominations,
    })
}

/// Split `pot` into exactly `tier.cells()` denominations summing to `pot`.
///
/// The result is in fill order, not shuffled.
pub fn partition_pot(pot: u64, tier: &BoardTier) -> Result<Vec<u64>, GameError> {
    let cells = tier.cells();
    let unreachable = GameError::UnreachablePot { pot, cells };

    let lowest = cells as u64 * tier.min_denomination();
    let highest = cells as u64 * tier.max_denomination();
    if pot < lowest || pot > highest {
        return Err(unreachable);
    }

    let reach = Reachability::build(tier.denominations, cells, pot);
    if !reach.reachable(cells, pot) {
        return Err(unreachable);
    }

    let mut values = greedy_fill(pot, cells, tier.denominations, &reach);

    let attempts = repair_residual(&mut values, pot, tier.denominations, MAX_REPAIR_ATTEMPTS);
    if attempts > 0 {
        tracing::warn!("Coin board for pot {} needed {} repair passes", pot, attempts);
    }
    force_last_cell(&mut values, pot, tier.denominations);

    let sum: u64 = values.iter().sum();
    if sum != pot || values.len() != cells {
        tracing::error!("Coin board sums to {} instead of {}", sum, pot);
        return Err(GameError::BoardGeneration { sum, pot });
    }

    Ok(values)
}

/// Which amounts can be written as a sum of exactly k denominations
struct Reachability {
    unit: u64,
    /// `table[k][u]`: `u * unit` is a sum of `k` denominations
    table: Vec<Vec<bool>>,
}

impl Reachability {
    fn build(denominations: &[u64], cells: usize, pot: u64) -> Self {
        let unit = denominations.iter().copied().fold(0, gcd).max(1);
        let max_units = (pot / unit) as usize;
        let steps: Vec<usize> = denominations.iter().map(|d| (d / unit) as usize).collect();

        let mut table = vec![vec![false; max_units + 1]; cells + 1];
        table[0][0] = true;
        for k in 1..=cells {
            for units in 0..=max_units {
                table[k][units] = steps
                    .iter()
                    .any(|&step| units >= step && table[k - 1][units - step]);
            }
        }

        Self { unit, table }
    }

    fn reachable(&self, cells: usize, amount: u64) -> bool {
        if amount % self.unit != 0 {
            return false;
        }
        let units = (amount / self.unit) as usize;
        self.table
            .get(cells)
            .and_then(|row| row.get(units))
            .copied()
            .unwrap_or(false)
    }
}

fn gcd(a: u64, b: u64) -> u64 {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}

/// Fill cells one by one with the denomination closest to the average the
/// remaining cells still need, skipping any choice that would leave the
/// rest of the pot unreachable.
fn greedy_fill(pot: u64, cells: usize, denominations: &[u64], reach: &Reachability) -> Vec<u64> {
    let mut values = Vec::with_capacity(cells);
    let mut remaining = pot;

    for placed in 0..cells {
        let cells_left = cells - placed;
        // |d - remaining / cells_left|, scaled by cells_left to stay integral
        let distance = |d: u64| (d * cells_left as u64).abs_diff(remaining);

        let feasible = denominations
            .iter()
            .copied()
            .filter(|&d| {
                remaining
                    .checked_sub(d)
                    .is_some_and(|rest| reach.reachable(cells_left - 1, rest))
            })
            .min_by_key(|&d| distance(d));

        let pick = feasible
            .or_else(|| denominations.iter().copied().min_by_key(|&d| distance(d)))
            .unwrap_or(0);

        values.push(pick);
        remaining = remaining.saturating_sub(pick);
    }

    values
}

/// Nudge `values` toward summing to `target`.
///
/// Each pass first tries one substitution that strictly shrinks the
/// residual, then a pair of substitutions that cancels it outright.
/// Stops when exact, stuck, or out of attempts. Returns passes used.
pub fn repair_residual(
    values: &mut [u64],
    target: u64,
    denominations: &[u64],
    max_attempts: usize,
) -> usize {
    let mut residual = target as i64 - values.iter().sum::<u64>() as i64;
    let mut attempts = 0;

    while residual != 0 && attempts < max_attempts {
        attempts += 1;

        if let Some((index, value)) = single_substitution(values, residual, denominations) {
            residual -= value as i64 - values[index] as i64;
            values[index] = value;
            continue;
        }

        if let Some(((i, vi), (j, vj))) = pair_substitution(values, residual, denominations) {
            values[i] = vi;
            values[j] = vj;
            residual = 0;
            continue;
        }

        break;
    }

    attempts
}

fn single_substitution(values: &[u64], residual: i64, denominations: &[u64]) -> Option<(usize, u64)> {
    values.iter().enumerate().find_map(|(index, &current)| {
        denominations
            .iter()
            .copied()
            .filter(|&d| d != current)
            .find(|&d| {
                let change = d as i64 - current as i64;
                (residual - change).abs() < residual.abs()
            })
            .map(|d| (index, d))
    })
}

type Substitution = ((usize, u64), (usize, u64));

fn pair_substitution(values: &[u64], residual: i64, denominations: &[u64]) -> Option<Substitution> {
    for i in 0..values.len() {
        for j in (i + 1)..values.len() {
            for &di in denominations {
                for &dj in denominations {
                    let change = (di as i64 - values[i] as i64) + (dj as i64 - values[j] as i64);
                    if change == residual {
                        return Some(((i, di), (j, dj)));
                    }
                }
            }
        }
    }
    None
}

/// Last resort: absorb any remaining residual in the final cell, if the
/// resulting value is itself a denomination
fn force_last_cell(values: &mut [u64], target: u64, denominations: &[u64]) {
    let residual = target as i64 - values.iter().sum::<u64>() as i64;
    if residual == 0 {
        return;
    }
    let Some(last) = values.last_mut() else {
        return;
    };
    let forced = *last as i64 + residual;
    if forced > 0 && denominations.contains(&(forced as u64)) {
        tracing::warn!("Forcing last coin {} -> {}", last, forced);
        *last = forced as u64;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn sorted(mut values: Vec<u64>) -> Vec<u64> {
        values.sort_unstable();
        values
    }

    #[test]
    fn test_tier_selection() {
        assert_eq!(tier_for_pot(1_000).grid_size, 3);
        assert_eq!(tier_for_pot(2_000).grid_size, 3);
        assert_eq!(tier_for_pot(5_000).grid_size, 3);
        assert_eq!(tier_for_pot(5_100).grid_size, 4);
        assert_eq!(tier_for_pot(10_000).grid_size, 4);
        assert_eq!(tier_for_pot(20_000).grid_size, 5);
        assert_eq!(tier_for_pot(40_000).grid_size, 5);
        assert!(!tier_for_pot(5_000).denominations.contains(&2_000));
        assert!(tier_for_pot(10_000).denominations.contains(&2_000));
        assert!(!tier_for_pot(10_000).denominations.contains(&5_000));
        assert!(tier_for_pot(20_000).denominations.contains(&5_000));
    }

    #[test]
    fn test_bet_5000_gives_4x4_board_worth_10000() {
        let mut rng = StdRng::seed_from_u64(7);
        let board = generate_board(5_000, &mut rng).unwrap();

        assert_eq!(board.grid_size, 4);
        assert_eq!(board.denominations.len(), 4);
        assert!(board.denominations.iter().all(|row| row.len() == 4));
        assert_eq!(board.cell_count(), 16);
        assert_eq!(board.total(), 10_000);

        let allowed = [100, 200, 500, 1_000, 2_000];
        assert!(board
            .denominations
            .iter()
            .flatten()
            .all(|d| allowed.contains(d)));
    }

    #[test]
    fn test_catalogue_bets() {
        let mut rng = StdRng::seed_from_u64(42);

        for (bet, grid) in [(1_000, 3), (5_000, 4), (10_000, 5), (20_000, 5)] {
            let board = generate_board(bet, &mut rng).unwrap();
            assert_eq!(board.grid_size, grid, "bet {}", bet);
            assert_eq!(board.cell_count(), grid * grid, "bet {}", bet);
            assert_eq!(board.total(), bet * 2, "bet {}", bet);
        }
    }

    #[test]
    fn test_zero_bet_rejected() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(generate_board(0, &mut rng), Err(GameError::InvalidBet));
    }

    #[test]
    fn test_pot_below_smallest_board_rejected() {
        let mut rng = StdRng::seed_from_u64(1);
        // 9 boxes need at least 900
        assert_eq!(
            generate_board(400, &mut rng),
            Err(GameError::UnreachablePot { pot: 800, cells: 9 })
        );
    }

    #[test]
    fn test_pot_above_largest_board_rejected() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(
            generate_board(62_600, &mut rng),
            Err(GameError::UnreachablePot {
                pot: 125_200,
                cells: 25
            })
        );
    }

    #[test]
    fn test_pot_off_the_denomination_grid_rejected() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(
            generate_board(1_025, &mut rng),
            Err(GameError::UnreachablePot {
                pot: 2_050,
                cells: 9
            })
        );
    }

    #[test]
    fn test_partition_is_exact_before_shuffle() {
        let tier = tier_for_pot(2_000);
        let values = partition_pot(2_000, tier).unwrap();

        assert_eq!(values.len(), 9);
        assert_eq!(values.iter().sum::<u64>(), 2_000);
    }

    #[test]
    fn test_shuffle_keeps_denominations() {
        let tier = tier_for_pot(30_000);
        let expected = sorted(partition_pot(30_000, tier).unwrap());

        let mut rng = StdRng::seed_from_u64(99);
        let board = generate_board(15_000, &mut rng).unwrap();
        let actual = sorted(board.denominations.into_iter().flatten().collect());

        assert_eq!(actual, expected);
    }

    #[test]
    fn test_repair_single_substitution() {
        let mut values = vec![200, 200, 200];
        let attempts = repair_residual(&mut values, 500, &[100, 200, 500], 10);

        assert!(attempts >= 1);
        assert_eq!(values.iter().sum::<u64>(), 500);
    }

    #[test]
    fn test_repair_falls_back_to_pair() {
        // Residual +100 with no 100 coin to bump: only 500 -> 1000 paired
        // with 500 -> 100 reaches it exactly
        let denominations = [100, 200, 500, 1_000];
        let mut values = vec![500, 500];
        let attempts = repair_residual(&mut values, 1_100, &denominations, 10);

        assert_eq!(attempts, 1);
        assert_eq!(values.iter().sum::<u64>(), 1_100);
        assert!(values.iter().all(|v| denominations.contains(v)));
    }

    #[test]
    fn test_repair_gives_up_when_stuck() {
        let mut values = vec![200];
        let attempts = repair_residual(&mut values, 300, &[200], 10);

        assert_eq!(attempts, 1);
        assert_eq!(values, vec![200]);
    }

    #[test]
    fn test_force_last_cell() {
        let mut values = vec![200, 200];
        force_last_cell(&mut values, 700, &[200, 500]);
        assert_eq!(values, vec![200, 500]);

        let mut values = vec![200, 200];
        force_last_cell(&mut values, 650, &[200, 500]);
        assert_eq!(values, vec![200, 200]);
    }
}
