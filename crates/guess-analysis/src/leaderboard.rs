//! Leaderboard ranking.
//!
//! Rows are ordered descending by the selected policy:
//!
//! | policy     | primary                             | then             | then          |
//! |------------|-------------------------------------|------------------|---------------|
//! | `wins`     | total wins                          | win rate         | total guesses |
//! | `prizes`   | total prizes won                    | total wins       | win rate      |
//! | `win-rate` | ≥ 5 guesses first, then win rate    | total wins       | total guesses |
//! | `activity` | last activity block                 | total guesses    | total wins    |
//!
//! Two win rates that differ by at most 0.001 count as equal and the next
//! key decides. Rates are compared by cross-multiplying the exact counts,
//! never through floats. Remaining ties go to the lower player address.
//!
//! The tolerance makes "equal" non-transitive, which `slice::sort_by` does
//! not accept, so rows are ranked with a stable insertion sort over input
//! that is first put in address order.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use alloy::primitives::{Address, U256};

use crate::stats::PlayerStats;

/// Guesses a player needs before ranking on win rate.
pub const MIN_GUESSES_FOR_WIN_RATE: u64 = 5;

/// Win rates closer than `1 / WIN_RATE_TOLERANCE_INV` are considered equal.
const WIN_RATE_TOLERANCE_INV: u64 = 1_000;

/// Ranking policy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SortBy {
    /// Most wins.
    #[default]
    Wins,
    /// Largest prize total.
    Prizes,
    /// Best win rate among qualified players.
    WinRate,
    /// Most recent activity.
    Activity,
}

impl SortBy {
    /// All policies, in display order.
    pub const ALL: [SortBy; 4] = [Self::Wins, Self::Prizes, Self::WinRate, Self::Activity];
}

impl fmt::Display for SortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Wins => write!(f, "wins"),
            Self::Prizes => write!(f, "prizes"),
            Self::WinRate => write!(f, "win-rate"),
            Self::Activity => write!(f, "activity"),
        }
    }
}

/// Unknown sort policy name.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown sort criterion '{0}'; use 'wins', 'prizes', 'win-rate' or 'activity'")]
pub struct ParseSortByError(String);

impl FromStr for SortBy {
    type Err = ParseSortByError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "wins" => Ok(Self::Wins),
            "prizes" => Ok(Self::Prizes),
            "win-rate" | "win_rate" | "winrate" => Ok(Self::WinRate),
            "activity" => Ok(Self::Activity),
            _ => Err(ParseSortByError(s.to_string())),
        }
    }
}

/// One ranked leaderboard row.
#[derive(Clone, Debug, PartialEq)]
pub struct LeaderboardEntry {
    /// Player address.
    pub player: Address,
    /// Correct guesses.
    pub total_wins: U256,
    /// Prize payouts received, in wei.
    pub total_prizes_won: U256,
    /// Guesses submitted.
    pub total_guesses: U256,
    /// `correct / total` guesses, `0.0` without guesses.
    pub win_rate: f64,
    /// Challenges created.
    pub challenges_created: U256,
    /// Highest block with activity.
    pub last_activity: u64,
}

impl LeaderboardEntry {
    fn from_stats(player: Address, stats: &PlayerStats) -> Self {
        Self {
            player,
            total_wins: stats.total_wins,
            total_prizes_won: stats.total_prizes_won,
            total_guesses: stats.total_guesses,
            win_rate: stats.win_rate(),
            challenges_created: stats.challenges_created,
            last_activity: stats.last_activity,
        }
    }
}

/// Ranks every player in `stats` under `sort_by`.
pub fn build_leaderboard(
    stats: &HashMap<Address, PlayerStats>,
    sort_by: SortBy,
) -> Vec<LeaderboardEntry> {
    let mut ranked: Vec<(&Address, &PlayerStats)> = stats.iter().collect();
    ranked.sort_unstable_by_key(|(player, _)| **player);
    insertion_sort_by(&mut ranked, |(a_player, a), (b_player, b)| {
        compare(a, b, sort_by).then_with(|| a_player.cmp(b_player))
    });

    ranked
        .into_iter()
        .map(|(player, stats)| LeaderboardEntry::from_stats(*player, stats))
        .collect()
}

/// Stable in-place sort that tolerates comparators which are not a total
/// order; it never panics and always terminates.
fn insertion_sort_by<T>(rows: &mut [T], mut cmp: impl FnMut(&T, &T) -> Ordering) {
    for i in 1..rows.len() {
        let mut j = i;
        while j > 0 && cmp(&rows[j - 1], &rows[j]) == Ordering::Greater {
            rows.swap(j - 1, j);
            j -= 1;
        }
    }
}

/// Descending comparison of two players under `sort_by`.
fn compare(a: &PlayerStats, b: &PlayerStats, sort_by: SortBy) -> Ordering {
    let wins = || b.total_wins.cmp(&a.total_wins);
    let rate = || compare_win_rate(a, b);
    let guesses = || b.total_guesses.cmp(&a.total_guesses);

    match sort_by {
        SortBy::Wins => wins().then_with(rate).then_with(guesses),
        SortBy::Prizes => b
            .total_prizes_won
            .cmp(&a.total_prizes_won)
            .then_with(wins)
            .then_with(rate),
        SortBy::WinRate => qualifies(b)
            .cmp(&qualifies(a))
            .then_with(rate)
            .then_with(wins)
            .then_with(guesses),
        SortBy::Activity => b
            .last_activity
            .cmp(&a.last_activity)
            .then_with(guesses)
            .then_with(wins),
    }
}

/// Descending win-rate comparison with a 0.001 tolerance.
///
/// `|a_c/a_t - b_c/b_t| <= 1/1000` is evaluated as
/// `|a_c*b_t - b_c*a_t| * 1000 <= a_t*b_t`. Players without guesses have a
/// rate of `0/1`.
fn compare_win_rate(a: &PlayerStats, b: &PlayerStats) -> Ordering {
    let (a_correct, a_total) = rate_parts(a);
    let (b_correct, b_total) = rate_parts(b);

    let a_scaled = a_correct.saturating_mul(b_total);
    let b_scaled = b_correct.saturating_mul(a_total);
    let diff = if a_scaled > b_scaled {
        a_scaled - b_scaled
    } else {
        b_scaled - a_scaled
    };

    if diff.saturating_mul(U256::from(WIN_RATE_TOLERANCE_INV)) <= a_total.saturating_mul(b_total) {
        Ordering::Equal
    } else {
        b_scaled.cmp(&a_scaled)
    }
}

fn rate_parts(stats: &PlayerStats) -> (U256, U256) {
    if stats.total_guesses.is_zero() {
        (U256::ZERO, U256::from(1u64))
    } else {
        (stats.correct_guesses(), stats.total_guesses)
    }
}

fn qualifies(stats: &PlayerStats) -> bool {
    stats.total_guesses >= U256::from(MIN_GUESSES_FOR_WIN_RATE)
}

/// Formats a wei amount as FLOW with exactly 6 decimal places.
///
/// Examples:
/// - `1_000_000_000_000_000_000` -> `"1.000000 FLOW"`
/// - `2_500_000_000_000_000` -> `"0.002500 FLOW"`
pub fn format_flow(wei: U256) -> String {
    let wei_per_flow = U256::from(1_000_000_000_000_000_000u128);
    let scale = U256::from(1_000_000u64);

    let whole = wei / wei_per_flow;
    let fractional = (wei % wei_per_flow) * scale / wei_per_flow;
    let fractional = u64::try_from(fractional).unwrap_or_default();

    format!("{whole}.{fractional:06} FLOW")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(n: u8) -> Address {
        Address::with_last_byte(n)
    }

    fn stats(wins: u64, guesses: u64, prizes: u64, last_activity: u64) -> PlayerStats {
        PlayerStats {
            total_wins: U256::from(wins),
            total_prizes_won: U256::from(prizes),
            total_guesses: U256::from(guesses),
            challenges_created: U256::ZERO,
            last_activity,
        }
    }

    fn order(map: &HashMap<Address, PlayerStats>, sort_by: SortBy) -> Vec<Address> {
        build_leaderboard(map, sort_by)
            .into_iter()
            .map(|e| e.player)
            .collect()
    }

    #[test]
    fn wins_tie_broken_by_win_rate() {
        let map = HashMap::from([
            (player(0xa), stats(3, 10, 0, 1)),
            (player(0xb), stats(3, 6, 0, 1)),
        ]);
        assert_eq!(order(&map, SortBy::Wins), vec![player(0xb), player(0xa)]);
    }

    #[test]
    fn wins_with_near_equal_rates_fall_back_to_guesses() {
        // 0.5 and 0.49975 are within 0.001 of each other.
        let map = HashMap::from([
            (player(1), stats(1000, 2000, 0, 1)),
            (player(2), stats(1000, 2001, 0, 1)),
        ]);
        assert_eq!(order(&map, SortBy::Wins), vec![player(2), player(1)]);

        let map = HashMap::from([
            (player(1), stats(1, 4000, 0, 1)),
            (player(2), stats(1, 4001, 0, 1)),
        ]);
        assert_eq!(order(&map, SortBy::Wins), vec![player(2), player(1)]);
    }

    #[test]
    fn rates_within_tolerance_tie_even_across_thousandths() {
        // 167/501 = 0.33333 and 167/500 = 0.334 differ by 0.000667.
        let map = HashMap::from([
            (player(0xa), stats(167, 501, 0, 1)),
            (player(0xb), stats(167, 500, 0, 1)),
        ]);
        assert_eq!(order(&map, SortBy::Wins), vec![player(0xa), player(0xb)]);
    }

    #[test]
    fn rates_just_outside_tolerance_are_ordered() {
        // 0.5 against 0.502: the higher rate wins despite fewer guesses.
        let map = HashMap::from([
            (player(1), stats(250, 500, 0, 1)),
            (player(2), stats(250, 498, 0, 1)),
        ]);
        assert_eq!(order(&map, SortBy::Wins), vec![player(2), player(1)]);
    }

    #[test]
    fn chained_near_equal_rates_rank_without_panicking() {
        // 900/1800 ~ 626/1250 ~ 313/624 pairwise by rate, and wins break
        // those ties downward, yet 313/624 beats 900/1800 on rate alone.
        let patterns = [(900, 1800), (626, 1250), (313, 624)];
        let map: HashMap<Address, PlayerStats> = (0u8..60)
            .map(|i| {
                let (wins, guesses) = patterns[usize::from(i % 3)];
                (player(i), stats(wins, guesses, 0, 1))
            })
            .collect();

        let first = order(&map, SortBy::WinRate);
        assert_eq!(first.len(), 60);
        let rebuilt: HashMap<Address, PlayerStats> = map.clone().into_iter().collect();
        assert_eq!(order(&rebuilt, SortBy::WinRate), first);
    }

    #[test]
    fn prizes_tie_broken_by_wins() {
        let map = HashMap::from([
            (player(0xc), stats(1, 1, 10, 1)),
            (player(0xd), stats(2, 2, 10, 1)),
        ]);
        assert_eq!(order(&map, SortBy::Prizes), vec![player(0xd), player(0xc)]);
    }

    #[test]
    fn win_rate_ranks_qualified_players_first() {
        let map = HashMap::from([
            (player(1), stats(4, 4, 0, 1)),  // 100%, unqualified
            (player(2), stats(1, 5, 0, 1)),  // 20%, qualified
            (player(3), stats(3, 5, 0, 1)),  // 60%, qualified
            (player(4), stats(0, 0, 0, 1)),  // no guesses
        ]);
        assert_eq!(
            order(&map, SortBy::WinRate),
            vec![player(3), player(2), player(1), player(4)]
        );
    }

    #[test]
    fn activity_orders_by_latest_block() {
        let map = HashMap::from([
            (player(1), stats(0, 1, 0, 100)),
            (player(2), stats(0, 3, 0, 250)),
            (player(3), stats(0, 5, 0, 100)),
        ]);
        assert_eq!(
            order(&map, SortBy::Activity),
            vec![player(2), player(3), player(1)]
        );
    }

    #[test]
    fn fully_equal_rows_sort_by_address() {
        let map = HashMap::from([
            (player(9), stats(1, 1, 1, 1)),
            (player(3), stats(1, 1, 1, 1)),
            (player(5), stats(1, 1, 1, 1)),
        ]);
        for sort_by in SortBy::ALL {
            assert_eq!(
                order(&map, sort_by),
                vec![player(3), player(5), player(9)],
                "policy {sort_by}"
            );
        }
    }

    #[test]
    fn prize_comparison_is_exact_beyond_f64() {
        let big = U256::from(10u64).pow(U256::from(30u64));
        let map = HashMap::from([
            (
                player(1),
                PlayerStats {
                    total_prizes_won: big,
                    ..PlayerStats::default()
                },
            ),
            (
                player(2),
                PlayerStats {
                    total_prizes_won: big + U256::from(1u64),
                    ..PlayerStats::default()
                },
            ),
        ]);
        assert_eq!(order(&map, SortBy::Prizes), vec![player(2), player(1)]);
    }

    #[test]
    fn entry_carries_derived_win_rate() {
        let map = HashMap::from([(player(1), stats(0, 0, 0, 7))]);
        let rows = build_leaderboard(&map, SortBy::Wins);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].win_rate, 0.0);
        assert_eq!(rows[0].last_activity, 7);
    }

    #[test]
    fn parses_sort_names() {
        assert_eq!("wins".parse::<SortBy>(), Ok(SortBy::Wins));
        assert_eq!("Prizes".parse::<SortBy>(), Ok(SortBy::Prizes));
        assert_eq!("winRate".parse::<SortBy>(), Ok(SortBy::WinRate));
        assert_eq!("win-rate".parse::<SortBy>(), Ok(SortBy::WinRate));
        assert!("volume".parse::<SortBy>().is_err());
        for sort_by in SortBy::ALL {
            assert_eq!(sort_by.to_string().parse::<SortBy>(), Ok(sort_by));
        }
    }

    #[test]
    fn formats_flow_amounts() {
        assert_eq!(
            format_flow(U256::from(1_000_000_000_000_000_000u128)),
            "1.000000 FLOW"
        );
        assert_eq!(format_flow(U256::from(2_500_000_000_000_000u128)), "0.002500 FLOW");
        assert_eq!(format_flow(U256::ZERO), "0.000000 FLOW");
    }
}
