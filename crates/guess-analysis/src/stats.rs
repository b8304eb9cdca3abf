//! Per-player statistics folded from contract logs.
//!
//! Every aggregation pass starts from an empty map; nothing is persisted
//! between passes. All counters are 256-bit so on-chain amounts can be
//! summed without truncation.

use std::collections::HashMap;

use alloy::primitives::{Address, U256};
use guess_data::ContractLog;
use tracing::{debug, warn};

use crate::events::GameEvent;

/// Aggregated activity of one address.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PlayerStats {
    /// Correct guesses. Every correct guess is a win.
    pub total_wins: U256,
    /// Sum of prize payouts received, in wei.
    pub total_prizes_won: U256,
    /// Guesses submitted.
    pub total_guesses: U256,
    /// Challenges created.
    pub challenges_created: U256,
    /// Highest block number of any event touching this address.
    pub last_activity: u64,
}

impl PlayerStats {
    /// Correct guesses; same counter as [`total_wins`](Self::total_wins).
    pub fn correct_guesses(&self) -> U256 {
        self.total_wins
    }

    /// `correct_guesses / total_guesses`, or `0.0` without guesses.
    pub fn win_rate(&self) -> f64 {
        if self.total_guesses.is_zero() {
            return 0.0;
        }
        to_f64(self.correct_guesses()) / to_f64(self.total_guesses)
    }

    fn touch(&mut self, block_number: u64) {
        self.last_activity = self.last_activity.max(block_number);
    }
}

/// Totals across all players.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LeaderboardSummary {
    /// Distinct addresses with any activity.
    pub total_players: usize,
    /// Sum of all prize payouts, in wei.
    pub total_prizes_won: U256,
    /// Sum of all guesses.
    pub total_guesses: U256,
    /// Sum of all wins.
    pub total_wins: U256,
    /// Sum of all challenges created.
    pub challenges_created: U256,
}

/// Folds `logs` into per-address statistics.
///
/// Input order does not matter. Malformed events are skipped and unknown
/// signatures ignored; neither creates a stats entry.
pub fn process_logs(logs: &[ContractLog]) -> HashMap<Address, PlayerStats> {
    let mut stats: HashMap<Address, PlayerStats> = HashMap::new();
    let mut skipped = 0usize;

    for log in logs {
        let event = match GameEvent::decode(log) {
            Ok(event) => event,
            Err(e) => {
                skipped += 1;
                debug!(
                    tx_hash = %log.transaction_hash,
                    block_number = log.block_number,
                    error = %e,
                    "skipping malformed event"
                );
                continue;
            }
        };

        let Some(player) = event.player() else {
            continue;
        };
        let entry = stats.entry(player).or_default();

        match event {
            GameEvent::PrizeAwarded { amount, .. } => {
                entry.total_prizes_won = checked_sum(entry.total_prizes_won, amount, player);
            }
            GameEvent::GuessMade { is_correct, .. } => {
                entry.total_guesses = checked_sum(entry.total_guesses, U256::from(1u64), player);
                if is_correct {
                    entry.total_wins = checked_sum(entry.total_wins, U256::from(1u64), player);
                }
            }
            GameEvent::ChallengeCreated { .. } => {
                entry.challenges_created =
                    checked_sum(entry.challenges_created, U256::from(1u64), player);
            }
            GameEvent::FeeDistributed { .. } | GameEvent::Unknown => {}
        }
        entry.touch(log.block_number);
    }

    debug!(
        logs = logs.len(),
        players = stats.len(),
        skipped,
        "processed contract logs"
    );

    stats
}

/// Sums the per-player statistics.
pub fn summarize(stats: &HashMap<Address, PlayerStats>) -> LeaderboardSummary {
    stats.values().fold(
        LeaderboardSummary {
            total_players: stats.len(),
            ..LeaderboardSummary::default()
        },
        |mut acc, s| {
            acc.total_prizes_won = acc.total_prizes_won.saturating_add(s.total_prizes_won);
            acc.total_guesses = acc.total_guesses.saturating_add(s.total_guesses);
            acc.total_wins = acc.total_wins.saturating_add(s.total_wins);
            acc.challenges_created = acc.challenges_created.saturating_add(s.challenges_created);
            acc
        },
    )
}

fn checked_sum(current: U256, add: U256, player: Address) -> U256 {
    current.checked_add(add).unwrap_or_else(|| {
        warn!(player = %player, "stat counter overflowed 256 bits, saturating");
        U256::MAX
    })
}

fn to_f64(value: U256) -> f64 {
    u128::try_from(value).unwrap_or(u128::MAX) as f64
}
