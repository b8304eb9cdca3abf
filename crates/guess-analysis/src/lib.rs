//! guess-analysis crate
//!
//! Turns decoded contract logs into player statistics and ranked
//! leaderboards, and exposes the cached [`service::LeaderboardService`].

pub mod events;
pub mod leaderboard;
pub mod service;
pub mod stats;

pub use events::{GameEvent, MalformedEvent};
pub use leaderboard::{build_leaderboard, format_flow, LeaderboardEntry, ParseSortByError, SortBy};
pub use service::LeaderboardService;
pub use stats::{process_logs, summarize, LeaderboardSummary, PlayerStats};
