//! Cached leaderboard queries over the game contract's event history.
//!
//! Every query reads the full log set through the service's [`LogCache`]
//! and recomputes statistics from scratch; only the raw logs are cached.

use std::sync::Arc;

use alloy::primitives::Address;
use guess_data::{
    BlockscoutClient, CacheStatus, ContractLog, ExplorerConfig, LogCache, LogFetcher, LogSource,
    NetworkError,
};
use tracing::error;

use crate::leaderboard::{build_leaderboard, LeaderboardEntry, SortBy};
use crate::stats::{process_logs, summarize, LeaderboardSummary, PlayerStats};

/// Leaderboard queries backed by one log cache.
#[derive(Debug)]
pub struct LeaderboardService<S> {
    cache: LogCache<S>,
}

impl LeaderboardService<BlockscoutClient> {
    /// Builds a service talking to the explorer described by `config`.
    ///
    /// # Errors
    /// Returns [`NetworkError`] if the HTTP client cannot be configured.
    pub fn from_config(config: &ExplorerConfig) -> Result<Self, NetworkError> {
        let client = BlockscoutClient::new(config)?;
        let fetcher = LogFetcher::new(client, config.page_delay);
        Ok(Self::new(LogCache::with_ttl(fetcher, config.cache_ttl)))
    }
}

impl<S: LogSource> LeaderboardService<S> {
    /// Wraps an existing cache.
    pub fn new(cache: LogCache<S>) -> Self {
        Self { cache }
    }

    /// The underlying log cache.
    pub fn cache(&self) -> &LogCache<S> {
        &self.cache
    }

    /// All decoded contract logs, from cache when allowed and fresh.
    pub async fn fetch_all_logs(
        &self,
        use_cache: bool,
    ) -> Result<Arc<Vec<ContractLog>>, NetworkError> {
        self.cache.get(use_cache).await
    }

    /// Every player ranked under `sort_by`.
    ///
    /// # Errors
    /// Propagates the [`NetworkError`] of a failed fetch unchanged.
    #[tracing::instrument(skip(self))]
    pub async fn leaderboard(
        &self,
        sort_by: SortBy,
        use_cache: bool,
    ) -> Result<Vec<LeaderboardEntry>, NetworkError> {
        let logs = self
            .cache
            .get(use_cache)
            .await
            .inspect_err(|e| error!(error = %e, "failed to generate leaderboard"))?;
        let stats = process_logs(&logs);
        Ok(build_leaderboard(&stats, sort_by))
    }

    /// The first `limit` rows of [`leaderboard`](Self::leaderboard).
    pub async fn top_players(
        &self,
        sort_by: SortBy,
        limit: usize,
        use_cache: bool,
    ) -> Result<Vec<LeaderboardEntry>, NetworkError> {
        let mut rows = self.leaderboard(sort_by, use_cache).await?;
        rows.truncate(limit);
        Ok(rows)
    }

    /// Statistics for one player, `None` if the address never played.
    #[tracing::instrument(skip(self), fields(player = %player))]
    pub async fn player_stats(
        &self,
        player: Address,
        use_cache: bool,
    ) -> Result<Option<PlayerStats>, NetworkError> {
        let logs = self
            .cache
            .get(use_cache)
            .await
            .inspect_err(|e| error!(error = %e, "failed to get player stats"))?;
        Ok(process_logs(&logs).remove(&player))
    }

    /// Totals across all players.
    pub async fn summary(&self, use_cache: bool) -> Result<LeaderboardSummary, NetworkError> {
        let logs = self.cache.get(use_cache).await?;
        Ok(summarize(&process_logs(&logs)))
    }

    /// Forces the next query to refetch.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Current cache state; never fetches.
    pub fn cache_status(&self) -> CacheStatus {
        self.cache.status()
    }
}
