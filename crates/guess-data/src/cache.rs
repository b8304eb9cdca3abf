//! Time-bounded memoization of the full contract log set.
//!
//! One [`LogCache`] holds at most one entry: the complete log list from the
//! last successful fetch. Entries are replaced whole and only after a fetch
//! finished, so a failed or cancelled fetch never leaves partial data
//! behind. Expiry is lazy and checked on read.
//!
//! Concurrent misses are coalesced: the fetch runs behind an async gate and
//! callers that queued behind it re-check freshness before fetching again.
//! A [`LogCache::clear`] issued while a fetch is in flight wins: that fetch's
//! result is handed to its caller but not stored.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::blockscout::{LogFetcher, LogSource};
use crate::config::CACHE_TTL;
use crate::error::NetworkError;
use crate::types::ContractLog;

#[derive(Clone, Debug)]
struct CacheEntry {
    data: Arc<Vec<ContractLog>>,
    filled_at: Instant,
    fetched_at: DateTime<Utc>,
}

/// Snapshot of the cache state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheStatus {
    /// Whether an entry exists (fresh or not).
    pub cached: bool,
    /// Age of the entry.
    pub age: Option<Duration>,
    /// Wall-clock time the entry was filled.
    pub fetched_at: Option<DateTime<Utc>>,
}

impl CacheStatus {
    /// Entry age in whole milliseconds.
    pub fn age_ms(&self) -> Option<u128> {
        self.age.map(|age| age.as_millis())
    }
}

/// Log cache in front of a [`LogFetcher`].
#[derive(Debug)]
pub struct LogCache<S> {
    fetcher: LogFetcher<S>,
    ttl: Duration,
    entry: RwLock<Option<CacheEntry>>,
    fetch_gate: Mutex<()>,
    /// Bumped by every clear.
    generation: AtomicU64,
}

impl<S: LogSource> LogCache<S> {
    /// Creates an empty cache with the default 5 minute TTL.
    pub fn new(fetcher: LogFetcher<S>) -> Self {
        Self::with_ttl(fetcher, CACHE_TTL)
    }

    /// Creates an empty cache with a custom TTL.
    pub fn with_ttl(fetcher: LogFetcher<S>, ttl: Duration) -> Self {
        Self {
            fetcher,
            ttl,
            entry: RwLock::new(None),
            fetch_gate: Mutex::new(()),
            generation: AtomicU64::new(0),
        }
    }

    /// The wrapped fetcher.
    pub fn fetcher(&self) -> &LogFetcher<S> {
        &self.fetcher
    }

    /// Returns the contract logs, fetching them if needed.
    ///
    /// With `use_cache` set, a fresh entry is returned without any network
    /// traffic. Otherwise, or when the entry is missing or expired, all pages
    /// are fetched and the entry is replaced.
    ///
    /// # Errors
    /// Propagates the fetch [`NetworkError`]; the existing entry is kept.
    pub async fn get(&self, use_cache: bool) -> Result<Arc<Vec<ContractLog>>, NetworkError> {
        if use_cache {
            if let Some(data) = self.fresh() {
                debug!(logs = data.len(), "using cached logs");
                return Ok(data);
            }
        }

        let _gate = self.fetch_gate.lock().await;

        // Another caller may have refilled the entry while we waited.
        if use_cache {
            if let Some(data) = self.fresh() {
                debug!(logs = data.len(), "using logs fetched by concurrent caller");
                return Ok(data);
            }
        }

        let generation = self.generation.load(Ordering::SeqCst);
        let data = Arc::new(self.fetcher.fetch_all_logs().await?);

        let mut slot = self.entry.write().unwrap_or_else(PoisonError::into_inner);
        if self.generation.load(Ordering::SeqCst) == generation {
            *slot = Some(CacheEntry {
                data: Arc::clone(&data),
                filled_at: Instant::now(),
                fetched_at: Utc::now(),
            });
        } else {
            debug!("cache cleared during fetch, result not stored");
        }

        Ok(data)
    }

    /// Drops the cached entry; the next [`get`](Self::get) fetches.
    ///
    /// A fetch already in flight still completes for its caller but does not
    /// repopulate the cache.
    pub fn clear(&self) {
        let mut slot = self.entry.write().unwrap_or_else(PoisonError::into_inner);
        *slot = None;
        self.generation.fetch_add(1, Ordering::SeqCst);
        drop(slot);
        info!("log cache cleared");
    }

    /// Reports whether an entry exists and its age. Never fetches.
    pub fn status(&self) -> CacheStatus {
        let entry = self.entry.read().unwrap_or_else(PoisonError::into_inner);
        match entry.as_ref() {
            Some(entry) => CacheStatus {
                cached: true,
                age: Some(entry.filled_at.elapsed()),
                fetched_at: Some(entry.fetched_at),
            },
            None => CacheStatus {
                cached: false,
                age: None,
                fetched_at: None,
            },
        }
    }

    fn fresh(&self) -> Option<Arc<Vec<ContractLog>>> {
        let entry = self.entry.read().unwrap_or_else(PoisonError::into_inner);
        entry
            .as_ref()
            .filter(|entry| entry.filled_at.elapsed() < self.ttl)
            .map(|entry| Arc::clone(&entry.data))
    }
}
