//! Shared test helpers and utilities.
//!
//! Provides a scripted [`MockSource`] standing in for the block explorer and
//! factory functions for raw log items of each game event.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use guess_analysis::events::signatures;
use guess_analysis::LeaderboardService;
use guess_data::types::{RawDecoded, RawLogItem};
use guess_data::{
    ContractLog, LogCache, LogFetcher, LogParameter, LogSource, LogsPage, NetworkError, PageParams,
};

pub const ALICE: &str = "0x70997970c51812dc3a010c7d01b50e0d17dc79c8";
pub const BOB: &str = "0x3c44cdddb6a900fa2b585dd299e03d12fa4293bc";
pub const CAROL: &str = "0x90f79bf6eb2c4f870365e785982e1f101e93b906";

/// Explorer stand-in serving a fixed list of pages.
///
/// Page `i` links to page `i + 1` through a cursor whose `items_count` is
/// `i + 1`, so the requested page is recovered from the cursor alone.
pub struct MockSource {
    pages: Vec<LogsPage>,
    requests: AtomicUsize,
    fail_on_page: Mutex<Option<usize>>,
    delay: Duration,
}

impl MockSource {
    /// One page per inner vector, in request order.
    pub fn new(pages: Vec<Vec<RawLogItem>>) -> Self {
        let count = pages.len();
        let pages = pages
            .into_iter()
            .enumerate()
            .map(|(i, items)| LogsPage {
                items,
                next_page_params: (i + 1 < count).then(|| PageParams {
                    block_number: 1,
                    index: 0,
                    items_count: (i + 1) as u64,
                }),
            })
            .collect();

        Self {
            pages,
            requests: AtomicUsize::new(0),
            fail_on_page: Mutex::new(None),
            delay: Duration::ZERO,
        }
    }

    /// Makes every page request take `delay`.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Answers HTTP 503 for the zero-based `page` until [`recover`](Self::recover).
    pub fn fail_on(&self, page: usize) {
        *self.fail_on_page.lock().unwrap() = Some(page);
    }

    pub fn recover(&self) {
        *self.fail_on_page.lock().unwrap() = None;
    }

    /// Page requests served so far, failed ones included.
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

impl LogSource for MockSource {
    async fn fetch_page(&self, cursor: Option<PageParams>) -> Result<LogsPage, NetworkError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let page = cursor.map_or(0, |c| c.items_count as usize);
        let failing = *self.fail_on_page.lock().unwrap();
        if failing == Some(page) {
            return Err(NetworkError::Status {
                status: 503,
                body: "service unavailable".into(),
            });
        }

        Ok(self.pages.get(page).cloned().unwrap_or_default())
    }
}

/// Service over `source` with no page delay.
pub fn test_service(source: MockSource) -> LeaderboardService<MockSource> {
    LeaderboardService::new(LogCache::new(LogFetcher::new(source, Duration::ZERO)))
}

/// Cache over `source` with no page delay.
pub fn test_cache(source: MockSource) -> LogCache<MockSource> {
    LogCache::new(LogFetcher::new(source, Duration::ZERO))
}

fn item(block_number: u64, signature: &str, params: &[(&str, &str)]) -> RawLogItem {
    RawLogItem {
        decoded: Some(RawDecoded {
            method_call: signature.to_string(),
            method_id: "0x00000000".to_string(),
            parameters: params
                .iter()
                .map(|(name, value)| LogParameter {
                    name: (*name).to_string(),
                    value: (*value).to_string(),
                    kind: String::new(),
                    indexed: false,
                })
                .collect(),
        }),
        transaction_hash: format!("0x{:064x}", block_number),
        block_number,
        index: 0,
        topics: Vec::new(),
        data: "0x".to_string(),
    }
}

pub fn guess(guesser: &str, correct: bool, block_number: u64) -> RawLogItem {
    item(
        block_number,
        signatures::GUESS_MADE,
        &[
            ("challengeId", "1"),
            ("guesser", guesser),
            ("guessString", "a fox in the snow"),
            ("isCorrect", if correct { "true" } else { "false" }),
        ],
    )
}

pub fn prize(winner: &str, amount: &str, block_number: u64) -> RawLogItem {
    item(
        block_number,
        signatures::PRIZE_AWARDED,
        &[("challengeId", "1"), ("winner", winner), ("amount", amount)],
    )
}

pub fn created(creator: &str, block_number: u64) -> RawLogItem {
    item(
        block_number,
        signatures::CHALLENGE_CREATED,
        &[
            ("challengeId", "1"),
            ("creator", creator),
            ("imageUrl", "ipfs://bafy"),
            ("initialPrizePool", "1000000000000000000"),
        ],
    )
}

pub fn fee(creator: &str, block_number: u64) -> RawLogItem {
    item(
        block_number,
        signatures::FEE_DISTRIBUTED,
        &[
            ("challengeId", "1"),
            ("creator", creator),
            ("creatorAmount", "80"),
            ("platform", BOB),
            ("platformAmount", "20"),
        ],
    )
}

/// A recognized signature with an arbitrary parameter list.
pub fn raw(signature: &str, block_number: u64, params: &[(&str, &str)]) -> RawLogItem {
    item(block_number, signature, params)
}

/// An entry the explorer could not decode.
pub fn undecoded(block_number: u64) -> RawLogItem {
    RawLogItem {
        decoded: None,
        ..item(block_number, "", &[])
    }
}

/// Decodes raw items the way the fetcher does.
pub fn decoded(items: Vec<RawLogItem>) -> Vec<ContractLog> {
    items
        .into_iter()
        .filter_map(RawLogItem::into_contract_log)
        .collect()
}
