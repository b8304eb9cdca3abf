//! # Blockscout Log Fetcher
//!
//! Pages through the Blockscout `/addresses/{contract}/logs` endpoint and
//! collects every entry the explorer managed to decode against the game ABI.
//!
//! ## Pagination
//!
//! Each response carries an optional `next_page_params` cursor which is sent
//! back as query parameters. Pages are requested strictly one after another
//! since every cursor depends on the previous response. A short delay is
//! inserted between pages (never after the last one) to stay under the
//! explorer's rate limits.
//!
//! A failure on any page aborts the fetch; pages already received in that
//! attempt are dropped.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, error, info};

use crate::config::ExplorerConfig;
use crate::error::NetworkError;
use crate::types::{ContractLog, LogsPage, PageParams};

/// Base backoff between retries of the same page; doubled per attempt.
const RETRY_BACKOFF_MS: u64 = 500;

/// Source of paginated contract logs.
///
/// Implemented by [`BlockscoutClient`] for the real explorer; tests plug in
/// scripted sources.
pub trait LogSource: Send + Sync {
    /// Fetches the page at `cursor` (`None` for the first page).
    fn fetch_page(
        &self,
        cursor: Option<PageParams>,
    ) -> impl Future<Output = Result<LogsPage, NetworkError>> + Send;
}

/// HTTP client for a Blockscout v2 API.
#[derive(Clone, Debug)]
pub struct BlockscoutClient {
    client: reqwest::Client,
    logs_url: reqwest::Url,
    request_timeout: Duration,
    max_retries: u32,
}

impl BlockscoutClient {
    /// Builds a client for the contract and explorer in `config`.
    ///
    /// # Errors
    /// Returns [`NetworkError::InvalidUrl`] if the logs URL does not parse,
    /// or [`NetworkError::Transport`] if the HTTP client cannot be built.
    pub fn new(config: &ExplorerConfig) -> Result<Self, NetworkError> {
        let logs_url = config.logs_url();
        let logs_url = reqwest::Url::parse(&logs_url)
            .map_err(|e| NetworkError::InvalidUrl(format!("{logs_url}: {e}")))?;

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            client,
            logs_url,
            request_timeout: config.request_timeout,
            max_retries: config.max_retries,
        })
    }

    /// Endpoint this client pages through.
    pub fn logs_url(&self) -> &reqwest::Url {
        &self.logs_url
    }

    async fn fetch_page_once(&self, cursor: Option<PageParams>) -> Result<LogsPage, NetworkError> {
        let mut request = self.client.get(self.logs_url.clone());
        if let Some(cursor) = cursor {
            request = request.query(&cursor);
        }

        let response = request.send().await.map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NetworkError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await.map_err(|e| self.classify(e))?;
        Ok(serde_json::from_str(&body)?)
    }

    fn classify(&self, err: reqwest::Error) -> NetworkError {
        if err.is_timeout() {
            NetworkError::Timeout(self.request_timeout)
        } else {
            NetworkError::Transport(err)
        }
    }
}

impl LogSource for BlockscoutClient {
    async fn fetch_page(&self, cursor: Option<PageParams>) -> Result<LogsPage, NetworkError> {
        let mut attempt = 0u32;
        loop {
            match self.fetch_page_once(cursor).await {
                Ok(page) => return Ok(page),
                Err(e) if attempt < self.max_retries && e.is_retryable() => {
                    let backoff_ms = RETRY_BACKOFF_MS * 2_u64.pow(attempt);
                    debug!(
                        attempt = attempt + 1,
                        backoff_ms,
                        error = %e,
                        "retrying log page request"
                    );
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Walks every page of a [`LogSource`] in order.
#[derive(Debug)]
pub struct LogFetcher<S> {
    source: S,
    page_delay: Duration,
}

impl<S: LogSource> LogFetcher<S> {
    /// Creates a fetcher that sleeps `page_delay` between pages.
    pub fn new(source: S, page_delay: Duration) -> Self {
        Self { source, page_delay }
    }

    /// The underlying page source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Fetches all pages and returns their decoded logs in request order.
    ///
    /// Undecoded entries are dropped. Dropping the returned future between
    /// pages cancels the fetch without side effects.
    ///
    /// # Errors
    /// Returns the first [`NetworkError`] hit on any page.
    #[tracing::instrument(skip_all)]
    pub async fn fetch_all_logs(&self) -> Result<Vec<ContractLog>, NetworkError> {
        info!("fetching fresh logs from explorer");

        let mut all_logs = Vec::new();
        let mut cursor: Option<PageParams> = None;
        let mut page_count = 0usize;

        loop {
            let page = match self.source.fetch_page(cursor).await {
                Ok(page) => page,
                Err(e) => {
                    error!(page = page_count + 1, error = %e, "failed to fetch log page");
                    return Err(e);
                }
            };

            let (logs, next) = page.into_decoded();
            page_count += 1;
            debug!(page = page_count, decoded = logs.len(), "fetched log page");
            all_logs.extend(logs);

            match next {
                Some(next) => {
                    cursor = Some(next);
                    if !self.page_delay.is_zero() {
                        tokio::time::sleep(self.page_delay).await;
                    }
                }
                None => break,
            }
        }

        info!(
            total_logs = all_logs.len(),
            pages = page_count,
            "log fetch complete"
        );

        Ok(all_logs)
    }
}
