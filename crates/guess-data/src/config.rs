//! Explorer connection settings.

use std::time::Duration;

/// Flow EVM testnet Blockscout API root.
pub const DEFAULT_EXPLORER_URL: &str = "https://evm-testnet.flowscan.io/api/v2";

/// Deployed game contract whose logs are aggregated.
pub const DEFAULT_CONTRACT_ADDRESS: &str = "0x3300a0e41F13117788Cfb1D9C215d10890c623d9";

/// Pause between consecutive page requests.
pub const DEFAULT_PAGE_DELAY: Duration = Duration::from_millis(200);

/// Upper bound for a single page request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Retries per page after the first attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// Validity window of a cached log set (5 minutes).
pub const CACHE_TTL: Duration = Duration::from_millis(300_000);

/// Settings for talking to the block explorer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExplorerConfig {
    /// API root, without trailing slash (e.g. `https://host/api/v2`).
    pub base_url: String,
    /// Contract whose logs are listed.
    pub contract_address: String,
    /// Politeness delay between page requests.
    pub page_delay: Duration,
    /// Per-request timeout.
    pub request_timeout: Duration,
    /// Retries per page for transient failures.
    pub max_retries: u32,
    /// Cache validity window.
    pub cache_ttl: Duration,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_EXPLORER_URL.to_string(),
            contract_address: DEFAULT_CONTRACT_ADDRESS.to_string(),
            page_delay: DEFAULT_PAGE_DELAY,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
            cache_ttl: CACHE_TTL,
        }
    }
}

impl ExplorerConfig {
    /// Full URL of the log listing endpoint for the configured contract.
    pub fn logs_url(&self) -> String {
        format!(
            "{}/addresses/{}/logs",
            self.base_url.trim_end_matches('/'),
            self.contract_address
        )
    }
}
