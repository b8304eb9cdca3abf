//! Error type for explorer requests.

use std::time::Duration;

/// Failure to retrieve the contract log listing.
///
/// Any variant aborts the whole multi-page fetch.
#[derive(Debug, thiserror::Error)]
pub enum NetworkError {
    /// Transport-level failure (connect, TLS, body read).
    #[error("transport: {0}")]
    Transport(#[from] reqwest::Error),
    /// The request did not complete within the configured timeout.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    /// The explorer answered with a non-success status.
    #[error("explorer returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, possibly empty.
        body: String,
    },
    /// The response body was not a valid log page.
    #[error("decode log page: {0}")]
    Decode(#[from] serde_json::Error),
    /// The configured explorer URL could not be parsed.
    #[error("invalid explorer url: {0}")]
    InvalidUrl(String),
}

impl NetworkError {
    /// Whether a retry of the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Timeout(_) => true,
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            Self::Decode(_) | Self::InvalidUrl(_) => false,
        }
    }
}
