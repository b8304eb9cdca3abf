//! guess-data crate
//!
//! Block-explorer ingestion for the prompt-guessing game contract:
//! wire types, the paginated log fetcher and the TTL log cache.

pub mod blockscout;
pub mod cache;
pub mod config;
pub mod error;
pub mod types;

pub use blockscout::{BlockscoutClient, LogFetcher, LogSource};
pub use cache::{CacheStatus, LogCache};
pub use config::ExplorerConfig;
pub use error::NetworkError;
pub use types::{ContractLog, LogParameter, LogsPage, PageParams};
