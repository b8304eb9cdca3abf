//! Type definitions for block-explorer log data.
//!
//! The `Raw*` structs mirror the Blockscout `/addresses/{addr}/logs` JSON
//! payload. [`ContractLog`] is the decoded, owned form the rest of the
//! workspace consumes.

use serde::{Deserialize, Serialize};

/// Pagination cursor returned by the explorer as `next_page_params`.
///
/// Sent back verbatim as query parameters to request the following page.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageParams {
    /// Block number of the last item on the previous page.
    pub block_number: u64,
    /// Log index of the last item on the previous page.
    pub index: u64,
    /// Number of items returned so far.
    pub items_count: u64,
}

/// One decoded event argument.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogParameter {
    /// Argument name from the event ABI (e.g. `"winner"`).
    pub name: String,
    /// Argument value: decimal integer, hex address, or raw string.
    pub value: String,
    /// Solidity type (e.g. `"uint256"`).
    #[serde(rename = "type")]
    pub kind: String,
    /// Whether the argument is an indexed topic.
    #[serde(default)]
    pub indexed: bool,
}

/// Explorer-side decoding of a log entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawDecoded {
    /// Canonical event signature, e.g.
    /// `"GuessMade(uint256 indexed challengeId, ...)"`.
    #[serde(default)]
    pub method_call: String,
    /// Topic0 selector (hex).
    #[serde(default)]
    pub method_id: String,
    /// Named arguments in ABI order.
    #[serde(default)]
    pub parameters: Vec<LogParameter>,
}

/// A single log item as returned by the explorer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawLogItem {
    /// Present only when the explorer matched the log to a known ABI.
    #[serde(default)]
    pub decoded: Option<RawDecoded>,
    /// Emitting transaction hash.
    pub transaction_hash: String,
    /// Block containing the log.
    pub block_number: u64,
    /// Log index within the block.
    pub index: u64,
    /// Raw topics, `null` for unused slots.
    #[serde(default)]
    pub topics: Vec<Option<String>>,
    /// Raw non-indexed data (hex).
    #[serde(default)]
    pub data: String,
}

/// One page of the explorer log listing.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogsPage {
    /// Log items on this page, newest first.
    #[serde(default)]
    pub items: Vec<RawLogItem>,
    /// Cursor for the next page; absent on the last page.
    #[serde(default)]
    pub next_page_params: Option<PageParams>,
}

/// A decoded contract event emission.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractLog {
    /// Emitting transaction hash.
    pub transaction_hash: String,
    /// Block containing the log.
    pub block_number: u64,
    /// Log index within the block.
    pub log_index: u64,
    /// Canonical event signature used as the dispatch discriminant.
    pub method_signature: String,
    /// Topic0 selector (hex).
    pub method_id: String,
    /// Decoded arguments in ABI order.
    pub parameters: Vec<LogParameter>,
}

impl ContractLog {
    /// Returns the value of the first parameter named `name`.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.parameters
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.value.as_str())
    }
}

impl RawLogItem {
    /// Converts into a [`ContractLog`], or `None` when the explorer could
    /// not decode the entry.
    pub fn into_contract_log(self) -> Option<ContractLog> {
        let decoded = self.decoded?;
        if decoded.method_call.is_empty() {
            return None;
        }

        Some(ContractLog {
            transaction_hash: self.transaction_hash,
            block_number: self.block_number,
            log_index: self.index,
            method_signature: decoded.method_call,
            method_id: decoded.method_id,
            parameters: decoded.parameters,
        })
    }
}

impl LogsPage {
    /// Drains the page into its decoded entries, preserving order.
    pub fn into_decoded(self) -> (Vec<ContractLog>, Option<PageParams>) {
        let logs = self
            .items
            .into_iter()
            .filter_map(RawLogItem::into_contract_log)
            .collect();
        (logs, self.next_page_params)
    }
}
