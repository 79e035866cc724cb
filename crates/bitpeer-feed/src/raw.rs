//! Raw fetch records as written by the collector.

use bitpeer_core::OfferSide;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const RAW_FORMAT_VERSION: &str = "rawfetch-v1";

fn default_format_version() -> String {
    RAW_FORMAT_VERSION.to_string()
}

fn default_asset() -> String {
    "USDT".to_string()
}

/// One HTTP exchange with the marketplace, stored verbatim.
///
/// The response body is kept as text so that parsing can be replayed with
/// newer normalizer rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawFetchRecord {
    #[serde(default = "default_format_version")]
    pub format_version: String,
    pub ts_utc: DateTime<Utc>,
    /// Configured market name (e.g. `rub_sell`).
    pub market: String,
    #[serde(default = "default_asset")]
    pub asset: String,
    pub fiat: String,
    pub side: OfferSide,
    pub page: u32,
    #[serde(default)]
    pub request_url: String,
    #[serde(default)]
    pub request_method: String,
    #[serde(default)]
    pub request_headers: BTreeMap<String, String>,
    #[serde(default)]
    pub request_body: serde_json::Value,
    #[serde(default)]
    pub http_status: Option<u16>,
    #[serde(default)]
    pub response_text: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl RawFetchRecord {
    /// Whether the fetch produced a body worth parsing.
    pub fn is_success(&self) -> bool {
        self.error.is_none()
            && self.response_text.as_deref().is_some_and(|t| !t.trim().is_empty())
            && self.http_status.map_or(true, |s| (200..300).contains(&s))
    }
}
