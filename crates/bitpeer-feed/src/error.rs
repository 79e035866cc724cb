//! Feed error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Fetch failed for {market} page {page}: {reason}")]
    FetchFailed {
        market: String,
        page: u32,
        reason: String,
    },

    #[error("Unsupported raw format version: {0}")]
    UnsupportedFormat(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type FeedResult<T> = Result<T, FeedError>;
