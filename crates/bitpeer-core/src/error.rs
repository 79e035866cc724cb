//! Error types for bitpeer-core.

use thiserror::Error;

/// Reason an offer was rejected during construction.
///
/// Malformed offers are excluded from computation and counted; they never
/// abort the analysis of the snapshot they came from.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedOffer {
    #[error("unit price must be positive, got {0}")]
    NonPositivePrice(String),

    #[error("min fiat amount must be positive, got {0}")]
    NonPositiveMin(String),

    #[error("min fiat amount {min} exceeds max fiat amount {max}")]
    MinExceedsMax { min: String, max: String },

    #[error("missing field: {0}")]
    MissingField(&'static str),

    #[error("invalid number in field {field}: {value}")]
    InvalidNumber { field: &'static str, value: String },
}

/// Core error types.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Malformed offer: {0}")]
    MalformedOffer(#[from] MalformedOffer),

    /// Hard precondition violation on a trade intent. This is a caller bug,
    /// never a market-data outcome.
    #[error("Invalid trade intent: {0}")]
    InvalidIntent(String),

    #[error("Decimal parse error: {0}")]
    DecimalParse(#[from] rust_decimal::Error),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
