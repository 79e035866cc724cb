//! Liquidity error types.
//!
//! Too little history is not an error: it is reported as an unavailable
//! field. These variants are caller mistakes only.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LiquidityError {
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    #[error("History not ordered by time: {0}")]
    UnorderedHistory(String),
}

pub type LiquidityResult<T> = Result<T, LiquidityError>;
