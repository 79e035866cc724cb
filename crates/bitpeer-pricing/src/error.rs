//! Pricing error types.
//!
//! Market-data outcomes (nothing executable, partial fills, infeasible
//! combos) are values, not errors. Only caller mistakes end up here.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PricingError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Combo leg direction mismatch: {0}")]
    LegDirection(String),
}

pub type PricingResult<T> = Result<T, PricingError>;
