//! Application error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Core error: {0}")]
    Core(#[from] bitpeer_core::CoreError),

    #[error("Feed error: {0}")]
    Feed(#[from] bitpeer_feed::FeedError),

    #[error("Pricing error: {0}")]
    Pricing(#[from] bitpeer_pricing::PricingError),

    #[error("Liquidity error: {0}")]
    Liquidity(#[from] bitpeer_liquidity::LiquidityError),

    #[error("Telemetry error: {0}")]
    Telemetry(#[from] bitpeer_telemetry::TelemetryError),

    #[error("Persistence error: {0}")]
    Persistence(#[from] bitpeer_persistence::PersistenceError),

    #[error("Worker task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AppResult<T> = Result<T, AppError>;
