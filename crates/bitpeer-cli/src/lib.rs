//! bitpeer application.
//!
//! Wires the library crates into a batch pipeline:
//! - `process`: raw fetch records → normalized offers
//! - `analyze`: offers → execution, liquidity and combo metrics
//! - `doctor`: print the effective configuration

pub mod config;
pub mod error;
pub mod pipeline;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use pipeline::{analyze_day, process_day, AnalyzeSummary, ProcessSummary};
