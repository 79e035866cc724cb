//! Prometheus metrics and structured logging for bitpeer.
//!
//! - Structured logging with tracing (JSON in production, pretty otherwise)
//! - Prometheus counters and gauges for the analysis pipeline

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::{init_logging, init_logging_with_default};
pub use metrics::Metrics;
