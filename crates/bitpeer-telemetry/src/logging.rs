//! Structured logging initialization.

use crate::error::{TelemetryError, TelemetryResult};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "info,bitpeer=debug";

/// Initialize structured logging with [`DEFAULT_FILTER`].
///
/// JSON output when `RUST_ENV=production`, pretty output otherwise.
/// Fails with [`TelemetryError::LoggingInit`] if a global subscriber is
/// already installed.
pub fn init_logging() -> TelemetryResult<()> {
    init_logging_with_default(DEFAULT_FILTER)
}

/// Initialize structured logging, falling back to `default_filter` when
/// `RUST_LOG` is unset or invalid.
pub fn init_logging_with_default(default_filter: &str) -> TelemetryResult<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let is_production = std::env::var("RUST_ENV")
        .map(|v| v == "production")
        .unwrap_or(false);

    let result = if is_production {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(true),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().pretty().with_target(true))
            .try_init()
    };

    result.map_err(|e| TelemetryError::LoggingInit(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_an_error() {
        // The first call may lose to another test's subscriber; either way the
        // second one must fail without panicking.
        let _ = init_logging();
        assert!(matches!(init_logging(), Err(TelemetryError::LoggingInit(_))));
    }
}
