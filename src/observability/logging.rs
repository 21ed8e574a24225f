//! # Structured Logging
//!
//! Installs the global `tracing` subscriber.
//!
//! Output is either one JSON object per line (the default, for log shippers)
//! or the human-readable pretty format. Timestamps are UTC with millisecond
//! precision and every entry carries its source file and line.
//!
//! `RUST_LOG`, when set, takes precedence over the configured level.

use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::{ConfigError, LogFormat, LoggingConfig};

/// Timestamp layout used in every log entry.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Build the level filter, preferring `RUST_LOG` over the configured level.
pub fn env_filter(config: &LoggingConfig) -> Result<EnvFilter, ConfigError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(&config.level).map_err(|e| ConfigError::invalid("LOG_LEVEL", e.to_string()))
}

/// Install the global subscriber.
///
/// Returns `Ok(false)` when a subscriber was already installed (for example
/// by a test harness); that is not treated as an error.
pub fn init_logging(config: &LoggingConfig) -> Result<bool, ConfigError> {
    let filter = env_filter(config)?;
    let timer = ChronoUtc::new(TIMESTAMP_FORMAT.to_string());

    let installed = match config.format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_timer(timer)
                    .with_file(true)
                    .with_line_number(true)
                    .with_current_span(false),
            )
            .try_init()
            .is_ok(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_timer(timer)
                    .with_file(true)
                    .with_line_number(true),
            )
            .try_init()
            .is_ok(),
    };

    if installed {
        tracing::info!(level = %config.level, format = %config.format, "Logging initialized");
    }
    Ok(installed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_level_is_rejected() {
        if std::env::var("RUST_LOG").is_ok() {
            return;
        }
        let config = LoggingConfig { level: "elliot=verbose".to_string(), ..LoggingConfig::default() };
        let err = env_filter(&config).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref key, .. } if key == "LOG_LEVEL"));
    }

    #[test]
    fn test_init_logging_twice_is_tolerated() {
        let config = LoggingConfig::default();
        // The first call may lose to a subscriber another test installed.
        let _ = init_logging(&config).unwrap();
        let second = init_logging(&config).unwrap();
        assert!(!second);
    }
}
