//! # Configuration Management
//!
//! Configuration is read one key at a time through the [`ConfigReader`] trait.
//! [`EnvConfig`] reads the process environment (after loading an optional
//! `.env` file); [`MapConfig`] is an in-memory reader for tests and embedding.
//!
//! Readers never fail: an unset key reads as the empty string, and each
//! consumer decides whether that means "use the default" or "missing".

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Result type for configuration parsing.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors produced while turning raw configuration values into settings.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required key was unset or empty
    #[error("missing required environment variable: {0}")]
    MissingRequired(String),

    /// A key was set to a value that could not be parsed
    #[error("invalid value for {key}: {reason}")]
    Invalid { key: String, reason: String },
}

impl ConfigError {
    pub fn missing(key: impl Into<String>) -> Self {
        Self::MissingRequired(key.into())
    }

    pub fn invalid(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid { key: key.into(), reason: reason.into() }
    }
}

/// Source of string configuration values.
pub trait ConfigReader: Send + Sync {
    /// The value of `key`, or an empty string when unset.
    fn string(&self, key: &str) -> String;

    /// The value of `key`, or `default` when unset or empty.
    fn string_or(&self, key: &str, default: &str) -> String {
        let value = self.string(key);
        if value.is_empty() {
            default.to_string()
        } else {
            value
        }
    }

    /// The value of `key`, failing when unset or empty.
    fn required(&self, key: &str) -> Result<String> {
        let value = self.string(key);
        if value.is_empty() {
            Err(ConfigError::missing(key))
        } else {
            Ok(value)
        }
    }
}

/// Reads configuration from process environment variables.
#[derive(Debug, Clone, Default)]
pub struct EnvConfig;

impl EnvConfig {
    /// Load `.env` from the working directory (if present) into the process
    /// environment, then read from the environment.
    ///
    /// Variables already set in the environment take precedence over `.env`.
    pub fn load() -> Self {
        match dotenvy::dotenv() {
            Ok(path) => tracing::debug!(path = %path.display(), "Loaded .env file"),
            Err(e) if e.not_found() => {}
            Err(e) => tracing::warn!(error = %e, "Failed to load .env file"),
        }
        Self
    }
}

impl ConfigReader for EnvConfig {
    fn string(&self, key: &str) -> String {
        std::env::var(key).unwrap_or_default()
    }
}

/// In-memory configuration.
#[derive(Debug, Clone, Default)]
pub struct MapConfig {
    values: HashMap<String, String>,
}

impl MapConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }
}

impl<K, V> FromIterator<(K, V)> for MapConfig
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self { values: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect() }
    }
}

impl ConfigReader for MapConfig {
    fn string(&self, key: &str) -> String {
        self.values.get(key).cloned().unwrap_or_default()
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// One JSON object per line
    #[default]
    Json,
    /// Human-readable multi-line output
    Pretty,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Pretty => "pretty",
        }
    }
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" | "text" => Ok(Self::Pretty),
            other => Err(ConfigError::invalid(
                "LOG_FORMAT",
                format!("unknown format '{}', expected json or pretty", other),
            )),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive, e.g. `info` or `elliot=debug,sqlx=warn`
    pub level: String,

    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), format: LogFormat::default() }
    }
}

impl LoggingConfig {
    /// Read `LOG_LEVEL` and `LOG_FORMAT`, falling back to the defaults.
    pub fn from_reader(reader: &dyn ConfigReader) -> Result<Self> {
        let defaults = Self::default();
        let level = reader.string_or("LOG_LEVEL", &defaults.level);
        let format = match reader.string("LOG_FORMAT").as_str() {
            "" => defaults.format,
            raw => raw.parse()?,
        };
        Ok(Self { level, format })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_config_reads_empty_for_unset() {
        let config = MapConfig::new().with("DB_HOST", "somehost.com");
        assert_eq!(config.string("DB_HOST"), "somehost.com");
        assert_eq!(config.string("DB_PORT"), "");
        assert_eq!(config.string_or("DB_PORT", "5432"), "5432");
    }

    #[test]
    fn test_required_treats_empty_as_missing() {
        let config: MapConfig = [("DB_USER", "")].into_iter().collect();
        let err = config.required("DB_USER").unwrap_err();
        assert_eq!(err, ConfigError::MissingRequired("DB_USER".to_string()));
        assert_eq!(err.to_string(), "missing required environment variable: DB_USER");
    }

    #[test]
    fn test_logging_config_defaults() {
        let config = LoggingConfig::from_reader(&MapConfig::new()).unwrap();
        assert_eq!(config, LoggingConfig::default());
        assert_eq!(config.level, "info");
        assert_eq!(config.format, LogFormat::Json);
    }

    #[test]
    fn test_logging_config_from_reader() {
        let reader = MapConfig::new().with("LOG_LEVEL", "debug").with("LOG_FORMAT", "Pretty");
        let config = LoggingConfig::from_reader(&reader).unwrap();
        assert_eq!(config.level, "debug");
        assert_eq!(config.format, LogFormat::Pretty);
    }

    #[test]
    fn test_invalid_log_format() {
        let reader = MapConfig::new().with("LOG_FORMAT", "xml");
        let err = LoggingConfig::from_reader(&reader).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref key, .. } if key == "LOG_FORMAT"));
    }

    #[test]
    fn test_log_format_round_trips_through_str() {
        for format in [LogFormat::Json, LogFormat::Pretty] {
            assert_eq!(format.to_string().parse::<LogFormat>().unwrap(), format);
        }
    }
}
