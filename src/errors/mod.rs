//! # Error Handling
//!
//! Crate-level error type for the database bootstrap, plus transparent
//! wrappers around the configuration and secret-store errors so that
//! application code can use a single `Result`.

use crate::config::ConfigError;
use crate::secrets::SecretsError;

/// Custom result type for crate operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Database settings could not be read
    #[error("problem parsing db configuration: {0}")]
    DatabaseConfig(#[source] ConfigError),

    /// The connection pool could not be created
    #[error("problem opening Postgres connection: {0}")]
    DatabaseOpen(#[source] sqlx::Error),

    /// The database did not answer the connectivity check
    #[error("problem verifying Postgres connection: {0}")]
    DatabaseVerify(#[source] sqlx::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Secrets(#[from] SecretsError),
}

impl Error {
    /// Whether the error came from the database bootstrap.
    pub fn is_database(&self) -> bool {
        matches!(self, Self::DatabaseConfig(_) | Self::DatabaseOpen(_) | Self::DatabaseVerify(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_database_config_message() {
        let err = Error::DatabaseConfig(ConfigError::missing("DB_USER"));
        assert_eq!(
            err.to_string(),
            "problem parsing db configuration: missing required environment variable: DB_USER"
        );
        assert!(err.is_database());
        assert!(err.source().is_some());
    }

    #[test]
    fn test_transparent_wrappers() {
        let err: Error = SecretsError::config("the uri cannot be empty").into();
        assert_eq!(err.to_string(), "the uri cannot be empty");
        assert!(!err.is_database());

        let err: Error = ConfigError::invalid("LOG_FORMAT", "unknown format").into();
        assert_eq!(err.to_string(), "invalid value for LOG_FORMAT: unknown format");
    }

    #[test]
    fn test_database_open_message() {
        let err = Error::DatabaseOpen(sqlx::Error::PoolTimedOut);
        assert!(err.to_string().starts_with("problem opening Postgres connection: "));
    }
}
