//! # Database Connection Pool Management
//!
//! Opens the PostgreSQL pool and verifies connectivity before returning it.

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};

use super::config::{parse_db_configuration, postgres_connection_string, DbConfig};
use crate::config::ConfigReader;
use crate::errors::{Error, Result};
use crate::observability::Logger;

/// Type alias for the database connection pool
pub type DbPool = Pool<Postgres>;

const MAX_CONNECTIONS: u32 = 10;
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// A verified database handle.
#[derive(Debug, Clone)]
pub struct Database {
    pool: DbPool,
}

impl Database {
    /// Wrap an existing pool without verifying it.
    pub fn from_pool(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    pub fn into_pool(self) -> DbPool {
        self.pool
    }
}

/// Open a pool for `config` and check that the server answers.
///
/// # Errors
///
/// - [`Error::DatabaseOpen`] if the connection string is rejected
/// - [`Error::DatabaseVerify`] if the connectivity check fails
pub async fn connect_postgres(logger: &dyn Logger, config: &DbConfig) -> Result<Database> {
    let pool = PgPoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .acquire_timeout(CONNECT_TIMEOUT)
        .connect_lazy(&postgres_connection_string(config))
        .map_err(Error::DatabaseOpen)?;

    sqlx::query("SELECT 1").execute(&pool).await.map_err(|e| {
        tracing::error!(error = %e, host = %config.host, "Failed to verify database connection");
        Error::DatabaseVerify(e)
    })?;

    logger.infof(format_args!("connected to postgres server at {}", config.host));
    Ok(Database::from_pool(pool))
}

/// Read database settings from `reader`, then [`connect_postgres`].
pub async fn connect_database(logger: &dyn Logger, reader: &dyn ConfigReader) -> Result<Database> {
    let config = parse_db_configuration(logger, reader).map_err(Error::DatabaseConfig)?;
    connect_postgres(logger, &config).await
}
