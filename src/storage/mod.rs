//! # Storage and Persistence
//!
//! PostgreSQL bootstrap: read connection settings from configuration, open a
//! pool and verify that the server answers before handing the pool out.
//!
//! ```rust,no_run
//! use elliot::config::EnvConfig;
//! use elliot::observability::TracingLogger;
//! use elliot::storage::connect_database;
//!
//! # async fn example() -> elliot::Result<()> {
//! let logger = TracingLogger::new("persistence");
//! let database = connect_database(&logger, &EnvConfig::load()).await?;
//! let pool = database.pool();
//! # let _ = pool;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod pool;

pub use config::{parse_db_configuration, postgres_connection_string, DbConfig};
pub use pool::{connect_database, connect_postgres, Database, DbPool};
