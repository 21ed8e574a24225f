//! # Elliot
//!
//! Secret storage over remote key-vault backends, together with the
//! configuration, logging and database bootstrap it runs alongside.
//!
//! ## Architecture
//!
//! ```text
//! caller → KeyVault facade → KeyVaultClient adapter → Azure Key Vault / HashiCorp Vault / memory
//!              ↓
//!   not-found → Ok(None) / Ok(false)
//! ```
//!
//! ## Core Components
//!
//! - **Secrets** ([`secrets`]): store, read and delete named secrets; a missing
//!   secret is a normal outcome, never an error
//! - **Configuration** ([`config`]): key-by-key readers over the environment
//!   (with `.env` support) or an in-memory map
//! - **Observability** ([`observability`]): `tracing` subscriber setup and the
//!   leveled [`Logger`](observability::Logger) capability
//! - **Storage** ([`storage`]): PostgreSQL pool bootstrap via SQLx
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use elliot::config::{EnvConfig, LoggingConfig};
//! use elliot::observability::init_logging;
//! use elliot::secrets::{build_key_vault, KeyVaultSettings, OperationContext};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let reader = EnvConfig::load();
//!     init_logging(&LoggingConfig::from_reader(&reader)?)?;
//!
//!     let vault = build_key_vault(&KeyVaultSettings::from_reader(&reader)?, &reader).await?;
//!     let ctx = OperationContext::background();
//!     if vault.read_secret(&ctx, "api-key").await?.is_none() {
//!         vault.store_secret(&ctx, "api-key", "generated").await?;
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod errors;
pub mod observability;
pub mod secrets;
pub mod storage;

// Re-export commonly used types and traits
pub use config::{ConfigReader, EnvConfig, MapConfig};
pub use errors::{Error, Result};
pub use secrets::{KeyVault, KeyVaultClient, OperationContext, RemoteKeyVault, SecretsError};

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
