//! Secret storage over remote key-vault backends.
//!
//! # Architecture
//!
//! Two layers, leaves first:
//!
//! - [`KeyVaultClient`]: the backend adapter. Three remote operations
//!   (set/get/delete a named secret record) returning provider-shaped
//!   responses and type-erased errors.
//! - [`KeyVault`]: the facade callers depend on. It wraps one adapter
//!   ([`RemoteKeyVault`]), classifies "not found" responses and normalizes
//!   results into `Option` / `bool`.
//!
//! A missing secret is never an error: `read_secret` returns `Ok(None)` and
//! `delete_secret` returns `Ok(false)` when the backend answers with status
//! 404. Everything else (authorization failures, server errors, transport
//! failures, cancellation) is returned as a [`SecretsError`] whose message is
//! prefixed with the failing operation.
//!
//! # Supported Backends
//!
//! - **Azure Key Vault**: REST API over `reqwest` ([`AzureKeyVaultClient`])
//! - **HashiCorp Vault**: KV v2 engine over `vaultrs` ([`HashiCorpVaultClient`])
//! - **In-memory**: development and tests ([`InMemoryKeyVaultClient`])
//!
//! # Example
//!
//! ```rust,no_run
//! use elliot::config::EnvConfig;
//! use elliot::secrets::{build_key_vault, KeyVaultSettings, OperationContext};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let reader = EnvConfig::load();
//! let settings = KeyVaultSettings::from_reader(&reader)?;
//! let vault = build_key_vault(&settings, &reader).await?;
//!
//! let ctx = OperationContext::background().with_timeout(Duration::from_secs(5));
//! vault.store_secret(&ctx, "db-password", "s3cr3t").await?;
//!
//! match vault.read_secret(&ctx, "db-password").await? {
//!     Some(value) => println!("read {} bytes", value.len()),
//!     None => println!("no such secret"),
//! }
//!
//! let existed = vault.delete_secret(&ctx, "db-password").await?;
//! # let _ = existed;
//! # Ok(())
//! # }
//! ```

pub mod azure;
pub mod client;
pub mod context;
pub mod credential;
pub mod error;
pub mod key_vault;
pub mod memory;
pub mod settings;
pub mod types;
pub mod vault;

pub use azure::AzureKeyVaultClient;
pub use client::KeyVaultClient;
pub use context::OperationContext;
pub use credential::{
    default_credential, AccessToken, ClientSecretCredential, StaticTokenCredential,
    TokenCredential,
};
pub use error::{
    is_secret_not_found, BoxError, ContextError, ResponseError, Result, SecretsError,
    TokenRequestError,
};
pub use key_vault::{KeyVault, RemoteKeyVault};
pub use memory::InMemoryKeyVaultClient;
pub use settings::{build_key_vault, KeyVaultBackend, KeyVaultSettings};
pub use types::{
    string_value_for, DeleteSecretResponse, DeletedSecretBundle, GetSecretResponse,
    RequestOptions, SecretAttributes, SecretBundle, SecretString, SetSecretParameters,
    SetSecretResponse,
};
pub use vault::{HashiCorpVaultClient, VaultConfig};
