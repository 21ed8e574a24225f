//! The key vault facade.
//!
//! [`KeyVault`] is the only contract callers depend on. It exposes plain strings,
//! booleans and [`SecretsError`]; backend response types stay behind the
//! [`KeyVaultClient`] seam.

use async_trait::async_trait;

use super::client::KeyVaultClient;
use super::context::OperationContext;
use super::error::{is_secret_not_found, Result, SecretsError};
use super::types::{string_value_for, SetSecretParameters};

/// Version token meaning "the latest version".
const LATEST_VERSION: &str = "";

/// Store, read and delete named secrets.
///
/// A secret that does not exist is a normal outcome, reported as `None` from
/// [`read_secret`](KeyVault::read_secret) and `false` from
/// [`delete_secret`](KeyVault::delete_secret). `Err` is reserved for failures.
/// Implementations never retry and never log; `ctx` is forwarded to the
/// backend unchanged.
#[async_trait]
pub trait KeyVault: Send + Sync {
    /// Create `name` with `value`, or overwrite its current value.
    ///
    /// # Errors
    ///
    /// [`SecretsError::Store`] wrapping the backend failure.
    async fn store_secret(&self, ctx: &OperationContext, name: &str, value: &str) -> Result<()>;

    /// Read the latest value of `name`.
    ///
    /// Returns `Ok(None)` when the backend reports the secret as not found. A
    /// record without a value reads as `Some("")`.
    ///
    /// # Errors
    ///
    /// [`SecretsError::Read`] for any backend failure other than not-found.
    async fn read_secret(&self, ctx: &OperationContext, name: &str) -> Result<Option<String>>;

    /// Delete `name`, returning whether it existed.
    ///
    /// Deleting an absent secret returns `Ok(false)`.
    ///
    /// # Errors
    ///
    /// [`SecretsError::Delete`] for any backend failure other than not-found.
    async fn delete_secret(&self, ctx: &OperationContext, name: &str) -> Result<bool>;
}

/// [`KeyVault`] backed by a remote key-vault client.
///
/// Stateless apart from the client handle, so it can be shared freely across
/// tasks (wrap it in an `Arc`).
#[derive(Debug, Clone)]
pub struct RemoteKeyVault<C> {
    client: C,
}

impl<C: KeyVaultClient> RemoteKeyVault<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    /// The underlying backend client.
    pub fn client(&self) -> &C {
        &self.client
    }
}

#[async_trait]
impl<C: KeyVaultClient> KeyVault for RemoteKeyVault<C> {
    async fn store_secret(&self, ctx: &OperationContext, name: &str, value: &str) -> Result<()> {
        self.client
            .set_secret(ctx, name, SetSecretParameters::with_value(value), None)
            .await
            .map_err(SecretsError::store)?;
        Ok(())
    }

    async fn read_secret(&self, ctx: &OperationContext, name: &str) -> Result<Option<String>> {
        match self.client.get_secret(ctx, name, LATEST_VERSION, None).await {
            Ok(response) => Ok(Some(string_value_for(response.secret.value.as_deref()))),
            Err(err) if is_secret_not_found(err.as_ref()) => Ok(None),
            Err(err) => Err(SecretsError::read(err)),
        }
    }

    async fn delete_secret(&self, ctx: &OperationContext, name: &str) -> Result<bool> {
        match self.client.delete_secret(ctx, name, None).await {
            Ok(_) => Ok(true),
            Err(err) if is_secret_not_found(err.as_ref()) => Ok(false),
            Err(err) => Err(SecretsError::delete(err)),
        }
    }
}
