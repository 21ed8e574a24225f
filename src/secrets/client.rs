//! Backend adapter trait.

use std::sync::Arc;

use async_trait::async_trait;

use super::context::OperationContext;
use super::error::BoxError;
use super::types::{
    DeleteSecretResponse, GetSecretResponse, RequestOptions, SetSecretParameters,
    SetSecretResponse,
};

/// The three remote operations a key-vault backend must provide.
///
/// This is the seam between the [`KeyVault`](super::KeyVault) facade and a
/// concrete provider. Each method is one round trip and must honor `ctx`:
/// when the context is cancelled or its deadline passes, the call returns a
/// [`ContextError`](super::ContextError) promptly.
///
/// Absent secrets must be reported as a [`ResponseError`](super::ResponseError)
/// with status 404 so that the facade can tell them apart from failures.
///
/// Implementations MUST NOT log secret values.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait KeyVaultClient: Send + Sync {
    /// Create the secret `name`, or overwrite its current value.
    async fn set_secret(
        &self,
        ctx: &OperationContext,
        name: &str,
        parameters: SetSecretParameters,
        options: Option<RequestOptions>,
    ) -> Result<SetSecretResponse, BoxError>;

    /// Fetch the secret `name`. An empty `version` means the latest version.
    async fn get_secret(
        &self,
        ctx: &OperationContext,
        name: &str,
        version: &str,
        options: Option<RequestOptions>,
    ) -> Result<GetSecretResponse, BoxError>;

    /// Delete the secret `name`.
    async fn delete_secret(
        &self,
        ctx: &OperationContext,
        name: &str,
        options: Option<RequestOptions>,
    ) -> Result<DeleteSecretResponse, BoxError>;
}

#[async_trait]
impl<T: KeyVaultClient + ?Sized> KeyVaultClient for Arc<T> {
    async fn set_secret(
        &self,
        ctx: &OperationContext,
        name: &str,
        parameters: SetSecretParameters,
        options: Option<RequestOptions>,
    ) -> Result<SetSecretResponse, BoxError> {
        (**self).set_secret(ctx, name, parameters, options).await
    }

    async fn get_secret(
        &self,
        ctx: &OperationContext,
        name: &str,
        version: &str,
        options: Option<RequestOptions>,
    ) -> Result<GetSecretResponse, BoxError> {
        (**self).get_secret(ctx, name, version, options).await
    }

    async fn delete_secret(
        &self,
        ctx: &OperationContext,
        name: &str,
        options: Option<RequestOptions>,
    ) -> Result<DeleteSecretResponse, BoxError> {
        (**self).delete_secret(ctx, name, options).await
    }
}
