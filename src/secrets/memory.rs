//! In-memory key-vault backend.
//!
//! Intended for **development and testing only**. Secrets live in process
//! memory and vanish when the client is dropped; nothing is encrypted or
//! persisted.
//!
//! The backend behaves like a remote vault as far as the facade can tell:
//! absent names are reported as a [`ResponseError`] with status 404, and every
//! call fails with a [`ContextError`](super::ContextError) once its context is
//! done.

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;

use super::client::KeyVaultClient;
use super::context::OperationContext;
use super::error::{BoxError, ResponseError};
use super::types::{
    DeleteSecretResponse, DeletedSecretBundle, GetSecretResponse, RequestOptions,
    SecretAttributes, SecretBundle, SetSecretParameters, SetSecretResponse,
};

/// Service error code reported for absent secrets.
const NOT_FOUND_CODE: &str = "SecretNotFound";

#[derive(Clone)]
struct StoredSecret {
    version: u64,
    value: Option<String>,
    content_type: Option<String>,
    tags: Option<HashMap<String, String>>,
    created: i64,
    updated: i64,
}

/// Process-local [`KeyVaultClient`] backed by a concurrent map.
///
/// Each overwrite bumps the record's version; only the latest version is
/// retained.
#[derive(Debug, Default)]
pub struct InMemoryKeyVaultClient {
    secrets: DashMap<String, StoredSecret>,
}

impl fmt::Debug for StoredSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredSecret")
            .field("version", &self.version)
            .field("value", &self.value.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl InMemoryKeyVaultClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of secrets currently held.
    pub fn len(&self) -> usize {
        self.secrets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.secrets.is_empty()
    }

    fn secret_id(name: &str, version: u64) -> String {
        format!("memory://secrets/{}/{}", name, version)
    }

    fn not_found(name: &str) -> BoxError {
        Box::new(
            ResponseError::new(404)
                .with_error_code(NOT_FOUND_CODE)
                .with_message(format!("secret '{}' was not found", name)),
        )
    }

    fn bundle(name: &str, stored: &StoredSecret) -> SecretBundle {
        SecretBundle {
            id: Some(Self::secret_id(name, stored.version)),
            value: stored.value.clone(),
            content_type: stored.content_type.clone(),
            attributes: Some(SecretAttributes {
                enabled: Some(true),
                created: Some(stored.created),
                updated: Some(stored.updated),
            }),
            tags: stored.tags.clone(),
        }
    }

    fn check(ctx: &OperationContext) -> Result<(), BoxError> {
        match ctx.err() {
            Some(err) => Err(Box::new(err)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl KeyVaultClient for InMemoryKeyVaultClient {
    async fn set_secret(
        &self,
        ctx: &OperationContext,
        name: &str,
        parameters: SetSecretParameters,
        _options: Option<RequestOptions>,
    ) -> Result<SetSecretResponse, BoxError> {
        Self::check(ctx)?;

        let now = Utc::now().timestamp();
        let mut entry = self.secrets.entry(name.to_string()).or_insert_with(|| StoredSecret {
            version: 0,
            value: None,
            content_type: None,
            tags: None,
            created: now,
            updated: now,
        });
        entry.version += 1;
        entry.value = parameters.value;
        entry.content_type = parameters.content_type;
        entry.tags = parameters.tags;
        entry.updated = now;

        Ok(Self::bundle(name, &entry).into())
    }

    async fn get_secret(
        &self,
        ctx: &OperationContext,
        name: &str,
        version: &str,
        _options: Option<RequestOptions>,
    ) -> Result<GetSecretResponse, BoxError> {
        Self::check(ctx)?;

        let stored = self.secrets.get(name).ok_or_else(|| Self::not_found(name))?;
        if !version.is_empty() && version != stored.version.to_string() {
            return Err(Self::not_found(name));
        }

        Ok(Self::bundle(name, &stored).into())
    }

    async fn delete_secret(
        &self,
        ctx: &OperationContext,
        name: &str,
        _options: Option<RequestOptions>,
    ) -> Result<DeleteSecretResponse, BoxError> {
        Self::check(ctx)?;

        let (_, stored) = self.secrets.remove(name).ok_or_else(|| Self::not_found(name))?;
        Ok(DeletedSecretBundle {
            secret: Self::bundle(name, &stored),
            deleted_date: Some(Utc::now().timestamp()),
            ..Default::default()
        }
        .into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::secrets::error::{is_secret_not_found, ContextError};

    #[tokio::test]
    async fn test_set_then_get() {
        let client = InMemoryKeyVaultClient::new();
        let ctx = OperationContext::background();

        let set = client
            .set_secret(&ctx, "db-password", SetSecretParameters::with_value("s3cr3t"), None)
            .await
            .unwrap();
        assert_eq!(set.secret.id.as_deref(), Some("memory://secrets/db-password/1"));

        let got = client.get_secret(&ctx, "db-password", "", None).await.unwrap();
        assert_eq!(got.secret.value.as_deref(), Some("s3cr3t"));
        assert_eq!(client.len(), 1);
    }

    #[tokio::test]
    async fn test_overwrite_bumps_version() {
        let client = InMemoryKeyVaultClient::new();
        let ctx = OperationContext::background();

        client.set_secret(&ctx, "k1", SetSecretParameters::with_value("v1"), None).await.unwrap();
        client.set_secret(&ctx, "k1", SetSecretParameters::with_value("v2"), None).await.unwrap();

        let latest = client.get_secret(&ctx, "k1", "", None).await.unwrap();
        assert_eq!(latest.secret.value.as_deref(), Some("v2"));

        let pinned = client.get_secret(&ctx, "k1", "2", None).await.unwrap();
        assert_eq!(pinned.secret.value.as_deref(), Some("v2"));

        let stale = client.get_secret(&ctx, "k1", "1", None).await.unwrap_err();
        assert!(is_secret_not_found(stale.as_ref()));
    }

    #[tokio::test]
    async fn test_absent_names_are_not_found() {
        let client = InMemoryKeyVaultClient::new();
        let ctx = OperationContext::background();

        let err = client.get_secret(&ctx, "never-existed", "", None).await.unwrap_err();
        assert!(is_secret_not_found(err.as_ref()));

        let err = client.delete_secret(&ctx, "never-existed", None).await.unwrap_err();
        let response = err.downcast_ref::<ResponseError>().unwrap();
        assert_eq!(response.error_code.as_deref(), Some("SecretNotFound"));
    }

    #[tokio::test]
    async fn test_delete_removes_secret() {
        let client = InMemoryKeyVaultClient::new();
        let ctx = OperationContext::background();

        client.set_secret(&ctx, "k1", SetSecretParameters::with_value("v1"), None).await.unwrap();
        let deleted = client.delete_secret(&ctx, "k1", None).await.unwrap();
        assert_eq!(deleted.deleted.secret.value.as_deref(), Some("v1"));
        assert!(deleted.deleted.deleted_date.is_some());
        assert!(client.is_empty());
    }

    #[tokio::test]
    async fn test_value_less_record() {
        let client = InMemoryKeyVaultClient::new();
        let ctx = OperationContext::background();

        client.set_secret(&ctx, "k1", SetSecretParameters::default(), None).await.unwrap();
        let got = client.get_secret(&ctx, "k1", "", None).await.unwrap();
        assert!(got.secret.value.is_none());
    }

    #[tokio::test]
    async fn test_done_context_fails_every_call() {
        let client = InMemoryKeyVaultClient::new();
        let ctx = OperationContext::background();
        ctx.cancel();

        let err = client
            .set_secret(&ctx, "k1", SetSecretParameters::with_value("v1"), None)
            .await
            .unwrap_err();
        assert_eq!(err.downcast_ref::<ContextError>(), Some(&ContextError::Cancelled));
        assert!(!is_secret_not_found(err.as_ref()));
        assert!(client.is_empty());
    }
}
