//! HashiCorp Vault backend.
//!
//! Secrets are kept in a KV v2 engine, one path per secret name, with the
//! value stored under the `value` field of the secret data.
//!
//! Vault reports failures as `APIError { code, errors }`; those are mapped onto
//! [`ResponseError`] with the same status code, so an absent path surfaces as a
//! 404. KV v2 metadata deletes succeed for absent paths, so
//! [`delete_secret`](KeyVaultClient::delete_secret) reads the metadata first
//! to report a missing secret as not found.
//!
//! # Example
//!
//! ```rust,ignore
//! use elliot::secrets::{HashiCorpVaultClient, RemoteKeyVault, VaultConfig};
//!
//! let config = VaultConfig {
//!     address: "https://vault.example.com:8200".to_string(),
//!     token: Some("vault-token".into()),
//!     namespace: None,
//!     mount_path: "secret".to_string(),
//! };
//! let vault = RemoteKeyVault::new(HashiCorpVaultClient::connect(config).await?);
//! ```

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::DateTime;
use serde::{Deserialize, Serialize};
use vaultrs::client::{VaultClient, VaultClientSettingsBuilder};
use vaultrs::error::ClientError;
use vaultrs::kv2;

use super::client::KeyVaultClient;
use super::context::OperationContext;
use super::error::{BoxError, ResponseError, SecretsError};
use super::types::{
    DeleteSecretResponse, DeletedSecretBundle, GetSecretResponse, RequestOptions,
    SecretAttributes, SecretBundle, SecretString, SetSecretParameters, SetSecretResponse,
};
use crate::config::ConfigReader;

/// Field of the KV v2 secret data holding the value.
const VALUE_FIELD: &str = "value";

type SecretData = HashMap<String, String>;

/// Configuration for the HashiCorp Vault backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultConfig {
    /// Vault server address (e.g., "https://vault.example.com:8200")
    pub address: String,

    /// Vault authentication token
    pub token: Option<SecretString>,

    /// Vault namespace (Enterprise only)
    pub namespace: Option<String>,

    /// KV v2 mount path (default: "secret")
    #[serde(default = "default_mount_path")]
    pub mount_path: String,
}

fn default_mount_path() -> String {
    "secret".to_string()
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            address: "http://127.0.0.1:8200".to_string(),
            token: None,
            namespace: None,
            mount_path: default_mount_path(),
        }
    }
}

impl VaultConfig {
    /// Reads `KEY_VAULT_URI` (the Vault address), `VAULT_TOKEN`,
    /// `VAULT_NAMESPACE` and `VAULT_MOUNT_PATH`.
    pub fn from_reader(reader: &dyn ConfigReader) -> Self {
        let non_empty = |key: &str| Some(reader.string(key)).filter(|v| !v.is_empty());
        Self {
            address: reader.string("KEY_VAULT_URI"),
            token: non_empty("VAULT_TOKEN").map(SecretString::new),
            namespace: non_empty("VAULT_NAMESPACE"),
            mount_path: reader.string_or("VAULT_MOUNT_PATH", &default_mount_path()),
        }
    }
}

/// [`KeyVaultClient`] over a HashiCorp Vault KV v2 engine.
pub struct HashiCorpVaultClient {
    client: VaultClient,
    address: String,
    mount_path: String,
}

impl std::fmt::Debug for HashiCorpVaultClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HashiCorpVaultClient")
            .field("address", &self.address)
            .field("mount_path", &self.mount_path)
            .finish_non_exhaustive()
    }
}

impl HashiCorpVaultClient {
    /// Creates a client without contacting the server.
    ///
    /// # Errors
    ///
    /// - [`SecretsError::Config`] if the address is empty
    /// - [`SecretsError::ClientBuild`] if the settings are rejected
    pub fn new(config: VaultConfig) -> Result<Self, SecretsError> {
        if config.address.trim().is_empty() {
            return Err(SecretsError::config("the uri cannot be empty"));
        }

        let mut settings_builder = VaultClientSettingsBuilder::default();
        settings_builder.address(&config.address);

        if let Some(ref token) = config.token {
            settings_builder.token(token.expose_secret());
        }

        if let Some(namespace) = config.namespace {
            settings_builder.namespace(Some(namespace));
        }

        let settings =
            settings_builder.build().map_err(|e| SecretsError::client_build(e.to_string()))?;
        let client =
            VaultClient::new(settings).map_err(|e| SecretsError::client_build(e.to_string()))?;

        Ok(Self { client, address: config.address, mount_path: config.mount_path })
    }

    /// Creates a client and verifies that the server answers its health check.
    pub async fn connect(config: VaultConfig) -> Result<Self, SecretsError> {
        let client = Self::new(config)?;

        match vaultrs::sys::health(&client.client).await {
            Ok(_) => {
                tracing::info!(address = %client.address, "Successfully connected to Vault");
                Ok(client)
            }
            Err(e) => {
                tracing::error!(error = %e, address = %client.address, "Failed to connect to Vault");
                Err(SecretsError::client_build(format!("vault health check failed: {}", e)))
            }
        }
    }

    pub fn mount_path(&self) -> &str {
        &self.mount_path
    }

    fn secret_id(&self, name: &str, version: u64) -> String {
        format!("{}/{}/{}", self.mount_path, name, version)
    }
}

/// Map a Vault client error onto the adapter error seam.
fn map_client_error(err: ClientError) -> BoxError {
    match err {
        ClientError::APIError { code, errors } => {
            Box::new(ResponseError::new(code).with_message(errors.join("; "))) as BoxError
        }
        other => other.to_string().into(),
    }
}

fn parse_timestamp(value: &str) -> Option<i64> {
    DateTime::parse_from_rfc3339(value).ok().map(|dt| dt.timestamp())
}

#[async_trait]
impl KeyVaultClient for HashiCorpVaultClient {
    async fn set_secret(
        &self,
        ctx: &OperationContext,
        name: &str,
        parameters: SetSecretParameters,
        _options: Option<RequestOptions>,
    ) -> Result<SetSecretResponse, BoxError> {
        let mut data = SecretData::new();
        if let Some(value) = parameters.value.as_ref() {
            data.insert(VALUE_FIELD.to_string(), value.clone());
        }

        let metadata = ctx
            .run(async {
                kv2::set(&self.client, &self.mount_path, name, &data).await.map_err(map_client_error)
            })
            .await?;

        let created = parse_timestamp(&metadata.created_time);
        Ok(SecretBundle {
            id: Some(self.secret_id(name, metadata.version)),
            value: parameters.value,
            content_type: parameters.content_type,
            attributes: Some(SecretAttributes { enabled: Some(true), created, updated: created }),
            tags: parameters.tags,
        }
        .into())
    }

    async fn get_secret(
        &self,
        ctx: &OperationContext,
        name: &str,
        version: &str,
        _options: Option<RequestOptions>,
    ) -> Result<GetSecretResponse, BoxError> {
        let pinned = match version {
            "" => None,
            v => Some(
                v.parse::<u64>()
                    .map_err(|e| format!("invalid secret version '{}': {}", v, e))?,
            ),
        };

        let mut data = ctx
            .run(async {
                let read: Result<SecretData, ClientError> = match pinned {
                    Some(v) => kv2::read_version(&self.client, &self.mount_path, name, v).await,
                    None => kv2::read(&self.client, &self.mount_path, name).await,
                };
                read.map_err(map_client_error)
            })
            .await?;

        let id = match pinned {
            Some(v) => self.secret_id(name, v),
            None => format!("{}/{}", self.mount_path, name),
        };
        Ok(SecretBundle { id: Some(id), value: data.remove(VALUE_FIELD), ..Default::default() }
            .into())
    }

    async fn delete_secret(
        &self,
        ctx: &OperationContext,
        name: &str,
        _options: Option<RequestOptions>,
    ) -> Result<DeleteSecretResponse, BoxError> {
        let metadata = ctx
            .run(async {
                let metadata = kv2::read_metadata(&self.client, &self.mount_path, name)
                    .await
                    .map_err(map_client_error)?;
                kv2::delete_metadata(&self.client, &self.mount_path, name)
                    .await
                    .map_err(map_client_error)?;
                Ok::<_, BoxError>(metadata)
            })
            .await?;

        Ok(DeletedSecretBundle {
            secret: SecretBundle {
                id: Some(self.secret_id(name, metadata.current_version)),
                attributes: Some(SecretAttributes {
                    enabled: Some(false),
                    created: parse_timestamp(&metadata.created_time),
                    updated: parse_timestamp(&metadata.updated_time),
                }),
                ..Default::default()
            },
            deleted_date: Some(chrono::Utc::now().timestamp()),
            ..Default::default()
        }
        .into())
    }
}
