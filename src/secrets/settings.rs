//! Backend selection and key vault construction.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::azure::AzureKeyVaultClient;
use super::credential::default_credential;
use super::error::SecretsError;
use super::key_vault::{KeyVault, RemoteKeyVault};
use super::memory::InMemoryKeyVaultClient;
use super::vault::{HashiCorpVaultClient, VaultConfig};
use crate::config::ConfigReader;

/// Type of key vault backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyVaultBackend {
    /// Azure Key Vault REST API
    #[default]
    Azure,
    /// HashiCorp Vault KV v2
    Hashicorp,
    /// Process-local map (development only)
    Memory,
}

impl KeyVaultBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Azure => "azure",
            Self::Hashicorp => "hashicorp",
            Self::Memory => "memory",
        }
    }
}

impl FromStr for KeyVaultBackend {
    type Err = SecretsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "azure" => Ok(Self::Azure),
            "hashicorp" => Ok(Self::Hashicorp),
            "memory" => Ok(Self::Memory),
            _ => Err(SecretsError::config(format!("unknown key vault backend: {}", s))),
        }
    }
}

impl fmt::Display for KeyVaultBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which backend to build, and where it lives.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyVaultSettings {
    pub backend: KeyVaultBackend,

    /// Vault URI (Azure) or server address (HashiCorp); unused by `memory`
    pub uri: String,
}

impl KeyVaultSettings {
    /// Reads `KEY_VAULT_BACKEND` (default `azure`) and `KEY_VAULT_URI`.
    pub fn from_reader(reader: &dyn ConfigReader) -> Result<Self, SecretsError> {
        let backend = match reader.string("KEY_VAULT_BACKEND").trim().to_lowercase().as_str() {
            "" => KeyVaultBackend::default(),
            other => other.parse()?,
        };
        Ok(Self { backend, uri: reader.string("KEY_VAULT_URI") })
    }
}

/// Build the configured key vault.
///
/// Backend-specific options (credentials, Vault token and mount path) are read
/// from `reader`. Construction errors are returned here, before any secret
/// operation runs.
pub async fn build_key_vault(
    settings: &KeyVaultSettings,
    reader: &dyn ConfigReader,
) -> Result<Arc<dyn KeyVault>, SecretsError> {
    let vault: Arc<dyn KeyVault> = match settings.backend {
        KeyVaultBackend::Azure => {
            if settings.uri.trim().is_empty() {
                return Err(SecretsError::config("the uri cannot be empty"));
            }
            let credential = default_credential(reader)?;
            Arc::new(RemoteKeyVault::new(AzureKeyVaultClient::new(&settings.uri, credential)?))
        }
        KeyVaultBackend::Hashicorp => {
            let config =
                VaultConfig { address: settings.uri.clone(), ..VaultConfig::from_reader(reader) };
            Arc::new(RemoteKeyVault::new(HashiCorpVaultClient::connect(config).await?))
        }
        KeyVaultBackend::Memory => {
            tracing::warn!("Using in-memory key vault; secrets will not survive a restart");
            Arc::new(RemoteKeyVault::new(InMemoryKeyVaultClient::new()))
        }
    };

    tracing::info!(backend = %settings.backend, "Key vault initialized");
    Ok(vault)
}
