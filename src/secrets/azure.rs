//! Azure Key Vault backend.
//!
//! Talks to the Key Vault REST API directly over `reqwest`:
//!
//! | Operation | Request |
//! |-----------|---------|
//! | set       | `PUT {vault}/secrets/{name}?api-version=7.4` |
//! | get       | `GET {vault}/secrets/{name}/{version}?api-version=7.4` |
//! | delete    | `DELETE {vault}/secrets/{name}?api-version=7.4` |
//!
//! Every request carries a bearer token from a [`TokenCredential`]. Non-2xx
//! responses become a [`ResponseError`] built from the service's
//! `{"error": {"code", "message"}}` body, so a missing secret surfaces as
//! status 404 with code `SecretNotFound`.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use url::Url;

use super::client::KeyVaultClient;
use super::context::OperationContext;
use super::credential::{default_credential, TokenCredential};
use super::error::{BoxError, ResponseError, SecretsError};
use super::types::{
    DeleteSecretResponse, DeletedSecretBundle, GetSecretResponse, RequestOptions, SecretBundle,
    SetSecretParameters, SetSecretResponse,
};
use crate::config::ConfigReader;

/// Key Vault REST API version used unless a request overrides it.
pub const DEFAULT_API_VERSION: &str = "7.4";

/// OAuth2 scope for Key Vault data-plane access.
pub const KEY_VAULT_SCOPE: &str = "https://vault.azure.net/.default";

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: String,
}

/// Build a [`ResponseError`] from a failed response body.
fn response_error(status: StatusCode, body: &str) -> ResponseError {
    let err = ResponseError::new(status.as_u16());
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(ErrorEnvelope { error }) => {
            let err = err.with_message(error.message);
            match error.code {
                Some(code) => err.with_error_code(code),
                None => err,
            }
        }
        Err(_) => err.with_message(body.trim()),
    }
}

fn parse_vault_url(uri: &str) -> Result<Url, SecretsError> {
    let uri = uri.trim();
    if uri.is_empty() {
        return Err(SecretsError::config("the uri cannot be empty"));
    }

    let url = Url::parse(uri).map_err(SecretsError::client_build)?;
    if url.cannot_be_a_base() {
        return Err(SecretsError::client_build(format!("'{}' is not a vault base url", uri)));
    }
    Ok(url)
}

/// [`KeyVaultClient`] for Azure Key Vault.
pub struct AzureKeyVaultClient {
    http: reqwest::Client,
    vault_url: Url,
    credential: Arc<dyn TokenCredential>,
    api_version: String,
}

impl std::fmt::Debug for AzureKeyVaultClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AzureKeyVaultClient")
            .field("vault_url", &self.vault_url.as_str())
            .field("api_version", &self.api_version)
            .finish_non_exhaustive()
    }
}

impl AzureKeyVaultClient {
    /// Creates a client for the vault at `uri`.
    ///
    /// # Errors
    ///
    /// - [`SecretsError::Config`] if `uri` is empty
    /// - [`SecretsError::ClientBuild`] if `uri` is not a usable URL
    pub fn new(uri: &str, credential: Arc<dyn TokenCredential>) -> Result<Self, SecretsError> {
        let vault_url = parse_vault_url(uri)?;
        let http = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(SecretsError::client_build)?;

        tracing::info!(vault_url = %vault_url, "Created Azure Key Vault client");
        Ok(Self { http, vault_url, credential, api_version: DEFAULT_API_VERSION.to_string() })
    }

    /// Creates a client from `KEY_VAULT_URI` and the default credential chain.
    ///
    /// The URI is validated before any credential is looked up.
    pub fn from_reader(reader: &dyn ConfigReader) -> Result<Self, SecretsError> {
        let uri = reader.string("KEY_VAULT_URI");
        parse_vault_url(&uri)?;
        let credential = default_credential(reader)?;
        Self::new(&uri, credential)
    }

    /// Override the API version sent with every request.
    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    pub fn vault_url(&self) -> &Url {
        &self.vault_url
    }

    /// `{vault}/secrets/{name}[/{version}]?api-version=...`
    ///
    /// An empty `version` addresses the latest version. An empty `name` is
    /// rejected, since `{vault}/secrets` is the listing endpoint.
    fn secret_url(
        &self,
        name: &str,
        version: &str,
        options: Option<&RequestOptions>,
    ) -> Result<Url, BoxError> {
        if name.is_empty() {
            return Err("the secret name cannot be empty".into());
        }

        let mut url = self.vault_url.clone();
        {
            let mut path = url.path_segments_mut().map_err(|_| "vault url cannot be a base")?;
            path.pop_if_empty().push("secrets").push(name);
            if !version.is_empty() {
                path.push(version);
            }
        }

        let api_version = options
            .and_then(|o| o.api_version.as_deref())
            .unwrap_or(self.api_version.as_str());
        url.query_pairs_mut().append_pair("api-version", api_version);
        Ok(url)
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        ctx: &OperationContext,
        method: Method,
        url: Url,
        body: Option<&SetSecretParameters>,
    ) -> Result<T, BoxError> {
        let token = self.credential.get_token(ctx, &[KEY_VAULT_SCOPE]).await?;

        let mut request =
            self.http.request(method.clone(), url).bearer_auth(token.token.expose_secret());
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        tracing::debug!(method = %method, status = %status.as_u16(), "Key vault response");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Box::new(response_error(status, &body)));
        }

        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl KeyVaultClient for AzureKeyVaultClient {
    async fn set_secret(
        &self,
        ctx: &OperationContext,
        name: &str,
        parameters: SetSecretParameters,
        options: Option<RequestOptions>,
    ) -> Result<SetSecretResponse, BoxError> {
        let url = self.secret_url(name, "", options.as_ref())?;
        let bundle: SecretBundle =
            ctx.run(self.execute(ctx, Method::PUT, url, Some(&parameters))).await?;
        Ok(bundle.into())
    }

    async fn get_secret(
        &self,
        ctx: &OperationContext,
        name: &str,
        version: &str,
        options: Option<RequestOptions>,
    ) -> Result<GetSecretResponse, BoxError> {
        let url = self.secret_url(name, version, options.as_ref())?;
        let bundle: SecretBundle = ctx.run(self.execute(ctx, Method::GET, url, None)).await?;
        Ok(bundle.into())
    }

    async fn delete_secret(
        &self,
        ctx: &OperationContext,
        name: &str,
        options: Option<RequestOptions>,
    ) -> Result<DeleteSecretResponse, BoxError> {
        let url = self.secret_url(name, "", options.as_ref())?;
        let deleted: DeletedSecretBundle =
            ctx.run(self.execute(ctx, Method::DELETE, url, None)).await?;
        Ok(deleted.into())
    }
}
