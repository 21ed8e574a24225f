//! Bearer-token credentials for the Azure Key Vault adapter.
//!
//! [`default_credential`] picks a credential from configuration:
//!
//! 1. `AZURE_TENANT_ID`, `AZURE_CLIENT_ID` and `AZURE_CLIENT_SECRET` select the
//!    OAuth2 client-credentials flow ([`ClientSecretCredential`]).
//!    `AZURE_AUTHORITY_HOST` overrides the identity endpoint.
//! 2. Otherwise `AZURE_ACCESS_TOKEN` is used verbatim ([`StaticTokenCredential`]).
//! 3. Otherwise no credential is available and construction fails.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use tokio::sync::Mutex;
use url::Url;

use super::context::OperationContext;
use super::error::{BoxError, SecretsError, TokenRequestError};
use super::types::SecretString;
use crate::config::ConfigReader;

/// Default Microsoft identity platform endpoint.
pub const DEFAULT_AUTHORITY_HOST: &str = "https://login.microsoftonline.com/";

/// Tokens are refreshed this long before they expire.
const EXPIRY_MARGIN_MINUTES: i64 = 5;

/// Expiry for a token issued at `now` that lives `expires_in` seconds.
///
/// Out-of-range lifetimes saturate instead of overflowing.
fn expires_on(now: DateTime<Utc>, expires_in: i64) -> DateTime<Utc> {
    let lifetime = Duration::try_seconds(expires_in.max(0)).unwrap_or(Duration::MAX);
    now.checked_add_signed(lifetime).unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// An access token and its expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub token: SecretString,
    pub expires_on: DateTime<Utc>,
}

impl AccessToken {
    pub fn new(token: impl Into<SecretString>, expires_on: DateTime<Utc>) -> Self {
        Self { token: token.into(), expires_on }
    }

    /// Whether the token is still usable at `now`, keeping a safety margin.
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_on - Duration::minutes(EXPIRY_MARGIN_MINUTES) > now
    }
}

/// Source of bearer tokens.
#[async_trait]
pub trait TokenCredential: Send + Sync {
    /// Obtain a token valid for `scopes`.
    async fn get_token(
        &self,
        ctx: &OperationContext,
        scopes: &[&str],
    ) -> Result<AccessToken, BoxError>;
}

/// A fixed, pre-issued token.
#[derive(Debug, Clone)]
pub struct StaticTokenCredential {
    token: AccessToken,
}

impl StaticTokenCredential {
    /// Wrap a token that never expires from this crate's point of view.
    pub fn new(token: impl Into<SecretString>) -> Self {
        Self { token: AccessToken::new(token, DateTime::<Utc>::MAX_UTC) }
    }
}

#[async_trait]
impl TokenCredential for StaticTokenCredential {
    async fn get_token(
        &self,
        ctx: &OperationContext,
        _scopes: &[&str],
    ) -> Result<AccessToken, BoxError> {
        if let Some(err) = ctx.err() {
            return Err(Box::new(err));
        }
        Ok(self.token.clone())
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: String,
}

/// OAuth2 client-credentials grant against the Microsoft identity platform.
///
/// The last token is cached and reused until shortly before it expires.
pub struct ClientSecretCredential {
    http: reqwest::Client,
    token_url: Url,
    client_id: String,
    client_secret: SecretString,
    cached: Mutex<Option<AccessToken>>,
}

impl std::fmt::Debug for ClientSecretCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientSecretCredential")
            .field("token_url", &self.token_url.as_str())
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret)
            .finish()
    }
}

impl ClientSecretCredential {
    /// # Errors
    ///
    /// [`SecretsError::Credential`] when `authority_host` is not a valid URL or
    /// any identifier is empty.
    pub fn new(
        authority_host: &str,
        tenant_id: &str,
        client_id: &str,
        client_secret: SecretString,
    ) -> Result<Self, SecretsError> {
        if tenant_id.is_empty() || client_id.is_empty() || client_secret.is_empty() {
            return Err(SecretsError::credential(
                "tenant id, client id and client secret are all required",
            ));
        }

        let mut authority = authority_host.trim().to_string();
        if !authority.ends_with('/') {
            authority.push('/');
        }
        let token_url = Url::parse(&authority)
            .and_then(|base| base.join(&format!("{}/oauth2/v2.0/token", tenant_id)))
            .map_err(SecretsError::credential)?;

        Ok(Self {
            http: reqwest::Client::new(),
            token_url,
            client_id: client_id.to_string(),
            client_secret,
            cached: Mutex::new(None),
        })
    }

    pub fn token_url(&self) -> &Url {
        &self.token_url
    }

    async fn request_token(&self, scopes: &[&str]) -> Result<AccessToken, BoxError> {
        let scope = scopes.join(" ");
        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.expose_secret()),
            ("scope", scope.as_str()),
        ];

        let response = self.http.post(self.token_url.clone()).form(&form).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = match serde_json::from_str::<TokenErrorResponse>(&body) {
                Ok(parsed) => TokenRequestError {
                    status: status.as_u16(),
                    error: Some(parsed.error),
                    description: parsed.error_description,
                },
                Err(_) => TokenRequestError {
                    status: status.as_u16(),
                    error: None,
                    description: body.trim().to_string(),
                },
            };
            return Err(Box::new(err));
        }

        let parsed: TokenResponse = response.json().await?;
        Ok(AccessToken::new(parsed.access_token, expires_on(Utc::now(), parsed.expires_in)))
    }
}

#[async_trait]
impl TokenCredential for ClientSecretCredential {
    async fn get_token(
        &self,
        ctx: &OperationContext,
        scopes: &[&str],
    ) -> Result<AccessToken, BoxError> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref().filter(|t| t.is_fresh(Utc::now())) {
            return Ok(token.clone());
        }

        let token = ctx.run(self.request_token(scopes)).await?;
        tracing::debug!(expires_on = %token.expires_on, "Acquired access token");
        *cached = Some(token.clone());
        Ok(token)
    }
}

/// Choose a credential from configuration.
///
/// # Errors
///
/// [`SecretsError::Credential`] when no supported combination of variables is set.
pub fn default_credential(
    reader: &dyn ConfigReader,
) -> Result<Arc<dyn TokenCredential>, SecretsError> {
    let tenant_id = reader.string("AZURE_TENANT_ID");
    let client_id = reader.string("AZURE_CLIENT_ID");
    let client_secret = reader.string("AZURE_CLIENT_SECRET");

    if !tenant_id.is_empty() && !client_id.is_empty() && !client_secret.is_empty() {
        let authority = reader.string_or("AZURE_AUTHORITY_HOST", DEFAULT_AUTHORITY_HOST);
        let credential = ClientSecretCredential::new(
            &authority,
            &tenant_id,
            &client_id,
            SecretString::new(client_secret),
        )?;
        tracing::info!(tenant_id = %tenant_id, client_id = %client_id, "Using client secret credential");
        return Ok(Arc::new(credential));
    }

    let access_token = reader.string("AZURE_ACCESS_TOKEN");
    if !access_token.is_empty() {
        tracing::info!("Using static access token credential");
        return Ok(Arc::new(StaticTokenCredential::new(access_token)));
    }

    Err(SecretsError::credential(
        "no credential configured: set AZURE_TENANT_ID, AZURE_CLIENT_ID and AZURE_CLIENT_SECRET, or AZURE_ACCESS_TOKEN",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MapConfig;

    #[test]
    fn test_token_freshness_margin() {
        let now = Utc::now();
        assert!(AccessToken::new("t", now + Duration::minutes(10)).is_fresh(now));
        assert!(!AccessToken::new("t", now + Duration::minutes(4)).is_fresh(now));
        assert!(!AccessToken::new("t", now - Duration::minutes(1)).is_fresh(now));
    }

    #[test]
    fn test_expiry_saturates_on_hostile_lifetimes() {
        let now = Utc::now();
        assert_eq!(expires_on(now, 3600), now + Duration::seconds(3600));
        assert_eq!(expires_on(now, i64::MAX), DateTime::<Utc>::MAX_UTC);
        assert_eq!(expires_on(now, -30), now);
    }

    #[test]
    fn test_token_url() {
        let credential = ClientSecretCredential::new(
            "https://login.example.com",
            "tenant-1",
            "client-1",
            SecretString::new("shh"),
        )
        .unwrap();
        assert_eq!(
            credential.token_url().as_str(),
            "https://login.example.com/tenant-1/oauth2/v2.0/token"
        );
        assert!(!format!("{:?}", credential).contains("shh"));
    }

    #[test]
    fn test_client_secret_credential_rejects_bad_authority() {
        let err = ClientSecretCredential::new("not a url", "t", "c", SecretString::new("s"))
            .unwrap_err();
        assert!(matches!(err, SecretsError::Credential { .. }));
    }

    #[tokio::test]
    async fn test_static_token() {
        let credential = StaticTokenCredential::new("abc");
        let token =
            credential.get_token(&OperationContext::background(), &["scope"]).await.unwrap();
        assert_eq!(token.token.expose_secret(), "abc");
        assert!(token.is_fresh(Utc::now()));
    }

    #[test]
    fn test_default_credential_prefers_client_secret() {
        let reader = MapConfig::new()
            .with("AZURE_TENANT_ID", "tenant")
            .with("AZURE_CLIENT_ID", "client")
            .with("AZURE_CLIENT_SECRET", "secret")
            .with("AZURE_ACCESS_TOKEN", "token");
        assert!(default_credential(&reader).is_ok());
    }

    #[test]
    fn test_default_credential_falls_back_to_access_token() {
        let reader =
            MapConfig::new().with("AZURE_TENANT_ID", "tenant").with("AZURE_ACCESS_TOKEN", "token");
        assert!(default_credential(&reader).is_ok());
    }

    #[test]
    fn test_default_credential_without_configuration() {
        let err = default_credential(&MapConfig::new()).err().unwrap();
        assert!(err
            .to_string()
            .starts_with("problem getting default credential: no credential configured"));
    }
}
