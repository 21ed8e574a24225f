//! Shared helpers for integration tests
//!
//! Provides a wiremock-backed Azure Key Vault and identity endpoint.

#![allow(dead_code)]

use std::sync::Arc;

use elliot::secrets::{AzureKeyVaultClient, RemoteKeyVault, StaticTokenCredential};
use serde_json::{json, Value};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TEST_TOKEN: &str = "test-access-token";

/// A mock Key Vault and a facade pointed at it.
pub struct MockKeyVault {
    pub server: MockServer,
    pub vault: RemoteKeyVault<AzureKeyVaultClient>,
}

impl MockKeyVault {
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let client = AzureKeyVaultClient::new(
            &server.uri(),
            Arc::new(StaticTokenCredential::new(TEST_TOKEN)),
        )
        .expect("client should build");
        Self { server, vault: RemoteKeyVault::new(client) }
    }

    /// Mount a response for `verb` on `/secrets/{suffix}`.
    pub async fn respond(&self, verb: &str, suffix: &str, status: u16, body: Value) {
        Mock::given(method(verb))
            .and(path(format!("/secrets/{}", suffix)))
            .and(query_param("api-version", "7.4"))
            .and(header("authorization", format!("Bearer {}", TEST_TOKEN).as_str()))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&self.server)
            .await;
    }
}

/// Service body for a secret record.
pub fn secret_bundle(server: &MockServer, name: &str, value: Option<&str>) -> Value {
    let mut bundle = json!({
        "id": format!("{}/secrets/{}/4387e9f3d6e14c459867679a90fd0f79", server.uri(), name),
        "attributes": { "enabled": true, "created": 1493938410, "updated": 1493938410 }
    });
    if let Some(value) = value {
        bundle["value"] = json!(value);
    }
    bundle
}

/// Service body for a failed request.
pub fn error_body(code: &str, message: &str) -> Value {
    json!({ "error": { "code": code, "message": message } })
}
