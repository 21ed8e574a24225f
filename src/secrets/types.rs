//! Secret record types exchanged with key-vault backends, and secure string
//! handling for credentials.
//!
//! The record types follow the key-vault wire shape: every payload field is an
//! `Option` so that "no value supplied" stays distinct from an empty string.
//! Use [`string_value_for`] to collapse an optional value into a plain string.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Coerce an optional wire value into a plain string, defaulting to empty.
pub fn string_value_for(value: Option<&str>) -> String {
    value.map(str::to_owned).unwrap_or_default()
}

/// Parameters for creating or overwriting a secret.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetSecretParameters {
    /// New secret value; `None` means no value is sent at all
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    /// Optional MIME type hint stored alongside the value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,

    /// Optional application tags
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<HashMap<String, String>>,
}

impl SetSecretParameters {
    /// Parameters carrying an explicit value (which may be the empty string).
    pub fn with_value(value: impl Into<String>) -> Self {
        Self { value: Some(value.into()), ..Self::default() }
    }
}

impl fmt::Debug for SetSecretParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SetSecretParameters")
            .field("value", &self.value.as_ref().map(|_| "[REDACTED]"))
            .field("content_type", &self.content_type)
            .field("tags", &self.tags)
            .finish()
    }
}

/// Management attributes attached to a secret record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretAttributes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    /// Creation time, seconds since the Unix epoch
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<i64>,

    /// Last update time, seconds since the Unix epoch
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated: Option<i64>,
}

/// A secret record as returned by the backend.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretBundle {
    /// Backend identifier of the record, including its version when the
    /// backend versions secrets
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// The secret value, absent when the backend returned none
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<SecretAttributes>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<HashMap<String, String>>,
}

impl fmt::Debug for SecretBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretBundle")
            .field("id", &self.id)
            .field("value", &self.value.as_ref().map(|_| "[REDACTED]"))
            .field("content_type", &self.content_type)
            .field("attributes", &self.attributes)
            .field("tags", &self.tags)
            .finish()
    }
}

/// A deleted secret record, with recovery information when soft-delete is on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedSecretBundle {
    #[serde(flatten)]
    pub secret: SecretBundle,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub recovery_id: Option<String>,

    /// Seconds since the Unix epoch
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_date: Option<i64>,

    /// Seconds since the Unix epoch
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_purge_date: Option<i64>,
}

/// Response to a set operation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SetSecretResponse {
    pub secret: SecretBundle,
}

/// Response to a get operation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GetSecretResponse {
    pub secret: SecretBundle,
}

/// Response to a delete operation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeleteSecretResponse {
    pub deleted: DeletedSecretBundle,
}

impl From<SecretBundle> for SetSecretResponse {
    fn from(secret: SecretBundle) -> Self {
        Self { secret }
    }
}

impl From<SecretBundle> for GetSecretResponse {
    fn from(secret: SecretBundle) -> Self {
        Self { secret }
    }
}

impl From<DeletedSecretBundle> for DeleteSecretResponse {
    fn from(deleted: DeletedSecretBundle) -> Self {
        Self { deleted }
    }
}

/// Per-request options passed through to the backend.
///
/// `None` everywhere means "use the client's defaults".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    /// Override of the service API version for this request
    pub api_version: Option<String>,
}

/// A string wrapper that redacts its contents in Debug, Display and serialization,
/// and zeroes its memory on drop.
///
/// Deserialization accepts real values so that credentials can be loaded from
/// configuration. The value is only reachable through [`SecretString::expose_secret`].
#[derive(Clone, Default, Zeroize, ZeroizeOnDrop)]
pub struct SecretString(String);

impl SecretString {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Borrow the underlying value. Never log the result.
    pub fn expose_secret(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for SecretString {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str("[REDACTED]")
    }
}

impl<'de> Deserialize<'de> for SecretString {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(SecretString)
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretString([REDACTED])")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl PartialEq for SecretString {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for SecretString {}

impl From<String> for SecretString {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for SecretString {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}
