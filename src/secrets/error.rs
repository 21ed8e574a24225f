//! Error types for secret-store operations.

use std::fmt;

use http::StatusCode;
use thiserror::Error;

/// Result type for secret-store operations.
pub type Result<T> = std::result::Result<T, SecretsError>;

/// Type-erased error returned by backend adapters.
///
/// Adapters report transport failures through this seam so that provider error
/// types never appear in the facade's signatures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors surfaced by the key vault facade and by adapter construction.
#[derive(Error, Debug)]
pub enum SecretsError {
    /// The backend rejected or failed a write.
    #[error("problem setting secret: {source}")]
    Store { source: BoxError },

    /// The backend failed a read for a reason other than the secret being absent.
    #[error("problem reading secret: {source}")]
    Read { source: BoxError },

    /// The backend failed a delete for a reason other than the secret being absent.
    #[error("problem deleting secret: {source}")]
    Delete { source: BoxError },

    /// Invalid adapter configuration, detected before any request is made.
    #[error("{message}")]
    Config { message: String },

    /// No usable credential could be obtained.
    #[error("problem getting default credential: {source}")]
    Credential { source: BoxError },

    /// The backend client could not be constructed.
    #[error("problem creating key vault client: {source}")]
    ClientBuild { source: BoxError },
}

impl SecretsError {
    /// Wrap a failed set operation.
    pub fn store(source: BoxError) -> Self {
        Self::Store { source }
    }

    /// Wrap a failed get operation.
    pub fn read(source: BoxError) -> Self {
        Self::Read { source }
    }

    /// Wrap a failed delete operation.
    pub fn delete(source: BoxError) -> Self {
        Self::Delete { source }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config { message: message.into() }
    }

    /// Create a credential error.
    pub fn credential(source: impl Into<BoxError>) -> Self {
        Self::Credential { source: source.into() }
    }

    /// Create a client construction error.
    pub fn client_build(source: impl Into<BoxError>) -> Self {
        Self::ClientBuild { source: source.into() }
    }
}

/// Structured error response returned by a key-vault service.
///
/// This is the one error shape that carries an HTTP status code, and the only
/// one that can be classified as "secret not found".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseError {
    /// HTTP status code of the failed response
    pub status_code: u16,

    /// Service-specific error code (e.g. `SecretNotFound`), when the body carried one
    pub error_code: Option<String>,

    /// Human-readable message from the service
    pub message: String,
}

impl ResponseError {
    /// Create a response error with only a status code.
    pub fn new(status_code: u16) -> Self {
        Self { status_code, error_code: None, message: String::new() }
    }

    /// Set the service error code.
    pub fn with_error_code(mut self, code: impl Into<String>) -> Self {
        self.error_code = Some(code.into());
        self
    }

    /// Set the service message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Whether the response reports a missing resource.
    pub fn is_not_found(&self) -> bool {
        self.status_code == StatusCode::NOT_FOUND.as_u16()
    }
}

impl fmt::Display for ResponseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "response status {}", self.status_code)?;
        if let Some(code) = &self.error_code {
            write!(f, " ({})", code)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ResponseError {}

/// The identity provider refused to issue an access token.
///
/// Kept apart from [`ResponseError`] so that a failed sign-in is never read as
/// a missing secret, whatever status the token endpoint answered with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRequestError {
    /// HTTP status code of the token endpoint response
    pub status: u16,

    /// OAuth2 error code (e.g. `invalid_client`)
    pub error: Option<String>,

    pub description: String,
}

impl fmt::Display for TokenRequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "token request failed with status {}", self.status)?;
        if let Some(error) = &self.error {
            write!(f, " ({})", error)?;
        }
        if !self.description.is_empty() {
            write!(f, ": {}", self.description)?;
        }
        Ok(())
    }
}

impl std::error::Error for TokenRequestError {}

/// Reasons an [`OperationContext`](super::OperationContext) stops an in-flight call.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextError {
    /// The context's cancellation token fired.
    #[error("context canceled")]
    Cancelled,

    /// The context's deadline passed.
    #[error("context deadline exceeded")]
    DeadlineExceeded,
}

/// Returns true if `err`, or any error in its source chain, is a
/// [`ResponseError`] with status 404.
///
/// The first `ResponseError` found in the chain decides. Authorization failures,
/// server errors, transport errors and context errors are never "not found".
pub fn is_secret_not_found(err: &(dyn std::error::Error + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(e) = current {
        if let Some(response) = e.downcast_ref::<ResponseError>() {
            return response.is_not_found();
        }
        current = e.source();
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[derive(Error, Debug)]
    #[error("request failed")]
    struct Wrapped(#[source] ResponseError);

    #[test]
    fn test_not_found_classification() {
        assert!(is_secret_not_found(&ResponseError::new(404)));
    }

    #[test]
    fn test_other_statuses_are_not_not_found() {
        for status in [401, 403, 500] {
            assert!(!is_secret_not_found(&ResponseError::new(status)), "status {}", status);
        }
    }

    #[test]
    fn test_classification_follows_source_chain() {
        assert!(is_secret_not_found(&Wrapped(ResponseError::new(404))));
        assert!(!is_secret_not_found(&Wrapped(ResponseError::new(503))));
    }

    #[test]
    fn test_boxed_errors_classify() {
        let not_found: BoxError = Box::new(ResponseError::new(404));
        assert!(is_secret_not_found(not_found.as_ref()));

        let plain: BoxError = "arbitrary error".into();
        assert!(!is_secret_not_found(plain.as_ref()));

        let cancelled: BoxError = Box::new(ContextError::Cancelled);
        assert!(!is_secret_not_found(cancelled.as_ref()));
    }

    #[test]
    fn test_operation_error_messages() {
        let err = SecretsError::store("boom".into());
        assert_eq!(err.to_string(), "problem setting secret: boom");

        let err = SecretsError::read("boom".into());
        assert_eq!(err.to_string(), "problem reading secret: boom");

        let err = SecretsError::delete("boom".into());
        assert_eq!(err.to_string(), "problem deleting secret: boom");
    }

    #[test]
    fn test_operation_error_keeps_cause() {
        let err = SecretsError::read(Box::new(ResponseError::new(500)));
        let source = err.source().expect("cause preserved");
        assert_eq!(source.downcast_ref::<ResponseError>(), Some(&ResponseError::new(500)));
    }

    #[test]
    fn test_response_error_display() {
        let err = ResponseError::new(404)
            .with_error_code("SecretNotFound")
            .with_message("A secret with (name/id) k1 was not found in this key vault.");
        assert_eq!(
            err.to_string(),
            "response status 404 (SecretNotFound): A secret with (name/id) k1 was not found in this key vault."
        );
        assert_eq!(ResponseError::new(500).to_string(), "response status 500");
    }

    #[test]
    fn test_token_request_errors_are_never_not_found() {
        let err = TokenRequestError {
            status: 404,
            error: Some("invalid_request".to_string()),
            description: "AADSTS90002: Tenant not found.".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "token request failed with status 404 (invalid_request): AADSTS90002: Tenant not found."
        );

        let boxed: BoxError = Box::new(err);
        assert!(!is_secret_not_found(boxed.as_ref()));
        assert!(!is_secret_not_found(&SecretsError::read(boxed)));
    }

    #[test]
    fn test_construction_errors() {
        let err = SecretsError::config("the uri cannot be empty");
        assert!(matches!(err, SecretsError::Config { .. }));
        assert_eq!(err.to_string(), "the uri cannot be empty");

        let err = SecretsError::credential("no credential configured");
        assert_eq!(err.to_string(), "problem getting default credential: no credential configured");
    }
}
