//! Error types and utilities for storage operations.

use google_cloud_storage::client::google_cloud_auth;
use google_cloud_storage::http::Error as HttpError;

/// Result type for all storage operations in this crate.
///
/// This is a convenience type alias that defaults to using [`Error`] as the error type.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Error type for Google Cloud Storage operations.
#[derive(Debug, thiserror::Error)]
#[must_use = "errors should be handled appropriately"]
pub enum Error {
    /// Credential material is missing, undecodable or malformed.
    ///
    /// Raised while resolving the credential source, before any request is
    /// sent to the storage backend.
    #[error("Credential error: {0}")]
    Credentials(String),

    /// The authentication layer rejected the resolved credentials.
    #[error("Authentication error: {0}")]
    Auth(#[from] google_cloud_auth::error::Error),

    /// The configured bucket could not be reached.
    #[error("Storage connectivity check failed for bucket '{bucket}'")]
    Connectivity { bucket: String },

    /// An upload completed but the object is not visible afterwards.
    #[error("Upload verification failed: object '{key}' was not found after upload")]
    UploadVerification { key: String },

    /// Invalid request or malformed input.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Bucket or object does not exist.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Serialization or deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Underlying storage client error.
    #[error("Storage client error: {0}")]
    Client(#[from] HttpError),

    /// A failure wrapped with the name of the operation that produced it.
    #[error("{operation}: {source}")]
    Operation {
        operation: &'static str,
        source: Box<Error>,
    },
}

impl Error {
    /// Translates a storage client error, mapping 404 responses to [`Error::NotFound`].
    pub fn from_storage(error: HttpError, resource: impl Into<String>) -> Self {
        if status_code_of(&error) == Some(404) {
            Self::NotFound(resource.into())
        } else {
            Self::Client(error)
        }
    }

    /// Wraps this error with the name of the failed operation.
    pub fn context(self, operation: &'static str) -> Self {
        Self::Operation {
            operation,
            source: Box::new(self),
        }
    }

    /// Returns the innermost error, unwrapping operation context.
    pub fn root(&self) -> &Error {
        match self {
            Self::Operation { source, .. } => source.root(),
            other => other,
        }
    }

    /// Returns whether this error indicates a missing resource.
    pub fn is_not_found(&self) -> bool {
        match self.root() {
            Self::NotFound(_) => true,
            Self::Client(e) => status_code_of(e) == Some(404),
            _ => false,
        }
    }

    /// Returns whether this error originates from credential resolution or authentication.
    pub fn is_credentials_error(&self) -> bool {
        matches!(self.root(), Self::Credentials(_) | Self::Auth(_))
    }

    /// Returns whether this error is a failed connectivity precondition.
    pub fn is_connectivity_error(&self) -> bool {
        matches!(self.root(), Self::Connectivity { .. })
    }

    /// Returns whether this error indicates invalid request data.
    pub fn is_invalid_request(&self) -> bool {
        matches!(self.root(), Self::InvalidRequest(_))
    }

    /// Returns the HTTP status code reported by the backend, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self.root() {
            Self::NotFound(_) => Some(404),
            Self::Client(e) => status_code_of(e),
            _ => None,
        }
    }

    /// Returns a short, stable name for the error kind, suitable for log fields.
    pub fn kind(&self) -> &'static str {
        match self.root() {
            Self::Credentials(_) => "credentials",
            Self::Auth(_) => "auth",
            Self::Connectivity { .. } => "connectivity",
            Self::UploadVerification { .. } => "upload_verification",
            Self::InvalidRequest(_) => "invalid_request",
            Self::NotFound(_) => "not_found",
            Self::Serialization(_) => "serialization",
            Self::Io(_) => "io",
            Self::Client(_) => "client",
            Self::Operation { .. } => "operation",
        }
    }
}

fn status_code_of(error: &HttpError) -> Option<u16> {
    match error {
        HttpError::Response(response) => Some(response.code),
        HttpError::HttpClient(e) | HttpError::RawResponse(e, _) => e.status().map(|s| s.as_u16()),
        _ => None,
    }
}
