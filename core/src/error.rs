//! Error types for the Cloud Connector client.
//!
//! # Design
//! Operations that require `204 No Content` report any other status as
//! `UnexpectedStatus`, naming the operation and the observed code. Decoding
//! operations report non-2xx statuses as `Http`. Both keep the full response
//! so callers can inspect headers and body for diagnostics.

use thiserror::Error;

use crate::http::HttpResponse;

/// Result type using `ApiError`.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Errors returned by the facades and `HttpClient` implementations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A local precondition on an upload source failed (e.g. it is a directory).
    #[error("invalid upload source: {0}")]
    InvalidUpload(String),

    /// The request could not be constructed.
    #[error("request construction failed: {0}")]
    Request(String),

    /// The request could not be executed.
    #[error("transport error: {0}")]
    Transport(String),

    /// Reading or writing a local file handle failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The operation requires a specific status and the server answered otherwise.
    #[error("{operation} failed with status code {status}")]
    UnexpectedStatus {
        operation: &'static str,
        status: u16,
        response: Box<HttpResponse>,
    },

    /// The server returned a non-2xx status.
    #[error("HTTP {status}: {}", .response.text())]
    Http {
        status: u16,
        response: Box<HttpResponse>,
    },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// Configuration is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),
}

impl ApiError {
    /// The raw response behind a status error, if this error carries one.
    pub fn response(&self) -> Option<&HttpResponse> {
        match self {
            ApiError::UnexpectedStatus { response, .. } | ApiError::Http { response, .. } => {
                Some(response)
            }
            _ => None,
        }
    }

    /// The HTTP status behind a status error, if any.
    pub fn status(&self) -> Option<u16> {
        self.response().map(|r| r.status)
    }
}

/// Response decoding failures. Encoding maps to `Serialization` explicitly.
impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Deserialization(err.to_string())
    }
}
