//! Error types for the request pipeline.

use std::time::Duration;

/// Errors produced while building, sending, or post-processing a request.
///
/// Every variant is cheap to clone so that error interceptors can inspect,
/// log, and hand the same error back to the caller.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RequestError {
    /// The transport did not answer before the request timeout elapsed.
    #[error("Request timeout after {}ms", timeout.as_millis())]
    Timeout {
        /// The timeout that was exceeded.
        timeout: Duration,
    },

    /// The server answered with a status outside the 2xx range.
    #[error("HTTP {status}: {status_text}")]
    HttpStatus {
        /// The HTTP status code.
        status: u16,
        /// The canonical reason phrase for the status.
        status_text: String,
        /// Headers of the failed response.
        headers: http::HeaderMap,
        /// The URL that produced the response.
        url: String,
    },

    /// Transport-level failure with no HTTP status (DNS, connect, reset).
    #[error("Network request failed: {0}")]
    Network(String),

    /// The body could not be decoded as its declared content type.
    #[error("Failed to decode response body: {0}")]
    Decode(String),

    /// Invalid URL provided.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Invalid header name or value.
    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    /// The key-value store behind the credential adapter failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// A user-registered interceptor rejected the request or response.
    #[error("Interceptor error: {0}")]
    Interceptor(String),

    /// A local file could not be read.
    #[error("I/O error: {0}")]
    Io(String),

    /// Configuration could not be read or parsed.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl RequestError {
    /// Create an interceptor error with the given message.
    pub fn interceptor(message: impl Into<String>) -> Self {
        Self::Interceptor(message.into())
    }

    /// The HTTP status carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns `true` if the request timed out.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

impl From<reqwest::Error> for RequestError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else if err.is_builder() {
            Self::InvalidUrl(err.to_string())
        } else {
            // Connect timeouts land here too: they never produced a status.
            Self::Network(err.to_string())
        }
    }
}

impl From<url::ParseError> for RequestError {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidUrl(err.to_string())
    }
}

impl From<serde_json::Error> for RequestError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

impl From<toml::de::Error> for RequestError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<std::io::Error> for RequestError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<http::header::InvalidHeaderName> for RequestError {
    fn from(err: http::header::InvalidHeaderName) -> Self {
        Self::InvalidHeader(err.to_string())
    }
}

impl From<http::header::InvalidHeaderValue> for RequestError {
    fn from(err: http::header::InvalidHeaderValue) -> Self {
        Self::InvalidHeader(err.to_string())
    }
}

/// A specialized Result type for request pipeline operations.
pub type Result<T> = std::result::Result<T, RequestError>;
