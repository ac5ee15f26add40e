//! Error classification.

use crate::error::RequestError;

/// Title shown on every error alert.
const ALERT_TITLE: &str = "Alert";

/// The kind of failure an alert reports.
///
/// Each category has its own suppression key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// The request timed out.
    Timeout,
    /// The server answered 401.
    Unauthorized,
    /// The server answered 403.
    Forbidden,
    /// The server answered 404.
    NotFound,
    /// The server answered 500 or another 5xx status.
    ServerError,
    /// Anything else: connection failures, undecodable bodies, other 4xx.
    NetworkError,
}

impl ErrorCategory {
    /// The suppression key for this category.
    pub fn key(self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::Unauthorized => "unauthorized",
            Self::Forbidden => "forbidden",
            Self::NotFound => "not_found",
            Self::ServerError => "server_error",
            Self::NetworkError => "network_error",
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// A classified failure, ready to be shown.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ErrorAlert {
    /// The failure category.
    pub category: ErrorCategory,
    /// Alert title.
    pub title: String,
    /// Alert message.
    pub message: String,
}

impl ErrorAlert {
    /// Classify a request error.
    ///
    /// Timeouts take precedence, then the exact statuses 401, 403, 404 and
    /// 500, then any other 5xx. Everything else is a network error.
    pub fn classify(error: &RequestError) -> Self {
        let (category, message) = match error {
            RequestError::Timeout { .. } => (
                ErrorCategory::Timeout,
                "Network request timeout, please check your network connection",
            ),
            RequestError::HttpStatus { status: 401, .. } => (
                ErrorCategory::Unauthorized,
                "Login has expired, please log in again",
            ),
            RequestError::HttpStatus { status: 403, .. } => (
                ErrorCategory::Forbidden,
                "No permission to access this resource",
            ),
            RequestError::HttpStatus { status: 404, .. } => (
                ErrorCategory::NotFound,
                "The requested resource does not exist",
            ),
            RequestError::HttpStatus { status: 500, .. } => {
                (ErrorCategory::ServerError, "Internal server error")
            }
            RequestError::HttpStatus { status, .. } if *status >= 500 => (
                ErrorCategory::ServerError,
                "Server exception, please try again later",
            ),
            _ => (
                ErrorCategory::NetworkError,
                "Network request failed, please try again later",
            ),
        };

        Self {
            category,
            title: ALERT_TITLE.to_string(),
            message: message.to_string(),
        }
    }

    /// The suppression key of this alert's category.
    pub fn key(&self) -> &'static str {
        self.category.key()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn status(status: u16) -> RequestError {
        RequestError::HttpStatus {
            status,
            status_text: String::new(),
            headers: http::HeaderMap::new(),
            url: "https://example.com".to_string(),
        }
    }

    #[test]
    fn test_status_categories() {
        assert_eq!(ErrorAlert::classify(&status(401)).category, ErrorCategory::Unauthorized);
        assert_eq!(ErrorAlert::classify(&status(403)).category, ErrorCategory::Forbidden);
        assert_eq!(ErrorAlert::classify(&status(404)).category, ErrorCategory::NotFound);
        assert_eq!(ErrorAlert::classify(&status(500)).category, ErrorCategory::ServerError);
        assert_eq!(ErrorAlert::classify(&status(503)).category, ErrorCategory::ServerError);
        assert_eq!(ErrorAlert::classify(&status(400)).category, ErrorCategory::NetworkError);
        assert_eq!(ErrorAlert::classify(&status(429)).category, ErrorCategory::NetworkError);
    }

    #[test]
    fn test_exact_500_has_distinct_message() {
        let internal = ErrorAlert::classify(&status(500));
        let unavailable = ErrorAlert::classify(&status(502));
        assert_eq!(internal.message, "Internal server error");
        assert_eq!(unavailable.message, "Server exception, please try again later");
        assert_eq!(internal.key(), unavailable.key());
    }

    #[test]
    fn test_timeout() {
        let alert = ErrorAlert::classify(&RequestError::Timeout {
            timeout: Duration::from_secs(10),
        });
        assert_eq!(alert.category, ErrorCategory::Timeout);
        assert_eq!(alert.title, "Alert");
        assert_eq!(alert.key(), "timeout");
    }

    #[test]
    fn test_fallback_categories() {
        for error in [
            RequestError::Network("connection refused".into()),
            RequestError::Decode("expected value".into()),
            RequestError::interceptor("rejected"),
            RequestError::InvalidUrl("relative URL without a base".into()),
        ] {
            let alert = ErrorAlert::classify(&error);
            assert_eq!(alert.category, ErrorCategory::NetworkError);
            assert_eq!(alert.message, "Network request failed, please try again later");
        }
    }
}
