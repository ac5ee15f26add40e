//! HTTP response types.

use serde::de::DeserializeOwned;

use super::request::RequestConfig;
use crate::error::Result;

/// A decoded response body.
#[derive(Clone, Debug, PartialEq)]
pub enum ResponseData {
    /// The body of a response whose content type declared JSON.
    Json(serde_json::Value),
    /// The raw text body of any other response.
    Text(String),
}

impl ResponseData {
    /// The JSON value, if the body was JSON.
    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Text(_) => None,
        }
    }

    /// The text, if the body was not JSON.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Json(_) => None,
            Self::Text(text) => Some(text),
        }
    }

    /// Returns `true` if the body was decoded as JSON.
    pub fn is_json(&self) -> bool {
        matches!(self, Self::Json(_))
    }
}

/// A normalized response.
#[derive(Clone, Debug)]
pub struct HttpResponse {
    /// Decoded body.
    pub data: ResponseData,
    /// HTTP status code.
    pub status: u16,
    /// Canonical reason phrase for the status.
    pub status_text: String,
    /// Response headers.
    pub headers: http::HeaderMap,
    /// Final URL of the response.
    pub url: String,
    /// The request that produced this response.
    pub config: RequestConfig,
}

impl HttpResponse {
    /// Create a response without a transport round-trip.
    ///
    /// Useful for error interceptors that recover with a fallback value.
    pub fn new(status: u16, data: ResponseData, config: RequestConfig) -> Self {
        Self {
            data,
            status,
            status_text: status_text(status),
            headers: http::HeaderMap::new(),
            url: config.url.clone(),
            config,
        }
    }

    /// Check if the response indicates success (2xx status).
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Get a specific header value.
    pub fn header(&self, name: impl http::header::AsHeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Get the Content-Type header value.
    pub fn content_type(&self) -> Option<&str> {
        self.header(http::header::CONTENT_TYPE)
    }

    /// Deserialize the body into a typed value.
    ///
    /// Text bodies are parsed as JSON as well, so a server that forgets the
    /// content type can still be read.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        match &self.data {
            ResponseData::Json(value) => Ok(T::deserialize(value)?),
            ResponseData::Text(text) => Ok(serde_json::from_str(text)?),
        }
    }

    /// The body as text. JSON bodies are re-serialized.
    pub fn text(&self) -> String {
        match &self.data {
            ResponseData::Json(value) => value.to_string(),
            ResponseData::Text(text) => text.clone(),
        }
    }
}

/// Canonical reason phrase for a status code, empty if unknown.
pub(crate) fn status_text(status: u16) -> String {
    http::StatusCode::from_u16(status)
        .ok()
        .and_then(|code| code.canonical_reason())
        .unwrap_or_default()
        .to_string()
}

/// Returns `true` if a Content-Type value declares a JSON media type.
///
/// Matches `application/json` and structured `+json` suffixes such as
/// `application/problem+json`, ignoring parameters and case.
pub fn is_json_content_type(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    essence == "application/json" || (essence.starts_with("application/") && essence.ends_with("+json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;
    use std::time::Duration;

    #[derive(Debug, Deserialize, PartialEq)]
    struct User {
        id: u32,
        name: String,
    }

    fn config() -> RequestConfig {
        RequestConfig::new("https://api.example.com/users", Duration::from_secs(1))
    }

    #[test]
    fn test_json_content_types() {
        assert!(is_json_content_type("application/json"));
        assert!(is_json_content_type("application/json; charset=utf-8"));
        assert!(is_json_content_type("Application/JSON"));
        assert!(is_json_content_type("application/problem+json"));
        assert!(!is_json_content_type("text/plain"));
        assert!(!is_json_content_type("text/html; charset=utf-8"));
        assert!(!is_json_content_type(""));
    }

    #[test]
    fn test_typed_json() {
        let response = HttpResponse::new(200, ResponseData::Json(json!({"id": 1, "name": "John"})), config());
        let user: User = response.json().unwrap();
        assert_eq!(user, User { id: 1, name: "John".to_string() });
    }

    #[test]
    fn test_typed_json_from_text_body() {
        let response = HttpResponse::new(200, ResponseData::Text(r#"{"id":2,"name":"Ann"}"#.to_string()), config());
        let user: User = response.json().unwrap();
        assert_eq!(user.id, 2);
    }

    #[test]
    fn test_typed_json_mismatch() {
        let response = HttpResponse::new(200, ResponseData::Text("ok".to_string()), config());
        assert!(response.json::<User>().is_err());
    }

    #[test]
    fn test_synthetic_response() {
        let response = HttpResponse::new(200, ResponseData::Text("ok".to_string()), config());
        assert!(response.is_success());
        assert_eq!(response.status_text, "OK");
        assert_eq!(response.url, "https://api.example.com/users");
        assert_eq!(response.text(), "ok");
        assert!(response.content_type().is_none());
    }

    #[test]
    fn test_unknown_status_text() {
        assert_eq!(status_text(599), "");
        assert_eq!(status_text(404), "Not Found");
    }
}
