//! HTTP request types.

use std::time::Duration;

use bytes::Bytes;
use serde::Serialize;

use super::multipart::MultipartForm;
use crate::error::Result;
use crate::targets;

/// HTTP request methods.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// HTTP GET method.
    #[default]
    Get,
    /// HTTP POST method.
    Post,
    /// HTTP PUT method.
    Put,
    /// HTTP DELETE method.
    Delete,
    /// HTTP PATCH method.
    Patch,
}

impl HttpMethod {
    /// The method name as sent on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Patch => "PATCH",
        }
    }

    /// Convert to reqwest method.
    pub(crate) fn to_reqwest(self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
            Self::Post => reqwest::Method::POST,
            Self::Put => reqwest::Method::PUT,
            Self::Delete => reqwest::Method::DELETE,
            Self::Patch => reqwest::Method::PATCH,
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The payload a caller hands to a request, before serialization.
#[derive(Clone, Debug, PartialEq)]
pub enum RequestData {
    /// A structured value, sent as a JSON document.
    Json(serde_json::Value),
    /// A pre-serialized text body, sent as-is.
    Text(String),
    /// A raw binary body, sent as-is.
    Bytes(Bytes),
    /// A multipart form; the transport sets the content type and boundary.
    Multipart(MultipartForm),
}

impl From<serde_json::Value> for RequestData {
    fn from(value: serde_json::Value) -> Self {
        Self::Json(value)
    }
}

impl From<String> for RequestData {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for RequestData {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<Bytes> for RequestData {
    fn from(bytes: Bytes) -> Self {
        Self::Bytes(bytes)
    }
}

impl From<Vec<u8>> for RequestData {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes.into())
    }
}

impl From<MultipartForm> for RequestData {
    fn from(form: MultipartForm) -> Self {
        Self::Multipart(form)
    }
}

/// The serialized body of a resolved request.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum RequestBody {
    /// No body.
    #[default]
    None,
    /// Text body (JSON documents are serialized into this variant).
    Text(String),
    /// Raw binary body.
    Bytes(Bytes),
    /// Multipart form body.
    Multipart(MultipartForm),
}

impl RequestBody {
    /// Returns `true` if there is no body.
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// The body as text, if it is a text body.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Serialize caller data into a body.
    ///
    /// `null` JSON values produce no body at all.
    pub(crate) fn from_data(data: RequestData) -> Self {
        match data {
            RequestData::Json(serde_json::Value::Null) => Self::None,
            RequestData::Json(value) => Self::Text(value.to_string()),
            RequestData::Text(text) => Self::Text(text),
            RequestData::Bytes(bytes) => Self::Bytes(bytes),
            RequestData::Multipart(form) => Self::Multipart(form),
        }
    }
}

/// Per-call options, merged over the client's defaults.
#[derive(Clone, Debug, Default)]
pub struct RequestOptions {
    /// HTTP method (GET when unset).
    pub method: Option<HttpMethod>,
    /// Headers that override the client's default headers.
    pub headers: http::HeaderMap,
    /// Request payload.
    pub data: Option<RequestData>,
    /// Timeout override for this request.
    pub timeout: Option<Duration>,
    /// Skip the user-visible alert if this request fails.
    pub suppress_error_alert: bool,
}

impl RequestOptions {
    /// Create empty options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the HTTP method.
    pub fn method(mut self, method: HttpMethod) -> Self {
        self.method = Some(method);
        self
    }

    /// Add a header. Invalid names or values are ignored.
    pub fn header(
        mut self,
        name: impl TryInto<http::HeaderName>,
        value: impl TryInto<http::HeaderValue>,
    ) -> Self {
        if let (Ok(name), Ok(value)) = (name.try_into(), value.try_into()) {
            self.headers.insert(name, value);
        }
        self
    }

    /// Add multiple headers.
    pub fn headers(mut self, headers: http::HeaderMap) -> Self {
        self.headers.extend(headers);
        self
    }

    /// Set the request payload.
    pub fn data(mut self, data: impl Into<RequestData>) -> Self {
        self.data = Some(data.into());
        self
    }

    /// Set a JSON payload from a serializable value.
    pub fn json<T: Serialize>(mut self, body: &T) -> Self {
        match serde_json::to_value(body) {
            Ok(value) => self.data = Some(RequestData::Json(value)),
            Err(e) => {
                tracing::error!(target: targets::HTTP, "Failed to serialize JSON body: {}", e);
            }
        }
        self
    }

    /// Set a timeout for this specific request.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Do not show an error alert if this request fails.
    pub fn suppress_error_alert(mut self) -> Self {
        self.suppress_error_alert = true;
        self
    }
}

/// A fully resolved request.
///
/// Request interceptors receive and return this value; once the transport
/// call is issued it is no longer modified and ends up in
/// [`HttpResponse::config`](super::HttpResponse::config).
#[derive(Clone, Debug)]
pub struct RequestConfig {
    /// Absolute request URL.
    pub url: String,
    /// The HTTP method.
    pub method: HttpMethod,
    /// Merged request headers.
    pub headers: http::HeaderMap,
    /// Serialized request body.
    pub body: RequestBody,
    /// Time allowed for the transport to answer.
    pub timeout: Duration,
    /// Whether a failure of this request skips the user-visible alert.
    pub suppress_error_alert: bool,
}

impl RequestConfig {
    /// Create a GET config for the given URL with no headers or body.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            method: HttpMethod::Get,
            headers: http::HeaderMap::new(),
            body: RequestBody::None,
            timeout,
            suppress_error_alert: false,
        }
    }

    /// Set `Authorization: Bearer <token>`.
    pub fn set_bearer_token(&mut self, token: &str) -> Result<()> {
        let mut value = http::HeaderValue::try_from(format!("Bearer {token}"))?;
        value.set_sensitive(true);
        self.headers.insert(http::header::AUTHORIZATION, value);
        Ok(())
    }

    /// Get a header value as a string.
    pub fn header(&self, name: impl http::header::AsHeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_null_json_has_no_body() {
        assert!(RequestBody::from_data(RequestData::Json(json!(null))).is_none());
    }

    #[test]
    fn test_json_is_serialized() {
        let body = RequestBody::from_data(json!({"name": "John", "tags": [1, 2]}).into());
        let text = body.as_text().unwrap();
        let decoded: serde_json::Value = serde_json::from_str(text).unwrap();
        assert_eq!(decoded, json!({"name": "John", "tags": [1, 2]}));
    }

    #[test]
    fn test_text_passes_through() {
        let body = RequestBody::from_data("a=1&b=2".into());
        assert_eq!(body, RequestBody::Text("a=1&b=2".to_string()));
    }

    #[test]
    fn test_options_builder() {
        let options = RequestOptions::new()
            .method(HttpMethod::Put)
            .header("x-trace", "abc")
            .header("bad header", "ignored")
            .json(&json!({"id": 7}))
            .timeout(Duration::from_secs(2))
            .suppress_error_alert();

        assert_eq!(options.method, Some(HttpMethod::Put));
        assert_eq!(options.headers.len(), 1);
        assert_eq!(options.data, Some(RequestData::Json(json!({"id": 7}))));
        assert_eq!(options.timeout, Some(Duration::from_secs(2)));
        assert!(options.suppress_error_alert);
    }

    #[test]
    fn test_bearer_token_is_sensitive() {
        let mut config = RequestConfig::new("https://example.com", Duration::from_secs(1));
        config.set_bearer_token("abc").unwrap();

        let value = config.headers.get(http::header::AUTHORIZATION).unwrap();
        assert_eq!(value, "Bearer abc");
        assert!(value.is_sensitive());
    }

    #[test]
    fn test_bearer_token_rejects_newlines() {
        let mut config = RequestConfig::new("https://example.com", Duration::from_secs(1));
        assert!(config.set_bearer_token("abc\r\ndef").is_err());
    }

    #[test]
    fn test_method_display() {
        assert_eq!(HttpMethod::default(), HttpMethod::Get);
        assert_eq!(HttpMethod::Patch.to_string(), "PATCH");
    }
}
