//! The network transport behind the pipeline.
//!
//! The pipeline talks to the network through the [`Transport`] trait. The
//! default implementation, [`ReqwestTransport`], wraps a `reqwest::Client`.
//! Tests and embedders can provide their own implementation.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::redirect::Policy;

use super::request::{HttpMethod, RequestBody, RequestConfig};
use crate::error::{RequestError, Result};

/// The part of a [`RequestConfig`] that goes on the wire.
#[derive(Clone, Debug)]
pub struct TransportRequest {
    /// The HTTP method.
    pub method: HttpMethod,
    /// Absolute request URL.
    pub url: String,
    /// Request headers.
    pub headers: http::HeaderMap,
    /// Request body.
    pub body: RequestBody,
}

impl From<&RequestConfig> for TransportRequest {
    fn from(config: &RequestConfig) -> Self {
        Self {
            method: config.method,
            url: config.url.clone(),
            headers: config.headers.clone(),
            body: config.body.clone(),
        }
    }
}

enum ResponseBody {
    Buffered(Bytes),
    Reqwest(reqwest::Response),
}

/// A response as returned by the transport, before normalization.
///
/// The body is read lazily so that the pipeline can reject error statuses
/// without touching it.
pub struct TransportResponse {
    status: u16,
    status_text: String,
    headers: http::HeaderMap,
    url: String,
    body: ResponseBody,
}

impl TransportResponse {
    /// Create a response with an in-memory body.
    pub fn new(status: u16, headers: http::HeaderMap, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            status_text: super::response::status_text(status),
            headers,
            url: String::new(),
            body: ResponseBody::Buffered(body.into()),
        }
    }

    /// Set the final URL of the response.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Create from a reqwest response.
    pub(crate) fn from_reqwest(response: reqwest::Response) -> Self {
        let status = response.status();
        Self {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            headers: response.headers().clone(),
            url: response.url().to_string(),
            body: ResponseBody::Reqwest(response),
        }
    }

    /// Get the HTTP status code.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Get the canonical reason phrase.
    pub fn status_text(&self) -> &str {
        &self.status_text
    }

    /// Check if the response indicates success (2xx status).
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Get the response headers.
    pub fn headers(&self) -> &http::HeaderMap {
        &self.headers
    }

    /// Get a specific header value.
    pub fn header(&self, name: impl http::header::AsHeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Get the final URL. Empty if the transport does not report one.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Split off the metadata, leaving the body to be read.
    pub(crate) fn into_parts(self) -> (u16, String, http::HeaderMap, String, TransportBody) {
        (
            self.status,
            self.status_text,
            self.headers,
            self.url,
            TransportBody(self.body),
        )
    }

    /// Get the response body as raw bytes.
    pub async fn bytes(self) -> Result<Bytes> {
        TransportBody(self.body).bytes().await
    }

    /// Get the response body as text.
    pub async fn text(self) -> Result<String> {
        TransportBody(self.body).text().await
    }
}

impl std::fmt::Debug for TransportResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportResponse")
            .field("status", &self.status)
            .field("url", &self.url)
            .finish()
    }
}

/// An unread response body.
pub(crate) struct TransportBody(ResponseBody);

impl TransportBody {
    pub(crate) async fn bytes(self) -> Result<Bytes> {
        match self.0 {
            ResponseBody::Buffered(bytes) => Ok(bytes),
            ResponseBody::Reqwest(response) => Ok(response.bytes().await?),
        }
    }

    pub(crate) async fn text(self) -> Result<String> {
        match self.0 {
            ResponseBody::Buffered(bytes) => Ok(String::from_utf8_lossy(&bytes).into_owned()),
            ResponseBody::Reqwest(response) => Ok(response.text().await?),
        }
    }
}

/// A fetch-style network transport.
///
/// Implementations return every HTTP response, including error statuses, as
/// `Ok`; `Err` is reserved for failures that produced no response at all.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a request and wait for the response head.
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse>;
}

/// Configuration for [`ReqwestTransport`].
#[derive(Clone, Debug)]
pub struct TransportConfig {
    /// Connect timeout.
    pub connect_timeout: Option<Duration>,
    /// Whether to follow redirects.
    pub follow_redirects: bool,
    /// Maximum number of redirects to follow.
    pub max_redirects: usize,
    /// Whether to enable cookie storage.
    pub cookies_enabled: bool,
    /// Default user agent.
    pub user_agent: Option<String>,
    /// Proxy URL.
    pub proxy: Option<String>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Some(Duration::from_secs(10)),
            follow_redirects: true,
            max_redirects: 10,
            cookies_enabled: true,
            user_agent: Some(format!("LatticeFetch/{} (Rust)", env!("CARGO_PKG_VERSION"))),
            proxy: None,
        }
    }
}

/// Builder for a [`ReqwestTransport`].
#[derive(Default)]
pub struct ReqwestTransportBuilder {
    config: TransportConfig,
}

impl ReqwestTransportBuilder {
    /// Create a new builder with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the connect timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = Some(timeout);
        self
    }

    /// Disable redirect following.
    pub fn no_redirects(mut self) -> Self {
        self.config.follow_redirects = false;
        self
    }

    /// Set the maximum number of redirects to follow.
    pub fn max_redirects(mut self, max: usize) -> Self {
        self.config.max_redirects = max;
        self
    }

    /// Disable cookie storage.
    pub fn no_cookies(mut self) -> Self {
        self.config.cookies_enabled = false;
        self
    }

    /// Set the user agent string.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = Some(user_agent.into());
        self
    }

    /// Set a proxy URL.
    pub fn proxy(mut self, proxy_url: impl Into<String>) -> Self {
        self.config.proxy = Some(proxy_url.into());
        self
    }

    /// Build the transport.
    ///
    /// No total timeout is configured on the reqwest client: the pipeline
    /// enforces its own per-request timeout.
    pub fn build(self) -> Result<ReqwestTransport> {
        let mut builder = reqwest::Client::builder();

        if let Some(connect_timeout) = self.config.connect_timeout {
            builder = builder.connect_timeout(connect_timeout);
        }

        if self.config.follow_redirects {
            builder = builder.redirect(Policy::limited(self.config.max_redirects));
        } else {
            builder = builder.redirect(Policy::none());
        }

        if self.config.cookies_enabled {
            builder = builder.cookie_store(true);
        }

        if let Some(ref ua) = self.config.user_agent {
            builder = builder.user_agent(ua);
        }

        if let Some(ref proxy_url) = self.config.proxy {
            let proxy = reqwest::Proxy::all(proxy_url)
                .map_err(|e| RequestError::InvalidUrl(format!("proxy: {e}")))?;
            builder = builder.proxy(proxy);
        }

        Ok(ReqwestTransport {
            client: builder.build()?,
            config: self.config,
        })
    }
}

/// A [`Transport`] backed by `reqwest`.
///
/// Cheaply cloneable; clones share the connection pool.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    config: TransportConfig,
}

impl ReqwestTransport {
    /// Create a transport with default configuration.
    pub fn new() -> Result<Self> {
        ReqwestTransportBuilder::new().build()
    }

    /// Create a builder for configuring a new transport.
    pub fn builder() -> ReqwestTransportBuilder {
        ReqwestTransportBuilder::new()
    }

    /// Get the transport's configuration.
    pub fn config(&self) -> &TransportConfig {
        &self.config
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse> {
        let url = url::Url::parse(&request.url)?;

        let mut req_builder = self
            .client
            .request(request.method.to_reqwest(), url)
            .headers(request.headers);

        match request.body {
            RequestBody::None => {}
            RequestBody::Text(text) => {
                req_builder = req_builder.body(text);
            }
            RequestBody::Bytes(bytes) => {
                req_builder = req_builder.body(bytes);
            }
            RequestBody::Multipart(form) => {
                req_builder = req_builder.multipart(form.into_reqwest());
            }
        }

        let response = req_builder.send().await?;
        Ok(TransportResponse::from_reqwest(response))
    }
}

impl std::fmt::Debug for ReqwestTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReqwestTransport")
            .field("config", &self.config)
            .finish()
    }
}
