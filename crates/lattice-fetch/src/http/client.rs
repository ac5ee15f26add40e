//! The request pipeline and its convenience surface.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use serde_json::Value;

use super::interceptor::{
    InterceptorChain, InterceptorId, RequestInterceptor, ResponseInterceptor, request_interceptor,
    run_request_chain, run_response_chain,
};
use super::multipart::{FormFile, MultipartForm};
use super::request::{HttpMethod, RequestBody, RequestConfig, RequestData, RequestOptions};
use super::response::{HttpResponse, ResponseData, is_json_content_type};
use super::transport::{ReqwestTransport, Transport, TransportRequest};
use crate::alert::{AlertPresenter, ErrorAlert, ErrorCategory, ErrorNotifier};
use crate::auth::{CredentialStore, KeyValueStore, MemoryStore, TOKEN_KEY};
use crate::config::ClientConfig;
use crate::error::{RequestError, Result};
use crate::targets;

/// Builder for creating an [`HttpClient`].
pub struct HttpClientBuilder {
    config: ClientConfig,
    default_headers: http::HeaderMap,
    transport: Option<Arc<dyn Transport>>,
    storage: Option<Arc<dyn KeyValueStore>>,
    token_key: String,
    notifier: Option<ErrorNotifier>,
    alert_presenter: Option<Arc<dyn AlertPresenter>>,
    default_interceptors: bool,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClientBuilder {
    /// Create a new builder with default configuration.
    pub fn new() -> Self {
        Self {
            config: ClientConfig::default(),
            default_headers: http::HeaderMap::new(),
            transport: None,
            storage: None,
            token_key: TOKEN_KEY.to_string(),
            notifier: None,
            alert_presenter: None,
            default_interceptors: true,
        }
    }

    /// Replace the whole client configuration.
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the prefix for request URLs without a scheme.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = base_url.into();
        self
    }

    /// Set the default request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Add a default header that will be sent with every request.
    pub fn default_header(
        mut self,
        name: impl TryInto<http::HeaderName>,
        value: impl TryInto<http::HeaderValue>,
    ) -> Result<Self> {
        let name = name
            .try_into()
            .map_err(|_| RequestError::InvalidHeader("Invalid header name".to_string()))?;
        let value = value
            .try_into()
            .map_err(|_| RequestError::InvalidHeader("Invalid header value".to_string()))?;
        self.default_headers.insert(name, value);
        Ok(self)
    }

    /// Set whether failed requests raise user-visible alerts.
    pub fn show_error_alert(mut self, show: bool) -> Self {
        self.config.show_error_alert = show;
        self
    }

    /// Use a custom transport instead of [`ReqwestTransport`].
    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Use a custom key-value store for the credential token.
    ///
    /// Defaults to an in-process [`MemoryStore`].
    pub fn storage(mut self, storage: impl KeyValueStore + 'static) -> Self {
        self.storage = Some(Arc::new(storage));
        self
    }

    /// Set the storage key of the credential token.
    pub fn token_key(mut self, key: impl Into<String>) -> Self {
        self.token_key = key.into();
        self
    }

    /// Share an existing notifier with this client.
    pub fn notifier(mut self, notifier: ErrorNotifier) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Show alerts through this presenter.
    ///
    /// Ignored when a notifier is set with [`notifier`](Self::notifier).
    pub fn alert_presenter(mut self, presenter: impl AlertPresenter + 'static) -> Self {
        self.alert_presenter = Some(Arc::new(presenter));
        self
    }

    /// Whether to install the bearer token and error alert interceptors.
    pub fn with_default_interceptors(mut self, enabled: bool) -> Self {
        self.default_interceptors = enabled;
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<HttpClient> {
        let mut default_headers = self.config.header_map()?;
        default_headers.extend(self.default_headers);

        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new()?),
        };

        let storage: Arc<dyn KeyValueStore> = match self.storage {
            Some(storage) => storage,
            None => Arc::new(MemoryStore::new()),
        };
        let credentials = CredentialStore::new(storage).with_key(self.token_key);

        let notifier = match (self.notifier, self.alert_presenter) {
            (Some(notifier), presenter) => {
                if presenter.is_some() {
                    tracing::warn!(
                        target: targets::ALERT,
                        "Both a notifier and an alert presenter were given; using the notifier"
                    );
                }
                notifier
            }
            (None, Some(presenter)) => ErrorNotifier::with_presenter(presenter),
            (None, None) => ErrorNotifier::default(),
        };

        let base_url = self.config.base_url;

        let inner = HttpClientInner {
            base_url,
            timeout: self.config.timeout,
            default_headers,
            show_error_alert: AtomicBool::new(self.config.show_error_alert),
            transport,
            credentials,
            notifier,
            request_interceptors: InterceptorChain::new(),
            response_interceptors: InterceptorChain::new(),
        };

        if self.default_interceptors {
            inner
                .request_interceptors
                .push(bearer_token_interceptor(inner.credentials.clone()));
            inner.response_interceptors.push(error_alert_interceptor(
                inner.credentials.clone(),
                inner.notifier.clone(),
            ));
        }

        tracing::debug!(
            target: targets::HTTP,
            base_url = %inner.base_url,
            timeout_ms = inner.timeout.as_millis() as u64,
            "Created HTTP client"
        );

        Ok(HttpClient {
            inner: Arc::new(inner),
        })
    }
}

/// Internal state for the HTTP client.
struct HttpClientInner {
    base_url: String,
    timeout: Duration,
    default_headers: http::HeaderMap,
    show_error_alert: AtomicBool,
    transport: Arc<dyn Transport>,
    credentials: CredentialStore,
    notifier: ErrorNotifier,
    request_interceptors: InterceptorChain<RequestInterceptor>,
    response_interceptors: InterceptorChain<ResponseInterceptor>,
}

/// An HTTP client with interceptors, timeouts and error alerts.
///
/// The client is cheaply cloneable and thread-safe. Clones share the same
/// transport, interceptors and alert toggle.
///
/// # Example
///
/// ```ignore
/// use lattice_fetch::{HttpClient, RequestOptions};
///
/// let client = HttpClient::builder()
///     .base_url("https://api.example.com")
///     .build()?;
///
/// let response = client.get("/users/1", RequestOptions::default()).await?;
/// println!("Status: {}", response.status);
/// ```
#[derive(Clone)]
pub struct HttpClient {
    inner: Arc<HttpClientInner>,
}

impl HttpClient {
    /// Create a client with default configuration and interceptors.
    pub fn new() -> Result<Self> {
        HttpClientBuilder::new().build()
    }

    /// Create a builder for configuring a new HTTP client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::new()
    }

    /// The base URL, as configured.
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// The default request timeout.
    pub fn timeout(&self) -> Duration {
        self.inner.timeout
    }

    /// The notifier this client reports failures to.
    pub fn notifier(&self) -> &ErrorNotifier {
        &self.inner.notifier
    }

    /// The credential store the bearer token is read from.
    pub fn credentials(&self) -> &CredentialStore {
        &self.inner.credentials
    }

    /// Build the config for a request without sending it.
    ///
    /// This is what request interceptors receive as input.
    pub fn resolve_config(&self, url: &str, options: RequestOptions) -> RequestConfig {
        let inner = &self.inner;

        let mut headers = inner.default_headers.clone();
        headers.extend(options.headers);

        let data = options.data;
        let is_multipart = matches!(data, Some(RequestData::Multipart(_)));
        let is_json = matches!(&data, Some(RequestData::Json(value)) if !value.is_null());
        let body = data.map(RequestBody::from_data).unwrap_or_default();

        if is_multipart {
            // The transport writes its own boundary
            headers.remove(http::header::CONTENT_TYPE);
        } else if is_json && !headers.contains_key(http::header::CONTENT_TYPE) {
            headers.insert(
                http::header::CONTENT_TYPE,
                http::HeaderValue::from_static("application/json"),
            );
        }

        RequestConfig {
            url: resolve_url(&inner.base_url, url),
            method: options.method.unwrap_or_default(),
            headers,
            body,
            timeout: options.timeout.unwrap_or(inner.timeout),
            suppress_error_alert: options.suppress_error_alert || !self.show_error_alert(),
        }
    }

    /// Send a request through the interceptor chains.
    pub async fn request(&self, url: &str, options: RequestOptions) -> Result<HttpResponse> {
        let config = self.resolve_config(url, options);

        let request_chain = self.inner.request_interceptors.snapshot();
        let response_chain = self.inner.response_interceptors.snapshot();

        let (result, config) = match run_request_chain(&request_chain, config).await {
            Ok(config) => (self.dispatch(&config).await, config),
            Err((error, config)) => (Err(error), config),
        };

        run_response_chain(&response_chain, result, &config).await
    }

    /// Send a config over the transport, raced against its timeout.
    async fn dispatch(&self, config: &RequestConfig) -> Result<HttpResponse> {
        tracing::debug!(
            target: targets::HTTP,
            method = %config.method,
            url = %config.url,
            timeout_ms = config.timeout.as_millis() as u64,
            "Sending request"
        );

        let timeout = config.timeout;
        if timeout.is_zero() {
            return Err(RequestError::Timeout { timeout });
        }

        let request = TransportRequest::from(config);
        let response = tokio::select! {
            biased;
            _ = tokio::time::sleep(timeout) => {
                return Err(RequestError::Timeout { timeout });
            }
            result = self.inner.transport.send(request) => result?,
        };

        let success = response.is_success();
        let (status, status_text, headers, url, body) = response.into_parts();
        let url = if url.is_empty() { config.url.clone() } else { url };

        if !success {
            return Err(RequestError::HttpStatus {
                status,
                status_text,
                headers,
                url,
            });
        }

        let text = body.text().await?;
        let is_json = headers
            .get(http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(is_json_content_type);

        let data = if !is_json {
            ResponseData::Text(text)
        } else if text.trim().is_empty() {
            ResponseData::Json(Value::Null)
        } else {
            ResponseData::Json(serde_json::from_str(&text)?)
        };

        tracing::debug!(target: targets::HTTP, status, url = %url, "Request completed");

        Ok(HttpResponse {
            data,
            status,
            status_text,
            headers,
            url,
            config: config.clone(),
        })
    }

    /// Send a GET request.
    pub async fn get(&self, url: &str, options: RequestOptions) -> Result<HttpResponse> {
        self.request(url, options.method(HttpMethod::Get)).await
    }

    /// Send a DELETE request.
    pub async fn delete(&self, url: &str, options: RequestOptions) -> Result<HttpResponse> {
        self.request(url, options.method(HttpMethod::Delete)).await
    }

    /// Send a POST request with a body.
    ///
    /// Pass `Value::Null` to send no body.
    pub async fn post(
        &self,
        url: &str,
        data: impl Into<RequestData>,
        options: RequestOptions,
    ) -> Result<HttpResponse> {
        self.request(url, options.method(HttpMethod::Post).data(data))
            .await
    }

    /// Send a PUT request with a body.
    pub async fn put(
        &self,
        url: &str,
        data: impl Into<RequestData>,
        options: RequestOptions,
    ) -> Result<HttpResponse> {
        self.request(url, options.method(HttpMethod::Put).data(data))
            .await
    }

    /// Send a PATCH request with a body.
    pub async fn patch(
        &self,
        url: &str,
        data: impl Into<RequestData>,
        options: RequestOptions,
    ) -> Result<HttpResponse> {
        self.request(url, options.method(HttpMethod::Patch).data(data))
            .await
    }

    /// Upload a file as a multipart POST.
    ///
    /// The file is sent under the field name `file`. If `options.data` is a
    /// JSON object, each of its entries becomes an extra text field: strings
    /// are sent as-is, other values JSON-encoded.
    pub async fn upload(
        &self,
        url: &str,
        file: FormFile,
        mut options: RequestOptions,
    ) -> Result<HttpResponse> {
        let mut form = MultipartForm::new().file("file", file);

        match options.data.take() {
            Some(RequestData::Json(Value::Object(fields))) => {
                for (name, value) in fields {
                    let value = match value {
                        Value::String(text) => text,
                        other => other.to_string(),
                    };
                    form = form.text(name, value);
                }
            }
            Some(RequestData::Json(Value::Null)) | None => {}
            Some(_) => {
                tracing::warn!(
                    target: targets::HTTP,
                    url,
                    "Upload data is not a JSON object; extra fields ignored"
                );
            }
        }

        self.request(url, options.method(HttpMethod::Post).data(form))
            .await
    }

    /// Persist the credential token.
    pub async fn set_token(&self, token: &str) {
        self.inner.credentials.set(token).await;
    }

    /// Read the credential token from storage.
    pub async fn get_token(&self) -> Option<String> {
        self.inner.credentials.get().await
    }

    /// Remove the credential token from storage.
    pub async fn clear_token(&self) {
        self.inner.credentials.remove().await;
    }

    /// Lift every active alert suppression.
    pub fn clear_error_alerts(&self) {
        self.inner.notifier.clear_all();
    }

    /// Enable or disable user-visible alerts for later requests.
    ///
    /// Credentials are still invalidated on 401 while alerts are disabled.
    pub fn set_show_error_alert(&self, show: bool) {
        self.inner.show_error_alert.store(show, Ordering::Relaxed);
    }

    /// Whether failed requests raise user-visible alerts.
    pub fn show_error_alert(&self) -> bool {
        self.inner.show_error_alert.load(Ordering::Relaxed)
    }

    /// Append an async request interceptor.
    ///
    /// # Example
    ///
    /// ```ignore
    /// client.add_request_interceptor(|mut config| async move {
    ///     config.headers.insert("x-client", "mobile".parse()?);
    ///     Ok(config)
    /// });
    /// ```
    pub fn add_request_interceptor<F, Fut>(&self, interceptor: F) -> InterceptorId
    where
        F: Fn(RequestConfig) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<RequestConfig>> + Send + 'static,
    {
        self.inner
            .request_interceptors
            .push(request_interceptor(interceptor))
    }

    /// Append a response interceptor.
    pub fn add_response_interceptor(&self, interceptor: ResponseInterceptor) -> InterceptorId {
        self.inner.response_interceptors.push(interceptor)
    }

    /// Remove a request interceptor. Returns `false` if it was not registered.
    pub fn eject_request_interceptor(&self, id: InterceptorId) -> bool {
        self.inner.request_interceptors.eject(id)
    }

    /// Remove a response interceptor. Returns `false` if it was not registered.
    pub fn eject_response_interceptor(&self, id: InterceptorId) -> bool {
        self.inner.response_interceptors.eject(id)
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("base_url", &self.inner.base_url)
            .field("timeout", &self.inner.timeout)
            .field("show_error_alert", &self.show_error_alert())
            .field("request_interceptors", &self.inner.request_interceptors.len())
            .field("response_interceptors", &self.inner.response_interceptors.len())
            .finish()
    }
}

/// Attaches `Authorization: Bearer <token>` when a token is stored.
fn bearer_token_interceptor(credentials: CredentialStore) -> RequestInterceptor {
    request_interceptor(move |mut config: RequestConfig| {
        let credentials = credentials.clone();
        async move {
            if let Some(token) = credentials.get().await
                && !token.is_empty()
            {
                config.set_bearer_token(&token)?;
            }
            Ok(config)
        }
    })
}

/// Logs and alerts on every failure, and drops the token on 401.
///
/// The error is always passed on.
fn error_alert_interceptor(
    credentials: CredentialStore,
    notifier: ErrorNotifier,
) -> ResponseInterceptor {
    ResponseInterceptor::new().on_error(move |error, config: &RequestConfig| {
        let credentials = credentials.clone();
        let notifier = notifier.clone();
        let method = config.method;
        let url = config.url.clone();
        let suppress = config.suppress_error_alert;

        async move {
            tracing::error!(
                target: targets::HTTP,
                %method,
                url = %url,
                error = %error,
                "Request failed"
            );

            let alert = ErrorAlert::classify(&error);
            if alert.category == ErrorCategory::Unauthorized {
                credentials.remove().await;
            }
            if !suppress {
                notifier.notify_alert(&alert);
            }
            Err(error)
        }
    })
}

/// Join a request URL onto the base URL.
///
/// URLs that carry their own scheme are used as-is.
fn resolve_url(base_url: &str, url: &str) -> String {
    if base_url.is_empty() || has_scheme(url) {
        return url.to_string();
    }
    match (base_url.ends_with('/'), url.strip_prefix('/')) {
        (true, Some(path)) => format!("{base_url}{path}"),
        (false, None) if !url.is_empty() && !url.starts_with('?') => format!("{base_url}/{url}"),
        _ => format!("{base_url}{url}"),
    }
}

fn has_scheme(url: &str) -> bool {
    let Some((scheme, _)) = url.split_once("://") else {
        return false;
    };
    let mut chars = scheme.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}
