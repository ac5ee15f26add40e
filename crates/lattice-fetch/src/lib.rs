//! An intercepting HTTP request pipeline.
//!
//! This crate layers cross-cutting request concerns over a raw transport:
//!
//! - **Authentication**: a bearer token read fresh from a key-value store for
//!   every request
//! - **Timeouts**: every transport call is raced against a timer
//! - **Normalization**: bodies are decoded as JSON or text depending on the
//!   declared content type, non-2xx statuses become errors
//! - **Interceptors**: ordered request and response/error hooks
//! - **Error alerts**: failures are classified and shown to the user, with
//!   repeated alerts of the same kind suppressed for a short window
//!
//! # Quick Start
//!
//! ```ignore
//! use lattice_fetch::{HttpClient, RequestOptions};
//!
//! let client = HttpClient::builder()
//!     .base_url("https://api.example.com")
//!     .build()?;
//!
//! client.set_token("secret").await;
//!
//! // GET https://api.example.com/users with `Authorization: Bearer secret`
//! let response = client.get("/users", RequestOptions::default()).await?;
//! let users: Vec<User> = response.json()?;
//!
//! // POST with a JSON body
//! client
//!     .post("/users", serde_json::json!({"name": "John"}), RequestOptions::default())
//!     .await?;
//! ```
//!
//! ## Interceptors
//!
//! ```ignore
//! use lattice_fetch::{ResponseInterceptor, HttpResponse, ResponseData};
//!
//! client.add_request_interceptor(|mut config| async move {
//!     config.headers.insert("x-request-source", "mobile".parse()?);
//!     Ok(config)
//! });
//!
//! // Recover from 404s with an empty list
//! client.add_response_interceptor(ResponseInterceptor::new().on_error(|error, config| {
//!     let config = config.clone();
//!     async move {
//!         match error.status() {
//!             Some(404) => Ok(HttpResponse::new(200, ResponseData::Json(serde_json::json!([])), config)),
//!             _ => Err(error),
//!         }
//!     }
//! }));
//! ```
//!
//! ## Error Alerts
//!
//! Alerts go through an [`ErrorNotifier`], an explicitly constructed service
//! that can be shared between clients:
//!
//! ```ignore
//! use lattice_fetch::{ErrorNotifier, HttpClient};
//!
//! let notifier = ErrorNotifier::new(|title: &str, message: &str| {
//!     eprintln!("{title}: {message}");
//! });
//!
//! let client = HttpClient::builder()
//!     .notifier(notifier.clone())
//!     .build()?;
//! ```

pub mod alert;
pub mod auth;
mod config;
mod error;
pub mod http;

pub use alert::{AlertPresenter, ErrorAlert, ErrorCategory, ErrorNotifier, LogAlert};
#[cfg(feature = "notifications")]
pub use alert::DesktopAlert;
pub use auth::{CredentialStore, JsonFileStore, KeyValueStore, MemoryStore, TOKEN_KEY};
pub use config::{ClientConfig, DEFAULT_TIMEOUT};
pub use error::{RequestError, Result};

// Re-export commonly used types at the crate root
pub use http::{
    FormFile, FormValue, HttpClient, HttpClientBuilder, HttpMethod, HttpResponse, InterceptorId,
    MultipartForm, ReqwestTransport, RequestBody, RequestConfig, RequestData, RequestOptions,
    ResponseData, ResponseInterceptor, Transport, TransportRequest, TransportResponse,
};

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Request pipeline target.
    pub const HTTP: &str = "lattice_fetch::http";
    /// Error alert target.
    pub const ALERT: &str = "lattice_fetch::alert";
    /// Credential storage target.
    pub const AUTH: &str = "lattice_fetch::auth";
    /// Configuration loading target.
    pub const CONFIG: &str = "lattice_fetch::config";
}
