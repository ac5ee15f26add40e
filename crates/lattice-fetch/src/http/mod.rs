//! The request pipeline.
//!
//! [`HttpClient`] resolves each call into a [`RequestConfig`], runs it
//! through the request interceptors, races the [`Transport`] against the
//! request timeout, normalizes the result into an [`HttpResponse`] or a
//! [`RequestError`](crate::RequestError), and finally runs the response
//! interceptors.
//!
//! # Example
//!
//! ```ignore
//! use lattice_fetch::http::{FormFile, HttpClient, RequestOptions};
//!
//! let client = HttpClient::builder()
//!     .base_url("https://api.example.com")
//!     .build()?;
//!
//! let avatar = FormFile::from_path("avatar.png").await?.mime_type("image/png");
//! client
//!     .upload(
//!         "/me/avatar",
//!         avatar,
//!         RequestOptions::new().data(serde_json::json!({"visibility": "public"})),
//!     )
//!     .await?;
//! ```

mod client;
mod interceptor;
mod multipart;
mod request;
mod response;
mod transport;

pub use client::{HttpClient, HttpClientBuilder};
pub use interceptor::{
    ErrorHandler, InterceptorFuture, InterceptorId, RequestInterceptor, ResponseInterceptor,
    SuccessHandler, request_interceptor,
};
pub use multipart::{FormFile, FormValue, MultipartForm};
pub use request::{HttpMethod, RequestBody, RequestConfig, RequestData, RequestOptions};
pub use response::{HttpResponse, ResponseData, is_json_content_type};
pub use transport::{
    ReqwestTransport, ReqwestTransportBuilder, Transport, TransportConfig, TransportRequest,
    TransportResponse,
};
