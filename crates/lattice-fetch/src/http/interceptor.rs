//! Request and response interceptors.
//!
//! Interceptors run in registration order. A request interceptor receives the
//! resolved [`RequestConfig`] and returns the config to use next. A response
//! interceptor carries an optional success handler and an optional error
//! handler; the error handler may recover by returning a response.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use parking_lot::RwLock;

use super::request::RequestConfig;
use super::response::HttpResponse;
use crate::error::{RequestError, Result};

/// The future returned by every interceptor.
pub type InterceptorFuture<T> = BoxFuture<'static, Result<T>>;

/// Type alias for request interceptors.
///
/// Returning an error skips the transport and routes the error through the
/// response interceptors' error handlers.
pub type RequestInterceptor =
    Arc<dyn Fn(RequestConfig) -> InterceptorFuture<RequestConfig> + Send + Sync>;

/// Handler called with each successful response.
pub type SuccessHandler = Arc<dyn Fn(HttpResponse) -> InterceptorFuture<HttpResponse> + Send + Sync>;

/// Handler called with each failure.
///
/// Returning `Ok` turns the failure into a success for later interceptors and
/// the caller.
pub type ErrorHandler =
    Arc<dyn Fn(RequestError, &RequestConfig) -> InterceptorFuture<HttpResponse> + Send + Sync>;

/// Wrap an async closure as a [`RequestInterceptor`].
pub fn request_interceptor<F, Fut>(f: F) -> RequestInterceptor
where
    F: Fn(RequestConfig) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<RequestConfig>> + Send + 'static,
{
    Arc::new(move |config| f(config).boxed())
}

/// A pair of optional success and error handlers.
#[derive(Clone, Default)]
pub struct ResponseInterceptor {
    on_success: Option<SuccessHandler>,
    on_error: Option<ErrorHandler>,
}

impl ResponseInterceptor {
    /// Create an interceptor with no handlers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the handler for successful responses.
    pub fn on_success<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(HttpResponse) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HttpResponse>> + Send + 'static,
    {
        let handler: SuccessHandler = Arc::new(move |response| f(response).boxed());
        self.on_success = Some(handler);
        self
    }

    /// Set the handler for failures.
    ///
    /// The handler also sees the request config that failed, which is the
    /// last config produced by the request interceptors.
    pub fn on_error<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(RequestError, &RequestConfig) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HttpResponse>> + Send + 'static,
    {
        let handler: ErrorHandler =
            Arc::new(move |error, config: &RequestConfig| f(error, config).boxed());
        self.on_error = Some(handler);
        self
    }

    /// Returns `true` if a success handler is set.
    pub fn has_success_handler(&self) -> bool {
        self.on_success.is_some()
    }

    /// Returns `true` if an error handler is set.
    pub fn has_error_handler(&self) -> bool {
        self.on_error.is_some()
    }
}

impl std::fmt::Debug for ResponseInterceptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseInterceptor")
            .field("on_success", &self.has_success_handler())
            .field("on_error", &self.has_error_handler())
            .finish()
    }
}

/// Handle returned when an interceptor is registered, used to eject it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct InterceptorId(u64);

/// An ordered, shared list of interceptors.
///
/// Each request works on a snapshot, so registering or ejecting an
/// interceptor never affects a request already in flight.
pub(crate) struct InterceptorChain<T> {
    entries: RwLock<Vec<(InterceptorId, T)>>,
    next_id: AtomicU64,
}

impl<T: Clone> InterceptorChain<T> {
    pub(crate) fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(0),
        }
    }

    pub(crate) fn push(&self, interceptor: T) -> InterceptorId {
        let id = InterceptorId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.entries.write().push((id, interceptor));
        id
    }

    /// Remove an interceptor. Returns `false` if it was not registered.
    pub(crate) fn eject(&self, id: InterceptorId) -> bool {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|(entry_id, _)| *entry_id != id);
        entries.len() != before
    }

    pub(crate) fn snapshot(&self) -> Vec<T> {
        self.entries.read().iter().map(|(_, t)| t.clone()).collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.read().len()
    }
}

/// Run the request interceptors in order.
///
/// On failure the error is returned with the last config that entered the
/// failing stage, so error handlers still have a request to look at.
pub(crate) async fn run_request_chain(
    interceptors: &[RequestInterceptor],
    mut config: RequestConfig,
) -> std::result::Result<RequestConfig, (RequestError, RequestConfig)> {
    for interceptor in interceptors {
        let snapshot = config.clone();
        config = match interceptor(config).await {
            Ok(next) => next,
            Err(e) => return Err((e, snapshot)),
        };
    }
    Ok(config)
}

/// Run the response interceptors in order over a settled result.
///
/// Each stage sees the outcome of the previous one: an error handler that
/// recovers hands its response to the next success handler, and a success
/// handler that fails hands its error to the next error handler.
pub(crate) async fn run_response_chain(
    interceptors: &[ResponseInterceptor],
    mut result: Result<HttpResponse>,
    config: &RequestConfig,
) -> Result<HttpResponse> {
    for interceptor in interceptors {
        result = match result {
            Ok(response) => match &interceptor.on_success {
                Some(handler) => handler(response).await,
                None => Ok(response),
            },
            Err(error) => match &interceptor.on_error {
                Some(handler) => handler(error, config).await,
                None => Err(error),
            },
        };
    }
    result
}
