//! Shared fixtures for the pipeline tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use lattice_fetch::{
    AlertPresenter, HttpClient, KeyValueStore, MemoryStore, RequestError, Result, Transport,
    TransportRequest, TransportResponse,
};
use parking_lot::Mutex;

/// What the scripted transport does with one request.
#[derive(Clone, Debug)]
pub enum Reply {
    /// Answer with a status, an optional content type and a body.
    Respond {
        status: u16,
        content_type: Option<String>,
        body: String,
    },
    /// Fail without a response.
    Fail(RequestError),
    /// Never answer.
    Hang,
}

impl Reply {
    pub fn json(status: u16, value: serde_json::Value) -> Self {
        Self::Respond {
            status,
            content_type: Some("application/json; charset=utf-8".to_string()),
            body: value.to_string(),
        }
    }

    pub fn text(status: u16, body: &str) -> Self {
        Self::Respond {
            status,
            content_type: Some("text/plain".to_string()),
            body: body.to_string(),
        }
    }

    pub fn raw(status: u16, content_type: &str, body: &str) -> Self {
        Self::Respond {
            status,
            content_type: Some(content_type.to_string()),
            body: body.to_string(),
        }
    }
}

struct ScriptedInner {
    replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<TransportRequest>>,
}

/// A transport that answers from a script and records what it was sent.
///
/// Replies are used in order; the last one repeats.
#[derive(Clone)]
pub struct ScriptedTransport {
    inner: Arc<ScriptedInner>,
    delay: Option<Duration>,
}

impl ScriptedTransport {
    pub fn new(replies: impl IntoIterator<Item = Reply>) -> Self {
        Self {
            inner: Arc::new(ScriptedInner {
                replies: Mutex::new(replies.into_iter().collect()),
                requests: Mutex::new(Vec::new()),
            }),
            delay: None,
        }
    }

    /// Answer every request after `delay`.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn requests(&self) -> Vec<TransportRequest> {
        self.inner.requests.lock().clone()
    }

    pub fn last_request(&self) -> TransportRequest {
        self.inner
            .requests
            .lock()
            .last()
            .cloned()
            .expect("no request was sent")
    }

    fn next_reply(&self) -> Reply {
        let mut replies = self.inner.replies.lock();
        let reply = if replies.len() > 1 {
            replies.pop_front()
        } else {
            replies.front().cloned()
        };
        reply.unwrap_or_else(|| Reply::text(200, ""))
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse> {
        let url = request.url.clone();
        self.inner.requests.lock().push(request);
        let reply = self.next_reply();

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match reply {
            Reply::Respond {
                status,
                content_type,
                body,
            } => {
                let mut headers = http::HeaderMap::new();
                if let Some(content_type) = content_type {
                    headers.insert(http::header::CONTENT_TYPE, content_type.parse().unwrap());
                }
                Ok(TransportResponse::new(status, headers, body).with_url(url))
            }
            Reply::Fail(error) => Err(error),
            Reply::Hang => std::future::pending().await,
        }
    }
}

/// Records every alert it is asked to show.
#[derive(Clone, Default)]
pub struct RecordingAlert {
    shown: Arc<Mutex<Vec<(String, String)>>>,
}

impl RecordingAlert {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.shown.lock().iter().map(|(_, m)| m.clone()).collect()
    }

    pub fn count(&self) -> usize {
        self.shown.lock().len()
    }
}

impl AlertPresenter for RecordingAlert {
    fn show(&self, title: &str, message: &str) {
        self.shown
            .lock()
            .push((title.to_string(), message.to_string()));
    }
}

/// A store whose every operation fails.
#[derive(Clone, Copy, Default)]
pub struct FailingStore;

#[async_trait]
impl KeyValueStore for FailingStore {
    async fn get_item(&self, _key: &str) -> Result<Option<String>> {
        Err(RequestError::Storage("disk unavailable".into()))
    }

    async fn set_item(&self, _key: &str, _value: &str) -> Result<()> {
        Err(RequestError::Storage("disk unavailable".into()))
    }

    async fn remove_item(&self, _key: &str) -> Result<()> {
        Err(RequestError::Storage("disk unavailable".into()))
    }
}

/// A client wired to scripted collaborators.
pub struct Harness {
    pub client: HttpClient,
    pub transport: ScriptedTransport,
    pub alerts: RecordingAlert,
    pub store: MemoryStore,
}

impl Harness {
    pub fn new(transport: ScriptedTransport) -> Self {
        let alerts = RecordingAlert::new();
        let store = MemoryStore::new();
        let client = HttpClient::builder()
            .base_url("https://api.test")
            .default_header("accept", "application/json")
            .unwrap()
            .transport(transport.clone())
            .storage(store.clone())
            .alert_presenter(alerts.clone())
            .build()
            .unwrap();

        Self {
            client,
            transport,
            alerts,
            store,
        }
    }

    pub fn replying(replies: impl IntoIterator<Item = Reply>) -> Self {
        Self::new(ScriptedTransport::new(replies))
    }
}
