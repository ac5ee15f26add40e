//! Deduplicated alert delivery.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;

use super::category::ErrorAlert;
use super::presenter::{AlertPresenter, LogAlert};
use crate::targets;

/// How long an alert key stays suppressed after it was shown.
pub const SUPPRESSION_WINDOW: Duration = Duration::from_secs(3);

struct NotifierInner {
    presenter: Arc<dyn AlertPresenter>,
    window: Duration,
    /// Suppressed keys and the instant their suppression ends.
    suppressed: Mutex<HashMap<String, Instant>>,
}

/// Shows alerts, at most once per key within the suppression window.
///
/// Cloning is cheap and clones share the suppression table, so one notifier
/// can serve several clients. Expired entries are pruned lazily on each
/// call; no timers are spawned.
///
/// # Example
///
/// ```ignore
/// use lattice_fetch::ErrorNotifier;
///
/// let notifier = ErrorNotifier::default();
/// assert!(notifier.notify("timeout", "Alert", "Request timed out"));
/// // Suppressed for the next three seconds
/// assert!(!notifier.notify("timeout", "Alert", "Request timed out"));
/// ```
#[derive(Clone)]
pub struct ErrorNotifier {
    inner: Arc<NotifierInner>,
}

impl Default for ErrorNotifier {
    fn default() -> Self {
        Self::new(LogAlert)
    }
}

impl ErrorNotifier {
    /// Create a notifier that shows alerts through `presenter`.
    pub fn new(presenter: impl AlertPresenter + 'static) -> Self {
        Self::with_presenter(Arc::new(presenter))
    }

    /// Create a notifier from a shared presenter.
    pub fn with_presenter(presenter: Arc<dyn AlertPresenter>) -> Self {
        Self {
            inner: Arc::new(NotifierInner {
                presenter,
                window: SUPPRESSION_WINDOW,
                suppressed: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Use a different suppression window.
    ///
    /// Returns a notifier with its own, empty suppression table; existing
    /// clones are unaffected.
    pub fn with_window(self, window: Duration) -> Self {
        Self {
            inner: Arc::new(NotifierInner {
                presenter: self.inner.presenter.clone(),
                window,
                suppressed: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// The suppression window.
    pub fn window(&self) -> Duration {
        self.inner.window
    }

    /// Show an alert unless `key` is suppressed.
    ///
    /// Returns `true` if the alert was shown. The check and the marking
    /// happen under one lock, so concurrent calls with the same key show at
    /// most one alert.
    pub fn notify(&self, key: &str, title: &str, message: &str) -> bool {
        let now = Instant::now();
        {
            let mut suppressed = self.inner.suppressed.lock();
            suppressed.retain(|_, until| now < *until);

            if suppressed.contains_key(key) {
                tracing::debug!(target: targets::ALERT, key, "Alert suppressed");
                return false;
            }
            suppressed.insert(key.to_string(), now + self.inner.window);
        }

        // Lock released: the presenter may block or call back into the notifier
        self.inner.presenter.show(title, message);
        true
    }

    /// Show a classified alert, keyed by its category.
    pub fn notify_alert(&self, alert: &ErrorAlert) -> bool {
        self.notify(alert.key(), &alert.title, &alert.message)
    }

    /// Returns `true` if alerts for `key` are currently suppressed.
    pub fn is_suppressed(&self, key: &str) -> bool {
        let now = Instant::now();
        self.inner
            .suppressed
            .lock()
            .get(key)
            .is_some_and(|until| now < *until)
    }

    /// Lift the suppression of one key.
    pub fn clear(&self, key: &str) {
        self.inner.suppressed.lock().remove(key);
    }

    /// Lift every suppression.
    pub fn clear_all(&self) {
        self.inner.suppressed.lock().clear();
    }

    /// Keys currently suppressed, sorted.
    pub fn suppressed_keys(&self) -> Vec<String> {
        let now = Instant::now();
        let mut keys: Vec<String> = self
            .inner
            .suppressed
            .lock()
            .iter()
            .filter(|(_, until)| now < **until)
            .map(|(key, _)| key.clone())
            .collect();
        keys.sort();
        keys
    }
}

impl std::fmt::Debug for ErrorNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorNotifier")
            .field("window", &self.inner.window)
            .field("suppressed", &self.inner.suppressed.lock().len())
            .finish()
    }
}
