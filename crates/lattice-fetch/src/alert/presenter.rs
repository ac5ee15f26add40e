//! Alert display backends.

use crate::targets;

/// Displays a one-shot alert to the user.
///
/// Implemented for any `Fn(&str, &str)` closure taking the title and message.
pub trait AlertPresenter: Send + Sync {
    /// Show an alert.
    fn show(&self, title: &str, message: &str);
}

impl<F> AlertPresenter for F
where
    F: Fn(&str, &str) + Send + Sync,
{
    fn show(&self, title: &str, message: &str) {
        self(title, message)
    }
}

/// Presents alerts as `tracing` warnings.
///
/// This is the default presenter for headless processes.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogAlert;

impl AlertPresenter for LogAlert {
    fn show(&self, title: &str, message: &str) {
        tracing::warn!(target: targets::ALERT, title, "{}", message);
    }
}

/// Presents alerts as desktop notifications.
#[cfg(feature = "notifications")]
#[derive(Clone, Debug, Default)]
pub struct DesktopAlert {
    app_name: Option<String>,
}

#[cfg(feature = "notifications")]
impl DesktopAlert {
    /// Create a presenter using the default application name.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the application name shown by the notification server.
    pub fn app_name(mut self, name: impl Into<String>) -> Self {
        self.app_name = Some(name.into());
        self
    }
}

#[cfg(feature = "notifications")]
impl AlertPresenter for DesktopAlert {
    fn show(&self, title: &str, message: &str) {
        let mut notification = notify_rust::Notification::new();
        notification.summary(title).body(message);
        if let Some(ref name) = self.app_name {
            notification.appname(name);
        }

        // Alerts are best-effort; a missing notification server is not an error
        if let Err(e) = notification.show() {
            tracing::warn!(
                target: targets::ALERT,
                title,
                "Failed to show desktop notification: {}",
                e
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[test]
    fn test_closure_presenter() {
        let shown = Arc::new(Mutex::new(Vec::new()));
        let sink = shown.clone();
        let presenter = move |title: &str, message: &str| {
            sink.lock().push(format!("{title}: {message}"));
        };

        presenter.show("Alert", "boom");
        assert_eq!(*shown.lock(), vec!["Alert: boom".to_string()]);
    }

    #[test]
    fn test_log_presenter_is_object_safe() {
        let presenter: Arc<dyn AlertPresenter> = Arc::new(LogAlert);
        presenter.show("Alert", "logged");
    }
}
