//! User-facing error alerts.
//!
//! Failed requests are classified into an [`ErrorCategory`] and reported to an
//! [`ErrorNotifier`], which shows at most one alert per category within the
//! suppression window. Alerts are displayed by an [`AlertPresenter`].

mod category;
mod notifier;
mod presenter;

pub use category::{ErrorAlert, ErrorCategory};
pub use notifier::{ErrorNotifier, SUPPRESSION_WINDOW};
#[cfg(feature = "notifications")]
pub use presenter::DesktopAlert;
pub use presenter::{AlertPresenter, LogAlert};
