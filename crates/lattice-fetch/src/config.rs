//! Client configuration.
//!
//! [`ClientConfig`] can be built in code or loaded from a TOML file:
//!
//! ```toml
//! base_url = "https://api.example.com"
//! timeout_ms = 15000
//! show_error_alert = true
//!
//! [headers]
//! Accept = "application/json"
//! ```

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{RequestError, Result};
use crate::targets;

/// Default request timeout (10 seconds).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(10_000);

/// Configuration owned by one [`HttpClient`](crate::HttpClient).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Prefix for request URLs that carry no scheme of their own.
    pub base_url: String,
    /// Default per-request timeout.
    #[serde(rename = "timeout_ms", with = "duration_ms")]
    pub timeout: Duration,
    /// Headers sent with every request unless overridden per call.
    pub headers: BTreeMap<String, String>,
    /// Whether failed requests raise user-visible alerts.
    pub show_error_alert: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            timeout: DEFAULT_TIMEOUT,
            headers: BTreeMap::new(),
            show_error_alert: true,
        }
    }
}

impl ClientConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load a configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| RequestError::Config(format!("{}: {e}", path.display())))?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(target: targets::CONFIG, path = %path.display(), "Loaded client configuration");
        Ok(config)
    }

    /// Convert the configured headers into a header map.
    pub fn header_map(&self) -> Result<http::HeaderMap> {
        let mut map = http::HeaderMap::with_capacity(self.headers.len());
        for (name, value) in &self.headers {
            let name = http::HeaderName::try_from(name.as_str())?;
            let value = http::HeaderValue::try_from(value.as_str())?;
            map.insert(name, value);
        }
        Ok(map)
    }
}

mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
