//! Compositing service configuration.
//!
//! The base URL is always supplied by the environment. The web app
//! captures the variables at build time, the CLI reads them at runtime;
//! both go through [`ServiceConfig::from_env_values`].

use std::time::Duration;

use crate::request::EDIT_PATH;

/// Environment variable holding the service base URL.
pub const ENV_BASE_URL: &str = "BGCHANGER_API_BASE_URL";

/// Environment variable holding the request timeout in seconds.
pub const ENV_TIMEOUT_SECS: &str = "BGCHANGER_API_TIMEOUT_SECS";

/// Invalid or missing service configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// No base URL was provided.
    #[error("BGCHANGER_API_BASE_URL is not set")]
    MissingBaseUrl,

    /// The base URL is not an http(s) URL.
    #[error("invalid service base URL {0:?}: expected http:// or https://")]
    InvalidBaseUrl(String),

    /// The timeout is not a positive whole number of seconds.
    #[error("invalid BGCHANGER_API_TIMEOUT_SECS {0:?}: expected a positive number of seconds")]
    InvalidTimeout(String),
}

/// Where and how patiently to call the compositing service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    base_url: String,
    timeout: Duration,
}

impl ServiceConfig {
    /// Timeout used when none is configured.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

    /// Validate `base_url` and pair it with `timeout`.
    ///
    /// Trailing slashes are trimmed so [`ServiceConfig::edit_url`] never
    /// produces `//edit`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingBaseUrl`] for a blank URL and
    /// [`ConfigError::InvalidBaseUrl`] for a non-http(s) URL.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ConfigError> {
        let trimmed = base_url.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            return Err(ConfigError::MissingBaseUrl);
        }
        let has_host = ["http://", "https://"]
            .iter()
            .any(|scheme| trimmed.strip_prefix(scheme).is_some_and(|rest| !rest.is_empty()));
        if !has_host {
            return Err(ConfigError::InvalidBaseUrl(base_url.to_owned()));
        }
        Ok(Self {
            base_url: trimmed.to_owned(),
            timeout,
        })
    }

    /// Build from raw environment values.
    ///
    /// # Errors
    ///
    /// See [`ServiceConfig::new`]; additionally returns
    /// [`ConfigError::InvalidTimeout`] for a timeout that is not a
    /// positive integer.
    pub fn from_env_values(
        base_url: Option<&str>,
        timeout_secs: Option<&str>,
    ) -> Result<Self, ConfigError> {
        let timeout = match timeout_secs.map(str::trim).filter(|s| !s.is_empty()) {
            None => Self::DEFAULT_TIMEOUT,
            Some(raw) => raw
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .ok_or_else(|| ConfigError::InvalidTimeout(raw.to_owned()))?,
        };
        Self::new(base_url.ok_or(ConfigError::MissingBaseUrl)?, timeout)
    }

    /// Base URL without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Full URL of the edit endpoint.
    #[must_use]
    pub fn edit_url(&self) -> String {
        format!("{}{EDIT_PATH}", self.base_url)
    }
}
