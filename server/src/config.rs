//! Runtime configuration for the proxy.
//!
//! Values come from defaults, then `CTGOV_*` environment variables, then
//! command-line overrides applied by the binary.

use std::time::Duration;

use ctgov_core::DEFAULT_BASE_URL;
use thiserror::Error;

/// Per-call deadline for the upstream GET.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub const ENV_BASE_URL: &str = "CTGOV_BASE_URL";
pub const ENV_TIMEOUT_SECS: &str = "CTGOV_TIMEOUT_SECS";
pub const ENV_USER_AGENT: &str = "CTGOV_USER_AGENT";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid {name} '{value}': expected a positive number of seconds")]
    InvalidTimeout { name: &'static str, value: String },

    #[error("invalid {name} '{value}': {reason}")]
    InvalidBaseUrl {
        name: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// API root, without a trailing slash requirement.
    pub base_url: String,
    pub timeout: Duration,
    /// Replaces the `User-Agent` of the emulated browser profile.
    pub user_agent: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: None,
        }
    }
}

impl ServerConfig {
    /// Defaults overlaid with the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overlaid with whatever `lookup` returns. Blank values are
    /// ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();
        if let Some(url) = get(ENV_BASE_URL) {
            config = config.with_base_url(url, ENV_BASE_URL)?;
        }
        if let Some(secs) = get(ENV_TIMEOUT_SECS) {
            config.timeout = parse_timeout(ENV_TIMEOUT_SECS, &secs)?;
        }
        if let Some(agent) = get(ENV_USER_AGENT) {
            config.user_agent = Some(agent);
        }
        Ok(config)
    }

    /// Replace the base URL after checking it is an absolute http(s) URL.
    pub fn with_base_url(
        mut self,
        url: String,
        source: &'static str,
    ) -> Result<Self, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidBaseUrl {
            name: source,
            value: url.clone(),
            reason,
        };
        let parsed = wreq::Url::parse(url.trim()).map_err(|e| invalid(e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme '{}'", parsed.scheme())));
        }
        self.base_url = url.trim().trim_end_matches('/').to_string();
        Ok(self)
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

fn parse_timeout(name: &'static str, value: &str) -> Result<Duration, ConfigError> {
    let invalid = || ConfigError::InvalidTimeout {
        name,
        value: value.to_string(),
    };
    let secs = value.trim().parse::<f64>().map_err(|_| invalid())?;
    timeout_from_secs(name, secs).map_err(|_| invalid())
}

/// A positive, finite number of seconds that fits in a `Duration`.
pub fn timeout_from_secs(name: &'static str, secs: f64) -> Result<Duration, ConfigError> {
    match Duration::try_from_secs_f64(secs) {
        Ok(timeout) if secs > 0.0 => Ok(timeout),
        _ => Err(ConfigError::InvalidTimeout {
            name,
            value: secs.to_string(),
        }),
    }
}
