//! Client configuration.

use std::time::Duration;

use serde::Deserialize;

use crate::error::{Result, ZarazError};

pub const DEFAULT_BASE_URL: &str = "https://api.cloudflare.com/client/v4";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const BASE_URL_ENV: &str = "ZARAZ_API_BASE_URL";
const TIMEOUT_ENV: &str = "ZARAZ_API_TIMEOUT_SECS";

/// Settings for building a `Dispatcher` over the reqwest transport.
///
/// Credentials are not part of this: callers that need authentication pass
/// their own `reqwest::Client` with default headers to `ReqwestTransport::new`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    #[serde(with = "secs")]
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: concat!("zaraz-core/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Defaults overridden by `ZARAZ_API_BASE_URL` and `ZARAZ_API_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(base_url) = lookup(BASE_URL_ENV) {
            config.base_url = base_url;
        }
        if let Some(raw) = lookup(TIMEOUT_ENV) {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                ZarazError::Config(format!("{TIMEOUT_ENV} must be a whole number of seconds, got {raw:?}"))
            })?;
            config.timeout = Duration::from_secs(secs);
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ZarazError::Config(format!(
                "base URL must start with http:// or https://, got: {}",
                self.base_url
            )));
        }
        Ok(())
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

mod secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}
