//! Client configuration loaded from code, a config file or the environment.

use std::time::Duration;

use serde::Deserialize;

use crate::client::DEFAULT_ENDPOINT;
use crate::error::{Result, TranskitError};
use crate::http::UreqTransport;

pub const ENV_API_KEY: &str = "TRANSKIT_API_KEY";
pub const ENV_ENDPOINT: &str = "TRANSKIT_ENDPOINT";
pub const ENV_TIMEOUT_SECS: &str = "TRANSKIT_TIMEOUT_SECS";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientConfig {
    pub api_key: String,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Deadline for a whole call. `None` waits as long as the server does.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            endpoint: default_endpoint(),
            timeout_secs: None,
        }
    }

    /// Read `TRANSKIT_API_KEY`, `TRANSKIT_ENDPOINT` and `TRANSKIT_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_key = lookup(ENV_API_KEY)
            .filter(|k| !k.is_empty())
            .ok_or(TranskitError::NoAuthData)?;
        let endpoint = lookup(ENV_ENDPOINT)
            .filter(|e| !e.is_empty())
            .unwrap_or_else(default_endpoint);
        let timeout_secs = match lookup(ENV_TIMEOUT_SECS) {
            Some(raw) => Some(
                raw.trim()
                    .parse::<u64>()
                    .map_err(|_| TranskitError::InvalidParameters)?,
            ),
            None => None,
        };

        Ok(Self {
            api_key,
            endpoint,
            timeout_secs,
        })
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    pub(crate) fn transport(&self) -> UreqTransport {
        match self.timeout() {
            Some(timeout) => UreqTransport::with_timeout(timeout),
            None => UreqTransport::new(),
        }
    }
}
