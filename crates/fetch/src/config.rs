//! Fetch cache configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{FetchError, Result};

/// Configuration for a [`ReplyCache`](crate::ReplyCache)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Timeout applied to every fetch, in milliseconds
    pub fetch_timeout_ms: u64,
    /// Largest accepted payload, in bytes
    pub max_body_size: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_ms: 3000,
            max_body_size: 128 * 1024,
        }
    }
}

impl FetchConfig {
    /// Fetch timeout as a [`Duration`]
    #[must_use]
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    /// Validate the configuration, returning an error if invalid.
    pub fn validate(&self) -> Result<()> {
        if self.fetch_timeout_ms == 0 {
            return Err(FetchError::config(
                "fetch_timeout_ms must be greater than 0",
            ));
        }
        if self.max_body_size == 0 {
            return Err(FetchError::config("max_body_size must be greater than 0"));
        }
        Ok(())
    }
}
