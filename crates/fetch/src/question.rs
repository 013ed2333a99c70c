//! Host-facing façade keyed by question strings.

use crate::cache::ReplyCache;
use crate::config::FetchConfig;
use crate::error::{FetchError, Result};
use crate::fetcher::Fetcher;
use crate::status::Status;

/// Question-body cache exposed to a scripting host.
///
/// Keys arrive as strings and are parsed as numeric question ids. Results
/// are host-friendly: booleans, possibly empty strings, and status text.
#[derive(Debug)]
pub struct QuestionCache<F: Fetcher> {
    cache: ReplyCache<F>,
}

impl<F: Fetcher> QuestionCache<F> {
    /// Create the façade on the current tokio runtime.
    pub fn new(fetcher: F, config: FetchConfig) -> Result<Self> {
        Ok(Self {
            cache: ReplyCache::new(fetcher, config)?,
        })
    }

    /// Wrap an existing cache.
    #[must_use]
    pub fn from_cache(cache: ReplyCache<F>) -> Self {
        Self { cache }
    }

    /// The underlying cache.
    #[must_use]
    pub fn cache(&self) -> &ReplyCache<F> {
        &self.cache
    }

    /// Fetch timeout in milliseconds.
    #[must_use]
    pub fn fetch_timeout(&self) -> u64 {
        self.cache.fetch_timeout_ms()
    }

    /// Set the fetch timeout in milliseconds.
    pub fn set_fetch_timeout(&self, ms: u64) {
        self.cache.set_fetch_timeout_ms(ms);
    }

    /// Start fetching the body of `question`. Returns `false` for keys
    /// that are not question ids.
    pub fn prefetch(&self, question: &str) -> bool {
        match parse_id(question) {
            Ok(id) => self.cache.prefetch(id),
            Err(error) => {
                tracing::debug!(%error, "prefetch rejected");
                false
            }
        }
    }

    /// Body of `question`, or an empty string if it cannot be obtained.
    pub async fn get(&self, question: &str) -> String {
        match parse_id(question) {
            Ok(id) => self.cache.get(id).await.unwrap_or_default(),
            Err(_) => String::new(),
        }
    }

    /// Status text for `question`.
    #[must_use]
    pub fn status(&self, question: &str) -> String {
        match parse_id(question) {
            Ok(id) => self.cache.status(id).to_string(),
            Err(error) => Status::Error(error.to_string()).to_string(),
        }
    }
}

/// Parse a host key into a question id.
pub fn parse_id(question: &str) -> Result<i64> {
    question
        .trim()
        .parse::<i64>()
        .map_err(|_| FetchError::InvalidId {
            key: question.to_string(),
        })
}
