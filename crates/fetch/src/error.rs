//! Error types for cached fetches
use thiserror::Error;

/// Result type for fetch operations
pub type Result<T> = std::result::Result<T, FetchError>;

/// Errors produced while fetching or configuring the cache
#[derive(Error, Debug)]
pub enum FetchError {
    /// The fetch did not complete within the configured timeout
    #[error("timed out after {timeout_ms}ms")]
    Timeout {
        /// The timeout in milliseconds
        timeout_ms: u64,
    },

    /// The payload exceeded the configured size cap
    #[error("payload of {size} bytes exceeds limit of {limit} bytes")]
    TooLarge {
        /// Size of the payload received
        size: usize,
        /// Maximum accepted size
        limit: usize,
    },

    /// The transport failed before a response was received
    #[error("transport error: {message}")]
    Transport {
        /// The error message
        message: String,
        /// The underlying error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The remote side answered with a non-success status
    #[error("server responded with status {code}")]
    Status {
        /// The response status code
        code: u16,
    },

    /// The key could not be parsed as an identifier
    #[error("invalid question id '{key}'")]
    InvalidId {
        /// The key as supplied by the caller
        key: String,
    },

    /// Configuration is invalid
    #[error("configuration error: {message}")]
    Config {
        /// The error message
        message: String,
    },

    /// No tokio runtime was available to run fetches on
    #[error("no async runtime available: {message}")]
    Runtime {
        /// The error message
        message: String,
    },
}

impl FetchError {
    /// Create a configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Wrap a transport-level error
    pub fn transport<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Transport {
            message: error.to_string(),
            source: Some(Box::new(error)),
        }
    }
}
