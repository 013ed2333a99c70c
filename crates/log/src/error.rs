//! Logging errors

use thiserror::Error;

/// Result type for logger setup
pub type LogResult<T> = Result<T, LogError>;

/// Errors raised while building or reconfiguring the logger
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LogError {
    /// The filter directive could not be parsed
    #[error("invalid log filter '{filter}': {message}")]
    Filter {
        /// The directive as given
        filter: String,
        /// Parser message
        message: String,
    },

    /// A global subscriber is already installed
    #[error("logger already initialized: {0}")]
    AlreadyInitialized(String),

    /// The running subscriber could not be reconfigured
    #[error("failed to reload filter: {0}")]
    Reload(String),

    /// Unknown output format name
    #[error("unknown log format '{0}'")]
    Format(String),
}
