//! # Warden Log
//!
//! Logging bootstrap for warden binaries, built on `tracing-subscriber`.
//!
//! ```rust,no_run
//! let _guard = warden_log::auto_init().expect("logger");
//! tracing::info!("ready");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod builder;
mod config;
mod error;

pub use builder::{LoggerBuilder, LoggerGuard, ReloadHandle};
pub use config::{Config, DisplayConfig, Format};
pub use error::{LogError, LogResult};

/// Install the global subscriber described by `config`.
///
/// # Errors
/// Returns error if the filter does not parse or a subscriber is already set
pub fn init_with(config: Config) -> LogResult<LoggerGuard> {
    LoggerBuilder::from_config(config).build()
}

/// Install the default subscriber (compact, `info`).
///
/// # Errors
/// Returns error if a subscriber is already set
pub fn init() -> LogResult<LoggerGuard> {
    init_with(Config::default())
}

/// Install a subscriber chosen from the environment.
///
/// `WARDEN_LOG` or `RUST_LOG` selects [`Config::from_env`]; otherwise debug
/// builds get [`Config::development`] and release builds
/// [`Config::production`].
///
/// # Errors
/// Returns error if the filter does not parse or a subscriber is already set
pub fn auto_init() -> LogResult<LoggerGuard> {
    init_with(auto_config())
}

fn auto_config() -> Config {
    if std::env::var_os("WARDEN_LOG").is_some() || std::env::var_os("RUST_LOG").is_some() {
        Config::from_env()
    } else if cfg!(debug_assertions) {
        Config::development()
    } else {
        Config::production()
    }
}
