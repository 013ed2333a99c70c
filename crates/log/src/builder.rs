//! Subscriber assembly

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::Subscriber;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, reload};

use crate::config::{Config, DisplayConfig, Format};
use crate::error::{LogError, LogResult};

/// Logger builder
#[derive(Debug)]
pub struct LoggerBuilder {
    config: Config,
}

/// Guard returned by a successful initialization
///
/// Holds the handle used to change the filter of the running subscriber.
#[derive(Debug)]
pub struct LoggerGuard {
    reload: ReloadHandle,
}

impl LoggerGuard {
    /// Handle for changing the filter at runtime
    #[must_use]
    pub fn reload_handle(&self) -> &ReloadHandle {
        &self.reload
    }
}

/// Handle for runtime filter changes
#[derive(Clone)]
pub struct ReloadHandle {
    filter: reload::Handle<EnvFilter, Registry>,
    current: Arc<RwLock<String>>,
}

impl ReloadHandle {
    /// Replace the active filter
    ///
    /// # Errors
    /// Returns error if the directive does not parse or the subscriber is gone
    pub fn reload(&self, filter: &str) -> LogResult<()> {
        let new_filter = parse_filter(filter)?;
        self.filter
            .reload(new_filter)
            .map_err(|e| LogError::Reload(e.to_string()))?;
        *self.current.write() = filter.to_string();
        Ok(())
    }

    /// The active filter directive
    #[must_use]
    pub fn current_filter(&self) -> String {
        self.current.read().clone()
    }
}

impl std::fmt::Debug for ReloadHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReloadHandle")
            .field("current", &*self.current.read())
            .finish_non_exhaustive()
    }
}

impl LoggerBuilder {
    /// Create builder from config
    #[must_use]
    pub fn from_config(config: Config) -> Self {
        Self { config }
    }

    /// Build and install the global subscriber
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Filter string cannot be parsed
    /// - A global subscriber is already installed
    pub fn build(self) -> LogResult<LoggerGuard> {
        let filter = parse_filter(&self.config.level)?;
        let (filter_layer, handle) = reload::Layer::new(filter);

        tracing_subscriber::registry()
            .with(filter_layer)
            .with(fmt_layer(self.config.format, &self.config.display))
            .try_init()
            .map_err(|e| LogError::AlreadyInitialized(e.to_string()))?;

        tracing::debug!(
            level = %self.config.level,
            format = %self.config.format,
            "logger initialized"
        );

        Ok(LoggerGuard {
            reload: ReloadHandle {
                filter: handle,
                current: Arc::new(RwLock::new(self.config.level)),
            },
        })
    }
}

pub(crate) fn parse_filter(filter: &str) -> LogResult<EnvFilter> {
    EnvFilter::try_new(filter).map_err(|e| LogError::Filter {
        filter: filter.to_string(),
        message: e.to_string(),
    })
}

fn fmt_layer<S>(format: Format, display: &DisplayConfig) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    let base = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(display.colors)
        .with_target(display.target)
        .with_file(display.source)
        .with_line_number(display.source);

    match (format, display.time) {
        (Format::Pretty, true) => base.pretty().boxed(),
        (Format::Pretty, false) => base.pretty().without_time().boxed(),
        (Format::Compact, true) => base.compact().boxed(),
        (Format::Compact, false) => base.compact().without_time().boxed(),
        (Format::Json, true) => base.json().boxed(),
        (Format::Json, false) => base.json().without_time().boxed(),
    }
}
