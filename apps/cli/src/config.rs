//! Layered configuration: defaults, `warden.toml`, `WARDEN_*` env, flags

use std::path::{Path, PathBuf};

use anyhow::Context;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use warden_fetch::{DEFAULT_URL_TEMPLATE, FetchConfig};

use crate::cli::LimitArgs;

/// File read when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "warden.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub log: warden_log::Config,
    pub fetch: FetchConfig,
    /// Question URL with an `{id}` placeholder
    pub url_template: String,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            log: warden_log::Config {
                level: "warn".to_string(),
                ..warden_log::Config::default()
            },
            fetch: FetchConfig::default(),
            url_template: DEFAULT_URL_TEMPLATE.to_string(),
        }
    }
}

impl CliConfig {
    /// Provider stack for `file`.
    ///
    /// Nested keys use a double underscore: `WARDEN_FETCH__MAX_BODY_SIZE`.
    /// `WARDEN_LOG` itself is a filter directive, not a section, so it is
    /// skipped here and applied by [`CliConfig::load`].
    pub fn figment(file: &Path) -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(file))
            .merge(Env::prefixed("WARDEN_").ignore(&["log", "config"]).split("__"))
    }

    /// Load configuration, requiring `file` to exist when one is named.
    pub fn load(file: Option<&Path>) -> anyhow::Result<Self> {
        let path = match file {
            Some(path) if !path.exists() => {
                anyhow::bail!("config file {} does not exist", path.display())
            }
            Some(path) => path.to_path_buf(),
            None => PathBuf::from(DEFAULT_CONFIG_FILE),
        };
        let mut config: Self = Self::figment(&path)
            .extract()
            .with_context(|| format!("invalid configuration in {}", path.display()))?;
        if let Ok(level) = std::env::var("WARDEN_LOG") {
            config.log.level = level;
        }
        Ok(config)
    }

    /// Apply `-v` flags.
    pub fn apply_verbosity(&mut self, verbose: u8) {
        match verbose {
            0 => {}
            1 => self.log.level = "debug".to_string(),
            _ => self.log.level = "trace".to_string(),
        }
    }

    /// Fetch settings with flag overrides applied.
    #[must_use]
    pub fn fetch_with(&self, limits: &LimitArgs) -> FetchConfig {
        FetchConfig {
            fetch_timeout_ms: limits.timeout_ms.unwrap_or(self.fetch.fetch_timeout_ms),
            max_body_size: limits.max_size.unwrap_or(self.fetch.max_body_size),
        }
    }
}
