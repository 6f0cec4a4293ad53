//! Configuration management with layered hierarchy

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, warn};

use crate::cli::OutputFormat;
use crate::core::error::Result;

/// Default HTTP timeout for API calls, in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// CLI configuration with layered hierarchy
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// API endpoint URL
    pub endpoint: Option<String>,

    /// API key used to authenticate requests
    pub api_key: Option<String>,

    /// Account e-mail, used by calls scoped to the current user
    pub user_email: Option<String>,

    /// Default output format when `--format` is not given
    pub default_format: Option<String>,

    /// HTTP timeout in seconds
    pub timeout_secs: Option<u64>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load() -> Self {
        let mut config = Config::default();

        // 1. Built-in defaults (already in Default impl)

        // 2. Global user config (~/.config/metalcloud/config.yaml)
        if let Some(global_path) = Self::global_config_path() {
            if let Some(global) = Self::read_file(&global_path) {
                config.merge(global);
            }
        }

        // 3. Environment variables
        config.merge(Self::from_env(|key| std::env::var(key).ok()));

        config
    }

    /// Read a config file, ignoring it (with a warning) if it cannot be parsed
    pub fn read_file(path: &Path) -> Option<Config> {
        if !path.exists() {
            return None;
        }
        debug!(path = %path.display(), "reading config file");

        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not read config file");
                return None;
            }
        };

        match serde_yml::from_str::<Config>(&contents) {
            Ok(config) => Some(config),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring malformed config file");
                None
            }
        }
    }

    /// Build a config from `METALCLOUD_*` variables using the given lookup
    pub fn from_env<F>(lookup: F) -> Config
    where
        F: Fn(&str) -> Option<String>,
    {
        Config {
            endpoint: lookup("METALCLOUD_ENDPOINT"),
            api_key: lookup("METALCLOUD_API_KEY"),
            user_email: lookup("METALCLOUD_USER_EMAIL"),
            default_format: lookup("METALCLOUD_DEFAULT_FORMAT"),
            timeout_secs: lookup("METALCLOUD_TIMEOUT_SECS").and_then(|s| s.trim().parse().ok()),
        }
    }

    /// Get the path to the global config file
    fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "metalcloud")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    pub fn merge(&mut self, other: Config) {
        if other.endpoint.is_some() {
            self.endpoint = other.endpoint;
        }
        if other.api_key.is_some() {
            self.api_key = other.api_key;
        }
        if other.user_email.is_some() {
            self.user_email = other.user_email;
        }
        if other.default_format.is_some() {
            self.default_format = other.default_format;
        }
        if other.timeout_secs.is_some() {
            self.timeout_secs = other.timeout_secs;
        }
    }

    /// The configured default output format, or `None` if unset
    pub fn output_format(&self) -> Result<Option<OutputFormat>> {
        self.default_format
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(OutputFormat::from_str)
            .transpose()
    }

    /// Resolve the output format: the command line wins over the config file
    pub fn effective_format(&self, requested: Option<OutputFormat>) -> Result<OutputFormat> {
        match requested {
            Some(format) => Ok(format),
            None => Ok(self.output_format()?.unwrap_or_default()),
        }
    }

    /// HTTP timeout for API calls
    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)
    }
}
