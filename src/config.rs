//! Configuration file handling.
//!
//! This module provides loading and saving of vendorwatch configuration
//! from a TOML file.
//!
//! # Configuration Location
//!
//! The configuration file is stored at:
//! - Linux: `~/.config/vendorwatch/config.toml`
//! - macOS: `~/Library/Application Support/vendorwatch/config.toml`
//! - Windows: `%APPDATA%\vendorwatch\config.toml`
//!
//! # Example Configuration
//!
//! ```toml
//! data_dir = "/srv/vendorwatch"
//! bind = "127.0.0.1:5000"
//! default_format = "table"
//!
//! [search]
//! endpoint = "https://www.google.com/search"
//! recency = "d"
//! max_attempts = 5
//! backoff_base_ms = 1000
//! timeout_secs = 30
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::platform;

/// Query terms that bias the search toward bad news.
pub const DEFAULT_NEGATIVE_TERMS: &str =
    "cyber attack or data breach or negative news or \"data breach\" or fraud or scam";

/// Application configuration.
///
/// Every field has a default, so a partial file (or no file at all) is valid.
///
/// # Example
///
/// ```no_run
/// use vendorwatch::Config;
///
/// let config = Config::load().unwrap();
///
/// println!("Data dir: {}", config.data_dir().display());
/// println!("Attempts: {}", config.search.max_attempts);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where the vendor list, findings and usage counter live.
    ///
    /// Default: the platform data directory (see [`platform::data_dir`]).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,

    /// Address the HTTP server listens on.
    ///
    /// Default: "127.0.0.1:5000"
    pub bind: String,

    /// Default output format for `findings` when no `--format` flag is given.
    ///
    /// Valid values: "table", "json", "html"
    /// Default: "table"
    pub default_format: String,

    /// Search provider settings.
    pub search: SearchConfig,
}

/// Settings for the outbound news search.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Base URL of the search endpoint.
    pub endpoint: String,

    /// Terms sent as the "any of these words" part of the query.
    pub negative_terms: String,

    /// Recency window passed as `as_qdr` ("d" = past day, "w" = past week).
    pub recency: String,

    /// Total attempts per vendor, including the first one.
    ///
    /// Default: 5
    pub max_attempts: u32,

    /// Backoff unit in milliseconds. The wait after throttled attempt `n`
    /// is `backoff_base_ms * 2^n`.
    ///
    /// Default: 1000
    pub backoff_base_ms: u64,

    /// Per-request timeout in seconds.
    ///
    /// Default: 30
    pub timeout_secs: u64,

    /// User agent sent with every request.
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            bind: "127.0.0.1:5000".to_string(),
            default_format: "table".to_string(),
            search: SearchConfig::default(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://www.google.com/search".to_string(),
            negative_terms: DEFAULT_NEGATIVE_TERMS.to_string(),
            recency: "d".to_string(),
            max_attempts: 5,
            backoff_base_ms: 1000,
            timeout_secs: 30,
            user_agent: concat!("vendorwatch/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl SearchConfig {
    /// Attempt budget, never less than one.
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    pub fn backoff_base(&self) -> Duration {
        Duration::from_millis(self.backoff_base_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    /// Loads configuration from the config file.
    ///
    /// If the config file doesn't exist, returns default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        let path = Self::config_path();

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::from_toml(&content).with_context(|| format!("parsing {}", path.display()))
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Saves the configuration to the config file.
    ///
    /// Creates the parent directory if it doesn't exist.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();

        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    /// Returns the path to the configuration file.
    ///
    /// # Example
    ///
    /// ```
    /// use vendorwatch::Config;
    ///
    /// let path = Config::config_path();
    /// assert!(path.ends_with("config.toml"));
    /// ```
    pub fn config_path() -> PathBuf {
        platform::config_dir().join("config.toml")
    }

    /// Resolved data directory: the configured one or the platform default.
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(platform::data_dir)
    }

    /// Generates a string containing the default configuration.
    pub fn generate_default_config() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}
