//! Configuration module for the metals feed

mod template;

use crate::utils::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::env;
use std::path::Path;
use std::time::Duration;

pub use template::commented_config_template;

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// InfluxDB connection settings
    #[serde(default)]
    pub influx: InfluxConfig,

    /// Polling settings
    #[serde(default)]
    pub feed: FeedConfig,

    /// Symbol registry, polled in this order
    #[serde(default = "default_metals")]
    pub metals: Vec<MetalEntry>,
}

/// InfluxDB connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfluxConfig {
    /// Host name or address (a full `http(s)://` URL is also accepted)
    #[serde(default = "default_influx_host")]
    pub host: String,

    /// HTTP API port
    #[serde(default = "default_influx_port")]
    pub port: u16,

    /// Database the points are written to; created at startup if absent
    #[serde(default = "default_influx_database")]
    pub database: String,

    /// Optional basic-auth user
    #[serde(default)]
    pub username: Option<String>,

    /// Optional basic-auth password
    #[serde(default)]
    pub password: Option<String>,
}

/// Polling settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Base URL of the price API; `/price/{SYMBOL}` is appended
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Seconds to sleep after each iteration
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Per-request timeout in seconds. Unset means requests may block indefinitely.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    /// What to do when a batch write fails
    #[serde(default)]
    pub on_store_error: StoreErrorPolicy,
}

/// One entry of the symbol registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetalEntry {
    /// Ticker code used in the request URL and as the point tag, e.g. "XAU"
    pub symbol: String,
    /// Display name used in status lines, e.g. "Gold"
    pub name: String,
}

impl MetalEntry {
    pub fn new(symbol: impl Into<String>, name: impl Into<String>) -> Self {
        Self { symbol: symbol.into(), name: name.into() }
    }
}

/// Policy applied when writing a batch to the store fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreErrorPolicy {
    /// Log the failure, drop the batch and keep polling
    #[default]
    Continue,
    /// Log the failure and stop the loop with the error
    Abort,
}

impl Default for Config {
    fn default() -> Self {
        Self { influx: InfluxConfig::default(), feed: FeedConfig::default(), metals: default_metals() }
    }
}

impl Default for InfluxConfig {
    fn default() -> Self {
        Self {
            host: default_influx_host(),
            port: default_influx_port(),
            database: default_influx_database(),
            username: None,
            password: None,
        }
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            poll_interval_secs: default_poll_interval_secs(),
            request_timeout_secs: None,
            on_store_error: StoreErrorPolicy::default(),
        }
    }
}

// --------- Helper default functions for serde ---------
fn default_influx_host() -> String {
    "localhost".to_string()
}
fn default_influx_port() -> u16 {
    8086
}
fn default_influx_database() -> String {
    "metals_db".to_string()
}
fn default_api_base_url() -> String {
    "https://api.gold-api.com".to_string()
}
fn default_poll_interval_secs() -> u64 {
    5
}
fn default_metals() -> Vec<MetalEntry> {
    vec![
        MetalEntry::new("XAU", "Gold"),
        MetalEntry::new("XAG", "Silver"),
        MetalEntry::new("XPT", "Platinum"),
        MetalEntry::new("HG", "Copper"),
    ]
}

impl InfluxConfig {
    /// Base URL of the InfluxDB HTTP API
    pub fn url(&self) -> String {
        if self.host.starts_with("http://") || self.host.starts_with("https://") {
            format!("{}:{}", self.host.trim_end_matches('/'), self.port)
        } else {
            format!("http://{}:{}", self.host, self.port)
        }
    }
}

impl FeedConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Price endpoint for a ticker, e.g. `https://api.gold-api.com/price/XAU`
    pub fn price_url(&self, symbol: &str) -> String {
        format!("{}/price/{}", self.api_base_url.trim_end_matches('/'), symbol)
    }
}

/// Environment variables consulted by [`Config::merge_env`]
pub const ENV_KEYS: [&str; 7] = [
    "INFLUX_HOST",
    "INFLUX_PORT",
    "INFLUX_DB",
    "INFLUX_USER",
    "INFLUX_PASSWORD",
    "METALS_API_URL",
    "METALS_POLL_INTERVAL_SECS",
];

impl Config {
    /// Serialize default config to TOML string
    pub fn default_toml() -> String {
        toml::to_string_pretty(&Self::default()).expect("serialize default config")
    }

    /// Load configuration from a specific file path
    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| {
            Error::ConfigError(format!("Failed to read config file {:?}: {}", path.as_ref(), e))
        })?;
        let mut cfg: Self = toml::from_str(&content)
            .map_err(|e| Error::ConfigError(format!("Failed to parse config file: {}", e)))?;
        cfg.merge_env()?;
        Ok(cfg)
    }

    /// Save the configuration to a file
    pub fn save<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::ConfigError(format!("Failed to serialize config: {}", e)))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                Error::ConfigError(format!("Failed to create directory {:?}: {}", parent, e))
            })?;
        }
        std::fs::write(path, content).map_err(|e| {
            Error::ConfigError(format!("Failed to write config file {:?}: {}", path, e))
        })?;
        Ok(())
    }

    /// Validate the configuration for required fields and reasonable values
    pub fn validate(&self) -> Result<()> {
        if self.influx.host.trim().is_empty() {
            return Err(Error::ConfigError("influx.host must be set".to_string()));
        }
        if self.influx.port == 0 {
            return Err(Error::ConfigError("influx.port must be > 0".to_string()));
        }
        if self.influx.database.trim().is_empty() {
            return Err(Error::ConfigError("influx.database must be set".to_string()));
        }
        if self.feed.poll_interval_secs == 0 {
            return Err(Error::ConfigError("feed.poll_interval_secs must be > 0".to_string()));
        }
        if self.feed.request_timeout_secs == Some(0) {
            return Err(Error::ConfigError("feed.request_timeout_secs must be > 0".to_string()));
        }
        let api = url::Url::parse(&self.feed.api_base_url).map_err(|e| {
            Error::ConfigError(format!("feed.api_base_url {:?} is invalid: {}", self.feed.api_base_url, e))
        })?;
        if api.scheme() != "http" && api.scheme() != "https" {
            return Err(Error::ConfigError(format!(
                "feed.api_base_url must be http(s), got scheme {:?}",
                api.scheme()
            )));
        }
        if self.metals.is_empty() {
            return Err(Error::ConfigError("at least one [[metals]] entry is required".to_string()));
        }
        let mut seen = HashSet::new();
        for metal in &self.metals {
            if metal.symbol.trim().is_empty() {
                return Err(Error::ConfigError("metal symbol must not be empty".to_string()));
            }
            if metal.name.trim().is_empty() {
                return Err(Error::ConfigError(format!("metal {} has an empty name", metal.symbol)));
            }
            if !seen.insert(metal.symbol.as_str()) {
                return Err(Error::ConfigError(format!("duplicate metal symbol {}", metal.symbol)));
            }
        }
        Ok(())
    }

    /// Load configuration from default locations: `./metals-feed.toml`, then
    /// `<config dir>/metals-feed/config.toml`, then built-in defaults.
    pub fn load() -> Result<Self> {
        let user_config = dirs::config_dir().map(|mut path| {
            path.push("metals-feed");
            path.push("config.toml");
            path
        });
        Self::load_from(Path::new("metals-feed.toml"), user_config.as_deref())
    }

    /// Load the first existing file among `local` and `user_config`. A file
    /// that exists but fails to parse is an error, never a silent fallback.
    pub fn load_from(local: &Path, user_config: Option<&Path>) -> Result<Self> {
        if local.exists() {
            return Self::from_file(local);
        }

        if let Some(path) = user_config {
            if path.exists() {
                return Self::from_file(path);
            }
        }

        let mut config = Self::default();
        config.merge_env()?;
        Ok(config)
    }

    /// Merge environment variables into the configuration
    pub fn merge_env(&mut self) -> Result<()> {
        if let Ok(host) = env::var("INFLUX_HOST") {
            self.influx.host = host;
        }

        if let Ok(port) = env::var("INFLUX_PORT") {
            self.influx.port = port
                .parse()
                .map_err(|e| Error::ConfigError(format!("INFLUX_PORT {:?} is not a port: {}", port, e)))?;
        }

        if let Ok(db) = env::var("INFLUX_DB") {
            self.influx.database = db;
        }

        if let Ok(user) = env::var("INFLUX_USER") {
            self.influx.username = Some(user);
        }

        if let Ok(password) = env::var("INFLUX_PASSWORD") {
            self.influx.password = Some(password);
        }

        if let Ok(api_url) = env::var("METALS_API_URL") {
            self.feed.api_base_url = api_url;
        }

        if let Ok(secs) = env::var("METALS_POLL_INTERVAL_SECS") {
            self.feed.poll_interval_secs = secs.parse().map_err(|e| {
                Error::ConfigError(format!("METALS_POLL_INTERVAL_SECS {:?} is invalid: {}", secs, e))
            })?;
        }

        Ok(())
    }
}
