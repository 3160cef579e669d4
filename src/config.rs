//! Application configuration module
//!
//! Provides the configuration consumed by the stores and the sync engine:
//! remote server URL, local database location and the connectivity debounce
//! window. Values come from an optional TOML file, environment variables
//! (`SYNCPAD_SERVER_URL`, `SYNCPAD_DB_PATH`), or the builder.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Default server URL
const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:3000";

/// Default connectivity debounce window in milliseconds
const DEFAULT_DEBOUNCE_MS: u64 = 2_000;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    server_url: String,
    db_path: Option<PathBuf>,
    debounce: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            db_path: None,
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
        }
    }
}

impl Config {
    /// Create a new ConfigBuilder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Configuration from environment variables over built-in defaults
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = std::env::var("SYNCPAD_SERVER_URL") {
            config.server_url = url;
        }
        if let Ok(path) = std::env::var("SYNCPAD_DB_PATH") {
            config.db_path = Some(PathBuf::from(path));
        }
        config
    }

    /// Load configuration: optional TOML file, then environment overrides
    ///
    /// The file lives at the platform config directory
    /// (`<config_dir>/syncpad/config.toml`) and every key in it is optional.
    /// A missing file is not an error.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(dir) = dirs::config_dir() {
            let path = dir.join("syncpad").join("config.toml");
            if path.exists() {
                config = Self::from_file(&path)?;
            }
        }

        if let Ok(url) = std::env::var("SYNCPAD_SERVER_URL") {
            config.server_url = url;
        }
        if let Ok(path) = std::env::var("SYNCPAD_DB_PATH") {
            config.db_path = Some(PathBuf::from(path));
        }

        Ok(config)
    }

    /// Load configuration from a specific TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
        let file: FileConfig =
            toml::from_str(&raw).map_err(|e| ConfigError::Parse(e.to_string()))?;

        ConfigBuilder {
            server_url: file.server_url,
            db_path: file.db_path.map(PathBuf::from),
            debounce_ms: file.debounce_ms,
        }
        .build()
    }

    /// Full URL for an API endpoint path
    pub fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.server_url, path)
    }

    /// Remote server base URL
    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    /// Local database file path
    ///
    /// Defaults to the platform data directory when not configured.
    pub fn db_path(&self) -> PathBuf {
        match &self.db_path {
            Some(path) => path.clone(),
            None => {
                let mut path = dirs::data_dir().unwrap_or_else(std::env::temp_dir);
                path.push("syncpad");
                path.push("local.db");
                path
            }
        }
    }

    /// Connectivity debounce window
    pub fn debounce(&self) -> Duration {
        self.debounce
    }
}

/// Raw TOML file shape
#[derive(Debug, Deserialize)]
struct FileConfig {
    server_url: Option<String>,
    db_path: Option<String>,
    debounce_ms: Option<u64>,
}

/// Builder for Config
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    server_url: Option<String>,
    db_path: Option<PathBuf>,
    debounce_ms: Option<u64>,
}

impl ConfigBuilder {
    /// Set the server URL
    pub fn server_url(mut self, url: impl Into<String>) -> Self {
        self.server_url = Some(url.into());
        self
    }

    /// Set the local database path
    pub fn db_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.db_path = Some(path.into());
        self
    }

    /// Set the connectivity debounce window in milliseconds
    pub fn debounce_ms(mut self, ms: u64) -> Self {
        self.debounce_ms = Some(ms);
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<Config, ConfigError> {
        let server_url = self
            .server_url
            .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string());
        if !server_url.starts_with("http://") && !server_url.starts_with("https://") {
            return Err(ConfigError::InvalidUrl(server_url));
        }

        Ok(Config {
            server_url: server_url.trim_end_matches('/').to_string(),
            db_path: self.db_path,
            debounce: Duration::from_millis(self.debounce_ms.unwrap_or(DEFAULT_DEBOUNCE_MS)),
        })
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("could not read config file: {0}")]
    Io(String),
    #[error("could not parse config file: {0}")]
    Parse(String),
}
