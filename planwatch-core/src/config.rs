//! Configuration management for planwatch
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (PLANWATCH_*)
//! 3. Config file (~/.config/planwatch/config.toml)
//! 4. Default values

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Browser-like identification header sent with page fetches. Some tariff
/// pages serve reduced markup to unknown clients.
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Page-fetch configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Tariff page to monitor
    pub base_url: String,

    /// User-Agent header for the fetch
    pub user_agent: String,

    /// Fetch timeout in seconds
    pub timeout_secs: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.spusu.ch/de/tariffs".to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: 30,
        }
    }
}

/// Snapshot storage configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding the data files
    pub data_dir: PathBuf,

    /// File name of the append-only daily history
    pub history_filename: String,

    /// File name of the latest-snapshot record
    pub latest_filename: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            history_filename: "price_history.json".to_string(),
            latest_filename: "spusu_prices.json".to_string(),
        }
    }
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Page-fetch settings
    pub monitor: MonitorConfig,

    /// Storage settings
    pub storage: StorageConfig,
}

impl Config {
    /// Load configuration from the default config file location
    ///
    /// Returns default config if file doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();

        if let Some(path) = config_path {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &PathBuf) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(Error::Io)?;
        toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }

    /// Get the default config file path
    ///
    /// Returns `~/.config/planwatch/config.toml` on Unix
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("planwatch").join("config.toml"))
    }

    /// Apply environment variable overrides
    ///
    /// Supported variables:
    /// - PLANWATCH_BASE_URL: Tariff page to monitor
    /// - PLANWATCH_DATA_DIR: Directory holding the data files
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(base_url) = std::env::var("PLANWATCH_BASE_URL") {
            self.monitor.base_url = base_url;
        }

        if let Ok(data_dir) = std::env::var("PLANWATCH_DATA_DIR") {
            self.storage.data_dir = PathBuf::from(data_dir);
        }

        self
    }

    /// Apply CLI flag overrides
    pub fn with_cli_overrides(
        mut self,
        base_url: Option<String>,
        data_dir: Option<PathBuf>,
    ) -> Self {
        if let Some(url) = base_url {
            self.monitor.base_url = url;
        }

        if let Some(dir) = data_dir {
            self.storage.data_dir = dir;
        }

        self
    }

    /// Load configuration with all overrides applied
    ///
    /// Priority: CLI > env > config file > defaults
    pub fn load_with_overrides(
        config_file: Option<PathBuf>,
        base_url: Option<String>,
        data_dir: Option<PathBuf>,
    ) -> Result<Self> {
        let base = match config_file {
            Some(path) => Self::load_from_file(&path)?,
            None => Self::load()?,
        };
        Ok(base
            .with_env_overrides()
            .with_cli_overrides(base_url, data_dir))
    }

    /// Path of the history file
    pub fn history_path(&self) -> PathBuf {
        self.storage.data_dir.join(&self.storage.history_filename)
    }

    /// Path of the latest-snapshot file
    pub fn latest_path(&self) -> PathBuf {
        self.storage.data_dir.join(&self.storage.latest_filename)
    }
}
