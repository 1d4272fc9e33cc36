//! Configuration for the refresh loop and location labels.
//!
//! Stores configuration in JSON format at `~/.tmd-top/config.json`.
//! A missing file means "all defaults"; command-line flags override it.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::adapters::Platform;
use crate::error::{Error, Result};

/// Configuration data stored in JSON format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Table refresh interval in seconds.
    #[serde(default = "default_refresh_interval", rename = "refreshInterval")]
    pub refresh_interval: u64,

    /// Stop after this many refreshes; unbounded when absent.
    #[serde(default, rename = "updateCount", skip_serializing_if = "Option::is_none")]
    pub update_count: Option<u64>,

    /// Location shown for connections to private-range addresses.
    #[serde(default = "default_lan_label", rename = "lanLabel")]
    pub lan_label: String,

    /// Force a platform adapter instead of detecting the host OS.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<Platform>,
}

fn default_refresh_interval() -> u64 {
    2
}

fn default_lan_label() -> String {
    "LAN".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            refresh_interval: default_refresh_interval(),
            update_count: None,
            lan_label: default_lan_label(),
            platform: None,
        }
    }
}

impl Config {
    /// Reject values the refresh loop cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.refresh_interval == 0 {
            return Err(Error::Config(
                "refreshInterval must be at least 1 second".to_string(),
            ));
        }
        if self.update_count == Some(0) {
            return Err(Error::Config("updateCount must be at least 1".to_string()));
        }
        if self.lan_label.trim().is_empty() {
            return Err(Error::Config("lanLabel must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Configuration store backed by a JSON file.
pub struct ConfigStore {
    /// Path to the configuration file.
    config_path: PathBuf,
}

impl ConfigStore {
    /// Create a new config store with the default path.
    ///
    /// Default path: `~/.tmd-top/config.json`
    pub fn new() -> Result<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| Error::Config("Could not determine home directory".to_string()))?;

        Ok(Self {
            config_path: home.join(".tmd-top").join("config.json"),
        })
    }

    /// Create a config store with a custom path (for testing).
    pub fn with_path(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    pub fn path(&self) -> &PathBuf {
        &self.config_path
    }

    /// Load configuration from disk.
    ///
    /// Returns default config if the file doesn't exist.
    pub async fn load(&self) -> Result<Config> {
        if !fs::try_exists(&self.config_path).await.unwrap_or(false) {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(&self.config_path)
            .await
            .map_err(|e| Error::Config(format!("Failed to read config: {}", e)))?;

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to disk.
    ///
    /// Creates the config directory if it doesn't exist.
    pub async fn save(&self, config: &Config) -> Result<()> {
        config.validate()?;

        if let Some(config_dir) = self.config_path.parent() {
            fs::create_dir_all(config_dir)
                .await
                .map_err(|e| Error::Config(format!("Failed to create config directory: {}", e)))?;
        }

        let content = serde_json::to_string_pretty(config)?;

        // Write to a temp file then rename so a crash never leaves half a file
        let temp_path = self.config_path.with_extension("json.tmp");

        let mut file = fs::File::create(&temp_path)
            .await
            .map_err(|e| Error::Config(format!("Failed to create temp config file: {}", e)))?;

        file.write_all(content.as_bytes())
            .await
            .map_err(|e| Error::Config(format!("Failed to write config: {}", e)))?;

        file.sync_all()
            .await
            .map_err(|e| Error::Config(format!("Failed to sync config: {}", e)))?;

        fs::rename(&temp_path, &self.config_path)
            .await
            .map_err(|e| Error::Config(format!("Failed to rename config file: {}", e)))?;

        Ok(())
    }

    /// Set the refresh interval in seconds.
    pub async fn set_refresh_interval(&self, seconds: u64) -> Result<()> {
        let mut config = self.load().await?;
        config.refresh_interval = seconds;
        self.save(&config).await
    }

    /// Set or clear the update count.
    pub async fn set_update_count(&self, count: Option<u64>) -> Result<()> {
        let mut config = self.load().await?;
        config.update_count = count;
        self.save(&config).await
    }

    /// Set the label used for private-range remote addresses.
    pub async fn set_lan_label(&self, label: &str) -> Result<()> {
        let mut config = self.load().await?;
        config.lan_label = label.trim().to_string();
        self.save(&config).await
    }

    /// Set or clear the platform override.
    pub async fn set_platform(&self, platform: Option<Platform>) -> Result<()> {
        let mut config = self.load().await?;
        config.platform = platform;
        self.save(&config).await
    }
}
