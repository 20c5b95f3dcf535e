//! Configuration management for ringside.
//!
//! Settings are stored as TOML under the platform config directory. Values
//! equal to their defaults are left out when saving so the file only holds
//! what the user actually changed.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::APP_NAME;

/// Default capacity of the event bus channel.
pub const DEFAULT_BUS_CAPACITY: usize = 64;

/// Core configuration structure for the application.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Log filter used when `RINGSIDE_LOG` is not set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,

    /// Number of events the bus buffers per subscriber before it lags
    #[serde(
        default = "default_bus_capacity",
        skip_serializing_if = "is_default_bus_capacity"
    )]
    pub bus_capacity: usize,

    /// Synthetic camera settings
    #[serde(default, skip_serializing_if = "CaptureConfig::is_default")]
    pub capture: CaptureConfig,
}

/// Format requested from the synthetic frame source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct CaptureConfig {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    /// Frames per second
    #[serde(default = "default_framerate")]
    pub framerate: u32,
}

fn default_bus_capacity() -> usize {
    DEFAULT_BUS_CAPACITY
}

fn is_default_bus_capacity(v: &usize) -> bool {
    *v == DEFAULT_BUS_CAPACITY
}

fn default_width() -> u32 {
    320
}

fn default_height() -> u32 {
    240
}

fn default_framerate() -> u32 {
    10
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            framerate: default_framerate(),
        }
    }
}

impl CaptureConfig {
    fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: None,
            bus_capacity: default_bus_capacity(),
            capture: CaptureConfig::default(),
        }
    }
}

impl Config {
    /// Get the configured log level, if any
    pub fn log_level(&self) -> Option<&str> {
        self.log_level.as_deref()
    }

    /// Bus capacity, never less than one.
    pub fn bus_capacity(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

/// Manages loading and saving configuration files.
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Creates a new ConfigManager with the default configuration directory.
    pub fn new() -> Result<Self> {
        let config_path = Self::default_config_path()?;
        Ok(Self { config_path })
    }

    /// Creates a new ConfigManager rooted at the given directory.
    pub fn with_config_dir<P: AsRef<std::path::Path>>(dir: P) -> Self {
        let config_path = dir.as_ref().join(format!("{}.toml", APP_NAME));
        Self { config_path }
    }

    /// Returns the default path to the configuration file.
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = config_dir().context("Failed to retrieve configuration directory")?;
        Ok(config_dir.join(APP_NAME).join(format!("{}.toml", APP_NAME)))
    }

    /// Loads the configuration from the config file or returns default.
    pub fn load(&self) -> Result<Config> {
        if !self.config_path.exists() {
            return Ok(Config::default());
        }

        let config_content = fs::read_to_string(&self.config_path)
            .with_context(|| format!("Failed to read config file at {:?}", self.config_path))?;

        let config: Config = toml::from_str(&config_content)
            .with_context(|| format!("Failed to parse config file at {:?}", self.config_path))?;

        if config.capture.framerate == 0 {
            warn!(
                path = ?self.config_path,
                "capture.framerate is 0, the synthetic camera will refuse to start"
            );
        }

        Ok(config)
    }

    /// Saves the configuration to the config file.
    pub fn save(&self, config: &Config) -> Result<()> {
        let config_dir = self
            .config_path
            .parent()
            .with_context(|| format!("Failed to get parent directory of {:?}", self.config_path))?;

        fs::create_dir_all(config_dir)
            .with_context(|| format!("Failed to create config directory at {:?}", config_dir))?;

        let serialized =
            toml::to_string_pretty(&config).context("Failed to serialize configuration")?;

        fs::write(&self.config_path, serialized)
            .with_context(|| format!("Failed to write config file at {:?}", self.config_path))?;

        Ok(())
    }

    /// Returns the path to the configuration file.
    pub fn config_path(&self) -> &std::path::Path {
        &self.config_path
    }
}
