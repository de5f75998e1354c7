//! Configuration management for tasksync
//!
//! This module handles loading, parsing, and validation of configuration files.

use crate::constants::{
    CONFIG_GENERATED, FIRESTORE_BASE_URL, LIST_TODAY, OPENWEATHER_BASE_URL, WEATHER_CACHE_MINUTES,
};
use crate::utils::datetime;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub remote: RemoteConfig,
    pub cache: CacheConfig,
    pub weather: WeatherConfig,
    pub display: DisplayConfig,
    pub logging: LoggingConfig,
}

/// Remote task store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Backend type: "firestore" or "memory" (process-local, nothing persists remotely)
    pub backend: String,
    /// Firestore project id
    pub project_id: String,
    /// REST endpoint, override to target the emulator
    pub base_url: String,
    /// Environment variable holding the web API key
    pub api_key_env: String,
    /// Environment variable holding the user's identity token
    pub id_token_env: String,
}

/// Local mirror cache configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CacheConfig {
    /// Path of the SQLite mirror database. Empty means the platform data
    /// directory; ":memory:" keeps the mirror in memory.
    pub path: String,
}

/// Weather lookup configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    /// Environment variable holding the OpenWeatherMap API key
    pub api_key_env: String,
    pub base_url: String,
    /// How long a city's weather is reused, in minutes
    pub cache_minutes: u64,
}

/// Display configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// List shown when none is requested
    /// Options: "all", "today", "important", "planned", "assigned", or a list id
    pub default_list: String,
    /// Show relative due dates ("tomorrow") instead of raw dates
    pub human_dates: bool,
    /// Show completed tasks under the active ones
    pub show_completed: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LoggingConfig {
    /// Write logs to a file in the cache directory
    pub enabled: bool,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            backend: "memory".to_string(),
            project_id: String::new(),
            base_url: FIRESTORE_BASE_URL.to_string(),
            api_key_env: "TASKSYNC_FIRESTORE_API_KEY".to_string(),
            id_token_env: "TASKSYNC_ID_TOKEN".to_string(),
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key_env: "OPENWEATHER_API_KEY".to_string(),
            base_url: OPENWEATHER_BASE_URL.to_string(),
            cache_minutes: WEATHER_CACHE_MINUTES,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            default_list: LIST_TODAY.to_string(),
            human_dates: true,
            show_completed: true,
        }
    }
}

impl RemoteConfig {
    /// Read the API key from the configured environment variable
    pub fn api_key(&self) -> Option<String> {
        read_env(&self.api_key_env)
    }

    /// Read the identity token from the configured environment variable
    pub fn id_token(&self) -> Option<String> {
        read_env(&self.id_token_env)
    }
}

impl WeatherConfig {
    pub fn api_key(&self) -> Option<String> {
        read_env(&self.api_key_env)
    }
}

fn read_env(name: &str) -> Option<String> {
    if name.is_empty() {
        return None;
    }
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

impl Config {
    /// Load configuration from file or return defaults
    pub fn load() -> Result<Self> {
        let config_path = Self::find_config_file()?;

        if let Some(path) = config_path {
            Self::load_from_file(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Find configuration file in order of precedence
    fn find_config_file() -> Result<Option<PathBuf>> {
        // 1. Check current directory
        let current_dir_config = PathBuf::from("tasksync.toml");
        if current_dir_config.exists() {
            return Ok(Some(current_dir_config));
        }

        // 2. Check XDG config directory
        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("tasksync").join("config.toml");
            if xdg_config.exists() {
                return Ok(Some(xdg_config));
            }
        }

        Ok(None)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        match self.remote.backend.as_str() {
            "firestore" => {
                if self.remote.project_id.is_empty() {
                    anyhow::bail!("remote.project_id is required for the firestore backend");
                }
                if !self.remote.base_url.starts_with("http://") && !self.remote.base_url.starts_with("https://") {
                    anyhow::bail!("remote.base_url must be an http(s) URL, got '{}'", self.remote.base_url);
                }
            }
            "memory" => {}
            other => anyhow::bail!("unsupported remote.backend '{}' (expected firestore or memory)", other),
        }

        if self.display.default_list.trim().is_empty() {
            anyhow::bail!("display.default_list cannot be empty");
        }

        if self.weather.cache_minutes > 1440 {
            anyhow::bail!("weather.cache_minutes cannot exceed 1440 (24 hours)");
        }

        Ok(())
    }

    /// Resolve where the mirror database lives
    pub fn mirror_path(&self) -> Result<PathBuf> {
        if !self.cache.path.is_empty() {
            return Ok(PathBuf::from(&self.cache.path));
        }
        dirs::data_dir()
            .map(|dir| dir.join("tasksync").join("mirror.db"))
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))
    }

    /// Generate default configuration file
    pub fn generate_default_config<P: AsRef<Path>>(path: P) -> Result<()> {
        let config = Self::default();
        let toml_content = toml::to_string_pretty(&config).context("Failed to serialize default config")?;

        let header = format!(
            "# tasksync Configuration File\n# Generated on {}\n\n",
            datetime::format_today()
        );

        let full_content = header + &toml_content;

        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }

        std::fs::write(&path, full_content)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        println!("{}: {}", CONFIG_GENERATED, path.as_ref().display());
        Ok(())
    }

    /// Get the XDG config directory path
    pub fn get_xdg_config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))
            .map(|dir| dir.join("tasksync"))
    }

    /// Get the default config file path
    pub fn get_default_config_path() -> Result<PathBuf> {
        Ok(Self::get_xdg_config_dir()?.join("config.toml"))
    }
}
