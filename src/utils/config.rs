//! Configuration management for pinplayer
//!
//! This module handles loading and managing application configuration
//! from config files and environment variables.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use crate::utils::error::{IntoPlayerError, PlayerError, Result};

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Player defaults applied to every session
    pub player: PlayerDefaults,

    /// General application settings
    pub general: GeneralConfig,
}

/// Defaults for new player sessions
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerDefaults {
    /// Volume a session starts with (0.0 - 1.0)
    pub volume: f64,

    /// Idle time before the control overlay hides, in milliseconds
    pub idle_hide_ms: u64,

    /// Aspect ratio used when none is given, as `width:height`
    pub aspect_ratio: String,
}

/// General application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for PlayerDefaults {
    fn default() -> Self {
        Self {
            volume: 1.0,
            idle_hide_ms: 3000,
            aspect_ratio: "16:9".to_string(),
        }
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

impl PlayerDefaults {
    /// Idle delay as a duration
    pub fn idle_hide_delay(&self) -> Duration {
        Duration::from_millis(self.idle_hide_ms)
    }
}

impl Config {
    /// Load configuration from various sources
    ///
    /// Configuration is loaded in the following order (later sources override earlier):
    /// 1. Default values
    /// 2. System config file (/etc/pinplayer/config.toml on Linux)
    /// 3. User config file (~/.config/pinplayer/config.toml on Linux)
    /// 4. Environment variables (PINPLAYER_* prefix)
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        if let Some(system_path) = Self::system_config_path() {
            if system_path.exists() {
                config = Self::from_file(&system_path)?;
            }
        }

        if let Some(user_path) = Self::user_config_path() {
            if user_path.exists() {
                config = Self::from_file(&user_path)?;
            }
        }

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    /// Read a TOML file; missing keys fall back to defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| PlayerError::Config(format!("Failed to read config file: {}", e)))?;

        toml::from_str(&contents).config_err("Failed to parse config file")
    }

    /// Save configuration to the given path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| PlayerError::Config(format!("Failed to create config directory: {}", e)))?;
        }

        let toml = toml::to_string_pretty(self).config_err("Failed to serialize config")?;
        std::fs::write(path, toml)?;

        Ok(())
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(volume) = std::env::var("PINPLAYER_VOLUME") {
            self.player.volume = volume.parse().config_err("Invalid PINPLAYER_VOLUME")?;
        }

        if let Ok(idle) = std::env::var("PINPLAYER_IDLE_HIDE_MS") {
            self.player.idle_hide_ms = idle.parse().config_err("Invalid PINPLAYER_IDLE_HIDE_MS")?;
        }

        if let Ok(ratio) = std::env::var("PINPLAYER_ASPECT_RATIO") {
            self.player.aspect_ratio = ratio;
        }

        if let Ok(log_level) = std::env::var("PINPLAYER_LOG_LEVEL") {
            self.general.log_level = log_level;
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.player.volume) {
            return Err(PlayerError::Config("Volume must be between 0.0 and 1.0".to_string()));
        }

        if self.player.idle_hide_ms == 0 {
            return Err(PlayerError::Config("Idle hide delay must be non-zero".to_string()));
        }

        self.player
            .aspect_ratio
            .parse::<crate::player::AspectRatio>()
            .map_err(|e| PlayerError::Config(e.to_string()))?;

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&self.general.log_level.as_str()) {
            return Err(PlayerError::Config(format!(
                "Invalid log level '{}', must be one of: {:?}",
                self.general.log_level,
                valid_log_levels
            )));
        }

        Ok(())
    }

    /// Get system config file path
    fn system_config_path() -> Option<PathBuf> {
        #[cfg(target_os = "linux")]
        return Some(PathBuf::from("/etc/pinplayer/config.toml"));

        #[cfg(target_os = "macos")]
        return Some(PathBuf::from("/Library/Application Support/pinplayer/config.toml"));

        #[allow(unreachable_code)]
        None
    }

    /// Get user config file path
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("pinplayer").join("config.toml"))
    }
}
