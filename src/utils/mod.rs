//! Utility module for pinplayer
//!
//! This module provides common utilities used throughout the crate:
//! - Error handling with custom error types
//! - Configuration management
//! - Time readout formatting and range clamping helpers

pub mod config;
pub mod error;

// Re-export commonly used items
pub use config::{Config, GeneralConfig, PlayerDefaults};
pub use error::{PlayerError, Result};

/// Initialize the application configuration
///
/// Loads configuration from:
/// 1. Default values
/// 2. System configuration file
/// 3. User configuration file
/// 4. Environment variables
pub fn load_config() -> Result<Config> {
    Config::load()
}

/// Format a time value in seconds for the player readout
///
/// Minutes are unbounded and seconds are zero-padded to two digits, so
/// 125 seconds becomes `"2:05"` and an hour becomes `"60:00"`. Negative,
/// NaN and infinite inputs render as `"0:00"`.
pub fn format_time(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };

    format!("{}:{:02}", total / 60, total % 60)
}

/// Clamp a value between min and max
///
/// NaN collapses to `min` so bad input never leaks into player state.
pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    if value.is_nan() || value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}

/// Clamp a volume level into `[0, 1]`
pub fn clamp_unit(value: f64) -> f64 {
    clamp(value, 0.0, 1.0)
}
