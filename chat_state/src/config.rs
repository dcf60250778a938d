//! Runtime configuration loaded from TOML.
//!
//! Every section and field has a default, so an empty file is valid:
//!
//! ```toml
//! [derived]
//! familiar_threshold = 70
//! morning_start = 5
//!
//! [persistence]
//! dir = "sessions"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Top-level runtime configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub derived: DerivedConfig,
    pub persistence: PersistenceConfig,
}

impl RuntimeConfig {
    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.derived.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}

/// Settings for variables computed on read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DerivedConfig {
    /// Affection at or above which `call_sign` takes a familiar suffix.
    pub familiar_threshold: f64,

    /// First hour (0-23) of each `time_of_day` bucket.
    pub morning_start: u32,
    pub afternoon_start: u32,
    pub evening_start: u32,
    pub night_start: u32,
}

impl Default for DerivedConfig {
    fn default() -> Self {
        Self {
            familiar_threshold: 70.0,
            morning_start: 5,
            afternoon_start: 12,
            evening_start: 17,
            night_start: 21,
        }
    }
}

impl DerivedConfig {
    /// Bucket boundaries must be increasing hours of one day.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let bounds = [
            self.morning_start,
            self.afternoon_start,
            self.evening_start,
            self.night_start,
        ];
        if bounds.iter().any(|h| *h > 23) || bounds.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ConfigError::Invalid(format!(
                "time_of_day boundaries must be increasing hours, got {:?}",
                bounds
            )));
        }
        Ok(())
    }

    /// Bucket an hour of the day.
    pub fn time_of_day(&self, hour: u32) -> &'static str {
        let hour = hour % 24;
        if hour >= self.night_start || hour < self.morning_start {
            "night"
        } else if hour >= self.evening_start {
            "evening"
        } else if hour >= self.afternoon_start {
            "afternoon"
        } else {
            "morning"
        }
    }
}

/// Settings for the file-backed store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistenceConfig {
    pub dir: PathBuf,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("sessions"),
        }
    }
}
