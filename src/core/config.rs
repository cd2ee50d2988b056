//! Persisted configuration record
//!
//! One process-wide defaults record stored as TOML under the platform
//! config directory (`~/.config/skycam/config.toml` on Linux). Missing keys
//! are backfilled with defaults on load; a malformed file is recovered by
//! overwriting it with defaults rather than failing the invocation.

use crate::core::error::Result;
use log::warn;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Application name used for the config directory
const APP_NAME: &str = "skycam";

/// Default config file name
const CONFIG_FILE_NAME: &str = "config.toml";

/// Standard configuration directory for the application
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Standard configuration file path
pub fn config_path() -> PathBuf {
    config_dir().join(CONFIG_FILE_NAME)
}

/// Process-wide defaults record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Template loaded when `start` is given no explicit name
    pub default_template: String,
    /// Directory holding template records
    pub templates_directory: PathBuf,
    /// Directory for session output
    pub output_directory: PathBuf,
    /// Frame name pattern, `{timestamp}` is substituted per shot
    pub filename_pattern: String,
    /// Timestamp layout used in frame names
    pub timestamp_format: String,
    /// Probe the transport when no port is specified
    pub auto_detect_camera: bool,
    /// Port used when auto-detection is off (empty = none)
    pub default_port: String,
    /// Reconcile requested settings against camera capabilities
    pub auto_adjust_settings: bool,
    /// Log a warning for every adjusted setting
    pub warn_on_adjustment: bool,
    /// Retry budget for transient transport commands
    pub max_retries: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_template: "default".to_string(),
            templates_directory: config_dir().join("templates"),
            output_directory: dirs::picture_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("Skycam"),
            filename_pattern: "SkyImage-{timestamp}".to_string(),
            timestamp_format: "YYYY-MM-DD_HH:MM:SS".to_string(),
            auto_detect_camera: true,
            default_port: String::new(),
            auto_adjust_settings: true,
            warn_on_adjustment: true,
            max_retries: 3,
        }
    }
}

impl Config {
    /// Load the record from `path`, creating or repairing it as needed.
    ///
    /// A missing file is created with defaults. Missing keys in an existing
    /// file are backfilled with their defaults. A file that fails to parse
    /// is overwritten with defaults; losing a hand-edited config is
    /// preferable to refusing to run unattended.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            let config = Self::default();
            config.save(path)?;
            return Ok(config);
        }

        let content = fs::read_to_string(path)?;
        match toml::from_str(&content) {
            Ok(config) => Ok(config),
            Err(e) => {
                warn!(
                    "Invalid config file '{}' ({}); regenerating defaults",
                    path.display(),
                    e
                );
                let config = Self::default();
                config.save(path)?;
                Ok(config)
            }
        }
    }

    /// Save the record as TOML, creating parent directories
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::core::error::SkycamError::ConfigInvalid(e.to_string()))?;
        fs::write(path, content)?;
        Ok(())
    }
}
