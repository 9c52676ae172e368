//! Configuration file handling.
//!
//! Supports JSON and TOML files selected by extension, stored in the
//! platform config directory. Sections default individually, so a config
//! file only needs the keys it overrides.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use vcpkit_core::{Error, Result};

/// Polling engine settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingSettings {
    /// Cycle period in milliseconds
    pub cycle_time_ms: u64,
    /// Max error-channel entries drained per cycle
    pub error_drain_limit: usize,
    /// Report actual (vs commanded) positions
    pub report_actual_position: bool,
}

impl Default for PollingSettings {
    fn default() -> Self {
        Self {
            cycle_time_ms: 75,
            error_drain_limit: 8,
            report_actual_position: false,
        }
    }
}

/// Recent-files list settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecentFilesSettings {
    /// Maximum number of retained entries
    pub max_files: usize,
    /// The persisted list, most recent first
    pub files: Vec<PathBuf>,
}

impl Default for RecentFilesSettings {
    fn default() -> Self {
        Self {
            max_files: 10,
            files: Vec::new(),
        }
    }
}

/// Complete application configuration
///
/// Aggregates all settings sections and provides file I/O operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Polling engine settings
    #[serde(default)]
    pub polling: PollingSettings,
    /// Recent-files list
    #[serde(default)]
    pub recent_files: RecentFilesSettings,
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Default config file location in the platform config directory
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("vcpkit").join("config.toml"))
    }

    /// Load the config from its default location, or defaults if absent
    pub fn load_default() -> Result<Self> {
        match Self::default_config_path() {
            Some(path) if path.exists() => Self::load_from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::other(format!("Failed to read config file: {}", e)))?;

        let config: Self = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content)
                .map_err(|e| Error::other(format!("Invalid JSON config: {}", e)))?
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            toml::from_str(&content)
                .map_err(|e| Error::other(format!("Invalid TOML config: {}", e)))?
        } else {
            return Err(Error::other(
                "Config file must be .json or .toml".to_string(),
            ));
        };

        config.validate()?;
        Ok(config)
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        self.validate()?;

        let content = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::to_string_pretty(self)
                .map_err(|e| Error::other(format!("Failed to serialize config: {}", e)))?
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            toml::to_string_pretty(self)
                .map_err(|e| Error::other(format!("Failed to serialize config: {}", e)))?
        } else {
            return Err(Error::other(
                "Config file must be .json or .toml".to_string(),
            ));
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::other(format!("Failed to create config dir: {}", e)))?;
        }
        std::fs::write(path, content)
            .map_err(|e| Error::other(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.polling.cycle_time_ms == 0 {
            return Err(Error::other("Cycle time must be > 0".to_string()));
        }

        if self.polling.error_drain_limit == 0 {
            return Err(Error::other("Error drain limit must be > 0".to_string()));
        }

        if self.recent_files.max_files == 0 {
            return Err(Error::other("Recent files max must be > 0".to_string()));
        }

        Ok(())
    }
}
