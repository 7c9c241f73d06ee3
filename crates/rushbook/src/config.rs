//! Configuration management for rushbook.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::Team;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "rushbook";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "rushbook.db";

/// Prefix for environment overrides. Nested keys are separated by `__`,
/// e.g. `RUSHBOOK_SESSION__RECENT_LIMIT=20`.
const ENV_PREFIX: &str = "RUSHBOOK_";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `RUSHBOOK_`)
/// 2. TOML config file at `~/.config/rushbook/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Session configuration.
    pub session: SessionConfig,
    /// Export configuration.
    pub export: ExportConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/rushbook/rushbook.db`
    pub database_path: Option<PathBuf>,
}

/// Sideline session configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Team selected when a session starts.
    pub default_team: Team,
    /// How many plays the recent list shows.
    pub recent_limit: usize,
    /// Jersey numbers added by `seed`.
    pub seed_jerseys: Vec<u32>,
}

/// CSV export configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Directory export files are written to. Defaults to the working directory.
    pub directory: Option<PathBuf>,
    /// File name prefix; the game date is appended.
    pub file_prefix: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            default_team: Team::Home,
            recent_limit: 12,
            seed_jerseys: default_seed_jerseys(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            directory: None,
            file_prefix: "rushing".to_string(),
        }
    }
}

/// Jersey numbers a quick seed fills the roster with.
fn default_seed_jerseys() -> Vec<u32> {
    vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 17, 21, 22, 24, 32]
}

impl Config {
    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.session.recent_limit == 0 {
            return Err(Error::ConfigValidation {
                message: "recent_limit must be greater than 0".to_string(),
            });
        }

        if self.session.seed_jerseys.is_empty() {
            return Err(Error::ConfigValidation {
                message: "seed_jerseys cannot be empty".to_string(),
            });
        }

        let prefix = &self.export.file_prefix;
        if prefix.is_empty() || prefix.contains(['/', '\\']) {
            return Err(Error::ConfigValidation {
                message: format!(
                    "file_prefix must be a non-empty file name without separators, got '{prefix}'"
                ),
            });
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Get the export directory, resolving defaults if not set.
    #[must_use]
    pub fn export_dir(&self) -> PathBuf {
        self.export
            .directory
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }
}
