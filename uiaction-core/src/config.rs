//! src/config.rs
//! ============================================================================
//! # Config: Frontend Configuration Loader and Saver
//!
//! Settings for the action registry and for logging, stored as TOML in the
//! platform config directory resolved with
//! [`directories`](https://docs.rs/directories).
//!
//! ## Example
//! ```rust,ignore
//! let config = Config::load().await?;
//! config.save().await?;
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tokio::fs as TokioFs;
use tracing::info;

use crate::error::{ActionError, ActionResult};
use crate::model::machine::Machine;

/// Action registry settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Mapping slots allocated up front; the table doubles when full.
    pub initial_capacity: usize,

    /// Machine the frontend runs as; only actions it supports are registered.
    pub machine: Machine,

    /// Warn when a blocking/dialog action runs longer than this (0s = off).
    #[serde(with = "humantime_serde")]
    pub stall_warning: Duration,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 64,
            machine: Machine::default(),
            stall_warning: Duration::from_secs(30),
        }
    }
}

/// Log file rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    Never,
    Hourly,
    #[default]
    Daily,
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is not set.
    pub level: String,

    /// Directory for JSON log files; console only when unset.
    pub log_dir: Option<PathBuf>,

    pub file_prefix: String,

    pub rotation: LogRotation,

    pub max_log_files: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_dir: None,
            file_prefix: "uiactions".to_string(),
            rotation: LogRotation::Daily,
            max_log_files: 10,
        }
    }
}

/// Main configuration struct.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub registry: RegistryConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Loads config from the platform config dir, or writes and returns
    /// defaults when there is no file yet.
    pub async fn load() -> ActionResult<Self> {
        let path = Self::config_path()?;
        Self::load_from(&path).await
    }

    pub async fn load_from(path: &Path) -> ActionResult<Self> {
        if TokioFs::try_exists(path)
            .await
            .map_err(|e| ActionError::config_io(path, e))?
        {
            info!("Loading config from {}", path.display());
            let text = TokioFs::read_to_string(path)
                .await
                .map_err(|e| ActionError::config_io(path, e))?;

            Self::from_toml_str(&text)
        } else {
            info!(
                "No config file found at {}, using default configuration. Creating it now.",
                path.display()
            );

            let default_config = Self::default();
            default_config.save_to(path).await?;

            Ok(default_config)
        }
    }

    /// Saves config to the platform config dir.
    pub async fn save(&self) -> ActionResult<()> {
        let path = Self::config_path()?;
        self.save_to(&path).await
    }

    pub async fn save_to(&self, path: &Path) -> ActionResult<()> {
        info!("Saving config to {}", path.display());

        if let Some(parent) = path.parent() {
            TokioFs::create_dir_all(parent)
                .await
                .map_err(|e| ActionError::config_io(parent, e))?;
        }

        let toml_str = toml::to_string_pretty(self)?;
        TokioFs::write(path, toml_str)
            .await
            .map_err(|e| ActionError::config_io(path, e))?;

        Ok(())
    }

    pub fn from_toml_str(text: &str) -> ActionResult<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Returns the canonical config file path.
    pub fn config_path() -> ActionResult<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    pub fn config_dir() -> ActionResult<PathBuf> {
        let proj_dirs = ProjectDirs::from("org", "vice-emu", "uiactions")
            .ok_or(ActionError::ConfigDirUnavailable)?;
        Ok(proj_dirs.config_dir().to_path_buf())
    }
}
