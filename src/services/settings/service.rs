use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use thiserror::Error;

use crate::models::settings::Settings;

/// Overrides the config file location when no `--config` flag is given.
pub const CONFIG_ENV_VAR: &str = "RUST_COUNTDOWN_CONFIG";

const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid settings: {0}")]
    Validation(String),
}

/// Locates and loads `config.toml`.
pub struct SettingsService {
    config_path: Option<PathBuf>,
}

impl SettingsService {
    /// Resolves the config path: explicit path, then the environment
    /// variable, then the platform config directory.
    pub fn new(explicit: Option<PathBuf>) -> Self {
        let config_path = explicit
            .or_else(|| std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from))
            .or_else(|| project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME)));
        Self { config_path }
    }

    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    /// Loads settings. A missing file yields the defaults.
    pub fn load(&self) -> Result<Settings, SettingsError> {
        let Some(path) = self.config_path.as_deref() else {
            log::debug!("No config directory available, using default settings");
            return Ok(Settings::default());
        };

        if !path.exists() {
            log::debug!("No config file at {}, using defaults", path.display());
            return Ok(Settings::default());
        }

        let data = fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let settings: Settings = toml::from_str(&data).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        settings.validate().map_err(SettingsError::Validation)?;

        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Directory holding the persisted countdown.
    pub fn data_dir(settings: &Settings) -> PathBuf {
        settings
            .data_dir
            .clone()
            .or_else(|| project_dirs().map(|dirs| dirs.data_dir().to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "RustCountdown", "Countdown")
}
