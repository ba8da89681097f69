// Settings module
// User-editable configuration, read from config.toml

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::models::countdown::TimeFormat;

/// Where the countdown target is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Json,
    Sqlite,
    Memory,
}

impl StorageBackend {
    /// File name used inside the data directory, if the backend has one.
    pub fn file_name(&self) -> Option<&'static str> {
        match self {
            StorageBackend::Json => Some("countdown.json"),
            StorageBackend::Sqlite => Some("countdown.db"),
            StorageBackend::Memory => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub tick_interval_ms: u64,
    pub highlight_ms: u64,
    pub celebration_ms: u64,
    pub storage: StorageBackend,
    pub data_dir: Option<PathBuf>,
    pub time_format: TimeFormat,
    pub desktop_notifications: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1000,
            highlight_ms: 500,
            celebration_ms: 8000,
            storage: StorageBackend::Json,
            data_dir: None,
            time_format: TimeFormat::TwelveHour,
            desktop_notifications: true,
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<(), String> {
        if self.tick_interval_ms == 0 {
            return Err("tick_interval_ms must be greater than zero".to_string());
        }
        if self.highlight_ms > self.tick_interval_ms {
            return Err(format!(
                "highlight_ms ({}) must not exceed tick_interval_ms ({})",
                self.highlight_ms, self.tick_interval_ms
            ));
        }
        Ok(())
    }
}
