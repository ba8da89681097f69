mod mapper;
mod service;

pub use mapper::settings_to_options;
pub use service::{SettingsError, SettingsService, CONFIG_ENV_VAR};
