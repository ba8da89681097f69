use std::time::Duration;

use crate::models::settings::Settings;
use crate::services::countdown::ControllerOptions;

pub fn settings_to_options(settings: &Settings) -> ControllerOptions {
    ControllerOptions {
        tick_interval: Duration::from_millis(settings.tick_interval_ms),
        highlight_hold: Duration::from_millis(settings.highlight_ms),
        celebration_hold: Duration::from_millis(settings.celebration_ms),
        time_format: settings.time_format,
    }
}
