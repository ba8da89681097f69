// Date utility functions

use chrono::{DateTime, Days, Local, TimeZone};

use crate::models::countdown::TimeFormat;

/// Format used by `datetime-local` style pickers, e.g. `2030-01-02T09:30`.
pub const INPUT_FORMAT: &str = "%Y-%m-%dT%H:%M";

pub fn start_of_day(date: DateTime<Local>) -> DateTime<Local> {
    // Midnight can fall into a DST gap in a few zones; keep the input then.
    date.date_naive()
        .and_hms_opt(0, 0, 0)
        .and_then(|midnight| Local.from_local_datetime(&midnight).earliest())
        .unwrap_or(date)
}

/// Midnight at the start of the day after `now`.
pub fn tomorrow_midnight(now: DateTime<Local>) -> DateTime<Local> {
    let tomorrow = now.checked_add_days(Days::new(1)).unwrap_or(now);
    start_of_day(tomorrow)
}

/// Renders an instant the way the date picker expects its value.
pub fn format_for_input(date: DateTime<Local>) -> String {
    date.format(INPUT_FORMAT).to_string()
}

/// Human readable timestamp for the status line (`1/2/2030, 3:04:05 PM`).
pub fn localized_timestamp(date: DateTime<Local>, format: TimeFormat) -> String {
    match format {
        TimeFormat::TwelveHour => date.format("%-m/%-d/%Y, %-I:%M:%S %p").to_string(),
        TimeFormat::TwentyFourHour => date.format("%-m/%-d/%Y, %H:%M:%S").to_string(),
    }
}
