use chrono::{DateTime, Local, NaiveDateTime, TimeZone};

use super::error::CountdownError;

/// Local formats accepted from the date/time picker or the command line.
const LOCAL_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
];

/// Parses raw picker input into a local instant.
///
/// Empty input, unknown formats and wall-clock times skipped by a DST
/// transition are all reported as [`CountdownError::InvalidInput`].
pub fn parse_target_input(raw: &str) -> Result<DateTime<Local>, CountdownError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CountdownError::InvalidInput);
    }

    if let Ok(with_offset) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(with_offset.with_timezone(&Local));
    }

    LOCAL_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .and_then(|naive| Local.from_local_datetime(&naive).earliest())
        .ok_or(CountdownError::InvalidInput)
}
