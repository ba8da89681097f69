use std::fmt;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Remaining time split greedily into calendar-ish units.
///
/// Years and months use fixed approximate lengths (365.25 and 30.44 days),
/// so the split is not Gregorian-exact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Breakdown {
    pub years: u64,
    pub months: u64,
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl Breakdown {
    pub const ZERO: Breakdown = Breakdown {
        years: 0,
        months: 0,
        days: 0,
        hours: 0,
        minutes: 0,
        seconds: 0,
    };

    /// Zero-padded two-digit text for each field.
    pub fn display_fields(&self) -> DisplayFields {
        DisplayFields {
            years: pad(self.years),
            months: pad(self.months),
            days: pad(self.days),
            hours: pad(self.hours),
            minutes: pad(self.minutes),
            seconds: pad(self.seconds),
        }
    }
}

fn pad(value: u64) -> String {
    format!("{:02}", value)
}

/// Text handed to the view for the six time blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayFields {
    pub years: String,
    pub months: String,
    pub days: String,
    pub hours: String,
    pub minutes: String,
    pub seconds: String,
}

impl DisplayFields {
    /// Placeholder shown while idle and once finished.
    pub fn zeroed() -> Self {
        Breakdown::ZERO.display_fields()
    }
}

/// Result of comparing a target against the current instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decomposition {
    Remaining(Breakdown),
    Elapsed,
}

/// Lifecycle of the single countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CountdownPhase {
    #[default]
    Idle,
    Running,
    Finished,
}

/// Outcome of one tick. Derived every time, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickState {
    Idle,
    Running(Breakdown),
    Finished,
}

/// Identifies one repeating tick schedule handed out by a scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(pub u64);

/// 12 or 24 hour clock for the "Counting down to" timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TimeFormat {
    #[default]
    #[serde(rename = "12h")]
    TwelveHour,
    #[serde(rename = "24h")]
    TwentyFourHour,
}

/// The one-line status shown under the countdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusLine {
    Prompt,
    CountingDown {
        target: DateTime<Local>,
        format: TimeFormat,
    },
    Finished,
    Error(String),
}

impl fmt::Display for StatusLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusLine::Prompt => write!(f, "Set a date to start counting down"),
            StatusLine::CountingDown { target, format } => write!(
                f,
                "Counting down to: {}",
                crate::utils::date::localized_timestamp(*target, *format)
            ),
            StatusLine::Finished => write!(f, "Countdown finished!"),
            StatusLine::Error(message) => f.write_str(message),
        }
    }
}

/// Limits and default pushed into the date/time picker at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputBounds {
    pub min: String,
    pub default_value: String,
}
