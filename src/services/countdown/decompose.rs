//! Fixed-radix split of the time left until a target.
//!
//! A year counts as 365.25 days and a month as 30.44 days. Both come out to a
//! whole number of seconds, so the greedy extraction runs on integer
//! milliseconds and floors exactly like the fractional-day arithmetic would.
//! Long countdowns drift against the real calendar; that is a known
//! approximation and is kept as is.

use chrono::{DateTime, TimeZone};

use crate::models::countdown::{Breakdown, Decomposition};

pub const SECONDS_PER_MINUTE: i64 = 60;
pub const SECONDS_PER_HOUR: i64 = 3_600;
pub const SECONDS_PER_DAY: i64 = 86_400;
/// 365.25 days.
pub const SECONDS_PER_YEAR: i64 = 31_557_600;
/// 30.44 days.
pub const SECONDS_PER_MONTH: i64 = 2_630_016;

const MILLIS_PER_SECOND: i64 = 1_000;

/// Splits the time between `now` and `target` into a [`Breakdown`].
///
/// Returns [`Decomposition::Elapsed`] when `target <= now`; reaching the
/// target exactly counts as elapsed.
pub fn decompose<Tz: TimeZone>(target: &DateTime<Tz>, now: &DateTime<Tz>) -> Decomposition {
    if target <= now {
        return Decomposition::Elapsed;
    }

    let diff_millis = target
        .clone()
        .signed_duration_since(now.clone())
        .num_milliseconds()
        .abs();

    Decomposition::Remaining(split_millis(diff_millis))
}

/// Greedy extraction over a non-negative millisecond count.
pub fn split_millis(diff_millis: i64) -> Breakdown {
    let mut remaining = diff_millis.max(0);

    let mut take = |unit_seconds: i64| -> u64 {
        let unit = unit_seconds * MILLIS_PER_SECOND;
        let count = remaining / unit;
        remaining -= count * unit;
        count as u64
    };

    let years = take(SECONDS_PER_YEAR);
    let months = take(SECONDS_PER_MONTH);
    let days = take(SECONDS_PER_DAY);
    let hours = take(SECONDS_PER_HOUR);
    let minutes = take(SECONDS_PER_MINUTE);
    let seconds = take(1);

    Breakdown {
        years,
        months,
        days,
        hours,
        minutes,
        seconds,
    }
}
