// Property-based tests for the remaining-time decomposition
// Random offsets from a fixed instant, checked against the unit bounds

use chrono::{Duration, Local, TimeZone};
use proptest::prelude::*;
use rust_countdown::models::countdown::Decomposition;
use rust_countdown::services::countdown::decompose::{
    split_millis, SECONDS_PER_DAY, SECONDS_PER_HOUR, SECONDS_PER_MINUTE, SECONDS_PER_MONTH,
    SECONDS_PER_YEAR,
};
use rust_countdown::services::countdown::decompose;

const FIFTY_YEARS_MS: i64 = 50 * SECONDS_PER_YEAR * 1_000;

proptest! {
    /// Property: every field except years stays below its next unit
    #[test]
    fn prop_fields_stay_within_bounds(offset_ms in 1..FIFTY_YEARS_MS) {
        let b = split_millis(offset_ms);

        prop_assert!(b.months <= 11);
        prop_assert!(b.days <= 30);
        prop_assert!(b.hours < 24);
        prop_assert!(b.minutes < 60);
        prop_assert!(b.seconds < 60);
    }

    /// Property: the fields add back up to the offset, less the sub-second part
    #[test]
    fn prop_fields_recompose_to_whole_seconds(offset_ms in 0..FIFTY_YEARS_MS) {
        let b = split_millis(offset_ms);

        let seconds = b.years as i64 * SECONDS_PER_YEAR
            + b.months as i64 * SECONDS_PER_MONTH
            + b.days as i64 * SECONDS_PER_DAY
            + b.hours as i64 * SECONDS_PER_HOUR
            + b.minutes as i64 * SECONDS_PER_MINUTE
            + b.seconds as i64;

        prop_assert_eq!(seconds, offset_ms / 1_000);
    }

    /// Property: a target at or before now is always elapsed
    #[test]
    fn prop_past_targets_are_elapsed(back_ms in 0..FIFTY_YEARS_MS) {
        let now = Local.with_ymd_and_hms(2030, 5, 17, 10, 0, 0).unwrap();
        let target = now - Duration::milliseconds(back_ms);

        prop_assert_eq!(decompose(&target, &now), Decomposition::Elapsed);
    }

    /// Property: one more second of lead never shows less time
    #[test]
    fn prop_more_lead_is_never_less_time(offset_ms in 1..FIFTY_YEARS_MS) {
        let now = Local.with_ymd_and_hms(2030, 5, 17, 10, 0, 0).unwrap();
        let near = now + Duration::milliseconds(offset_ms);
        let far = near + Duration::seconds(1);

        let (Decomposition::Remaining(a), Decomposition::Remaining(b)) =
            (decompose(&near, &now), decompose(&far, &now))
        else {
            return Err(TestCaseError::fail("future targets must be remaining"));
        };

        let as_tuple = |x: rust_countdown::models::countdown::Breakdown| {
            (x.years, x.months, x.days, x.hours, x.minutes, x.seconds)
        };
        prop_assert!(as_tuple(b) > as_tuple(a));
    }
}
