//! Conversion from "now + N days" to the Julian Date the planning service expects.

use time::OffsetDateTime;

/// Milliseconds in one day.
pub const MS_PER_DAY: f64 = 86_400_000.0;

/// Julian Date of 1970-01-01T00:00:00Z.
pub const UNIX_EPOCH_JD: f64 = 2_440_587.5;

/// Julian Date of `now_ms + duration_days` days, with `now_ms` counted from the Unix epoch.
///
/// No validation: negative durations simply land before `now_ms`.
pub fn intercept_epoch_ms(now_ms: f64, duration_days: f64) -> f64 {
    let target_ms = now_ms + duration_days * MS_PER_DAY;
    target_ms / MS_PER_DAY + UNIX_EPOCH_JD
}

/// Julian Date of an instant.
pub fn julian_date(instant: OffsetDateTime) -> f64 {
    intercept_epoch_ms(unix_ms(instant), 0.0)
}

/// Julian Date of the intercept `duration_days` after `now`.
pub fn intercept_epoch(now: OffsetDateTime, duration_days: u32) -> f64 {
    intercept_epoch_ms(unix_ms(now), duration_days as f64)
}

fn unix_ms(instant: OffsetDateTime) -> f64 {
    instant.unix_timestamp_nanos() as f64 / 1_000_000.0
}
