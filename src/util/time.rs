//! Timeline arithmetic helpers
//!
//! All instants are UTC. Epoch values are whole seconds, matching how samples
//! are stored and how the output document encodes its time axis.

use chrono::{DateTime, Duration, NaiveTime, Utc};

/// Convert epoch seconds to an instant
///
/// Returns `None` when the value is outside the range chrono can represent.
#[inline]
pub fn from_epoch(secs: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0)
}

/// Floor an epoch value onto a fixed-width grid
///
/// Always rounds toward negative infinity, so the result is never later than
/// the input even for pre-1970 values.
///
/// # Examples
///
/// ```
/// use marathon_stats::util::time::floor_to_grid;
///
/// assert_eq!(floor_to_grid(1_000, 300), 900);
/// assert_eq!(floor_to_grid(900, 300), 900);
/// assert_eq!(floor_to_grid(-1, 300), -300);
/// ```
#[inline]
pub fn floor_to_grid(epoch_secs: i64, width_secs: i64) -> i64 {
    epoch_secs.div_euclid(width_secs) * width_secs
}

/// Truncate an instant to midnight of its (UTC) calendar day
pub fn truncate_to_day(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts.date_naive().and_time(NaiveTime::MIN).and_utc()
}

/// Format a signed duration as days/hours/minutes
///
/// # Examples
///
/// ```
/// use chrono::Duration;
/// use marathon_stats::util::time::format_offset;
///
/// assert_eq!(format_offset(Duration::zero()), "0d 00h 00m");
/// assert_eq!(format_offset(Duration::hours(27) + Duration::minutes(5)), "1d 03h 05m");
/// assert_eq!(format_offset(Duration::hours(-2)), "-0d 02h 00m");
/// ```
pub fn format_offset(offset: Duration) -> String {
    let sign = if offset < Duration::zero() { "-" } else { "" };
    let total_minutes = offset.num_minutes().abs();
    let days = total_minutes / (24 * 60);
    let hours = (total_minutes / 60) % 24;
    let minutes = total_minutes % 60;
    format!("{}{}d {:02}h {:02}m", sign, days, hours, minutes)
}

/// Format an instant for console output
pub fn format_instant(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}
