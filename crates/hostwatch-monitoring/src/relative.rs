//! Compact relative-time expressions
//!
//! Grammar: optional surrounding whitespace, then one or more digits
//! followed by exactly one unit letter. Units are `m` (minutes), `h`
//! (hours) and `d` (days of 24 hours), case-insensitive. Multi-unit
//! ("1h30m") and fractional values are rejected.

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RelativeTimeError {
    #[error("empty time expression")]
    Empty,
    #[error("invalid number format: {0}")]
    InvalidNumber(String),
    #[error("unsupported time unit: {0}")]
    UnsupportedUnit(char),
    #[error("time value out of range: {0}")]
    OutOfRange(String),
}

/// Parse an expression like "30m", "2h" or "7d" into a duration.
pub fn parse_relative(expr: &str) -> Result<Duration, RelativeTimeError> {
    let expr = expr.trim();
    if expr.is_empty() {
        return Err(RelativeTimeError::Empty);
    }

    // Unit is always the final character; everything before it must be
    // a plain non-negative integer.
    let mut chars = expr.chars();
    let unit = chars.next_back().unwrap_or_default();
    let number = chars.as_str();

    let value: u64 = number
        .parse()
        .map_err(|_| RelativeTimeError::InvalidNumber(number.to_string()))?;
    let value = i64::try_from(value)
        .map_err(|_| RelativeTimeError::OutOfRange(number.to_string()))?;

    // The checked constructors bound the duration to what chrono can
    // represent; anything larger is a malformed request, not a panic.
    let duration = match unit.to_ascii_lowercase() {
        'm' => Duration::try_minutes(value),
        'h' => Duration::try_hours(value),
        'd' => value.checked_mul(24).and_then(Duration::try_hours),
        other => return Err(RelativeTimeError::UnsupportedUnit(other)),
    };
    duration.ok_or_else(|| RelativeTimeError::OutOfRange(number.to_string()))
}

/// Millisecond-epoch interval `[now - duration, now]`.
///
/// A duration reaching past the representable calendar clamps to the
/// earliest instant instead of overflowing.
pub fn relative_range(now: DateTime<Utc>, duration: Duration) -> (i64, i64) {
    let to = now.timestamp_millis();
    let from = now
        .checked_sub_signed(duration)
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
        .timestamp_millis();
    (from, to)
}
