//! Timestamp parsing and skew enforcement (§4.1).

use aip_types::AipError;
use chrono::{DateTime, Utc};

/// Parses an RFC 3339 / ISO-8601 timestamp with an explicit timezone,
/// normalizing a trailing `Z` to `+00:00` and converting to UTC.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, AipError> {
    if value.is_empty() {
        return Err(AipError::TimestampMissing);
    }
    let dt = DateTime::parse_from_rfc3339(value)
        .map_err(|e| AipError::TimestampMalformed(e.to_string()))?;
    Ok(dt.with_timezone(&Utc))
}

/// Validates `timestamp` and asserts `|now - t| <= max_skew_ms` (inclusive).
/// `now` defaults to the wall clock; tests pin it explicitly.
pub fn assert_within_skew(
    timestamp: &str,
    max_skew_ms: i64,
    now: Option<DateTime<Utc>>,
) -> Result<DateTime<Utc>, AipError> {
    let dt = parse_timestamp(timestamp)?;
    let reference = now.unwrap_or_else(Utc::now);
    let delta_ms = (reference - dt).num_milliseconds().abs();
    if delta_ms > max_skew_ms {
        return Err(AipError::TimestampSkew { delta_ms, max_skew_ms });
    }
    Ok(dt)
}
