use chrono::{DateTime, NaiveDate, NaiveDateTime};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid ISO-8601 timestamp: {0:?}")]
pub struct TimestampError(pub String);

// Offset forms RFC 3339 does not cover (minutes-only, `+hhmm`, space separator).
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%dT%H:%M%z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M%:z",
];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse an ISO-8601 timestamp into a naive date-time.
///
/// Offset-qualified values (`Z`, `+02:00`) are normalised to UTC; values without
/// an offset are taken as written. A bare date means midnight.
pub fn parse_iso8601(value: &str) -> Result<NaiveDateTime, TimestampError> {
    let trimmed = value.trim();

    if let Ok(aware) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(aware.naive_utc());
    }

    let with_offset = match trimmed.strip_suffix(['Z', 'z']) {
        Some(local) => format!("{local}+00:00"),
        None => trimmed.to_string(),
    };
    for format in OFFSET_FORMATS {
        if let Ok(aware) = DateTime::parse_from_str(&with_offset, format) {
            return Ok(aware.naive_utc());
        }
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(naive);
        }
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .ok_or_else(|| TimestampError(value.to_string()))
}
