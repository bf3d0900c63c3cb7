//! Lenient ISO-8601 timestamp parsing.
//!
//! Redmine and Alertmanager both emit RFC 3339, but older Redmine versions
//! and hand-written payloads drop the zone designator. A value without one
//! is taken to be UTC.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse an ISO-8601 timestamp and normalize it to UTC.
///
/// Accepts a trailing `Z`, a numeric offset, or no designator at all.
/// Returns `None` when the value is not a recognizable timestamp.
#[must_use]
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    // RFC 3339 requires the `T`; ISO-8601 readers commonly allow a space
    if let Ok(dt) = DateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Some(dt.with_timezone(&Utc));
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_with_zulu() {
        let expected = Utc.with_ymd_and_hms(2025, 3, 1, 12, 30, 0).unwrap();
        assert_eq!(parse_timestamp("2025-03-01T12:30:00Z"), Some(expected));
    }

    #[test]
    fn test_parse_with_offset_normalizes_to_utc() {
        let expected = Utc.with_ymd_and_hms(2025, 3, 1, 3, 30, 0).unwrap();
        assert_eq!(parse_timestamp("2025-03-01T12:30:00+09:00"), Some(expected));
    }

    #[test]
    fn test_parse_without_designator_is_utc() {
        let expected = Utc.with_ymd_and_hms(2025, 3, 1, 12, 30, 0).unwrap();
        assert_eq!(parse_timestamp("2025-03-01T12:30:00"), Some(expected));
        assert_eq!(parse_timestamp("2025-03-01 12:30:00"), Some(expected));
    }

    #[test]
    fn test_parse_fractional_seconds() {
        let parsed = parse_timestamp("2025-03-01T12:30:00.123456789Z").unwrap();
        assert_eq!(parsed.timestamp_subsec_nanos(), 123_456_789);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("yesterday"), None);
        assert_eq!(parse_timestamp("2025-13-01T00:00:00Z"), None);
    }
}
