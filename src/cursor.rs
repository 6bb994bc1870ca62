//! Replication cursor values
//!
//! Cursor fields hold timestamps as strings. The API is not consistent about
//! precision (`.97Z`, `.123456789Z`) and older records carry bare dates, so
//! parsing is lenient. Comparison always happens on the parsed instant while
//! bookmarks keep the raw string the API returned.

use crate::types::Record;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
];

/// Parse a cursor value into a UTC instant.
///
/// Accepts RFC 3339 with any number of fractional digits, naive date-times
/// (taken as UTC) and bare dates with an optional `Z` / `+00:00` suffix
/// (taken as midnight UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    let naive = value
        .strip_suffix('Z')
        .or_else(|| value.strip_suffix("+00:00"))
        .unwrap_or(value);

    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(naive, format) {
            return Some(dt.and_utc());
        }
    }

    NaiveDate::parse_from_str(naive, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// Result of looking up a cursor field on a record
#[derive(Debug, Clone, PartialEq)]
pub enum CursorValue {
    /// Field absent or null
    Missing,
    /// Present but not a parseable timestamp
    Malformed(String),
    /// Parsed timestamp plus the raw string to store as bookmark
    Valid { raw: String, at: DateTime<Utc> },
}

impl CursorValue {
    /// Look up `field` on `record` and classify it
    pub fn of(record: &Record, field: &str) -> Self {
        match record.get(field) {
            None | Some(Value::Null) => CursorValue::Missing,
            Some(Value::String(s)) => match parse_timestamp(s) {
                Some(at) => CursorValue::Valid { raw: s.clone(), at },
                None => CursorValue::Malformed(s.clone()),
            },
            Some(other) => CursorValue::Malformed(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;
    use test_case::test_case;

    #[test_case("2024-02-01T00:00:00Z", 2024, 2, 1, 0 ; "rfc3339 utc")]
    #[test_case("2024-02-01T10:30:00+02:00", 2024, 2, 1, 8 ; "rfc3339 offset")]
    #[test_case("2024-02-01T00:00:00.97Z", 2024, 2, 1, 0 ; "two fraction digits")]
    #[test_case("2024-02-01T00:00:00.123456789Z", 2024, 2, 1, 0 ; "nanoseconds")]
    #[test_case("2024-02-01 05:00:00", 2024, 2, 1, 5 ; "naive with space")]
    #[test_case("2024-02-01T05:00:00", 2024, 2, 1, 5 ; "naive with t")]
    #[test_case("2024-01-15Z", 2024, 1, 15, 0 ; "date with z")]
    #[test_case("2024-01-15", 2024, 1, 15, 0 ; "bare date")]
    fn test_parse_timestamp(raw: &str, y: i32, m: u32, d: u32, h: u32) {
        let parsed = parse_timestamp(raw).unwrap();
        assert_eq!(
            parsed.date_naive(),
            NaiveDate::from_ymd_opt(y, m, d).unwrap()
        );
        assert_eq!(parsed.format("%H").to_string(), format!("{h:02}"));
    }

    #[test_case("" ; "empty")]
    #[test_case("yesterday" ; "word")]
    #[test_case("2024-13-01T00:00:00Z" ; "bad month")]
    #[test_case("1706745600" ; "epoch seconds")]
    fn test_parse_timestamp_rejects(raw: &str) {
        assert!(parse_timestamp(raw).is_none());
    }

    #[test]
    fn test_date_orders_before_later_instant() {
        let date = parse_timestamp("2024-02-15Z").unwrap();
        let bookmark = parse_timestamp("2024-02-01T00:00:00Z").unwrap();
        assert!(date > bookmark);
        assert_eq!(date, Utc.with_ymd_and_hms(2024, 2, 15, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_cursor_value_of() {
        let record = json!({
            "ok": "2024-03-01T00:00:00Z",
            "bad": "soon",
            "num": 17,
            "nil": null
        });
        let record = record.as_object().unwrap();

        assert!(matches!(
            CursorValue::of(record, "ok"),
            CursorValue::Valid { ref raw, .. } if raw == "2024-03-01T00:00:00Z"
        ));
        assert_eq!(
            CursorValue::of(record, "bad"),
            CursorValue::Malformed("soon".into())
        );
        assert_eq!(
            CursorValue::of(record, "num"),
            CursorValue::Malformed("17".into())
        );
        assert_eq!(CursorValue::of(record, "nil"), CursorValue::Missing);
        assert_eq!(CursorValue::of(record, "absent"), CursorValue::Missing);
    }
}
