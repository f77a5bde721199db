//! Date formatting for API timestamps

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Display format for dates in tables and comparisons
pub const DATE_FORMAT: &str = "%m/%d/%Y";

/// Format an API timestamp as `MM/DD/YYYY`.
///
/// Accepts RFC 3339 (`2021-03-04T10:11:12.123456Z`), naive ISO datetimes
/// (`2021-03-04T10:11:12.123`) and plain dates. Anything else is returned
/// unchanged so the raw value still shows.
pub fn format_date(raw: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return String::new();
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.format(DATE_FORMAT).to_string();
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return dt.format(DATE_FORMAT).to_string();
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f") {
        return dt.format(DATE_FORMAT).to_string();
    }
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return d.format(DATE_FORMAT).to_string();
    }

    raw.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rfc3339_with_zone() {
        assert_eq!(format_date("2021-03-04T10:11:12.123456Z"), "03/04/2021");
        assert_eq!(format_date("2021-12-31T23:00:00+05:00"), "12/31/2021");
    }

    #[test]
    fn test_naive_datetime() {
        assert_eq!(format_date("2020-01-02T03:04:05.678"), "01/02/2020");
        assert_eq!(format_date("2020-01-02 03:04:05"), "01/02/2020");
    }

    #[test]
    fn test_plain_date() {
        assert_eq!(format_date("2019-07-08"), "07/08/2019");
    }

    #[test]
    fn test_unparseable_is_passed_through() {
        assert_eq!(format_date("yesterday"), "yesterday");
        assert_eq!(format_date("  "), "");
    }
}
