//! ISO 8601 parsing and formatting. Everything is timezone-naive; UTC is
//! implicit throughout.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::Resolution;

/// Parses an ISO 8601 date or datetime into a naive datetime.
///
/// Accepts `2020-01-01`, `2020-01-01T10:30:00` (with optional fractional
/// seconds), and the space-separated `2020-01-01 10:30:00` form. A bare date
/// parses to midnight.
pub fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = s.parse::<NaiveDateTime>() {
        return Some(dt);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(dt);
    }
    s.parse::<NaiveDate>()
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN))
}

/// Formats a bound the way it reads in a schema document: date-only for day
/// resolution, seconds precision otherwise.
pub fn format_bound(dt: NaiveDateTime, resolution: Resolution) -> String {
    match resolution {
        Resolution::Day => dt.date().format("%Y-%m-%d").to_string(),
        _ => dt.format("%Y-%m-%dT%H:%M:%S").to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_only() {
        let dt = parse_datetime("2020-01-01").unwrap();
        assert_eq!(dt.to_string(), "2020-01-01 00:00:00");
    }

    #[test]
    fn test_parse_datetime_t_separator() {
        let dt = parse_datetime("2020-01-01T10:30:00").unwrap();
        assert_eq!(dt.to_string(), "2020-01-01 10:30:00");
    }

    #[test]
    fn test_parse_datetime_space_separator() {
        let dt = parse_datetime("2020-01-01 10:30:00").unwrap();
        assert_eq!(dt.to_string(), "2020-01-01 10:30:00");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_datetime("not-a-date").is_none());
        assert!(parse_datetime("2020-13-40").is_none());
        assert!(parse_datetime("").is_none());
    }

    #[test]
    fn test_format_bound_by_resolution() {
        let dt = parse_datetime("2020-01-01T10:30:00").unwrap();
        assert_eq!(format_bound(dt, Resolution::Day), "2020-01-01");
        assert_eq!(format_bound(dt, Resolution::Hour), "2020-01-01T10:30:00");
    }
}
