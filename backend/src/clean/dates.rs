//! Timestamp parsing and whole-day arithmetic.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S%.f",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

const NANOS_PER_DAY: i64 = 86_400 * 1_000_000_000;

/// Parse a timestamp cell. Returns `None` when no supported format matches.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }

    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }

    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.naive_utc())
}

/// Whole days from `start` to `end`, rounded toward negative infinity, so
/// twelve hours before `start` is day -1.
pub fn days_between(end: NaiveDateTime, start: NaiveDateTime) -> i64 {
    let delta = end - start;
    match delta.num_nanoseconds() {
        Some(n) => n.div_euclid(NANOS_PER_DAY),
        None => {
            let days = delta.num_days();
            if delta < chrono::Duration::days(days) {
                days - 1
            } else {
                days
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> NaiveDateTime {
        parse_timestamp(s).unwrap()
    }

    #[test]
    fn test_supported_formats() {
        let expected = NaiveDate::from_ymd_opt(2018, 2, 26)
            .unwrap()
            .and_hms_opt(19, 58, 54)
            .unwrap();
        assert_eq!(ts("2018-02-26 19:58:54"), expected);
        assert_eq!(ts("2018-02-26T19:58:54"), expected);
        assert_eq!(ts("2018-02-26T19:58:54Z"), expected);
        assert_eq!(ts("2018/02/26 19:58:54"), expected);
        assert_eq!(ts("02/26/2018 19:58:54"), expected);

        let midnight = NaiveDate::from_ymd_opt(2018, 2, 26)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(ts("2018-02-26"), midnight);
        assert_eq!(ts(" 2018-02-26 "), midnight);
    }

    #[test]
    fn test_fractional_seconds() {
        let dt = ts("2018-02-26 19:58:54.250");
        assert_eq!(dt.and_utc().timestamp_subsec_millis(), 250);
    }

    #[test]
    fn test_rfc3339_offset_converted_to_utc() {
        let dt = ts("2018-02-26T01:00:00+02:00");
        assert_eq!(dt, ts("2018-02-25 23:00:00"));
    }

    #[test]
    fn test_unparseable() {
        assert!(parse_timestamp("yesterday").is_none());
        assert!(parse_timestamp("2018-13-40").is_none());
    }

    #[test]
    fn test_days_between_whole_days() {
        assert_eq!(days_between(ts("2021-01-10"), ts("2021-01-01")), 9);
        assert_eq!(days_between(ts("2021-01-01"), ts("2021-01-10")), -9);
        assert_eq!(days_between(ts("2021-01-01"), ts("2021-01-01")), 0);
    }

    #[test]
    fn test_days_between_floors_partial_days() {
        assert_eq!(days_between(ts("2021-01-02 11:00:00"), ts("2021-01-01 12:00:00")), 0);
        assert_eq!(days_between(ts("2021-01-01 00:00:00"), ts("2021-01-01 12:00:00")), -1);
        assert_eq!(days_between(ts("2021-01-03 13:00:00"), ts("2021-01-01 12:00:00")), 2);
    }
}
