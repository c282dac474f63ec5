//! Time utilities: calendar "today" and day counts in a configured timezone.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use thiserror::Error;

const SECONDS_PER_DAY: f64 = 86_400.0;
/// Half-hour steps tried past a skipped midnight (one full day).
const MIDNIGHT_SEARCH_STEPS: i64 = 48;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid timezone: {0}")]
pub struct InvalidTimezone(pub String);

/// Parse an IANA timezone name like "Asia/Shanghai".
pub fn parse_timezone(name: &str) -> Result<Tz, InvalidTimezone> {
    name.trim()
        .parse()
        .map_err(|_| InvalidTimezone(name.to_string()))
}

/// The calendar date `now` falls on in `tz`.
pub fn today_in(tz: Tz, now: DateTime<Utc>) -> NaiveDate {
    now.with_timezone(&tz).date_naive()
}

/// First instant of `date` in `tz`.
///
/// Where a DST jump skips midnight, the day starts at the first valid local
/// time after it, searched in half-hour steps. If none turns up within a day,
/// midnight is read as UTC.
pub fn local_midnight(date: NaiveDate, tz: Tz) -> DateTime<Tz> {
    let midnight = NaiveDateTime::from(date);
    (0..MIDNIGHT_SEARCH_STEPS)
        .map(|step| midnight + Duration::minutes(30 * step))
        .find_map(|local| tz.from_local_datetime(&local).earliest())
        .unwrap_or_else(|| tz.from_utc_datetime(&midnight))
}

/// Whole days from `today` to `target`, measured between local midnights.
///
/// Local days around DST changes last 23 or 25 hours, so the raw elapsed time
/// is rounded half away from zero. Ceiling would count a 25 hour day as two.
pub fn days_between(today: NaiveDate, target: NaiveDate, tz: Tz) -> i64 {
    let elapsed = local_midnight(target, tz) - local_midnight(today, tz);
    (elapsed.num_seconds() as f64 / SECONDS_PER_DAY).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn new_york() -> Tz {
        parse_timezone("America/New_York").unwrap()
    }

    #[test]
    fn test_parse_timezone() {
        assert_eq!(parse_timezone(" Asia/Shanghai ").unwrap(), chrono_tz::Asia::Shanghai);
        assert!(parse_timezone("Mars/Olympus").is_err());
    }

    #[test]
    fn test_today_in_shifts_across_date_line() {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 18, 30, 0).unwrap();
        assert_eq!(today_in(chrono_tz::UTC, now), d(2025, 3, 1));
        assert_eq!(today_in(chrono_tz::Asia::Shanghai, now), d(2025, 3, 2));
        assert_eq!(today_in(chrono_tz::America::Los_Angeles, now), d(2025, 3, 1));
    }

    #[test]
    fn test_spring_forward_day_counts_as_one() {
        // 2024-03-10 is 23 hours long in New York.
        let tz = new_york();
        let elapsed = local_midnight(d(2024, 3, 11), tz) - local_midnight(d(2024, 3, 10), tz);
        assert_eq!(elapsed.num_hours(), 23);
        assert_eq!(days_between(d(2024, 3, 10), d(2024, 3, 11), tz), 1);
        assert_eq!(days_between(d(2024, 3, 9), d(2024, 3, 11), tz), 2);
    }

    #[test]
    fn test_fall_back_day_counts_as_one() {
        // 2024-11-03 is 25 hours long; a ceiling would report 2.
        let tz = new_york();
        let elapsed = local_midnight(d(2024, 11, 4), tz) - local_midnight(d(2024, 11, 3), tz);
        assert_eq!(elapsed.num_hours(), 25);
        assert_eq!(days_between(d(2024, 11, 3), d(2024, 11, 4), tz), 1);
        assert_eq!(days_between(d(2024, 11, 3), d(2024, 11, 3), tz), 0);
    }

    #[test]
    fn test_days_between_matches_calendar_over_a_year() {
        let tz = new_york();
        let start = d(2024, 1, 1);
        let mut day = start;
        while day < d(2025, 1, 1) {
            assert_eq!(days_between(start, day, tz), (day - start).num_days());
            assert_eq!(days_between(day, start, tz), (start - day).num_days());
            day = day.succ_opt().unwrap();
        }
    }

    #[test]
    fn test_local_midnight_always_lands_on_its_date() {
        let zones = ["America/Santiago", "America/Havana", "Asia/Beirut", "Australia/Lord_Howe", "UTC"];
        for name in zones {
            let tz = parse_timezone(name).unwrap();
            let mut day = d(2023, 1, 1);
            while day < d(2026, 1, 1) {
                let start = local_midnight(day, tz);
                assert_eq!(start.date_naive(), day, "{name} {day}");
                assert!(start.time() <= chrono::NaiveTime::from_hms_opt(1, 0, 0).unwrap(), "{name} {day}");
                day = day.succ_opt().unwrap();
            }
        }
    }

    #[test]
    fn test_midnight_skipped_by_dst() {
        // Santiago moved clocks from 00:00 to 01:00 on 2024-09-08.
        let tz = parse_timezone("America/Santiago").unwrap();
        let start = local_midnight(d(2024, 9, 8), tz);
        assert_eq!(start.date_naive(), d(2024, 9, 8));
        assert_eq!(start.time(), chrono::NaiveTime::from_hms_opt(1, 0, 0).unwrap());
        assert_eq!(days_between(d(2024, 9, 7), d(2024, 9, 9), tz), 2);
    }
}
