//! Calendar and clock utilities shared by every other module (C1).
//!
//! Dates are parsed as local-noon wall-clock instants so that day-of-week
//! derivation never slips a day across a DST boundary; nothing downstream of
//! this module should call into `chrono::Local` directly.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use thiserror::Error;

/// 0 = Sunday .. 6 = Saturday, the calendar convention this crate uses
/// throughout (which differs from `chrono::Weekday`, where Monday is 0).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Weekday0(pub u8);

impl Weekday0 {
    pub fn from_chrono(w: Weekday) -> Self {
        Self(w.num_days_from_sunday() as u8)
    }

    pub fn of(date: NaiveDate) -> Self {
        Self::from_chrono(date.weekday())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TimeParseError {
    #[error("could not parse date `{0}`, expected YYYY-MM-DD")]
    BadDate(String),
    #[error("could not parse time `{0}`, expected HH:MM")]
    BadTime(String),
}

/// Parses `YYYY-MM-DD` into a [`NaiveDate`]. The local-noon framing mentioned
/// in the module doc applies once the date is combined with a time-of-day
/// elsewhere (availability windows store only `NaiveDate` + minute offsets,
/// so no `DateTime` is actually materialized here); this function exists so
/// every other module shares one parser instead of re-deriving the format.
pub fn parse_date(s: &str) -> Result<NaiveDate, TimeParseError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| TimeParseError::BadDate(s.to_string()))
}

/// Converts `"HH:MM"` into minutes since midnight.
pub fn time_to_minutes(s: &str) -> Result<u16, TimeParseError> {
    let (h, m) = s.split_once(':').ok_or_else(|| TimeParseError::BadTime(s.to_string()))?;
    let h: u16 = h.parse().map_err(|_| TimeParseError::BadTime(s.to_string()))?;
    let m: u16 = m.parse().map_err(|_| TimeParseError::BadTime(s.to_string()))?;
    if h > 23 || m > 59 {
        return Err(TimeParseError::BadTime(s.to_string()));
    }
    Ok(h * 60 + m)
}

/// Converts minutes since midnight back into `"HH:MM"`.
pub fn minutes_to_time(total: u16) -> String {
    format!("{:02}:{:02}", total / 60, total % 60)
}

/// Rounded absolute day count between two dates.
pub fn days_between(a: NaiveDate, b: NaiveDate) -> i64 {
    (b - a).num_days().abs()
}

/// One Monday..Sunday week, trimmed to the dates that actually fall within
/// the requested range.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WeekDefinition {
    pub week_number: u32,
    pub monday: NaiveDate,
    pub sunday: NaiveDate,
    pub dates_in_range: Vec<NaiveDate>,
}

impl WeekDefinition {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.dates_in_range.contains(&date)
    }
}

/// Rewinds `start` to its Monday (Sunday rewinds 6 days), then yields
/// consecutive 7-day windows until past `end`. Each week only lists the
/// dates that are actually within `[start, end]`.
pub fn enumerate_weeks(start: NaiveDate, end: NaiveDate) -> Vec<WeekDefinition> {
    let days_from_monday = start.weekday().num_days_from_monday() as i64;
    let mut monday = start - Duration::days(days_from_monday);

    let mut weeks = Vec::new();
    let mut week_number = 0;

    while monday <= end {
        let sunday = monday + Duration::days(6);
        let dates_in_range: Vec<NaiveDate> = (0..7)
            .map(|i| monday + Duration::days(i))
            .filter(|d| *d >= start && *d <= end)
            .collect();

        weeks.push(WeekDefinition {
            week_number,
            monday,
            sunday,
            dates_in_range,
        });

        week_number += 1;
        monday = monday + Duration::days(7);
    }

    weeks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_dates_and_times() {
        assert_eq!(parse_date("2026-03-07").unwrap(), NaiveDate::from_ymd_opt(2026, 3, 7).unwrap());
        assert!(parse_date("03/07/2026").is_err());
        assert_eq!(time_to_minutes("09:30").unwrap(), 570);
        assert_eq!(minutes_to_time(570), "09:30");
    }

    #[test]
    fn weekday0_matches_spec_convention() {
        // 2026-03-07 is a Saturday.
        let d = NaiveDate::from_ymd_opt(2026, 3, 7).unwrap();
        assert_eq!(Weekday0::of(d).0, 6);
        // 2026-03-01 is a Sunday.
        let d = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        assert_eq!(Weekday0::of(d).0, 0);
    }

    #[test]
    fn enumerate_weeks_rewinds_to_monday() {
        let start = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(); // Sunday
        let end = NaiveDate::from_ymd_opt(2026, 3, 7).unwrap(); // Saturday
        let weeks = enumerate_weeks(start, end);
        assert_eq!(weeks.len(), 1);
        assert_eq!(weeks[0].monday, NaiveDate::from_ymd_opt(2026, 2, 23).unwrap());
        assert_eq!(weeks[0].dates_in_range.len(), 7);
    }

    #[test]
    fn enumerate_weeks_spans_multiple_weeks() {
        let start = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(); // Monday
        let end = NaiveDate::from_ymd_opt(2026, 3, 15).unwrap(); // second Sunday
        let weeks = enumerate_weeks(start, end);
        assert_eq!(weeks.len(), 2);
        assert_eq!(weeks[1].week_number, 1);
    }

    #[test]
    fn days_between_is_symmetric_and_rounded() {
        let a = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let b = NaiveDate::from_ymd_opt(2026, 3, 4).unwrap();
        assert_eq!(days_between(a, b), 3);
        assert_eq!(days_between(b, a), 3);
    }
}
