use std::fmt;

use chrono::{Months, NaiveDate, Weekday};
use serde::Serialize;

use crate::error::{AppError, AppResult};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Inclusive calendar-date range handed to the version-control backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> AppResult<Self> {
        if start > end {
            return Err(AppError::Input(format!(
                "start date {} is after end date {}",
                start.format(DATE_FORMAT),
                end.format(DATE_FORMAT)
            )));
        }
        Ok(Self { start, end })
    }

    /// Monday..Sunday of ISO week `week` in ISO year `year`.
    pub fn for_week(week: u32, year: i32) -> AppResult<Self> {
        let start = NaiveDate::from_isoywd_opt(year, week, Weekday::Mon)
            .ok_or_else(|| AppError::Input(format!("week {week} does not exist in {year}")))?;
        let end = NaiveDate::from_isoywd_opt(year, week, Weekday::Sun)
            .ok_or_else(|| AppError::Input(format!("week {week} does not exist in {year}")))?;
        Self::new(start, end)
    }

    pub fn for_month(month: u32, year: i32) -> AppResult<Self> {
        let start = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| AppError::Input(format!("month {month} of {year} is not valid")))?;
        let end = start
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .ok_or_else(|| AppError::Input(format!("month {month} of {year} is out of range")))?;
        Self::new(start, end)
    }

    pub fn start_str(&self) -> String {
        self.start.format(DATE_FORMAT).to_string()
    }

    pub fn end_str(&self) -> String {
        self.end.format(DATE_FORMAT).to_string()
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start_str(), self.end_str())
    }
}

/// The ways a caller may describe a range; resolved in a fixed precedence.
#[derive(Debug, Clone, Default)]
pub struct RangeRequest {
    pub since: Option<String>,
    pub until: Option<String>,
    pub week: Option<u32>,
    pub month: Option<u32>,
    pub year: Option<i32>,
}

impl RangeRequest {
    /// Week + year wins over month + year, which wins over an explicit pair.
    pub fn resolve(&self) -> AppResult<DateRange> {
        match (self.week, self.month, self.year) {
            (Some(week), _, Some(year)) => DateRange::for_week(week, year),
            (None, Some(month), Some(year)) => DateRange::for_month(month, year),
            _ => match (&self.since, &self.until) {
                (Some(since), Some(until)) => {
                    DateRange::new(parse_date(since)?, parse_date(until)?)
                }
                _ => Err(AppError::Input(
                    "provide --since and --until, --week with --year, or --month with --year"
                        .to_string(),
                )),
            },
        }
    }
}

pub fn parse_date(value: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|err| AppError::Input(format!("'{value}' is not a YYYY-MM-DD date: {err}")))
}

pub fn format_day(day: NaiveDate) -> String {
    day.format(DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn resolves_iso_week() {
        let range = DateRange::for_week(39, 2024).unwrap();
        assert_eq!(range.start, date(2024, 9, 23));
        assert_eq!(range.end, date(2024, 9, 29));
    }

    #[test]
    fn week_one_can_start_in_previous_year() {
        let range = DateRange::for_week(1, 2025).unwrap();
        assert_eq!(range.start, date(2024, 12, 30));
        assert_eq!(range.end, date(2025, 1, 5));
    }

    #[test]
    fn rejects_missing_week() {
        assert!(matches!(DateRange::for_week(53, 2024), Err(AppError::Input(_))));
    }

    #[test]
    fn resolves_month_including_leap_day() {
        let range = DateRange::for_month(2, 2024).unwrap();
        assert_eq!(range.start, date(2024, 2, 1));
        assert_eq!(range.end, date(2024, 2, 29));

        let december = DateRange::for_month(12, 2024).unwrap();
        assert_eq!(december.end, date(2024, 12, 31));
    }

    #[test]
    fn rejects_invalid_month() {
        assert!(matches!(DateRange::for_month(13, 2024), Err(AppError::Input(_))));
    }

    #[test]
    fn week_takes_precedence_over_month_and_explicit_range() {
        let request = RangeRequest {
            since: Some("2020-01-01".to_string()),
            until: Some("2020-01-31".to_string()),
            week: Some(39),
            month: Some(3),
            year: Some(2024),
        };
        assert_eq!(request.resolve().unwrap().start, date(2024, 9, 23));
    }

    #[test]
    fn month_takes_precedence_over_explicit_range() {
        let request = RangeRequest {
            since: Some("2020-01-01".to_string()),
            until: Some("2020-01-31".to_string()),
            month: Some(3),
            year: Some(2024),
            ..RangeRequest::default()
        };
        assert_eq!(request.resolve().unwrap().end, date(2024, 3, 31));
    }

    #[test]
    fn explicit_range_requires_both_bounds() {
        let request = RangeRequest {
            since: Some("2024-09-23".to_string()),
            ..RangeRequest::default()
        };
        assert!(matches!(request.resolve(), Err(AppError::Input(_))));
    }

    #[test]
    fn week_without_year_is_an_input_error() {
        let request = RangeRequest {
            week: Some(39),
            ..RangeRequest::default()
        };
        assert!(matches!(request.resolve(), Err(AppError::Input(_))));
    }

    #[test]
    fn explicit_range_must_be_ordered() {
        let request = RangeRequest {
            since: Some("2024-09-29".to_string()),
            until: Some("2024-09-23".to_string()),
            ..RangeRequest::default()
        };
        assert!(matches!(request.resolve(), Err(AppError::Input(_))));
    }

    #[test]
    fn displays_as_label() {
        let range = DateRange::new(date(2024, 9, 23), date(2024, 9, 29)).unwrap();
        assert_eq!(range.to_string(), "2024-09-23 to 2024-09-29");
    }
}
