//! Parsing of the `year` and `month` query parameters and the date ranges they select.
//!
//! Both pages that take these parameters treat a missing or malformed value
//! the same way: they fall back to the current local year or month instead of
//! rejecting the request.

use serde::Deserialize;
use time::{Date, Month};

use crate::Error;

/// The earliest year that can be selected.
pub const MIN_YEAR: i32 = 1900;
/// The latest year that can be selected.
pub const MAX_YEAR: i32 = 9999;

/// The raw query parameters for pages filtered by year and, optionally, month.
///
/// The values are kept as strings so that a malformed value falls back to the
/// default instead of failing the whole request.
#[derive(Debug, Default, Deserialize)]
pub struct PeriodQuery {
    pub year: Option<String>,
    pub month: Option<String>,
}

/// Parse a year from `raw`, falling back to `current_year` when it is
/// missing, not a number or outside [MIN_YEAR]..=[MAX_YEAR].
pub fn parse_year(raw: Option<&str>, current_year: i32) -> i32 {
    raw.and_then(|year| year.trim().parse::<i32>().ok())
        .filter(|year| (MIN_YEAR..=MAX_YEAR).contains(year))
        .unwrap_or(current_year)
}

/// Parse a month number (1-12) from `raw`, falling back to `current_month`.
pub fn parse_month(raw: Option<&str>, current_month: Month) -> Month {
    raw.and_then(|month| month.trim().parse::<u8>().ok())
        .and_then(|month| Month::try_from(month).ok())
        .unwrap_or(current_month)
}

/// The first and last day of `year`.
///
/// # Errors
/// Returns [Error::InvalidDateFormat] if `year` cannot be represented as a date.
pub fn year_date_range(year: i32) -> Result<(Date, Date), Error> {
    let first = Date::from_calendar_date(year, Month::January, 1)
        .map_err(|error| Error::InvalidDateFormat(error.to_string(), format!("{year}-01-01")))?;
    let last = Date::from_calendar_date(year, Month::December, 31)
        .map_err(|error| Error::InvalidDateFormat(error.to_string(), format!("{year}-12-31")))?;

    Ok((first, last))
}

/// The first and last day of `month` in `year`.
///
/// # Errors
/// Returns [Error::InvalidDateFormat] if `year` cannot be represented as a date.
pub fn month_date_range(year: i32, month: Month) -> Result<(Date, Date), Error> {
    let last_day = month.length(year);
    let first = Date::from_calendar_date(year, month, 1).map_err(|error| {
        Error::InvalidDateFormat(error.to_string(), format!("{year}-{}-01", month as u8))
    })?;
    let last = Date::from_calendar_date(year, month, last_day).map_err(|error| {
        Error::InvalidDateFormat(
            error.to_string(),
            format!("{year}-{}-{last_day}", month as u8),
        )
    })?;

    Ok((first, last))
}

/// The years a user can pick from, newest first.
///
/// The range spans the year of the user's earliest transaction up to the
/// current year, and always includes `selected_year`. Years before [MIN_YEAR]
/// are never offered.
pub fn year_options(earliest_year: Option<i32>, current_year: i32, selected_year: i32) -> Vec<i32> {
    let first = earliest_year
        .unwrap_or(current_year)
        .min(current_year)
        .min(selected_year)
        .max(MIN_YEAR);
    let last = current_year.max(selected_year);

    (first..=last).rev().collect()
}
