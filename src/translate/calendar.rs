//! Calendar arithmetic for relative date windows.
//!
//! All computations use the naive local calendar of the reference instant.
//! Weeks start on Monday. Calendar windows are half-open `[start, end)`.

use std::str::FromStr;

use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime};

/// Calendar unit named in a time cue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Unit {
    Day,
    Week,
    Month,
    Year,
}

impl FromStr for Unit {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "day" | "days" => Ok(Self::Day),
            "week" | "weeks" => Ok(Self::Week),
            "month" | "months" => Ok(Self::Month),
            "year" | "years" => Ok(Self::Year),
            _ => Err(()),
        }
    }
}

pub fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

/// First day of the calendar period containing `date`.
pub fn period_start(date: NaiveDate, unit: Unit) -> Option<NaiveDate> {
    match unit {
        Unit::Day => Some(date),
        Unit::Week => date.checked_sub_signed(Duration::days(
            i64::from(date.weekday().num_days_from_monday()),
        )),
        Unit::Month => date.with_day(1),
        Unit::Year => NaiveDate::from_ymd_opt(date.year(), 1, 1),
    }
}

/// Shift a date by `n` units (negative goes back). `None` on overflow.
pub fn shift_date(date: NaiveDate, unit: Unit, n: i64) -> Option<NaiveDate> {
    match unit {
        Unit::Day => date.checked_add_signed(Duration::try_days(n)?),
        Unit::Week => date.checked_add_signed(Duration::try_weeks(n)?),
        Unit::Month | Unit::Year => {
            let months = if unit == Unit::Year { n.checked_mul(12)? } else { n };
            let magnitude = Months::new(u32::try_from(months.unsigned_abs()).ok()?);
            if months >= 0 {
                date.checked_add_months(magnitude)
            } else {
                date.checked_sub_months(magnitude)
            }
        }
    }
}

/// Shift an instant by `n` units, keeping the time of day.
pub fn shift(at: NaiveDateTime, unit: Unit, n: i64) -> Option<NaiveDateTime> {
    shift_date(at.date(), unit, n).map(|d| d.and_time(at.time()))
}

/// The current calendar period containing `now`: `[start, next start)`.
pub fn this_period(now: NaiveDateTime, unit: Unit) -> Option<(NaiveDateTime, NaiveDateTime)> {
    let start = period_start(now.date(), unit)?;
    let end = shift_date(start, unit, 1)?;
    Some((start_of_day(start), start_of_day(end)))
}

/// The calendar period before the one containing `now`.
pub fn last_period(now: NaiveDateTime, unit: Unit) -> Option<(NaiveDateTime, NaiveDateTime)> {
    let current = period_start(now.date(), unit)?;
    let start = shift_date(current, unit, -1)?;
    Some((start_of_day(start), start_of_day(current)))
}

/// Parse an explicit ISO date (`YYYY-MM-DD`, also accepting `/` separators).
/// Impossible dates such as `2024-02-30` yield `None`.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%Y/%m/%d"))
        .ok()
}
