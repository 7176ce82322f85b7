//! Validity windows and fiscal periods
//!
//! Records may carry a start and/or end date; a missing bound is open.
//! Fiscal years run from a configurable start month (July by default) and
//! are written `YYYY-YYYY`, quarters `qN:YYYY-YYYY`.

use crate::error::ParseError;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Default first month of the fiscal year (July)
pub const DEFAULT_FISCAL_START_MONTH: u32 = 7;

/// Inclusive date range with optional bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DateWindow {
    /// First valid day
    #[serde(default, rename = "start_date", skip_serializing_if = "Option::is_none")]
    pub start: Option<NaiveDate>,
    /// Last valid day
    #[serde(default, rename = "end_date", skip_serializing_if = "Option::is_none")]
    pub end: Option<NaiveDate>,
}

impl DateWindow {
    /// Unbounded window
    pub const OPEN: DateWindow = DateWindow {
        start: None,
        end: None,
    };

    /// Window between two days, inclusive
    #[inline]
    #[must_use]
    pub const fn between(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    /// Whether both bounds are missing
    #[inline]
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// Whether the bounds are inverted, so no day is inside
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!((self.start, self.end), (Some(start), Some(end)) if start > end)
    }

    /// Whether a day lies inside
    #[must_use]
    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start.map_or(true, |start| start <= day) && self.end.map_or(true, |end| day <= end)
    }

    /// Whether two windows share at least one day
    #[must_use]
    pub fn intersects(&self, other: &DateWindow) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        let starts_in_time = match (self.start, other.end) {
            (Some(start), Some(end)) => start <= end,
            _ => true,
        };
        let other_starts_in_time = match (other.start, self.end) {
            (Some(start), Some(end)) => start <= end,
            _ => true,
        };
        starts_in_time && other_starts_in_time
    }
}

impl std::fmt::Display for DateWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(start) = self.start {
            write!(f, "{start}")?;
        }
        f.write_str("..")?;
        if let Some(end) = self.end {
            write!(f, "{end}")?;
        }
        Ok(())
    }
}

/// Parses `START..END` or `START/END`; either side may be empty
impl FromStr for DateWindow {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (start, end) = s
            .split_once("..")
            .or_else(|| s.split_once('/'))
            .ok_or_else(|| ParseError::InvalidDate(s.to_string()))?;
        Ok(Self {
            start: parse_day(start)?,
            end: parse_day(end)?,
        })
    }
}

fn parse_day(text: &str) -> Result<Option<NaiveDate>, ParseError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| ParseError::InvalidDate(text.to_string()))
}

/// First day of the month `offset` months after `start_month` of `year`
fn month_start(year: i32, start_month: u32, offset: u32) -> Option<NaiveDate> {
    if !(1..=12).contains(&start_month) {
        return None;
    }
    let zero_based = start_month - 1 + offset;
    let year = year.checked_add(i32::try_from(zero_based / 12).ok()?)?;
    NaiveDate::from_ymd_opt(year, zero_based % 12 + 1, 1)
}

/// Fiscal year identified by the calendar year it starts in
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FiscalYear {
    start_year: i32,
}

impl FiscalYear {
    /// Fiscal year starting in `start_year`
    #[inline]
    #[must_use]
    pub const fn new(start_year: i32) -> Self {
        Self { start_year }
    }

    /// Calendar year the fiscal year starts in
    #[inline]
    #[must_use]
    pub const fn start_year(self) -> i32 {
        self.start_year
    }

    /// Fiscal year containing a day
    #[must_use]
    pub fn containing(day: NaiveDate, start_month: u32) -> Self {
        if day.month() >= start_month {
            Self::new(day.year())
        } else {
            Self::new(day.year() - 1)
        }
    }

    /// Date range covered, `None` for an invalid start month
    #[must_use]
    pub fn window(self, start_month: u32) -> Option<DateWindow> {
        let start = month_start(self.start_year, start_month, 0)?;
        let end = month_start(self.start_year, start_month, 12)?.pred_opt()?;
        Some(DateWindow::between(start, end))
    }

    /// Quarter `number` (1..=4)
    #[must_use]
    pub fn quarter(self, number: u8) -> Option<FiscalQuarter> {
        (1..=4).contains(&number).then_some(FiscalQuarter {
            year: self,
            number,
        })
    }

    /// The four quarters in order
    #[must_use]
    pub fn quarters(self) -> [FiscalQuarter; 4] {
        [1, 2, 3, 4].map(|number| FiscalQuarter { year: self, number })
    }
}

impl std::fmt::Display for FiscalYear {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.start_year, i64::from(self.start_year) + 1)
    }
}

impl FromStr for FiscalYear {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseError::InvalidFiscalYear(s.to_string());
        let (first, second) = s.trim().split_once('-').ok_or_else(invalid)?;
        let first: i32 = first.parse().map_err(|_| invalid())?;
        let second: i32 = second.parse().map_err(|_| invalid())?;
        if first.checked_add(1) != Some(second) {
            return Err(invalid());
        }
        Ok(Self::new(first))
    }
}

impl TryFrom<String> for FiscalYear {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FiscalYear> for String {
    fn from(year: FiscalYear) -> Self {
        year.to_string()
    }
}

/// One quarter of a fiscal year; Q1 opens the fiscal year
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FiscalQuarter {
    year: FiscalYear,
    number: u8,
}

impl FiscalQuarter {
    /// Owning fiscal year
    #[inline]
    #[must_use]
    pub const fn year(self) -> FiscalYear {
        self.year
    }

    /// Quarter number, 1..=4
    #[inline]
    #[must_use]
    pub const fn number(self) -> u8 {
        self.number
    }

    /// Date range covered, `None` for an invalid start month
    #[must_use]
    pub fn window(self, start_month: u32) -> Option<DateWindow> {
        let offset = u32::from(self.number - 1) * 3;
        let start = month_start(self.year.start_year, start_month, offset)?;
        let end = month_start(self.year.start_year, start_month, offset + 3)?.pred_opt()?;
        Some(DateWindow::between(start, end))
    }
}

impl std::fmt::Display for FiscalQuarter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "q{}:{}", self.number, self.year)
    }
}

impl FromStr for FiscalQuarter {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (quarter, year) = s
            .trim()
            .split_once(':')
            .ok_or_else(|| ParseError::InvalidQuarter(s.to_string()))?;
        let number: u8 = quarter
            .trim_start_matches(['q', 'Q'])
            .parse()
            .map_err(|_| ParseError::InvalidQuarter(s.to_string()))?;
        let year: FiscalYear = year.parse()?;
        year.quarter(number)
            .ok_or_else(|| ParseError::InvalidQuarter(s.to_string()))
    }
}

/// Budget line for one fiscal year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FiscalBudget {
    /// Fiscal year the amount is allocated to
    pub fiscal_year: FiscalYear,
    /// Allocated amount
    pub amount: f64,
}
