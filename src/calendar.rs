//! Month-grid projection of a cycle report.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Months, NaiveDate};
use serde::Serialize;

use crate::cycle::LUTEAL_DAYS;
use crate::dates::days_between;
use crate::models::{CycleReport, DayCell, DayLabel, MonthGrid};

/// A calendar month. `month` is 1-based (1 = January).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MonthError {
    #[error("unrecognised month '{0}', expected YYYY-MM")]
    Invalid(String),
    #[error("month {0} is out of range")]
    OutOfRange(u32),
    #[error("month offset leaves the supported calendar")]
    Overflow,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Result<Self, MonthError> {
        if !(1..=12).contains(&month) || NaiveDate::from_ymd_opt(year, month, 1).is_none() {
            return Err(MonthError::OutOfRange(month));
        }
        Ok(Self { year, month })
    }

    pub fn year(self) -> i32 {
        self.year
    }

    pub fn month(self) -> u32 {
        self.month
    }

    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn first_day(self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .unwrap_or_else(|| unreachable!("YearMonth is validated on construction"))
    }

    /// Move by whole months, like the previous/next buttons of a month view.
    pub fn offset(self, months: i32) -> Result<Self, MonthError> {
        let first = self.first_day();
        let step = Months::new(months.unsigned_abs());
        let shifted = if months >= 0 {
            first.checked_add_months(step)
        } else {
            first.checked_sub_months(step)
        };
        shifted.map(Self::containing).ok_or(MonthError::Overflow)
    }

    pub fn days_in_month(self) -> u32 {
        match self.first_day().checked_add_months(Months::new(1)) {
            Some(next) => days_between(self.first_day(), next) as u32,
            // December of the last representable year
            None => 31,
        }
    }

    pub fn contains(self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    /// `March 2024`
    pub fn label(self) -> String {
        self.first_day().format("%B %Y").to_string()
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = MonthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || MonthError::Invalid(s.to_string());
        let (year, month) = s.rsplit_once('-').ok_or_else(invalid)?;
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        Self::new(year, month)
    }
}

/// Label every day of `month` with its cycle markers.
///
/// Returns `None` when the report carries no reference date. Days before the
/// reference date only ever get the `today` marker.
pub fn project(report: &CycleReport, month: YearMonth, today: NaiveDate) -> Option<MonthGrid> {
    let reference = report.reference_date?;
    let first = month.first_day();

    let days = first
        .iter_days()
        .take_while(|d| month.contains(*d))
        .map(|date| {
            let mut labels =
                cycle_labels(days_between(reference, date), report.cycle_length, report.period_length);
            if date == today {
                labels.insert(DayLabel::Today);
            }
            DayCell { date, labels }
        })
        .collect();

    Some(MonthGrid {
        year: month.year,
        month: month.month,
        leading_blank_count: first.weekday().num_days_from_sunday(),
        days,
    })
}

/// Markers for a day `elapsed` days after the reference date, using the
/// 0-based position in the cycle.
pub fn cycle_labels(elapsed: i64, cycle_length: u32, period_length: u32) -> BTreeSet<DayLabel> {
    let mut labels = BTreeSet::new();
    let len = i64::from(cycle_length);
    if elapsed < 0 || len == 0 {
        return labels;
    }

    let day_in_cycle = elapsed % len;
    let ov_index = len - LUTEAL_DAYS;

    if day_in_cycle < i64::from(period_length) {
        labels.insert(DayLabel::Period);
    }
    if (ov_index - 3..=ov_index + 1).contains(&day_in_cycle) {
        labels.insert(DayLabel::Fertile);
    }
    if day_in_cycle == ov_index {
        labels.insert(DayLabel::Ovulation);
    }
    labels
}
