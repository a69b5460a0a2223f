use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CYCLE_LENGTH: u32 = 28;
pub const DEFAULT_PERIOD_LENGTH: u32 = 5;

/// Accepted range for the cycle length at the input boundary.
pub const CYCLE_LENGTH_RANGE: std::ops::RangeInclusive<u32> = 20..=40;
/// Accepted range for the period length at the input boundary.
pub const PERIOD_LENGTH_RANGE: std::ops::RangeInclusive<u32> = 2..=10;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParamsError {
    #[error("cycle length must be between 20 and 40 days, got {0}")]
    CycleLength(u32),
    #[error("period length must be between 2 and 10 days, got {0}")]
    PeriodLength(u32),
    #[error("period length ({period}) must be shorter than cycle length ({cycle})")]
    PeriodNotShorter { period: u32, cycle: u32 },
}

/// Inputs to the calculator. A missing reference date means "no data yet".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleParameters {
    pub reference_date: Option<NaiveDate>,
    pub cycle_length: u32,
    pub period_length: u32,
}

impl Default for CycleParameters {
    fn default() -> Self {
        Self {
            reference_date: None,
            cycle_length: DEFAULT_CYCLE_LENGTH,
            period_length: DEFAULT_PERIOD_LENGTH,
        }
    }
}

impl CycleParameters {
    pub fn new(reference_date: NaiveDate, cycle_length: u32, period_length: u32) -> Self {
        Self {
            reference_date: Some(reference_date),
            cycle_length,
            period_length,
        }
    }

    /// Check the ranges the entry form enforces. The calculator itself
    /// accepts anything and never calls this.
    pub fn validate(&self) -> Result<(), ParamsError> {
        if !CYCLE_LENGTH_RANGE.contains(&self.cycle_length) {
            return Err(ParamsError::CycleLength(self.cycle_length));
        }
        if !PERIOD_LENGTH_RANGE.contains(&self.period_length) {
            return Err(ParamsError::PeriodLength(self.period_length));
        }
        if self.period_length >= self.cycle_length {
            return Err(ParamsError::PeriodNotShorter {
                period: self.period_length,
                cycle: self.cycle_length,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    Menstrual,
    Follicular,
    Fertile,
    Luteal,
}

impl Phase {
    pub fn label(self) -> &'static str {
        match self {
            Phase::Menstrual => "Menstrual phase",
            Phase::Follicular => "Follicular phase",
            Phase::Fertile => "Fertile window",
            Phase::Luteal => "Luteal phase",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Phase::Menstrual => "Typical bleeding days of your cycle.",
            Phase::Follicular => "Hormones rise and a follicle matures.",
            Phase::Fertile => "Higher chance of conception around ovulation.",
            Phase::Luteal => "Post-ovulation phase; PMS symptoms may appear for some people.",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Everything derived from one set of parameters and one `today`.
///
/// `Default` is the "no data" report returned when no reference date is set.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CycleReport {
    pub reference_date: Option<NaiveDate>,
    pub cycle_length: u32,
    pub period_length: u32,
    pub next_period_start: Option<NaiveDate>,
    pub next_period_end: Option<NaiveDate>,
    pub ovulation_day: Option<NaiveDate>,
    pub fertile_start: Option<NaiveDate>,
    pub fertile_end: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub days_since_reference: Option<i64>,
    pub cycle_day_today: Option<u32>,
    pub current_phase: Option<Phase>,
    pub pregnancy_weeks: Option<i64>,
    pub pregnancy_extra_days: Option<i64>,
}

impl CycleReport {
    pub fn has_data(&self) -> bool {
        self.reference_date.is_some()
    }
}

/// Calendar markers, ordered the way the legend lists them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayLabel {
    Period,
    Fertile,
    Ovulation,
    Today,
}

impl DayLabel {
    pub fn name(self) -> &'static str {
        match self {
            DayLabel::Period => "period",
            DayLabel::Fertile => "fertile",
            DayLabel::Ovulation => "ovulation",
            DayLabel::Today => "today",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayCell {
    pub date: NaiveDate,
    pub labels: BTreeSet<DayLabel>,
}

impl DayCell {
    pub fn has(&self, label: DayLabel) -> bool {
        self.labels.contains(&label)
    }
}

/// Data handed to a renderer for a month view. `month` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthGrid {
    pub year: i32,
    pub month: u32,
    /// Weekday of the 1st, 0 = Sunday.
    pub leading_blank_count: u32,
    pub days: Vec<DayCell>,
}

/// The flat record a host persists between sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TrackerData {
    #[serde(with = "optional_iso_date")]
    pub last_period: Option<NaiveDate>,
    #[serde(deserialize_with = "lenient::cycle_length")]
    pub cycle_length: u32,
    #[serde(deserialize_with = "lenient::period_length")]
    pub period_length: u32,
    #[serde(deserialize_with = "lenient::flag")]
    pub pregnancy_mode: bool,
}

impl Default for TrackerData {
    fn default() -> Self {
        Self {
            last_period: None,
            cycle_length: DEFAULT_CYCLE_LENGTH,
            period_length: DEFAULT_PERIOD_LENGTH,
            pregnancy_mode: false,
        }
    }
}

impl TrackerData {
    pub fn parameters(&self) -> CycleParameters {
        CycleParameters {
            reference_date: self.last_period,
            cycle_length: self.cycle_length,
            period_length: self.period_length,
        }
    }
}

/// `lastPeriod` is stored as `"YYYY-MM-DD"`, with `""` meaning unset.
mod optional_iso_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &Option<NaiveDate>, s: S) -> Result<S::Ok, S::Error> {
        match date {
            Some(d) => s.serialize_str(&d.format("%Y-%m-%d").to_string()),
            None => s.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
        let raw = Option::<String>::deserialize(d)?.unwrap_or_default();
        if raw.trim().is_empty() {
            return Ok(None);
        }
        crate::dates::parse_calendar_date(&raw)
            .map(Some)
            .map_err(serde::de::Error::custom)
    }
}

/// Form fields may have been saved as raw input text (`"30"`), as `0`, or
/// not at all; anything unusable falls back to the default.
mod lenient {
    use serde::de::IgnoredAny;
    use serde::{Deserialize, Deserializer};

    use super::{DEFAULT_CYCLE_LENGTH, DEFAULT_PERIOD_LENGTH};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawLength {
        Number(f64),
        Text(String),
        #[allow(dead_code)]
        Other(IgnoredAny),
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawFlag {
        Bool(bool),
        #[allow(dead_code)]
        Other(IgnoredAny),
    }

    pub fn cycle_length<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
        length_or(d, DEFAULT_CYCLE_LENGTH)
    }

    pub fn period_length<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
        length_or(d, DEFAULT_PERIOD_LENGTH)
    }

    pub fn flag<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
        Ok(matches!(RawFlag::deserialize(d)?, RawFlag::Bool(true)))
    }

    fn length_or<'de, D: Deserializer<'de>>(d: D, default: u32) -> Result<u32, D::Error> {
        let value = match RawLength::deserialize(d)? {
            RawLength::Number(n) => Some(n),
            RawLength::Text(t) => t.trim().parse::<f64>().ok(),
            RawLength::Other(_) => None,
        };
        Ok(match value {
            Some(n) if n.is_finite() && n >= 1.0 && n <= f64::from(u32::MAX) => n as u32,
            _ => default,
        })
    }
}
