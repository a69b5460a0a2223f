use chrono::NaiveDate;

use crate::dates::{days_between, shift};
use crate::models::{CycleParameters, CycleReport, Phase};

/// The luteal phase is assumed to last this long, so ovulation sits this many
/// days before the next period.
pub const LUTEAL_DAYS: i64 = 14;
/// 40-week gestational estimate counted from the last period start.
pub const GESTATION_DAYS: i64 = 280;
/// Fertile window runs from three days before ovulation to one day after.
const FERTILE_BEFORE: i64 = 3;
const FERTILE_AFTER: i64 = 1;

/// Derive all cycle and pregnancy estimates for `today`.
///
/// Never fails: without a reference date the default report is returned, and
/// fields that do not apply (reference in the future, zero cycle length,
/// calendar overflow) are left as `None`.
pub fn compute(params: &CycleParameters, today: NaiveDate) -> CycleReport {
    let Some(reference) = params.reference_date else {
        return CycleReport::default();
    };

    let cycle_length = i64::from(params.cycle_length);
    let period_length = i64::from(params.period_length);

    let next_period_start = shift(reference, cycle_length);
    let next_period_end = next_period_start.and_then(|d| shift(d, period_length - 1));

    let ovulation_day = shift(reference, cycle_length - LUTEAL_DAYS);
    let fertile_start = ovulation_day.and_then(|d| shift(d, -FERTILE_BEFORE));
    let fertile_end = ovulation_day.and_then(|d| shift(d, FERTILE_AFTER));

    let due_date = shift(reference, GESTATION_DAYS);
    let elapsed = days_between(reference, today);

    let mut report = CycleReport {
        reference_date: Some(reference),
        cycle_length: params.cycle_length,
        period_length: params.period_length,
        next_period_start,
        next_period_end,
        ovulation_day,
        fertile_start,
        fertile_end,
        due_date,
        days_since_reference: Some(elapsed),
        ..CycleReport::default()
    };

    if elapsed >= 0 {
        report.pregnancy_weeks = Some(elapsed / 7);
        report.pregnancy_extra_days = Some(elapsed % 7);
        report.cycle_day_today = cycle_day(elapsed, params.cycle_length);
        report.current_phase = report
            .cycle_day_today
            .map(|day| classify_phase(day, params.cycle_length, params.period_length));
    }

    tracing::trace!(
        elapsed,
        cycle_day = ?report.cycle_day_today,
        phase = ?report.current_phase,
        "cycle report computed"
    );

    report
}

/// 1-based position of `elapsed` in an endlessly repeating cycle anchored at
/// the reference date. `None` for a zero-length cycle.
pub fn cycle_day(elapsed: i64, cycle_length: u32) -> Option<u32> {
    let len = i64::from(cycle_length);
    if len == 0 || elapsed < 0 {
        return None;
    }
    u32::try_from(elapsed % len + 1).ok()
}

/// Classify a 1-based cycle day. First match wins: menstrual, follicular,
/// fertile, then luteal as the fallback.
///
/// The bounds compare the 1-based `cycle_day` against the 0-based ovulation
/// index, so the fertile phase here runs one day later than the absolute
/// fertile window and the calendar markers.
pub fn classify_phase(cycle_day: u32, cycle_length: u32, period_length: u32) -> Phase {
    let day = i64::from(cycle_day);
    let ov_index = i64::from(cycle_length) - LUTEAL_DAYS;

    if day <= i64::from(period_length) {
        Phase::Menstrual
    } else if day < ov_index - 1 {
        Phase::Follicular
    } else if (ov_index - FERTILE_BEFORE..=ov_index + FERTILE_AFTER).contains(&day) {
        Phase::Fertile
    } else {
        Phase::Luteal
    }
}
