//! Whole-engine properties: determinism, phase partition, label consistency.

use chrono::{Datelike, NaiveDate};
use cycle_tracker::cycle::classify_phase;
use cycle_tracker::{compute, project, CycleParameters, DayLabel, Phase, YearMonth};

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn months_of(year: i32) -> impl Iterator<Item = YearMonth> {
    (1..=12).map(move |m| YearMonth::new(year, m).unwrap())
}

#[test]
fn compute_and_project_are_deterministic() {
    let params = CycleParameters::new(ymd(2024, 1, 1), 28, 5);
    let today = ymd(2024, 3, 15);

    let a = compute(&params, today);
    let b = compute(&params, today);
    assert_eq!(a, b);

    let month = YearMonth::new(2024, 3).unwrap();
    assert_eq!(project(&a, month, today), project(&b, month, today));
}

#[test]
fn each_phase_covers_one_contiguous_run() {
    for cycle_length in 20..=40 {
        for period_length in 2..=10 {
            let phases: Vec<Phase> = (1..=cycle_length)
                .map(|d| classify_phase(d, cycle_length, period_length))
                .collect();

            let mut runs: Vec<Phase> = Vec::new();
            for p in &phases {
                if runs.last() != Some(p) {
                    assert!(!runs.contains(p), "{p:?} split in {cycle_length}/{period_length}");
                    runs.push(*p);
                }
            }

            assert_eq!(runs.first(), Some(&Phase::Menstrual));
            assert_eq!(runs.last(), Some(&Phase::Luteal));
            // room for a follicular day before the fertile phase starts
            if period_length + 16 < cycle_length {
                assert_eq!(
                    runs,
                    vec![Phase::Menstrual, Phase::Follicular, Phase::Fertile, Phase::Luteal],
                    "{cycle_length}/{period_length}"
                );
            }
        }
    }
}

#[test]
fn phase_sequence_never_goes_backwards() {
    let rank = |p: Phase| match p {
        Phase::Menstrual => 0,
        Phase::Follicular => 1,
        Phase::Fertile => 2,
        Phase::Luteal => 3,
    };
    for cycle_length in 20..=40 {
        for period_length in 2..=10 {
            let ranks: Vec<_> = (1..=cycle_length)
                .map(|d| rank(classify_phase(d, cycle_length, period_length)))
                .collect();
            assert!(ranks.windows(2).all(|w| w[0] <= w[1]), "{cycle_length}/{period_length}");
        }
    }
}

#[test]
fn report_phase_matches_cycle_day() {
    let params = CycleParameters::new(ymd(2024, 1, 1), 31, 6);
    for offset in 0..200u64 {
        let today = ymd(2024, 1, 1) + chrono::Days::new(offset);
        let report = compute(&params, today);
        let day = report.cycle_day_today.unwrap();
        assert!((1..=31).contains(&day));
        assert_eq!(report.current_phase, Some(classify_phase(day, 31, 6)));
    }
}

#[test]
fn future_reference_has_no_today_fields() {
    let report = compute(&CycleParameters::new(ymd(2025, 6, 1), 28, 5), ymd(2025, 5, 31));
    assert_eq!(report.days_since_reference, Some(-1));
    assert!(report.cycle_day_today.is_none());
    assert!(report.current_phase.is_none());
    assert!(report.pregnancy_weeks.is_none());
    assert!(report.pregnancy_extra_days.is_none());
}

#[test]
fn ovulation_days_are_always_fertile() {
    for cycle_length in [20, 24, 28, 33, 40] {
        let params = CycleParameters::new(ymd(2024, 1, 9), cycle_length, 5);
        let report = compute(&params, ymd(2024, 6, 1));
        for month in months_of(2024) {
            let grid = project(&report, month, ymd(2024, 6, 1)).unwrap();
            for cell in grid.days.iter().filter(|c| c.has(DayLabel::Ovulation)) {
                assert!(cell.has(DayLabel::Fertile), "{} ({cycle_length})", cell.date);
            }
        }
    }
}

#[test]
fn calendar_ovulation_matches_absolute_ovulation_day() {
    let params = CycleParameters::new(ymd(2024, 1, 1), 28, 5);
    let report = compute(&params, ymd(2024, 1, 1));
    let grid = project(&report, YearMonth::new(2024, 1).unwrap(), ymd(2024, 1, 1)).unwrap();
    let ovulation: Vec<_> = grid
        .days
        .iter()
        .filter(|c| c.has(DayLabel::Ovulation))
        .map(|c| c.date)
        .collect();
    assert_eq!(ovulation, vec![report.ovulation_day.unwrap()]);

    let fertile: Vec<_> = grid
        .days
        .iter()
        .filter(|c| c.has(DayLabel::Fertile))
        .map(|c| c.date)
        .collect();
    assert_eq!(fertile.first().copied(), report.fertile_start);
    assert_eq!(fertile.last().copied(), report.fertile_end);
}

#[test]
fn today_marked_once_and_only_in_its_month() {
    let today = ymd(2024, 7, 19);
    let report = compute(&CycleParameters::new(ymd(2024, 1, 1), 28, 5), today);
    for month in months_of(2024) {
        let grid = project(&report, month, today).unwrap();
        let marked: Vec<_> = grid.days.iter().filter(|c| c.has(DayLabel::Today)).collect();
        if month.month() == 7 {
            assert_eq!(marked.len(), 1);
            assert_eq!(marked[0].date, today);
        } else {
            assert!(marked.is_empty());
        }
    }
}

#[test]
fn grid_covers_the_whole_month_in_order() {
    let report = compute(&CycleParameters::new(ymd(2023, 11, 20), 28, 5), ymd(2024, 2, 1));
    for month in months_of(2024) {
        let grid = project(&report, month, ymd(2024, 2, 1)).unwrap();
        assert_eq!(grid.days.len() as u32, month.days_in_month());
        assert_eq!(grid.leading_blank_count, month.first_day().weekday().num_days_from_sunday());
        for (i, cell) in grid.days.iter().enumerate() {
            assert_eq!(cell.date.day() as usize, i + 1);
        }
    }
}

#[test]
fn leap_february_has_29_cells() {
    let report = compute(&CycleParameters::new(ymd(2024, 1, 1), 28, 5), ymd(2024, 1, 1));
    let grid = project(&report, YearMonth::new(2024, 2).unwrap(), ymd(2024, 1, 1)).unwrap();
    assert_eq!(grid.days.len(), 29);
    // 2024-02-01 was a Thursday
    assert_eq!(grid.leading_blank_count, 4);
}

#[test]
fn degenerate_parameters_never_panic() {
    let today = ymd(2024, 5, 5);
    for cycle_length in [0, 1, 5, 13, 14, 15, 100] {
        for period_length in [0, 1, 12, 200] {
            let params = CycleParameters::new(ymd(2024, 1, 1), cycle_length, period_length);
            let report = compute(&params, today);
            let grid = project(&report, YearMonth::new(2024, 5).unwrap(), today).unwrap();
            assert_eq!(grid.days.len(), 31);
        }
    }
}
