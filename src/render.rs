//! Plain-text views of a report and a month grid.

use cycle_tracker::calendar::YearMonth;
use cycle_tracker::dates::format_optional_date;
use cycle_tracker::models::{CycleReport, DayCell, DayLabel, MonthGrid};

const WEEKDAYS: &str = " S   M   T   W   T   F   S";
const CELL_WIDTH: usize = 4;
const DISCLAIMER: &str = "This tool uses standard average-cycle assumptions and should not \
                          replace professional medical guidance.";

pub fn status(report: &CycleReport, pregnancy: bool) -> String {
    let mut out = String::new();

    out.push_str("Today in your cycle\n");
    if !report.has_data() {
        out.push_str("  Add your last period date to see where you are in this cycle.\n\n");
        out.push_str("Cycle prediction\n");
        out.push_str(
            "  Once you add your data, you'll see your next period and ovulation window here.\n",
        );
        return out;
    }

    let day = report
        .cycle_day_today
        .map(|d| d.to_string())
        .unwrap_or_else(|| "-".to_string());
    out.push_str(&format!("  Day {day}\n"));
    match report.current_phase {
        Some(phase) => {
            out.push_str(&format!("  {}\n", phase.label()));
            out.push_str(&format!("  {}\n", phase.description()));
        }
        None => out.push_str("  Cycle phase unavailable\n"),
    }

    out.push_str("\nCycle prediction\n");
    out.push_str(&format!(
        "  Next period:   {} (window {} to {})\n",
        format_optional_date(report.next_period_start),
        format_optional_date(report.next_period_start),
        format_optional_date(report.next_period_end),
    ));
    out.push_str(&format!(
        "  Ovulation day: {} (fertile window {} to {})\n",
        format_optional_date(report.ovulation_day),
        format_optional_date(report.fertile_start),
        format_optional_date(report.fertile_end),
    ));

    if pregnancy {
        out.push_str("\nPregnancy estimate\n");
        out.push_str(&format!(
            "  Estimated due date: {}\n",
            format_optional_date(report.due_date)
        ));
        if let (Some(weeks), Some(days)) = (report.pregnancy_weeks, report.pregnancy_extra_days) {
            out.push_str(&format!(
                "  Based on your last period, you are approximately {weeks} weeks {days} days pregnant.\n"
            ));
        }
        out.push_str(&format!("  {DISCLAIMER}\n"));
    }

    out
}

pub fn no_calendar() -> String {
    "Once you add your data, you'll see cycle highlights for each month here.\n".to_string()
}

pub fn calendar(grid: &MonthGrid) -> String {
    let mut out = String::new();
    let title = YearMonth::new(grid.year, grid.month)
        .map(YearMonth::label)
        .unwrap_or_else(|_| format!("{}-{:02}", grid.year, grid.month));
    out.push_str(&format!("{title:^width$}\n", width = WEEKDAYS.len()));
    out.push_str(WEEKDAYS);
    out.push('\n');

    let lead = grid.leading_blank_count as usize;
    let mut line = " ".repeat(lead * CELL_WIDTH);
    for (i, cell) in grid.days.iter().enumerate() {
        line.push_str(&cell_text(cell));
        if (lead + i + 1) % 7 == 0 {
            out.push_str(line.trim_end());
            out.push('\n');
            line.clear();
        }
    }
    if !line.trim().is_empty() {
        out.push_str(line.trim_end());
        out.push('\n');
    }

    out.push_str("\n  p period   f fertile window   o ovulation   * today\n");
    out
}

/// Day number plus one cycle marker and the today marker, four columns wide.
fn cell_text(cell: &DayCell) -> String {
    use chrono::Datelike;

    let marker = if cell.has(DayLabel::Ovulation) {
        'o'
    } else if cell.has(DayLabel::Period) {
        'p'
    } else if cell.has(DayLabel::Fertile) {
        'f'
    } else {
        ' '
    };
    let today = if cell.has(DayLabel::Today) { '*' } else { ' ' };
    format!("{:>2}{marker}{today}", cell.date.day())
}
