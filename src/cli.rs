use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use cycle_tracker::calendar::YearMonth;
use cycle_tracker::dates::parse_calendar_date;

/// Cycle and pregnancy estimates from your last period date.
#[derive(Parser)]
#[command(
    name = "cycle-tracker",
    version,
    about = "Cycle phase, fertile window and pregnancy estimates. Not medical advice."
)]
pub struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to TOML configuration file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the data file location from config.
    #[arg(long, global = true)]
    pub data_file: Option<PathBuf>,

    /// Environment variable holding the passphrase for encrypted storage.
    #[arg(long, global = true)]
    pub passphrase_env: Option<String>,

    /// Treat this date as today instead of the system clock.
    #[arg(long, global = true, value_parser = parse_calendar_date)]
    pub today: Option<NaiveDate>,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Command {
    /// Update the stored cycle parameters.
    Set(SetArgs),
    /// Show today's cycle day, phase and predictions.
    Status(StatusArgs),
    /// Show a month calendar with period, fertile and ovulation days.
    Calendar(CalendarArgs),
    /// Print the stored record and current report as JSON.
    Export,
    /// Delete the stored record.
    Reset(ResetArgs),
}

/// Arguments for the `set` subcommand.
#[derive(clap::Args)]
pub struct SetArgs {
    /// Start date of the last period (YYYY-MM-DD).
    #[arg(short, long, value_parser = parse_calendar_date)]
    pub last_period: Option<NaiveDate>,

    /// Forget the last period date.
    #[arg(long, conflicts_with = "last_period")]
    pub clear_last_period: bool,

    /// Average cycle length in days (20-40).
    #[arg(long)]
    pub cycle_length: Option<u32>,

    /// Period length in days (2-10).
    #[arg(long)]
    pub period_length: Option<u32>,

    /// Show the pregnancy estimate in `status`.
    #[arg(long)]
    pub pregnancy_mode: Option<bool>,
}

/// Arguments for the `status` subcommand.
#[derive(clap::Args)]
pub struct StatusArgs {
    /// Include the pregnancy estimate even if pregnancy mode is off.
    #[arg(long)]
    pub pregnancy: bool,

    /// Emit the report as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `calendar` subcommand.
#[derive(clap::Args)]
pub struct CalendarArgs {
    /// Month to show (YYYY-MM). Defaults to the current month.
    #[arg(short, long, conflicts_with = "offset")]
    pub month: Option<YearMonth>,

    /// Months relative to the current month, e.g. -1 for last month.
    #[arg(short, long, allow_hyphen_values = true)]
    pub offset: Option<i32>,

    /// Emit the grid as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `reset` subcommand.
#[derive(clap::Args)]
pub struct ResetArgs {
    /// Confirm deletion.
    #[arg(long)]
    pub yes: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_set_with_dates() {
        let cli = Cli::try_parse_from([
            "cycle-tracker",
            "--today",
            "2024-03-15",
            "set",
            "--last-period",
            "2024-01-01",
            "--cycle-length",
            "30",
        ])
        .unwrap();
        assert_eq!(cli.today, NaiveDate::from_ymd_opt(2024, 3, 15));
        match cli.command {
            Command::Set(args) => {
                assert_eq!(args.last_period, NaiveDate::from_ymd_opt(2024, 1, 1));
                assert_eq!(args.cycle_length, Some(30));
                assert_eq!(args.period_length, None);
            }
            _ => panic!("expected set"),
        }
    }

    #[test]
    fn parses_negative_offset() {
        let cli = Cli::try_parse_from(["cycle-tracker", "calendar", "--offset", "-2"]).unwrap();
        match cli.command {
            Command::Calendar(args) => assert_eq!(args.offset, Some(-2)),
            _ => panic!("expected calendar"),
        }
    }

    #[test]
    fn month_and_offset_conflict() {
        let res = Cli::try_parse_from([
            "cycle-tracker",
            "calendar",
            "--month",
            "2024-01",
            "--offset",
            "1",
        ]);
        assert!(res.is_err());
    }

    #[test]
    fn rejects_bad_dates() {
        let res = Cli::try_parse_from(["cycle-tracker", "set", "--last-period", "soon"]);
        assert!(res.is_err());
    }
}
