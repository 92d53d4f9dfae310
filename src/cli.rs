use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;

use crate::dates::{DateRange, parse_date};
use crate::rollups::WeekStart;
use crate::rounding::RoundingMode;

#[derive(Parser, Debug)]
#[command(name = "ratesheet")]
#[command(version)]
#[command(about = "Project revenue and payroll reports from time-tracking exports", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug, Clone)]
pub struct ReportArgs {
    /// Organization snapshot exported as JSON
    #[arg(short, long, value_name = "FILE")]
    pub data: PathBuf,

    /// Report a single day (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date, conflicts_with_all = ["start", "end"])]
    pub date: Option<NaiveDate>,

    /// First day of the report period (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub start: Option<NaiveDate>,

    /// Last day of the report period (YYYY-MM-DD), defaults to today
    #[arg(long, value_parser = parse_date)]
    pub end: Option<NaiveDate>,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

impl ReportArgs {
    /// Defaults to the current month when no dates are given.
    pub fn range(&self) -> Result<DateRange, String> {
        DateRange::from_options(self.date, self.start, self.end)
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Revenue breakdown for one project
    Project {
        /// Project identifier
        id: String,
        #[command(flatten)]
        report: ReportArgs,
    },
    /// Revenue and cost for every project in the organization
    Costs {
        #[command(flatten)]
        report: ReportArgs,
    },
    /// Hours, overtime and gross pay per employee
    Payroll {
        #[command(flatten)]
        report: ReportArgs,
        /// Hours per period before overtime starts
        #[arg(long, value_name = "HOURS")]
        overtime_threshold: Option<Decimal>,
    },
    /// Daily, weekly and monthly hours with a per-project breakdown
    Summary {
        #[command(flatten)]
        report: ReportArgs,
        #[arg(long, value_parser = parse_week_start)]
        week_start: Option<WeekStart>,
    },
    /// Show or change saved settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    Show,
    SetOvertime {
        hours: Decimal,
    },
    SetWeekStart {
        #[arg(value_parser = parse_week_start)]
        day: WeekStart,
    },
    /// Round clock spans to an increment when checking stored hours
    SetRounding {
        minutes: u32,
        #[arg(value_parser = parse_rounding_mode)]
        mode: RoundingMode,
    },
    ClearRounding,
}

pub fn parse_week_start(value: &str) -> Result<WeekStart, String> {
    match value.to_ascii_lowercase().as_str() {
        "monday" | "mon" => Ok(WeekStart::Monday),
        "sunday" | "sun" => Ok(WeekStart::Sunday),
        _ => Err("Week start must be monday or sunday.".to_string()),
    }
}

pub fn parse_rounding_mode(value: &str) -> Result<RoundingMode, String> {
    match value.to_ascii_lowercase().as_str() {
        "closest" => Ok(RoundingMode::Closest),
        "up" => Ok(RoundingMode::Up),
        "down" => Ok(RoundingMode::Down),
        _ => Err("Rounding mode must be closest, up or down.".to_string()),
    }
}
