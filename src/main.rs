use anyhow::{Context, Result, anyhow};
use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use ratesheet::cli::{Cli, Command, ConfigAction, ReportArgs};
use ratesheet::dates::DateRange;
use ratesheet::models::Dataset;
use ratesheet::rounding::RoundingConfig;
use ratesheet::storage::{self, Config};
use ratesheet::{aggregate, render, reports};

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load(report: &ReportArgs, config: &Config) -> Result<(Dataset, DateRange)> {
    let range = report.range().map_err(|message| anyhow!(message))?;
    let dataset = storage::read_dataset(&report.data)
        .with_context(|| format!("failed to read {}", report.data.display()))?;
    dataset
        .validate_with(config.rounding.as_ref())
        .with_context(|| format!("invalid data in {}", report.data.display()))?;
    Ok((dataset, range))
}

fn emit<T: Serialize>(json: bool, value: &T, text: impl FnOnce(&T) -> String) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        print!("{}", text(value));
    }
    Ok(())
}

fn run_config(action: ConfigAction, config: Config) -> Result<()> {
    match action {
        ConfigAction::Show => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            return Ok(());
        }
        ConfigAction::SetOvertime { hours } => storage::write_overtime_threshold(hours)?,
        ConfigAction::SetWeekStart { day } => storage::write_week_start(day)?,
        ConfigAction::SetRounding { minutes, mode } => storage::write_rounding(Some(RoundingConfig {
            increment_minutes: minutes,
            mode,
        }))?,
        ConfigAction::ClearRounding => storage::write_rounding(None)?,
    }
    println!("Saved.");
    Ok(())
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = storage::read_config();

    match cli.command {
        Command::Project { id, report } => {
            let (dataset, range) = load(&report, &config)?;
            let project = dataset
                .project(&id)
                .with_context(|| format!("project {id} not found"))?;
            let entries = dataset
                .entries_for_project(&project.id)
                .filter(|entry| range.contains(entry.clock_in));
            let summary = aggregate(
                project,
                &dataset.users,
                entries,
                &dataset.costs_for_project(&project.id),
                &dataset.employees_for_project(&project.id),
            );
            emit(report.json, &summary, |summary| {
                render::render_project(&dataset, project, summary)
            })
        }
        Command::Costs { report } => {
            let (dataset, range) = load(&report, &config)?;
            let analysis = reports::project_cost_analysis(&dataset, &range);
            emit(report.json, &analysis, render::render_cost_analysis)
        }
        Command::Payroll {
            report,
            overtime_threshold,
        } => {
            let (dataset, range) = load(&report, &config)?;
            let threshold = overtime_threshold.unwrap_or_else(|| config.overtime_threshold());
            let payroll = reports::payroll_report(&dataset, &range, threshold);
            emit(report.json, &payroll, render::render_payroll)
        }
        Command::Summary { report, week_start } => {
            let (dataset, range) = load(&report, &config)?;
            let week_start = week_start.unwrap_or(config.week_start);
            let summary = reports::time_summary(&dataset, &range, week_start);
            emit(report.json, &summary, render::render_time_summary)
        }
        Command::Config { action } => run_config(action, config),
    }
}
