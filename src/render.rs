use std::fmt::Write;

use rust_decimal::Decimal;

use crate::models::{Dataset, Project};
use crate::rates::RateSource;
use crate::reports::{CostAnalysis, PayrollReport, TimeSummary};
use crate::revenue::ProjectRevenueSummary;

fn rate_source_label(source: RateSource) -> &'static str {
    match source {
        RateSource::LegacyOverride => "legacy cost",
        RateSource::ProjectEmployee => "project",
        RateSource::UserDefault => "user default",
        RateSource::ProjectDefault => "project default",
        RateSource::None => "unset",
    }
}

fn completion_label(value: Option<Decimal>) -> String {
    value
        .map(|percent| format!("{percent:.1}%"))
        .unwrap_or_else(|| "no estimate".to_string())
}

pub fn render_project(dataset: &Dataset, project: &Project, summary: &ProjectRevenueSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} ({})", project.name, project.id);
    let _ = writeln!(out, "  Hours:         {:.2}h", summary.total_hours);
    let _ = writeln!(out, "  Completion:    {}", completion_label(summary.completion_percentage));
    let _ = writeln!(out, "  Contributors:  {}", summary.unique_contributors);
    let _ = writeln!(out, "  Fixed:         {:.2}", summary.fixed_revenue);
    let _ = writeln!(out, "  Variable:      {:.2}", summary.variable_revenue);
    let _ = writeln!(out, "  Total revenue: {:.2}", summary.total_revenue);
    if !summary.expense_total.is_zero() {
        let _ = writeln!(out, "  Expenses:      {:.2}", summary.expense_total);
    }

    if !summary.per_user_breakdown.is_empty() {
        let _ = writeln!(out);
        for user in &summary.per_user_breakdown {
            let name = dataset
                .user(&user.user_id)
                .map(|user| user.display_name())
                .unwrap_or(&user.user_id);
            let _ = writeln!(
                out,
                "  {:<24} {:>8.2}h  @ {:>8.2} ({})  = {:>10.2}",
                name,
                user.hours,
                user.rate,
                rate_source_label(user.rate_source),
                user.cost
            );
        }
    }
    out
}

pub fn render_cost_analysis(analysis: &CostAnalysis) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Project cost analysis: {}", analysis.period);
    for line in &analysis.projects {
        let summary = &line.summary;
        let _ = writeln!(
            out,
            "  {:<24} {:>8.2}h  fixed {:>10.2}  variable {:>10.2}  total {:>10.2}  {}",
            line.name,
            summary.total_hours,
            summary.fixed_revenue,
            summary.variable_revenue,
            summary.total_revenue,
            completion_label(summary.completion_percentage)
        );
    }
    let _ = writeln!(
        out,
        "Total {:.2}h  revenue {:.2}  expenses {:.2}",
        analysis.total_hours, analysis.total_revenue, analysis.expense_total
    );
    out
}

pub fn render_payroll(report: &PayrollReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Payroll: {} (overtime above {:.2}h)",
        report.period, report.overtime_threshold
    );
    for line in &report.lines {
        let _ = writeln!(
            out,
            "  {:<24} {:>8.2}h  regular {:>8.2}h  overtime {:>7.2}h  gross {:>10.2}",
            line.name, line.total_hours, line.regular_hours, line.overtime_hours, line.gross_pay
        );
        for project in &line.projects {
            let _ = writeln!(
                out,
                "      {:<20} {:>8.2}h  @ {:>8.2}  = {:>10.2}",
                project.name, project.hours, project.rate, project.pay
            );
        }
    }
    let _ = writeln!(
        out,
        "Total {:.2}h  overtime {:.2}h  gross {:.2}",
        report.total_hours, report.total_overtime_hours, report.total_gross_pay
    );
    out
}

pub fn render_time_summary(summary: &TimeSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Time summary: {}", summary.period);
    let _ = writeln!(out, "Total: {:.2}h", summary.total_hours);

    let _ = writeln!(out, "\nWeeks");
    for week in &summary.rollups.weekly {
        let _ = writeln!(out, "  {:<36} {:>8.2}h", week.label, week.hours);
    }
    let _ = writeln!(out, "\nMonths");
    for month in &summary.rollups.monthly {
        let _ = writeln!(out, "  {:<36} {:>8.2}h", month.label, month.hours);
    }

    let _ = writeln!(out, "\nProjects");
    for project in &summary.projects {
        let _ = writeln!(out, "  {:<36} {:>8.2}h", project.name, project.total_hours);
        for user in &project.users {
            let _ = writeln!(out, "      {:<32} {:>8.2}h", user.name, user.total_hours);
        }
    }
    out
}
