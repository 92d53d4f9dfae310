//! Organization-wide reports built on the per-project aggregator.
//!
//! Every report first narrows the snapshot to the organization and to entries
//! clocked in inside the requested range, then runs the same rate resolution
//! per project. Cost records are not date-bound and always apply.

use std::collections::{BTreeMap, HashSet};

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info};

use crate::dates::DateRange;
use crate::grouping::{GroupedProject, group_entries};
use crate::models::{Dataset, Project, TimeEntry};
use crate::revenue::{ProjectRevenueSummary, aggregate};
use crate::rollups::{Rollups, WeekStart, build_rollups};

/// Hours per report period above which time counts as overtime.
pub const DEFAULT_OVERTIME_THRESHOLD: Decimal = Decimal::from_parts(40, 0, 0, false, 0);

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectCostLine {
    pub name: String,
    pub summary: ProjectRevenueSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CostAnalysis {
    pub period: String,
    pub projects: Vec<ProjectCostLine>,
    pub total_revenue: Decimal,
    pub fixed_revenue: Decimal,
    pub variable_revenue: Decimal,
    pub expense_total: Decimal,
    pub total_hours: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayrollProjectLine {
    pub project_id: Option<String>,
    pub name: String,
    pub hours: Decimal,
    pub rate: Decimal,
    pub pay: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayrollLine {
    pub user_id: String,
    pub name: String,
    pub email: Option<String>,
    pub total_hours: Decimal,
    pub regular_hours: Decimal,
    pub overtime_hours: Decimal,
    pub gross_pay: Decimal,
    pub projects: Vec<PayrollProjectLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayrollReport {
    pub period: String,
    pub overtime_threshold: Decimal,
    pub lines: Vec<PayrollLine>,
    pub total_hours: Decimal,
    pub total_overtime_hours: Decimal,
    pub total_gross_pay: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSummary {
    pub period: String,
    pub total_hours: Decimal,
    pub rollups: Rollups,
    pub projects: Vec<GroupedProject>,
}

/// Splits period hours into regular and overtime at `threshold`.
///
/// The split is per report period, not per calendar week.
pub fn split_overtime(hours: Decimal, threshold: Decimal) -> (Decimal, Decimal) {
    let regular = hours.min(threshold);
    let overtime = (hours - threshold).max(Decimal::ZERO);
    (regular, overtime)
}

fn organization_projects(dataset: &Dataset) -> impl Iterator<Item = &Project> {
    dataset
        .projects
        .iter()
        .filter(|project| project.organization_id == dataset.organization.id)
}

fn entries_in_range<'a>(dataset: &'a Dataset, range: &DateRange) -> Vec<&'a TimeEntry> {
    let org_id = dataset.organization.id.as_str();
    let entries: Vec<&TimeEntry> = dataset
        .time_entries
        .iter()
        .filter(|entry| entry.organization_id.as_deref().is_none_or(|id| id == org_id))
        .filter(|entry| range.contains(entry.clock_in))
        .collect();
    debug!(
        total = dataset.time_entries.len(),
        in_range = entries.len(),
        period = range.label(),
        "filtered time entries"
    );
    entries
}

fn summarize_project(
    dataset: &Dataset,
    project: &Project,
    entries: &[&TimeEntry],
) -> ProjectRevenueSummary {
    aggregate(
        project,
        &dataset.users,
        entries
            .iter()
            .copied()
            .filter(|entry| entry.belongs_to(&project.id)),
        &dataset.costs_for_project(&project.id),
        &dataset.employees_for_project(&project.id),
    )
}

pub fn project_cost_analysis(dataset: &Dataset, range: &DateRange) -> CostAnalysis {
    let entries = entries_in_range(dataset, range);

    let projects: Vec<ProjectCostLine> = organization_projects(dataset)
        .map(|project| ProjectCostLine {
            name: project.name.clone(),
            summary: summarize_project(dataset, project, &entries),
        })
        .collect();

    let total = |field: fn(&ProjectRevenueSummary) -> Decimal| -> Decimal {
        projects.iter().map(|line| field(&line.summary)).sum()
    };
    let analysis = CostAnalysis {
        period: range.label().to_string(),
        total_revenue: total(|summary| summary.total_revenue),
        fixed_revenue: total(|summary| summary.fixed_revenue),
        variable_revenue: total(|summary| summary.variable_revenue),
        expense_total: total(|summary| summary.expense_total),
        total_hours: total(|summary| summary.total_hours),
        projects,
    };

    info!(
        organization = %dataset.organization.id,
        projects = analysis.projects.len(),
        total_revenue = %analysis.total_revenue,
        "built project cost analysis"
    );
    analysis
}

pub fn payroll_report(dataset: &Dataset, range: &DateRange, overtime_threshold: Decimal) -> PayrollReport {
    let entries = entries_in_range(dataset, range);
    let mut per_user: BTreeMap<String, Vec<PayrollProjectLine>> = BTreeMap::new();
    let mut paid_projects: HashSet<&str> = HashSet::new();

    for project in organization_projects(dataset) {
        paid_projects.insert(project.id.as_str());
        let summary = summarize_project(dataset, project, &entries);
        for user in summary.per_user_breakdown {
            per_user.entry(user.user_id).or_default().push(PayrollProjectLine {
                project_id: Some(project.id.clone()),
                name: project.name.clone(),
                hours: user.hours,
                rate: user.rate,
                pay: user.cost,
            });
        }
    }

    // Time without a project of this organization is paid nothing but still
    // counts toward overtime.
    let mut unassigned: BTreeMap<(&str, Option<&str>), Decimal> = BTreeMap::new();
    for entry in &entries {
        let project_id = entry.project_id.as_deref();
        if project_id.is_some_and(|id| paid_projects.contains(id)) {
            continue;
        }
        if let Some(hours) = entry.billable_hours() {
            *unassigned.entry((entry.user_id.as_str(), project_id)).or_default() += hours;
        }
    }
    for ((user_id, project_id), hours) in unassigned {
        let name = match project_id {
            None => "No Project",
            Some(id) => dataset
                .project(id)
                .map(|project| project.name.as_str())
                .unwrap_or("Unknown Project"),
        };
        debug!(user_id, project_id, %hours, "unpaid hours in payroll");
        per_user.entry(user_id.to_string()).or_default().push(PayrollProjectLine {
            project_id: project_id.map(str::to_string),
            name: name.to_string(),
            hours,
            rate: Decimal::ZERO,
            pay: Decimal::ZERO,
        });
    }

    let mut lines: Vec<PayrollLine> = per_user
        .into_iter()
        .map(|(user_id, projects)| {
            let total_hours: Decimal = projects.iter().map(|line| line.hours).sum();
            let gross_pay: Decimal = projects.iter().map(|line| line.pay).sum();
            let (regular_hours, overtime_hours) = split_overtime(total_hours, overtime_threshold);
            let user = dataset.user(&user_id);
            PayrollLine {
                name: user
                    .map(|user| user.display_name().to_string())
                    .unwrap_or_else(|| user_id.clone()),
                email: user.map(|user| user.email.clone()),
                user_id,
                total_hours,
                regular_hours,
                overtime_hours,
                gross_pay,
                projects,
            }
        })
        .collect();
    lines.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.user_id.cmp(&b.user_id)));

    let report = PayrollReport {
        period: range.label().to_string(),
        overtime_threshold,
        total_hours: lines.iter().map(|line| line.total_hours).sum(),
        total_overtime_hours: lines.iter().map(|line| line.overtime_hours).sum(),
        total_gross_pay: lines.iter().map(|line| line.gross_pay).sum(),
        lines,
    };

    info!(
        organization = %dataset.organization.id,
        employees = report.lines.len(),
        total_gross_pay = %report.total_gross_pay,
        "built payroll report"
    );
    report
}

pub fn time_summary(dataset: &Dataset, range: &DateRange, week_start: WeekStart) -> TimeSummary {
    let entries = entries_in_range(dataset, range);
    let rollups = build_rollups(
        entries.iter().copied(),
        range.start_date(),
        range.end_date(),
        week_start,
    );
    let projects = group_entries(entries.iter().copied(), &dataset.projects, &dataset.users);

    TimeSummary {
        period: range.label().to_string(),
        total_hours: rollups.daily.iter().map(|day| day.hours).sum(),
        rollups,
        projects,
    }
}
