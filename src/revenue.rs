use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, warn};

use crate::models::{CostType, Project, ProjectCost, ProjectEmployee, TimeEntry, User};
use crate::rates::{LegacyRates, RateSource, resolve_rate_with_source};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRevenue {
    pub user_id: String,
    pub hours: Decimal,
    pub rate: Decimal,
    pub rate_source: RateSource,
    pub cost: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRevenueSummary {
    pub project_id: String,
    pub total_revenue: Decimal,
    pub fixed_revenue: Decimal,
    pub variable_revenue: Decimal,
    pub expense_total: Decimal,
    pub total_hours: Decimal,
    pub unique_contributors: usize,
    /// `None` when the project has no hour estimate.
    pub completion_percentage: Option<Decimal>,
    pub per_user_breakdown: Vec<UserRevenue>,
}

impl ProjectRevenueSummary {
    pub fn empty(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            total_revenue: Decimal::ZERO,
            fixed_revenue: Decimal::ZERO,
            variable_revenue: Decimal::ZERO,
            expense_total: Decimal::ZERO,
            total_hours: Decimal::ZERO,
            unique_contributors: 0,
            completion_percentage: None,
            per_user_breakdown: Vec::new(),
        }
    }
}

/// Revenue, hours and per-user cost for one project.
///
/// Records belonging to other projects are ignored, and when every supplied
/// record belongs elsewhere the summary is zeroed, fixed cost included.
/// Entries still clocked in contribute nothing. `time_entries` is expected to
/// be pre-filtered to the reporting period.
pub fn aggregate<'a>(
    project: &Project,
    users: &[User],
    time_entries: impl IntoIterator<Item = &'a TimeEntry>,
    project_costs: &[ProjectCost],
    project_employees: &[ProjectEmployee],
) -> ProjectRevenueSummary {
    let supplied: Vec<&TimeEntry> = time_entries.into_iter().collect();
    let entries: Vec<&TimeEntry> = supplied
        .iter()
        .copied()
        .filter(|entry| entry.belongs_to(&project.id))
        .collect();
    let costs: Vec<ProjectCost> = project_costs
        .iter()
        .filter(|cost| cost.project_id == project.id)
        .cloned()
        .collect();

    let any_supplied =
        !supplied.is_empty() || !project_costs.is_empty() || !project_employees.is_empty();
    let any_matched = !entries.is_empty()
        || !costs.is_empty()
        || project_employees
            .iter()
            .any(|employee| employee.project_id == project.id);
    if any_supplied && !any_matched {
        debug!(project_id = %project.id, "no supplied records belong to project");
        return ProjectRevenueSummary::empty(&project.id);
    }

    let legacy = LegacyRates::from_costs(&costs, users);

    let fixed_revenue = project.fixed_cost.unwrap_or(Decimal::ZERO)
        + sum_of_type(&costs, CostType::FixedCost);
    let expense_total = sum_of_type(&costs, CostType::Expense);

    let mut per_user: BTreeMap<&str, (Decimal, Decimal)> = BTreeMap::new();
    let mut rates: BTreeMap<&str, (Decimal, RateSource)> = BTreeMap::new();
    let mut variable_revenue = Decimal::ZERO;
    let mut total_hours = Decimal::ZERO;

    for entry in entries {
        let Some(hours) = entry.billable_hours() else {
            continue;
        };
        let user_id = entry.user_id.as_str();
        let (rate, _) = *rates.entry(user_id).or_insert_with(|| {
            let user = users.iter().find(|user| user.id == user_id);
            resolve_rate_with_source(user_id, user, project, project_employees, &legacy)
        });

        let subtotal = per_user.get(user_id).copied().unwrap_or_default();
        let totals = hours.checked_mul(rate).and_then(|cost| {
            Some((
                (subtotal.0.checked_add(hours)?, subtotal.1.checked_add(cost)?),
                variable_revenue.checked_add(cost)?,
                total_hours.checked_add(hours)?,
            ))
        });
        let Some((subtotal, variable, hours_sum)) = totals else {
            warn!(
                entry_id = %entry.id,
                %hours,
                %rate,
                "skipping time entry whose cost overflows"
            );
            continue;
        };
        per_user.insert(user_id, subtotal);
        variable_revenue = variable;
        total_hours = hours_sum;
    }

    let per_user_breakdown: Vec<UserRevenue> = per_user
        .into_iter()
        .map(|(user_id, (hours, cost))| {
            let (rate, rate_source) = rates[user_id];
            UserRevenue {
                user_id: user_id.to_string(),
                hours,
                rate,
                rate_source,
                cost,
            }
        })
        .collect();
    let unique_contributors = per_user_breakdown.len();

    let completion_percentage = project
        .estimated_hours
        .filter(|estimate| *estimate > Decimal::ZERO)
        .and_then(|estimate| total_hours.checked_div(estimate))
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED));

    debug!(
        project_id = %project.id,
        %total_hours,
        %variable_revenue,
        %fixed_revenue,
        contributors = unique_contributors,
        legacy_overrides = legacy.len(),
        "aggregated project revenue"
    );

    ProjectRevenueSummary {
        project_id: project.id.clone(),
        total_revenue: fixed_revenue.saturating_add(variable_revenue),
        fixed_revenue,
        variable_revenue,
        expense_total,
        total_hours,
        unique_contributors,
        completion_percentage,
        per_user_breakdown,
    }
}

fn sum_of_type(costs: &[ProjectCost], cost_type: CostType) -> Decimal {
    costs
        .iter()
        .filter(|cost| cost.cost_type == cost_type)
        .map(|cost| cost.amount)
        .sum()
}
