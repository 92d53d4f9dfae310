use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::rounding::{RoundingConfig, elapsed_hours};

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub default_hourly_rate: Option<Decimal>,
}

impl User {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.email)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub organization_id: String,
    pub name: String,
    #[serde(default)]
    pub hourly_rate: Option<Decimal>,
    #[serde(default)]
    pub fixed_cost: Option<Decimal>,
    #[serde(default)]
    pub estimated_hours: Option<Decimal>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectEmployee {
    pub id: String,
    pub project_id: String,
    pub user_id: String,
    #[serde(default)]
    pub hourly_rate: Option<Decimal>,
    pub is_active: bool,
    pub joined_at: DateTime<Utc>,
    #[serde(default)]
    pub left_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeEntry {
    pub id: String,
    pub user_id: String,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub organization_id: Option<String>,
    pub clock_in: DateTime<Utc>,
    #[serde(default)]
    pub clock_out: Option<DateTime<Utc>>,
    #[serde(default)]
    pub total_hours: Option<Decimal>,
}

impl TimeEntry {
    pub fn is_closed(&self) -> bool {
        self.clock_out.is_some()
    }

    /// Hours that count toward revenue and payroll. Open entries have none.
    pub fn billable_hours(&self) -> Option<Decimal> {
        if self.is_closed() {
            self.total_hours
        } else {
            None
        }
    }

    /// Hours implied by the clock span, or `None` while the entry is open.
    pub fn derived_hours(&self, rounding: Option<&RoundingConfig>) -> Option<Decimal> {
        self.clock_out
            .map(|clock_out| elapsed_hours(self.clock_in, clock_out, rounding))
    }

    pub fn belongs_to(&self, project_id: &str) -> bool {
        self.project_id.as_deref() == Some(project_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CostType {
    HourlyRate,
    FixedCost,
    Expense,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectCost {
    pub id: String,
    pub project_id: String,
    pub cost_type: CostType,
    pub amount: Decimal,
    #[serde(default)]
    pub user_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Snapshot of one organization as exported by the persistence layer.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub organization: Organization,
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub project_employees: Vec<ProjectEmployee>,
    #[serde(default)]
    pub time_entries: Vec<TimeEntry>,
    #[serde(default)]
    pub project_costs: Vec<ProjectCost>,
}

impl Dataset {
    pub fn user(&self, id: &str) -> Option<&User> {
        self.users.iter().find(|user| user.id == id)
    }

    pub fn project(&self, id: &str) -> Option<&Project> {
        self.projects.iter().find(|project| project.id == id)
    }

    pub fn employees_for_project(&self, project_id: &str) -> Vec<ProjectEmployee> {
        self.project_employees
            .iter()
            .filter(|employee| employee.project_id == project_id)
            .cloned()
            .collect()
    }

    pub fn costs_for_project(&self, project_id: &str) -> Vec<ProjectCost> {
        self.project_costs
            .iter()
            .filter(|cost| cost.project_id == project_id)
            .cloned()
            .collect()
    }

    pub fn entries_for_project<'a>(
        &'a self,
        project_id: &'a str,
    ) -> impl Iterator<Item = &'a TimeEntry> + 'a {
        self.time_entries
            .iter()
            .filter(move |entry| entry.belongs_to(project_id))
    }
}
