use std::collections::HashSet;

use rust_decimal::Decimal;
use tracing::warn;

use crate::errors::ValidationError;
use crate::models::{Dataset, Project, ProjectCost, ProjectEmployee, TimeEntry, User};
use crate::rounding::RoundingConfig;

impl Dataset {
    /// Rejects negative rates, hours and amounts and broken clock invariants.
    ///
    /// Missing optional values are fine; they simply contribute nothing.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.validate_with(None)
    }

    /// Same as [`Dataset::validate`], checking stored hours against clock
    /// spans rounded with `rounding`.
    pub fn validate_with(&self, rounding: Option<&RoundingConfig>) -> Result<(), ValidationError> {
        self.users.iter().try_for_each(validate_user)?;
        self.projects.iter().try_for_each(validate_project)?;
        validate_employees(&self.project_employees)?;
        self.time_entries
            .iter()
            .try_for_each(|entry| validate_entry(entry, rounding))?;
        self.project_costs.iter().try_for_each(validate_cost)?;
        Ok(())
    }
}

fn non_negative(
    value: Option<Decimal>,
    field: &'static str,
    id: &str,
) -> Result<(), ValidationError> {
    match value {
        Some(value) if value.is_sign_negative() && !value.is_zero() => {
            Err(ValidationError::NegativeRate {
                field,
                id: id.to_string(),
            })
        }
        _ => Ok(()),
    }
}

pub fn validate_user(user: &User) -> Result<(), ValidationError> {
    non_negative(user.default_hourly_rate, "defaultHourlyRate", &user.id)
}

pub fn validate_project(project: &Project) -> Result<(), ValidationError> {
    non_negative(project.hourly_rate, "hourlyRate", &project.id)?;
    non_negative(project.fixed_cost, "fixedCost", &project.id)?;
    non_negative(project.estimated_hours, "estimatedHours", &project.id)
}

pub fn validate_employees(employees: &[ProjectEmployee]) -> Result<(), ValidationError> {
    let mut active = HashSet::new();
    for employee in employees {
        non_negative(employee.hourly_rate, "hourlyRate", &employee.id)?;
        if employee.is_active
            && !active.insert((employee.project_id.as_str(), employee.user_id.as_str()))
        {
            return Err(ValidationError::DuplicateActiveEmployee {
                project_id: employee.project_id.clone(),
                user_id: employee.user_id.clone(),
            });
        }
    }
    Ok(())
}

pub fn validate_entry(
    entry: &TimeEntry,
    rounding: Option<&RoundingConfig>,
) -> Result<(), ValidationError> {
    let id = entry.id.clone();
    let (clock_out, hours) = match (entry.clock_out, entry.total_hours) {
        (None, None) => return Ok(()),
        (None, Some(_)) => return Err(ValidationError::HoursWithoutClockOut { id }),
        (Some(_), None) => return Err(ValidationError::ClockOutWithoutHours { id }),
        (Some(clock_out), Some(hours)) => (clock_out, hours),
    };

    if clock_out < entry.clock_in {
        return Err(ValidationError::ClockOutBeforeClockIn { id });
    }
    if hours.is_sign_negative() && !hours.is_zero() {
        return Err(ValidationError::NegativeHours { id });
    }

    if let Some(expected) = entry.derived_hours(rounding) {
        if expected != hours {
            warn!(
                entry_id = %entry.id,
                stored = %hours,
                expected = %expected,
                "time entry hours differ from clock span"
            );
        }
    }
    Ok(())
}

pub fn validate_cost(cost: &ProjectCost) -> Result<(), ValidationError> {
    if cost.amount.is_sign_negative() && !cost.amount.is_zero() {
        return Err(ValidationError::NegativeAmount {
            id: cost.id.clone(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CostType, Organization};
    use chrono::{TimeZone, Utc};

    fn entry(clock_out_hour: Option<u32>, hours: Option<Decimal>) -> TimeEntry {
        TimeEntry {
            id: "t1".to_string(),
            user_id: "u1".to_string(),
            project_id: Some("p1".to_string()),
            organization_id: None,
            clock_in: Utc.with_ymd_and_hms(2026, 2, 3, 9, 0, 0).unwrap(),
            clock_out: clock_out_hour.map(|hour| Utc.with_ymd_and_hms(2026, 2, 3, hour, 0, 0).unwrap()),
            total_hours: hours,
        }
    }

    fn employee(id: &str, active: bool) -> ProjectEmployee {
        ProjectEmployee {
            id: id.to_string(),
            project_id: "p1".to_string(),
            user_id: "u1".to_string(),
            hourly_rate: None,
            is_active: active,
            joined_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
            left_at: None,
        }
    }

    #[test]
    fn open_and_closed_entries_pass() {
        assert!(validate_entry(&entry(None, None), None).is_ok());
        assert!(validate_entry(&entry(Some(11), Some(Decimal::new(2, 0))), None).is_ok());
    }

    #[test]
    fn hours_require_clock_out() {
        assert_eq!(
            validate_entry(&entry(None, Some(Decimal::ONE)), None),
            Err(ValidationError::HoursWithoutClockOut { id: "t1".to_string() })
        );
        assert_eq!(
            validate_entry(&entry(Some(10), None), None),
            Err(ValidationError::ClockOutWithoutHours { id: "t1".to_string() })
        );
    }

    #[test]
    fn rejects_clock_out_before_clock_in() {
        assert_eq!(
            validate_entry(&entry(Some(8), Some(Decimal::ONE)), None),
            Err(ValidationError::ClockOutBeforeClockIn { id: "t1".to_string() })
        );
    }

    #[test]
    fn rejects_negative_values() {
        assert_eq!(
            validate_entry(&entry(Some(10), Some(Decimal::NEGATIVE_ONE)), None),
            Err(ValidationError::NegativeHours { id: "t1".to_string() })
        );

        let user = User {
            id: "u1".to_string(),
            email: "a@example.com".to_string(),
            name: None,
            default_hourly_rate: Some(Decimal::new(-5, 0)),
        };
        assert!(matches!(
            validate_user(&user),
            Err(ValidationError::NegativeRate { field: "defaultHourlyRate", .. })
        ));

        let cost = ProjectCost {
            id: "c1".to_string(),
            project_id: "p1".to_string(),
            cost_type: CostType::Expense,
            amount: Decimal::new(-1, 0),
            user_id: None,
            created_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        };
        assert!(validate_cost(&cost).is_err());
    }

    #[test]
    fn zero_rate_is_allowed() {
        let user = User {
            id: "u1".to_string(),
            email: "a@example.com".to_string(),
            name: None,
            default_hourly_rate: Some(Decimal::ZERO),
        };
        assert!(validate_user(&user).is_ok());
    }

    #[test]
    fn rejects_second_active_membership() {
        assert!(validate_employees(&[employee("e1", true), employee("e2", false)]).is_ok());
        assert_eq!(
            validate_employees(&[employee("e1", true), employee("e2", true)]),
            Err(ValidationError::DuplicateActiveEmployee {
                project_id: "p1".to_string(),
                user_id: "u1".to_string(),
            })
        );
    }

    #[test]
    fn dataset_validation_visits_every_collection() {
        let mut dataset = Dataset {
            organization: Organization {
                id: "o1".to_string(),
                name: "Acme".to_string(),
            },
            users: Vec::new(),
            projects: Vec::new(),
            project_employees: Vec::new(),
            time_entries: vec![entry(Some(11), Some(Decimal::new(2, 0)))],
            project_costs: Vec::new(),
        };
        assert!(dataset.validate().is_ok());

        dataset.time_entries.push(entry(None, Some(Decimal::ONE)));
        assert!(dataset.validate().is_err());
    }
}
