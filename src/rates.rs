//! Effective hourly rate for a (user, project) pair.
//!
//! Lookup order, first hit wins:
//!
//! 1. a legacy `HOURLY_RATE` project cost recorded against the user's email,
//! 2. the user's project membership rate,
//! 3. the user's default rate,
//! 4. the project's rate,
//! 5. zero.
//!
//! Legacy costs outrank everything, including a newer membership rate. That
//! ordering is kept for compatibility with data recorded before memberships
//! carried their own rates.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{trace, warn};

use crate::models::{CostType, Project, ProjectCost, ProjectEmployee, User};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RateSource {
    LegacyOverride,
    ProjectEmployee,
    UserDefault,
    ProjectDefault,
    None,
}

/// Manually entered hourly rates keyed by user email.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LegacyRates {
    by_email: HashMap<String, Decimal>,
}

impl LegacyRates {
    /// Builds the map from `HOURLY_RATE` costs that name a user.
    ///
    /// Costs are applied oldest first by `created_at`, so the newest record
    /// for an email wins. Records with equal timestamps keep input order.
    pub fn from_costs(costs: &[ProjectCost], users: &[User]) -> Self {
        let mut hourly: Vec<&ProjectCost> = costs
            .iter()
            .filter(|cost| cost.cost_type == CostType::HourlyRate)
            .collect();
        hourly.sort_by_key(|cost| cost.created_at);

        let mut by_email = HashMap::new();
        for cost in hourly {
            let Some(user_id) = cost.user_id.as_deref() else {
                continue;
            };
            match users.iter().find(|user| user.id == user_id) {
                Some(user) => {
                    by_email.insert(user.email.clone(), cost.amount);
                }
                None => warn!(
                    cost_id = %cost.id,
                    user_id,
                    "hourly rate cost references an unknown user"
                ),
            }
        }
        Self { by_email }
    }

    pub fn get(&self, email: &str) -> Option<Decimal> {
        self.by_email.get(email).copied()
    }

    #[cfg(test)]
    fn insert(&mut self, email: impl Into<String>, rate: Decimal) {
        self.by_email.insert(email.into(), rate);
    }

    pub fn len(&self) -> usize {
        self.by_email.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_email.is_empty()
    }
}

pub fn resolve_rate(
    user: &User,
    project: &Project,
    project_employees: &[ProjectEmployee],
    legacy: &LegacyRates,
) -> Decimal {
    resolve_rate_with_source(&user.id, Some(user), project, project_employees, legacy).0
}

/// Like [`resolve_rate`], but also reports which source supplied the rate.
///
/// `user` may be missing when an entry references someone absent from the
/// snapshot; only the membership and project rates can apply then.
pub fn resolve_rate_with_source(
    user_id: &str,
    user: Option<&User>,
    project: &Project,
    project_employees: &[ProjectEmployee],
    legacy: &LegacyRates,
) -> (Decimal, RateSource) {
    let (rate, source) = user
        .and_then(|user| legacy.get(&user.email))
        .map(|rate| (rate, RateSource::LegacyOverride))
        .or_else(|| {
            membership(user_id, project, project_employees)
                .and_then(|employee| employee.hourly_rate)
                .map(|rate| (rate, RateSource::ProjectEmployee))
        })
        .or_else(|| {
            user.and_then(|user| user.default_hourly_rate)
                .map(|rate| (rate, RateSource::UserDefault))
        })
        .or_else(|| {
            project
                .hourly_rate
                .map(|rate| (rate, RateSource::ProjectDefault))
        })
        .unwrap_or((Decimal::ZERO, RateSource::None));

    trace!(user_id, project_id = %project.id, %rate, ?source, "resolved rate");
    (rate, source)
}

/// The active membership, or the most recently joined one for former members.
fn membership<'a>(
    user_id: &str,
    project: &Project,
    project_employees: &'a [ProjectEmployee],
) -> Option<&'a ProjectEmployee> {
    let candidates = project_employees
        .iter()
        .filter(|employee| employee.user_id == user_id && employee.project_id == project.id);

    let mut latest: Option<&ProjectEmployee> = None;
    for employee in candidates {
        if employee.is_active {
            return Some(employee);
        }
        if latest.is_none_or(|current| employee.joined_at > current.joined_at) {
            latest = Some(employee);
        }
    }
    latest
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn day(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, day, 0, 0, 0).unwrap()
    }

    fn user(default_rate: Option<i64>) -> User {
        User {
            id: "u1".to_string(),
            email: "a@example.com".to_string(),
            name: Some("Alice".to_string()),
            default_hourly_rate: default_rate.map(Decimal::from),
        }
    }

    fn project(rate: Option<i64>) -> Project {
        Project {
            id: "p1".to_string(),
            organization_id: "o1".to_string(),
            name: "Website".to_string(),
            hourly_rate: rate.map(Decimal::from),
            fixed_cost: None,
            estimated_hours: None,
        }
    }

    fn employee(id: &str, rate: Option<i64>, active: bool, joined: u32) -> ProjectEmployee {
        ProjectEmployee {
            id: id.to_string(),
            project_id: "p1".to_string(),
            user_id: "u1".to_string(),
            hourly_rate: rate.map(Decimal::from),
            is_active: active,
            joined_at: day(joined),
            left_at: None,
        }
    }

    fn hourly_cost(id: &str, amount: i64, user_id: Option<&str>, created: u32) -> ProjectCost {
        ProjectCost {
            id: id.to_string(),
            project_id: "p1".to_string(),
            cost_type: CostType::HourlyRate,
            amount: Decimal::from(amount),
            user_id: user_id.map(str::to_string),
            created_at: day(created),
        }
    }

    fn legacy(rate: i64) -> LegacyRates {
        let mut rates = LegacyRates::default();
        rates.insert("a@example.com", Decimal::from(rate));
        rates
    }

    #[test]
    fn legacy_override_beats_every_other_source() {
        let employees = vec![employee("e1", Some(60), true, 1)];
        let (rate, source) = resolve_rate_with_source(
            "u1",
            Some(&user(Some(75))),
            &project(Some(50)),
            &employees,
            &legacy(40),
        );
        assert_eq!(rate, Decimal::from(40));
        assert_eq!(source, RateSource::LegacyOverride);
    }

    #[test]
    fn fallback_chain_steps_down_one_source_at_a_time() {
        let employees = vec![employee("e1", Some(60), true, 1)];
        let none = LegacyRates::default();

        assert_eq!(
            resolve_rate(&user(Some(75)), &project(Some(50)), &employees, &none),
            Decimal::from(60)
        );
        assert_eq!(
            resolve_rate(&user(Some(75)), &project(Some(50)), &[], &none),
            Decimal::from(75)
        );
        assert_eq!(
            resolve_rate(&user(None), &project(Some(50)), &[], &none),
            Decimal::from(50)
        );
        assert_eq!(resolve_rate(&user(None), &project(None), &[], &none), Decimal::ZERO);
    }

    #[test]
    fn membership_without_rate_falls_through() {
        let employees = vec![employee("e1", None, true, 1)];
        let (rate, source) = resolve_rate_with_source(
            "u1",
            Some(&user(Some(75))),
            &project(Some(50)),
            &employees,
            &LegacyRates::default(),
        );
        assert_eq!(rate, Decimal::from(75));
        assert_eq!(source, RateSource::UserDefault);
    }

    #[test]
    fn zero_membership_rate_is_a_real_rate() {
        let employees = vec![employee("e1", Some(0), true, 1)];
        let (rate, source) = resolve_rate_with_source(
            "u1",
            Some(&user(Some(75))),
            &project(Some(50)),
            &employees,
            &LegacyRates::default(),
        );
        assert_eq!(rate, Decimal::ZERO);
        assert_eq!(source, RateSource::ProjectEmployee);
    }

    #[test]
    fn active_membership_wins_over_former_ones() {
        let employees = vec![
            employee("e1", Some(30), false, 5),
            employee("e2", Some(45), true, 1),
        ];
        assert_eq!(
            resolve_rate(&user(None), &project(None), &employees, &LegacyRates::default()),
            Decimal::from(45)
        );
    }

    #[test]
    fn former_member_uses_latest_membership() {
        let employees = vec![
            employee("e1", Some(30), false, 1),
            employee("e2", Some(35), false, 9),
        ];
        assert_eq!(
            resolve_rate(&user(None), &project(None), &employees, &LegacyRates::default()),
            Decimal::from(35)
        );
    }

    #[test]
    fn unknown_user_uses_membership_and_project_rates() {
        let (rate, source) = resolve_rate_with_source(
            "ghost",
            None,
            &project(Some(50)),
            &[],
            &LegacyRates::default(),
        );
        assert_eq!(rate, Decimal::from(50));
        assert_eq!(source, RateSource::ProjectDefault);
    }

    #[test]
    fn legacy_map_keeps_newest_cost_per_email() {
        let users = vec![user(None)];
        let costs = vec![
            hourly_cost("c2", 55, Some("u1"), 10),
            hourly_cost("c1", 40, Some("u1"), 2),
        ];
        let rates = LegacyRates::from_costs(&costs, &users);
        assert_eq!(rates.get("a@example.com"), Some(Decimal::from(55)));
    }

    #[test]
    fn legacy_map_ties_keep_input_order() {
        let users = vec![user(None)];
        let costs = vec![
            hourly_cost("c1", 40, Some("u1"), 2),
            hourly_cost("c2", 45, Some("u1"), 2),
        ];
        let rates = LegacyRates::from_costs(&costs, &users);
        assert_eq!(rates.get("a@example.com"), Some(Decimal::from(45)));
    }

    #[test]
    fn legacy_map_skips_unassigned_and_unknown_users() {
        let users = vec![user(None)];
        let mut fixed = hourly_cost("c3", 900, Some("u1"), 1);
        fixed.cost_type = CostType::FixedCost;
        let costs = vec![
            hourly_cost("c1", 40, None, 1),
            hourly_cost("c2", 45, Some("nobody"), 1),
            fixed,
        ];
        assert!(LegacyRates::from_costs(&costs, &users).is_empty());
    }
}
