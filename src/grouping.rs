use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::{Project, TimeEntry, User};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupedUser {
    pub user_id: String,
    pub name: String,
    pub total_hours: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupedProject {
    pub project_id: Option<String>,
    pub name: String,
    pub total_hours: Decimal,
    pub users: Vec<GroupedUser>,
}

/// Closed-entry hours per project and, within each project, per user.
///
/// Projects and users are ordered by hours, largest first, then by name.
pub fn group_entries<'a>(
    entries: impl IntoIterator<Item = &'a TimeEntry>,
    projects: &[Project],
    users: &[User],
) -> Vec<GroupedProject> {
    let project_names: HashMap<&str, &str> = projects
        .iter()
        .map(|project| (project.id.as_str(), project.name.as_str()))
        .collect();
    let user_names: HashMap<&str, &str> = users
        .iter()
        .map(|user| (user.id.as_str(), user.display_name()))
        .collect();

    let mut grouped: HashMap<Option<&str>, HashMap<&str, Decimal>> = HashMap::new();
    for entry in entries {
        let Some(hours) = entry.billable_hours() else {
            continue;
        };
        let project_entries = grouped.entry(entry.project_id.as_deref()).or_default();
        *project_entries.entry(entry.user_id.as_str()).or_default() += hours;
    }

    let mut result: Vec<GroupedProject> = grouped
        .into_iter()
        .map(|(project_id, per_user)| {
            let name = match project_id {
                None => "No Project".to_string(),
                Some(id) => project_names
                    .get(id)
                    .map(|name| name.to_string())
                    .unwrap_or_else(|| "Unknown Project".to_string()),
            };

            let mut users: Vec<GroupedUser> = per_user
                .into_iter()
                .map(|(user_id, total_hours)| GroupedUser {
                    user_id: user_id.to_string(),
                    name: user_names
                        .get(user_id)
                        .map(|name| name.to_string())
                        .unwrap_or_else(|| user_id.to_string()),
                    total_hours,
                })
                .collect();
            users.sort_by(|a, b| {
                b.total_hours
                    .cmp(&a.total_hours)
                    .then_with(|| a.name.cmp(&b.name))
            });

            GroupedProject {
                project_id: project_id.map(str::to_string),
                name,
                total_hours: users.iter().map(|user| user.total_hours).sum(),
                users,
            }
        })
        .collect();

    result.sort_by(|a, b| {
        b.total_hours
            .cmp(&a.total_hours)
            .then_with(|| a.name.cmp(&b.name))
    });

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn entry(user_id: &str, project_id: Option<&str>, hours: Option<Decimal>) -> TimeEntry {
        let clock_in = Utc.with_ymd_and_hms(2026, 2, 3, 9, 0, 0).unwrap();
        TimeEntry {
            id: format!("{user_id}-{project_id:?}"),
            user_id: user_id.to_string(),
            project_id: project_id.map(str::to_string),
            organization_id: None,
            clock_in,
            clock_out: hours.map(|_| clock_in),
            total_hours: hours,
        }
    }

    fn project(id: &str, name: &str) -> Project {
        Project {
            id: id.to_string(),
            organization_id: "o1".to_string(),
            name: name.to_string(),
            hourly_rate: None,
            fixed_cost: None,
            estimated_hours: None,
        }
    }

    #[test]
    fn groups_entries_by_project_and_user() {
        let projects = vec![project("p1", "Project A"), project("p2", "Project B")];
        let users = vec![User {
            id: "u1".to_string(),
            email: "a@example.com".to_string(),
            name: Some("Alice".to_string()),
            default_hourly_rate: None,
        }];
        let entries = vec![
            entry("u1", Some("p1"), Some(Decimal::ONE)),
            entry("u1", Some("p1"), Some(Decimal::new(5, 1))),
            entry("u2", Some("p2"), Some(Decimal::new(5, 1))),
            entry("u2", None, Some(Decimal::new(25, 1))),
            entry("u1", Some("p2"), None),
        ];

        let grouped = group_entries(&entries, &projects, &users);

        assert_eq!(grouped.len(), 3);
        assert_eq!(grouped[0].name, "No Project");
        assert_eq!(grouped[1].name, "Project A");
        assert_eq!(grouped[1].total_hours, Decimal::new(15, 1));
        assert_eq!(grouped[1].users.len(), 1);
        assert_eq!(grouped[1].users[0].name, "Alice");
        assert_eq!(grouped[2].users[0].name, "u2");
    }
}
