use chrono::{Datelike, Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::models::TimeEntry;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyTotal {
    pub date: NaiveDate,
    pub hours: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodRollup {
    pub label: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub days: usize,
    pub hours: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Rollups {
    pub daily: Vec<DailyTotal>,
    pub weekly: Vec<PeriodRollup>,
    pub monthly: Vec<PeriodRollup>,
    pub yearly: Vec<PeriodRollup>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WeekStart {
    #[default]
    Monday,
    Sunday,
}

/// Hours per day between `start` and `end`, grouped into weeks, months and years.
///
/// Days without entries are kept with zero hours. Open entries are skipped.
pub fn build_rollups<'a>(
    entries: impl IntoIterator<Item = &'a TimeEntry>,
    start: NaiveDate,
    end: NaiveDate,
    week_start: WeekStart,
) -> Rollups {
    let mut totals: HashMap<NaiveDate, Decimal> = HashMap::new();

    for entry in entries {
        let Some(hours) = entry.billable_hours() else {
            continue;
        };
        let date = entry.clock_in.date_naive();
        if date < start || date > end {
            continue;
        }
        *totals.entry(date).or_default() += hours;
    }

    let daily = build_daily_totals(&totals, start, end);
    let weekly = build_periods(
        &daily,
        |date| start_of_week(date, week_start),
        |first, last| {
            let week = start_of_week(first, week_start).iso_week();
            format!(
                "W{:02} {} ({} → {})",
                week.week(),
                week.year(),
                first.format("%Y-%m-%d"),
                last.format("%Y-%m-%d")
            )
        },
    );
    let monthly = build_periods(
        &daily,
        |date| date.with_day(1).unwrap_or(date),
        |first, _| first.format("%b %Y").to_string(),
    );
    let yearly = build_periods(
        &daily,
        |date| date.with_ordinal(1).unwrap_or(date),
        |first, _| first.year().to_string(),
    );

    Rollups {
        daily,
        weekly,
        monthly,
        yearly,
    }
}

fn build_daily_totals(
    totals: &HashMap<NaiveDate, Decimal>,
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<DailyTotal> {
    let mut daily = Vec::new();
    let mut current = start;
    while current <= end {
        let hours = totals.get(&current).copied().unwrap_or_default();
        daily.push(DailyTotal {
            date: current,
            hours,
        });
        current = current.succ_opt().unwrap_or(current + Duration::days(1));
    }
    daily
}

/// Folds consecutive days sharing a period key into one rollup.
fn build_periods(
    daily: &[DailyTotal],
    period_key: impl Fn(NaiveDate) -> NaiveDate,
    label: impl Fn(NaiveDate, NaiveDate) -> String,
) -> Vec<PeriodRollup> {
    let mut rollups: Vec<PeriodRollup> = Vec::new();
    let mut current_key: Option<NaiveDate> = None;

    for day in daily {
        let key = period_key(day.date);
        if current_key != Some(key) {
            current_key = Some(key);
            rollups.push(PeriodRollup {
                label: String::new(),
                start: day.date,
                end: day.date,
                days: 0,
                hours: Decimal::ZERO,
            });
        }

        if let Some(rollup) = rollups.last_mut() {
            rollup.end = day.date;
            rollup.days += 1;
            rollup.hours += day.hours;
        }
    }

    for rollup in &mut rollups {
        rollup.label = label(rollup.start, rollup.end);
    }
    rollups
}

fn start_of_week(date: NaiveDate, week_start: WeekStart) -> NaiveDate {
    let offset = match week_start {
        WeekStart::Monday => date.weekday().num_days_from_monday() as i64,
        WeekStart::Sunday => date.weekday().num_days_from_sunday() as i64,
    };
    date - Duration::days(offset)
}
