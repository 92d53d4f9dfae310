use chrono::{DateTime, Datelike, NaiveDate, Utc};

/// Inclusive range of calendar days in UTC.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
    label: String,
}

impl DateRange {
    pub fn from_single(date: NaiveDate) -> Self {
        let label = format!("{}", date.format("%Y-%m-%d"));
        Self {
            start: date,
            end: date,
            label,
        }
    }

    pub fn from_bounds(start: NaiveDate, end: NaiveDate) -> Self {
        let label = if start == end {
            format!("{}", start.format("%Y-%m-%d"))
        } else {
            format!("{} → {}", start.format("%Y-%m-%d"), end.format("%Y-%m-%d"))
        };
        Self { start, end, label }
    }

    pub fn month_of(date: NaiveDate) -> Self {
        let start = date.with_day(1).unwrap_or(date);
        let end = start
            .checked_add_months(chrono::Months::new(1))
            .and_then(|next| next.pred_opt())
            .unwrap_or(date);
        let mut range = Self::from_bounds(start, end);
        range.label = start.format("%b %Y").to_string();
        range
    }

    pub fn this_month() -> Self {
        Self::month_of(Utc::now().date_naive())
    }

    pub fn from_options(
        date: Option<NaiveDate>,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Self, String> {
        if let Some(date) = date {
            return Ok(Self::from_single(date));
        }

        match (start_date, end_date) {
            (Some(start), Some(end)) => {
                if start > end {
                    return Err("Start date cannot be after end date.".to_string());
                }
                Ok(Self::from_bounds(start, end))
            }
            (Some(start), None) => {
                let end = Utc::now().date_naive();
                if start > end {
                    return Err("Start date cannot be after end date.".to_string());
                }
                Ok(Self::from_bounds(start, end))
            }
            (None, None) => Ok(Self::this_month()),
            (None, Some(_)) => Err("End date requires a start date.".to_string()),
        }
    }

    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        let day = timestamp.date_naive();
        day >= self.start && day <= self.end
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start
    }

    pub fn end_date(&self) -> NaiveDate {
        self.end
    }
}

pub fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| "Invalid date format. Use YYYY-MM-DD.".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn parse_date_valid() {
        let parsed = parse_date("2026-02-03").unwrap();
        assert_eq!(parsed, date(2026, 2, 3));
    }

    #[test]
    fn parse_date_invalid() {
        assert!(parse_date("02-03-2026").is_err());
    }

    #[test]
    fn range_from_bounds_label() {
        let range = DateRange::from_bounds(date(2026, 1, 1), date(2026, 1, 10));
        assert!(range.label().contains("2026-01-01"));
        assert!(range.label().contains("2026-01-10"));
    }

    #[test]
    fn month_of_covers_whole_month() {
        let range = DateRange::month_of(date(2026, 2, 17));
        assert_eq!(range.start_date(), date(2026, 2, 1));
        assert_eq!(range.end_date(), date(2026, 2, 28));
        assert_eq!(range.label(), "Feb 2026");

        let december = DateRange::month_of(date(2025, 12, 5));
        assert_eq!(december.end_date(), date(2025, 12, 31));
    }

    #[test]
    fn contains_is_inclusive_on_both_ends() {
        let range = DateRange::from_bounds(date(2026, 2, 1), date(2026, 2, 3));
        assert!(range.contains(Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap()));
        assert!(range.contains(Utc.with_ymd_and_hms(2026, 2, 3, 23, 59, 59).unwrap()));
        assert!(!range.contains(Utc.with_ymd_and_hms(2026, 2, 4, 0, 0, 0).unwrap()));
        assert!(!range.contains(Utc.with_ymd_and_hms(2026, 1, 31, 23, 59, 59).unwrap()));
    }

    #[test]
    fn from_options_rejects_inverted_bounds() {
        assert!(DateRange::from_options(None, Some(date(2026, 2, 3)), Some(date(2026, 2, 1))).is_err());
        assert!(DateRange::from_options(None, None, Some(date(2026, 2, 1))).is_err());
        let single = DateRange::from_options(Some(date(2026, 2, 1)), None, None).unwrap();
        assert_eq!(single.start_date(), single.end_date());
    }
}
