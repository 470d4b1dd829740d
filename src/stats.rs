use crate::errors::AppError;
use crate::models::{RangeQuery, StatItem};
use crate::trend::{compute_trend, round2, TrendResult};
use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Inclusive span of calendar days, interpreted in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Result<Self, AppError> {
        if from > to {
            return Err(AppError::unprocessable("range: 'from' must not be after 'to'"));
        }
        Ok(Self { from, to })
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        let day = at.date_naive();
        self.from <= day && day <= self.to
    }
}

/// Fills in whichever bound the query leaves out from the month of `today`.
pub fn resolve_range(query: &RangeQuery, today: NaiveDate) -> Result<DateRange, AppError> {
    let month = month_range(today);
    DateRange::new(query.from.unwrap_or(month.from), query.to.unwrap_or(month.to))
}

pub fn month_range(today: NaiveDate) -> DateRange {
    let from = today - Duration::days(i64::from(today.day0()));
    let next_month = if today.month() == 12 {
        NaiveDate::from_ymd_opt(today.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(today.year(), today.month() + 1, 1)
    };
    let to = next_month.map_or(from, |first| first - Duration::days(1));
    DateRange { from, to }
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemSummary {
    pub total: usize,
    /// Smallest strictly positive value.
    pub min: Option<f64>,
    /// Largest strictly positive value.
    pub max: Option<f64>,
    pub avg: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatReport {
    pub range: Option<DateRange>,
    pub summary: ItemSummary,
    pub trend: TrendResult,
}

pub fn summarize(items: &[StatItem]) -> ItemSummary {
    let positives: Vec<f64> = items
        .iter()
        .map(|item| item.numeric_value)
        .filter(|value| *value > 0.0)
        .collect();

    let min = positives.iter().copied().reduce(f64::min);
    let max = positives.iter().copied().reduce(f64::max);
    let avg = if positives.is_empty() {
        0.0
    } else {
        round2(positives.iter().sum::<f64>() / positives.len() as f64)
    };

    ItemSummary {
        total: items.len(),
        min,
        max,
        avg,
    }
}

pub fn build_report(range: Option<DateRange>, items: &[StatItem]) -> StatReport {
    StatReport {
        range,
        summary: summarize(items),
        trend: compute_trend(items),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn item(value: f64) -> StatItem {
        StatItem {
            id: value.to_string(),
            stat_id: "stat".into(),
            user_id: "user".into(),
            date_of_entry: Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap(),
            numeric_value: value,
            note: None,
        }
    }

    #[test]
    fn summary_uses_positive_values() {
        let items: Vec<StatItem> = [70.0, 0.0, 69.5, -3.0, 69.8].into_iter().map(item).collect();
        let summary = summarize(&items);
        assert_eq!(summary.total, 5);
        assert_eq!(summary.min, Some(69.5));
        assert_eq!(summary.max, Some(70.0));
        assert_eq!(summary.avg, 69.77);
    }

    #[test]
    fn summary_without_positive_values() {
        let items: Vec<StatItem> = [0.0, -1.0].into_iter().map(item).collect();
        let summary = summarize(&items);
        assert_eq!(summary.total, 2);
        assert_eq!(summary.min, None);
        assert_eq!(summary.max, None);
        assert_eq!(summary.avg, 0.0);

        let empty = summarize(&[]);
        assert_eq!(empty.total, 0);
        assert_eq!(empty.avg, 0.0);
    }

    #[test]
    fn report_combines_summary_and_trend() {
        let items: Vec<StatItem> = [2.0, 3.0, 2.0].into_iter().map(item).collect();
        let report = build_report(None, &items);
        assert_eq!(report.summary.total, 3);
        assert_eq!(report.trend.modes, vec![2.0]);
        assert_eq!(report.trend.data.len(), 3);
    }

    #[test]
    fn month_range_covers_whole_month() {
        let today = NaiveDate::from_ymd_opt(2024, 2, 14).unwrap();
        let range = month_range(today);
        assert_eq!(range.from, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(range.to, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());

        let december = month_range(NaiveDate::from_ymd_opt(2025, 12, 1).unwrap());
        assert_eq!(december.to, NaiveDate::from_ymd_opt(2025, 12, 31).unwrap());
    }

    #[test]
    fn range_includes_both_end_days() {
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
        )
        .unwrap();
        assert!(range.contains(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()));
        assert!(range.contains(Utc.with_ymd_and_hms(2024, 6, 3, 23, 59, 59).unwrap()));
        assert!(!range.contains(Utc.with_ymd_and_hms(2024, 6, 4, 0, 0, 0).unwrap()));
        assert!(!range.contains(Utc.with_ymd_and_hms(2024, 5, 31, 23, 59, 59).unwrap()));
    }

    #[test]
    fn range_may_end_on_the_last_representable_day() {
        let query = RangeQuery {
            from: None,
            to: Some(NaiveDate::MAX),
        };
        let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let range = resolve_range(&query, today).unwrap();
        assert_eq!(range.to, NaiveDate::MAX);
        assert!(range.contains(Utc.with_ymd_and_hms(2024, 6, 2, 12, 0, 0).unwrap()));

        let whole = DateRange::new(NaiveDate::MIN, NaiveDate::MAX).unwrap();
        assert!(whole.contains(Utc.with_ymd_and_hms(1970, 1, 1, 0, 0, 0).unwrap()));
    }

    #[test]
    fn resolve_range_fills_missing_bounds() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let query = RangeQuery {
            from: Some(NaiveDate::from_ymd_opt(2024, 5, 20).unwrap()),
            to: None,
        };
        let range = resolve_range(&query, today).unwrap();
        assert_eq!(range.from, NaiveDate::from_ymd_opt(2024, 5, 20).unwrap());
        assert_eq!(range.to, NaiveDate::from_ymd_opt(2024, 6, 30).unwrap());

        let inverted = RangeQuery {
            from: Some(NaiveDate::from_ymd_opt(2024, 7, 2).unwrap()),
            to: None,
        };
        assert!(resolve_range(&inverted, today).is_err());
    }
}
