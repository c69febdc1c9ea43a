use std::collections::BTreeMap;

use farelane_shared::models::month::month_of;
use farelane_shared::{days_in_month, DayResults};
use serde::Serialize;

/// Per-day results of one calendar month, ready for a calendar view.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthBucket {
    pub year: i32,
    pub month: u32,
    pub total_calendar_days: u32,
    pub loaded_days: u32,
    pub days: Vec<DayResults>,
}

/// Group per-day results by calendar month. Buckets come out in calendar
/// order and so do the days inside them, whatever order they were fetched in.
pub fn group_by_month(per_day: &[DayResults]) -> Vec<MonthBucket> {
    let mut months: BTreeMap<(i32, u32), Vec<DayResults>> = BTreeMap::new();
    for day in per_day {
        months.entry(month_of(day.day)).or_default().push(day.clone());
    }

    months
        .into_iter()
        .map(|((year, month), mut days)| {
            days.sort_by_key(|d| (d.day, d.direction == farelane_shared::Direction::Inbound));
            let mut distinct: Vec<_> = days.iter().map(|d| d.day).collect();
            distinct.dedup();
            MonthBucket {
                year,
                month,
                total_calendar_days: days_in_month(year, month).unwrap_or(0),
                loaded_days: distinct.len() as u32,
                days,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use farelane_shared::Direction;

    fn day(y: i32, m: u32, d: u32, direction: Direction) -> DayResults {
        DayResults {
            day: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            direction,
            flights: vec![],
        }
    }

    #[test]
    fn test_groups_are_chronological() {
        let per_day = vec![
            day(2025, 9, 2, Direction::Outbound),
            day(2025, 8, 30, Direction::Inbound),
            day(2025, 8, 3, Direction::Outbound),
            day(2025, 8, 30, Direction::Outbound),
        ];

        let buckets = group_by_month(&per_day);
        assert_eq!(buckets.len(), 2);

        let august = &buckets[0];
        assert_eq!((august.year, august.month), (2025, 8));
        assert_eq!(august.total_calendar_days, 31);
        assert_eq!(august.loaded_days, 2);
        let order: Vec<_> = august.days.iter().map(|d| (d.day.to_string(), d.direction)).collect();
        assert_eq!(
            order,
            vec![
                ("2025-08-03".to_string(), Direction::Outbound),
                ("2025-08-30".to_string(), Direction::Outbound),
                ("2025-08-30".to_string(), Direction::Inbound),
            ]
        );

        assert_eq!(buckets[1].total_calendar_days, 30);
        assert_eq!(buckets[1].loaded_days, 1);
    }
}
