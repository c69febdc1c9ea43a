use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::flight::FlightRecord;
use super::response::Direction;

/// Client-built aggregate of a month search. Same JSON layout as the payload
/// the orchestrator persists: `{ meta: {...}, data: { per_day_results, ... } }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthSearchResults {
    pub meta: MonthMeta,
    pub data: MonthData,
}

impl MonthSearchResults {
    pub fn new(year: i32, month: u32, total_days: u32, phase: MonthPhase) -> Self {
        Self {
            meta: MonthMeta {
                month,
                year,
                total_days,
                loaded_days: 0,
                loading: true,
                phase,
            },
            data: MonthData::default(),
        }
    }

    /// Append one day's flights and keep the flattened lists and count in sync.
    pub fn push_day(&mut self, day: DayResults) {
        match day.direction {
            Direction::Outbound => self.data.search_results.extend(day.flights.iter().cloned()),
            Direction::Inbound => self
                .data
                .inbound_search_results
                .extend(day.flights.iter().cloned()),
        }
        self.data.per_day_results.push(day);
        self.data.total_count =
            (self.data.search_results.len() + self.data.inbound_search_results.len()) as u64;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthMeta {
    pub month: u32,
    pub year: i32,
    pub total_days: u32,
    #[serde(default)]
    pub loaded_days: u32,
    #[serde(default)]
    pub loading: bool,
    #[serde(default)]
    pub phase: MonthPhase,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MonthPhase {
    Outbound,
    Inbound,
    #[default]
    Done,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonthData {
    pub per_day_results: Vec<DayResults>,
    #[serde(default)]
    pub search_results: Vec<FlightRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inbound_search_results: Vec<FlightRecord>,
    #[serde(default)]
    pub total_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayResults {
    pub day: NaiveDate,
    #[serde(default)]
    pub direction: Direction,
    pub flights: Vec<FlightRecord>,
}

/// Number of calendar days in the given month, or `None` for an invalid month.
pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some(next.signed_duration_since(first).num_days() as u32)
}

/// `(year, month)` of a date, for grouping.
pub fn month_of(date: NaiveDate) -> (i32, u32) {
    (date.year(), date.month())
}
