use std::cmp::Ordering;
use std::collections::HashSet;

use chrono::{DateTime, NaiveDateTime, Timelike};
use farelane_shared::{airline_slug, FlightRecord};
use serde::{Deserialize, Serialize};

/// Departure time-of-day buckets, half-open on the upper hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TimeOfDay {
    Night,     // 00-06
    Morning,   // 06-12
    Afternoon, // 12-18
    Evening,   // 18-24
}

impl TimeOfDay {
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            0..=5 => TimeOfDay::Night,
            6..=11 => TimeOfDay::Morning,
            12..=17 => TimeOfDay::Afternoon,
            _ => TimeOfDay::Evening,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StopCategory {
    Direct,
    OneStop,
    MultiStop,
}

impl StopCategory {
    pub fn from_stops(stops: u32) -> Self {
        match stops {
            0 => StopCategory::Direct,
            1 => StopCategory::OneStop,
            _ => StopCategory::MultiStop,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DurationBucket {
    Short,  // <= 2h
    Medium, // 2h - 5h
    Long,   // > 5h
}

impl DurationBucket {
    pub fn from_minutes(minutes: u32) -> Self {
        match minutes {
            0..=120 => DurationBucket::Short,
            121..=300 => DurationBucket::Medium,
            _ => DurationBucket::Long,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Price,
    Departure,
    Duration,
}

impl SortKey {
    /// `None` for keys the engine does not know; those leave the order alone.
    pub fn parse(key: &str) -> Option<Self> {
        match key {
            "price" => Some(SortKey::Price),
            "departure" => Some(SortKey::Departure),
            "duration" => Some(SortKey::Duration),
            _ => None,
        }
    }
}

/// Client-side filter state. Empty lists mean "no restriction".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterCriteria {
    #[serde(default)]
    pub departure_times: Vec<TimeOfDay>,
    #[serde(default)]
    pub stops: Vec<StopCategory>,
    #[serde(default)]
    pub durations: Vec<DurationBucket>,
    #[serde(default)]
    pub sort_by: Option<String>,
}

impl FilterCriteria {
    fn accepts(&self, flight: &FlightRecord) -> bool {
        (self.departure_times.is_empty()
            || self
                .departure_times
                .contains(&TimeOfDay::from_hour(departure_hour(&flight.departure_time))))
            && (self.stops.is_empty() || self.stops.contains(&StopCategory::from_stops(flight.stops)))
            && (self.durations.is_empty()
                || self
                    .durations
                    .contains(&DurationBucket::from_minutes(flight.duration_minutes)))
    }
}

/// Apply airline selection and criteria, then sort. The input is left as is.
///
/// `selected_airlines` holds airline names or slugs; an empty selection
/// disables airline filtering altogether.
pub fn filter_and_sort(
    flights: &[FlightRecord],
    selected_airlines: &[String],
    criteria: &FilterCriteria,
) -> Vec<FlightRecord> {
    let airlines: HashSet<String> = selected_airlines.iter().map(|a| airline_slug(a)).collect();

    let mut out: Vec<FlightRecord> = flights
        .iter()
        .filter(|f| airlines.is_empty() || airlines.contains(&airline_slug(&f.airline_name)))
        .filter(|f| criteria.accepts(f))
        .cloned()
        .collect();

    if let Some(key) = criteria.sort_by.as_deref().and_then(SortKey::parse) {
        // sort_by is stable, so equal keys keep backend order
        out.sort_by(|a, b| compare(a, b, key));
    }
    out
}

fn compare(a: &FlightRecord, b: &FlightRecord, key: SortKey) -> Ordering {
    match key {
        SortKey::Price => a
            .pricing
            .grand_total
            .partial_cmp(&b.pricing.grand_total)
            .unwrap_or(Ordering::Equal),
        SortKey::Departure => departure_key(&a.departure_time).cmp(&departure_key(&b.departure_time)),
        SortKey::Duration => a.duration_minutes.cmp(&b.duration_minutes),
    }
}

/// Milliseconds since epoch; unparsable timestamps sort last.
fn departure_key(ts: &str) -> i64 {
    parse_timestamp(ts)
        .map(|dt| dt.and_utc().timestamp_millis())
        .unwrap_or(i64::MAX)
}

const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"];

/// Wall-clock time in the origin timezone for offset-less strings, UTC
/// instant for offset-carrying ones.
fn parse_timestamp(ts: &str) -> Option<NaiveDateTime> {
    let ts = ts.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(ts) {
        return Some(dt.naive_utc());
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(ts, fmt).ok())
}

/// Hour of departure: ISO parse first, then any `HH:MM` substring, else 0.
pub fn departure_hour(ts: &str) -> u32 {
    let ts = ts.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(ts) {
        return dt.hour();
    }
    if let Some(dt) = NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(ts, fmt).ok())
    {
        return dt.hour();
    }
    clock_hour(ts).unwrap_or(0)
}

fn clock_hour(s: &str) -> Option<u32> {
    s.as_bytes().windows(5).find_map(|w| {
        let digits = [w[0], w[1], w[3], w[4]];
        if w[2] != b':' || !digits.iter().all(u8::is_ascii_digit) {
            return None;
        }
        let hour = u32::from(w[0] - b'0') * 10 + u32::from(w[1] - b'0');
        let minute = u32::from(w[3] - b'0') * 10 + u32::from(w[4] - b'0');
        (hour < 24 && minute < 60).then_some(hour)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(id: i64, airline: &str, departure: &str, minutes: u32, stops: u32, total: f64) -> FlightRecord {
        serde_json::from_value(json!({
            "flight_id": id,
            "airline_name": airline,
            "departure_time": departure,
            "duration_minutes": minutes,
            "stops": stops,
            "pricing": { "grand_total": total }
        }))
        .unwrap()
    }

    fn sample() -> Vec<FlightRecord> {
        vec![
            record(1, "Garuda Indonesia", "2025-08-01T06:30:00Z", 115, 0, 1200000.0),
            record(2, "Lion Air", "2025-08-01T23:10:00Z", 130, 1, 900000.0),
            record(3, "Citilink", "2025-08-01T13:05:00", 420, 2, 1500000.0),
            record(4, "Lion Air", "departs 04:45 local", 95, 0, 650000.0),
        ]
    }

    fn ids(flights: &[FlightRecord]) -> Vec<i64> {
        flights.iter().map(|f| f.flight_id).collect()
    }

    #[test]
    fn test_price_sort_scenario() {
        let flights = vec![
            record(1, "A", "", 0, 0, 1200000.0),
            record(2, "A", "", 0, 0, 900000.0),
        ];
        let criteria = FilterCriteria { sort_by: Some("price".into()), ..Default::default() };
        assert_eq!(ids(&filter_and_sort(&flights, &[], &criteria)), vec![2, 1]);
    }

    #[test]
    fn test_evening_bucket_scenario() {
        let flights = vec![record(1, "A", "2025-08-01T23:10:00Z", 60, 0, 1.0)];
        let evening = FilterCriteria { departure_times: vec![TimeOfDay::Evening], ..Default::default() };
        let morning = FilterCriteria { departure_times: vec![TimeOfDay::Morning], ..Default::default() };

        assert_eq!(filter_and_sort(&flights, &[], &evening).len(), 1);
        assert!(filter_and_sort(&flights, &[], &morning).is_empty());
    }

    #[test]
    fn test_empty_airline_selection_keeps_everything() {
        let flights = sample();
        let out = filter_and_sort(&flights, &[], &FilterCriteria::default());
        assert_eq!(ids(&out), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_airline_selection_matches_by_slug() {
        let flights = sample();
        let selected = vec!["lion-air".to_string(), "Citilink".to_string()];
        let out = filter_and_sort(&flights, &selected, &FilterCriteria::default());
        assert_eq!(ids(&out), vec![2, 3, 4]);
    }

    #[test]
    fn test_stop_and_duration_filters_combine() {
        let flights = sample();
        let criteria = FilterCriteria {
            stops: vec![StopCategory::Direct],
            durations: vec![DurationBucket::Short],
            ..Default::default()
        };
        assert_eq!(ids(&filter_and_sort(&flights, &[], &criteria)), vec![1, 4]);

        let long_haul = FilterCriteria {
            stops: vec![StopCategory::MultiStop],
            durations: vec![DurationBucket::Long],
            ..Default::default()
        };
        assert_eq!(ids(&filter_and_sort(&flights, &[], &long_haul)), vec![3]);
    }

    #[test]
    fn test_departure_and_duration_sorts() {
        let flights = sample();
        let by_departure = FilterCriteria { sort_by: Some("departure".into()), ..Default::default() };
        // record 4 has no parsable timestamp and goes last
        assert_eq!(ids(&filter_and_sort(&flights, &[], &by_departure)), vec![1, 3, 2, 4]);

        let by_duration = FilterCriteria { sort_by: Some("duration".into()), ..Default::default() };
        assert_eq!(ids(&filter_and_sort(&flights, &[], &by_duration)), vec![4, 1, 2, 3]);
    }

    #[test]
    fn test_unknown_sort_key_keeps_order() {
        let flights = sample();
        let criteria = FilterCriteria { sort_by: Some("popularity".into()), ..Default::default() };
        assert_eq!(ids(&filter_and_sort(&flights, &[], &criteria)), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_filter_and_sort_is_idempotent_and_pure() {
        let flights = sample();
        let before = flights.clone();
        let criteria = FilterCriteria {
            departure_times: vec![TimeOfDay::Night, TimeOfDay::Evening, TimeOfDay::Morning],
            sort_by: Some("price".into()),
            ..Default::default()
        };
        let once = filter_and_sort(&flights, &[], &criteria);
        let twice = filter_and_sort(&once, &[], &criteria);

        assert_eq!(once, twice);
        assert_eq!(flights, before);
        assert!(filter_and_sort(&[], &["x".to_string()], &criteria).is_empty());
    }

    #[test]
    fn test_departure_hour_fallbacks() {
        assert_eq!(departure_hour("2025-08-01T23:10:00Z"), 23);
        assert_eq!(departure_hour("2025-08-01T07:15:00+07:00"), 7);
        assert_eq!(departure_hour("2025-08-01T13:05:00"), 13);
        assert_eq!(departure_hour("departs 04:45 local"), 4);
        assert_eq!(departure_hour("soon"), 0);
        assert_eq!(departure_hour("99:99 then 18:20"), 18);
    }
}
