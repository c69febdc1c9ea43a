use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::flight::FlightRecord;
use super::month::MonthSearchResults;

/// Canonical search result. Serializes back into the same raw shape the
/// normalizer accepts, so a persisted snapshot can be read again after reload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SearchResponse {
    OneWay(OneWayResults),
    RoundTrip(RoundTripResults),
    Month(MonthSearchResults),
}

impl SearchResponse {
    pub fn trip_type(&self) -> TripType {
        match self {
            SearchResponse::OneWay(_) => TripType::OneWay,
            SearchResponse::RoundTrip(_) => TripType::RoundTrip,
            SearchResponse::Month(month) if month.data.inbound_search_results.is_empty() => {
                TripType::OneWay
            }
            SearchResponse::Month(_) => TripType::RoundTrip,
        }
    }

    /// Flights on the outbound leg (or the only leg for one-way searches).
    pub fn outbound(&self) -> &[FlightRecord] {
        match self {
            SearchResponse::OneWay(r) => &r.search_results,
            SearchResponse::RoundTrip(r) => &r.outbound_search_results,
            SearchResponse::Month(r) => &r.data.search_results,
        }
    }

    pub fn inbound(&self) -> &[FlightRecord] {
        match self {
            SearchResponse::OneWay(_) => &[],
            SearchResponse::RoundTrip(r) => &r.inbound_search_results,
            SearchResponse::Month(r) => &r.data.inbound_search_results,
        }
    }

    pub fn loaded_count(&self) -> usize {
        self.outbound().len() + self.inbound().len()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OneWayResults {
    pub search_results: Vec<FlightRecord>,
    pub total_count: u64,
    pub total_pages: u64,
    pub page: u64,
    pub limit: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub departure_airport: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arrival_airport: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoundTripResults {
    pub outbound_search_results: Vec<FlightRecord>,
    pub inbound_search_results: Vec<FlightRecord>,
    pub outbound_total_count: u64,
    pub inbound_total_count: u64,
    pub outbound_total_pages: u64,
    pub inbound_total_pages: u64,
    pub page: u64,
    pub limit: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_date: Option<String>,
}

/// Which leg of a round trip a flight or a tab belongs to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Outbound,
    Inbound,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Outbound => "outbound",
            Direction::Inbound => "inbound",
        }
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "outbound" => Ok(Direction::Outbound),
            "inbound" => Ok(Direction::Inbound),
            other => Err(format!("unknown direction: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TripType {
    #[default]
    OneWay,
    RoundTrip,
}

impl TripType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TripType::OneWay => "one-way",
            TripType::RoundTrip => "round-trip",
        }
    }
}

impl fmt::Display for TripType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TripType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "one-way" => Ok(TripType::OneWay),
            "round-trip" => Ok(TripType::RoundTrip),
            other => Err(format!("unknown trip type: {}", other)),
        }
    }
}
