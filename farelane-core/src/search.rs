use chrono::NaiveDate;
use farelane_shared::PassengerCounts;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Query sent to the flight-search backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub origin_code: String,
    pub destination_code: String,
    pub departure_date: NaiveDate, // Just date, the backend matches the whole day
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_date: Option<NaiveDate>,
    pub passengers: PassengerCounts,
    #[serde(default = "default_cabin_class")]
    pub cabin_class: String,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default = "default_sort_by")]
    pub sort_by: String,
    #[serde(default)]
    pub sort_order: SortOrder,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude_airline_ids: Vec<i64>,
}

fn default_cabin_class() -> String {
    "economy".to_string()
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    20
}

fn default_sort_by() -> String {
    "price".to_string()
}

impl SearchRequest {
    pub fn one_way(origin: &str, destination: &str, date: NaiveDate, passengers: PassengerCounts) -> Self {
        Self {
            origin_code: origin.to_string(),
            destination_code: destination.to_string(),
            departure_date: date,
            return_date: None,
            passengers,
            cabin_class: default_cabin_class(),
            page: default_page(),
            limit: default_limit(),
            sort_by: default_sort_by(),
            sort_order: SortOrder::Asc,
            exclude_airline_ids: Vec::new(),
        }
    }

    pub fn is_round_trip(&self) -> bool {
        self.return_date.is_some()
    }

    /// Single-day one-way query derived from this one. `reversed` swaps
    /// origin and destination for the return leg of a month search.
    pub fn for_day(&self, date: NaiveDate, reversed: bool) -> Self {
        let (origin, destination) = if reversed {
            (&self.destination_code, &self.origin_code)
        } else {
            (&self.origin_code, &self.destination_code)
        };
        Self {
            origin_code: origin.clone(),
            destination_code: destination.clone(),
            departure_date: date,
            return_date: None,
            page: 1,
            exclude_airline_ids: Vec::new(),
            ..self.clone()
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.origin_code.trim().is_empty() || self.destination_code.trim().is_empty() {
            return Err("Origin and destination are required".to_string());
        }
        if self.origin_code.eq_ignore_ascii_case(&self.destination_code) {
            return Err("Origin and destination must differ".to_string());
        }
        if !self.passengers.is_valid() || self.passengers.is_empty() {
            return Err("At least one adult passenger is required".to_string());
        }
        if let Some(return_date) = self.return_date {
            if return_date < self.departure_date {
                return Err("Return date cannot be before departure date".to_string());
            }
        }
        Ok(())
    }
}
