//! Converts raw backend payloads into the canonical [`SearchResponse`].
//!
//! The backend does not tag its responses, so the shape is recognised by an
//! ordered list of [`ShapeDetector`]s evaluated top to bottom; the first one
//! that claims the payload decides the outcome. New legacy shapes are added
//! by appending a detector, never by editing an existing one.
//!
//! Numeric and date fields are carried through as-is. Formatting belongs to
//! the filter/sort engine and the presentation layer.

use chrono::NaiveDate;
use farelane_shared::{
    DayResults, Direction, FlightRecord, MonthMeta, MonthSearchResults, OneWayResults,
    RoundTripResults, SearchResponse,
};
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Maximum number of nested `{status, data}` envelopes unwrapped.
pub const MAX_ENVELOPE_DEPTH: usize = 4;

/// Alternate key names seen for the outbound leg of legacy round trips.
pub const OUTBOUND_KEY_VARIANTS: &[&str] = &[
    "outbound_flights",
    "departing_flights",
    "departure_flights",
    "outbound",
    "departures",
    "outbound_results",
];

/// Alternate key names seen for the inbound leg of legacy round trips.
pub const INBOUND_KEY_VARIANTS: &[&str] = &[
    "inbound_flights",
    "returning_flights",
    "return_flights",
    "inbound",
    "returns",
    "inbound_results",
];

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NormalizeError {
    #[error("Unsupported response schema (keys: {})", .keys.join(", "))]
    UnsupportedSchema { keys: Vec<String> },
    #[error("Backend error: {}", .0.as_deref().unwrap_or("no message"))]
    BackendError(Option<String>),
    #[error("Payload is not valid JSON: {0}")]
    InvalidPayload(String),
}

impl NormalizeError {
    pub fn user_message(&self) -> String {
        match self {
            NormalizeError::BackendError(Some(msg)) if !msg.trim().is_empty() => msg.clone(),
            NormalizeError::BackendError(_) => crate::GENERIC_BACKEND_ERROR.to_string(),
            NormalizeError::UnsupportedSchema { .. } | NormalizeError::InvalidPayload(_) => {
                crate::GENERIC_READ_ERROR.to_string()
            }
        }
    }
}

pub type NormalizeResult<T> = Result<T, NormalizeError>;

/// One structural recogniser. Must be total and free of side effects.
pub trait ShapeDetector: Send + Sync {
    fn name(&self) -> &'static str;

    /// `None` when the payload does not have this detector's shape.
    fn detect(
        &self,
        raw: &Value,
        normalizer: &Normalizer,
        depth: usize,
    ) -> Option<NormalizeResult<SearchResponse>>;
}

pub struct Normalizer {
    detectors: Vec<Box<dyn ShapeDetector>>,
}

impl Normalizer {
    pub fn new() -> Self {
        Self {
            detectors: vec![
                Box::new(MonthAggregateDetector),
                Box::new(DirectDataDetector),
                Box::new(EnvelopeDetector),
                Box::new(LegacyNestedDetector),
                Box::new(VariantKeyDetector),
            ],
        }
    }

    /// Append a detector after the built-in ones.
    pub fn with_detector(mut self, detector: Box<dyn ShapeDetector>) -> Self {
        self.detectors.push(detector);
        self
    }

    pub fn normalize(&self, raw: &Value) -> NormalizeResult<SearchResponse> {
        self.normalize_at(raw, 0)
    }

    pub fn normalize_str(&self, raw: &str) -> NormalizeResult<SearchResponse> {
        let value: Value =
            serde_json::from_str(raw).map_err(|e| NormalizeError::InvalidPayload(e.to_string()))?;
        self.normalize(&value)
    }

    /// Entry point for detectors that unwrap a nested payload.
    pub fn normalize_at(&self, raw: &Value, depth: usize) -> NormalizeResult<SearchResponse> {
        if depth <= MAX_ENVELOPE_DEPTH {
            for detector in &self.detectors {
                if let Some(result) = detector.detect(raw, self, depth) {
                    debug!("Payload matched {} shape at depth {}", detector.name(), depth);
                    return result;
                }
            }
        }

        let keys = key_set(raw);
        warn!("Unsupported search response schema, keys: {:?}", keys);
        Err(NormalizeError::UnsupportedSchema { keys })
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Normalize with the built-in detector list.
pub fn normalize(raw: &Value) -> NormalizeResult<SearchResponse> {
    Normalizer::new().normalize(raw)
}

// ============================================================================
// Detectors
// ============================================================================

/// `{ meta: {month, year, totalDays, ...}, data: { per_day_results: [...] } }`
pub struct MonthAggregateDetector;

impl ShapeDetector for MonthAggregateDetector {
    fn name(&self) -> &'static str {
        "month-aggregated"
    }

    fn detect(&self, raw: &Value, _: &Normalizer, _: usize) -> Option<NormalizeResult<SearchResponse>> {
        let meta = raw.get("meta")?.as_object()?;
        let numeric = |key: &str| meta.get(key).map_or(false, Value::is_number);
        if !(numeric("month") && numeric("year") && numeric("totalDays")) {
            return None;
        }
        let days = raw.get("data")?.get("per_day_results")?.as_array()?;

        let meta = match month_meta(meta) {
            Some(meta) => meta,
            None => return Some(Err(NormalizeError::UnsupportedSchema { keys: key_set(raw) })),
        };

        let mut results = MonthSearchResults {
            meta,
            data: Default::default(),
        };
        for entry in days {
            match day_results(entry) {
                Some(day) => results.push_day(day),
                None => warn!("Skipping unreadable per-day entry: {}", entry),
            }
        }
        Some(Ok(SearchResponse::Month(results)))
    }
}

/// Bare `search_results` or `outbound_search_results`/`inbound_search_results`.
pub struct DirectDataDetector;

impl ShapeDetector for DirectDataDetector {
    fn name(&self) -> &'static str {
        "direct"
    }

    fn detect(&self, raw: &Value, _: &Normalizer, _: usize) -> Option<NormalizeResult<SearchResponse>> {
        let obj = raw.as_object()?;
        if has_envelope(raw) {
            return None;
        }

        if let Some(flights) = obj.get("search_results").and_then(Value::as_array) {
            return Some(Ok(SearchResponse::OneWay(one_way(obj, flights))));
        }

        let outbound = obj.get("outbound_search_results")?;
        let inbound = obj.get("inbound_search_results")?;
        let is_list = |v: &Value| v.is_array() || v.is_null();
        if !(is_list(outbound) && is_list(inbound)) || (outbound.is_null() && inbound.is_null()) {
            return None;
        }

        let outbound = parse_flights(outbound.as_array().map(Vec::as_slice).unwrap_or_default());
        let inbound = parse_flights(inbound.as_array().map(Vec::as_slice).unwrap_or_default());
        Some(Ok(SearchResponse::RoundTrip(round_trip(obj, None, outbound, inbound))))
    }
}

/// `{ status: bool, data, errorMessage? }`
pub struct EnvelopeDetector;

impl ShapeDetector for EnvelopeDetector {
    fn name(&self) -> &'static str {
        "envelope"
    }

    fn detect(
        &self,
        raw: &Value,
        normalizer: &Normalizer,
        depth: usize,
    ) -> Option<NormalizeResult<SearchResponse>> {
        let status = raw.get("status")?.as_bool()?;
        if !status {
            let message = ["errorMessage", "error_message", "message"]
                .iter()
                .filter_map(|key| raw.get(*key).and_then(Value::as_str))
                .map(str::trim)
                .find(|msg| !msg.is_empty())
                .map(str::to_string);
            return Some(Err(NormalizeError::BackendError(message)));
        }

        match raw.get("data") {
            Some(data) if !data.is_null() => Some(normalizer.normalize_at(data, depth + 1)),
            _ => Some(Err(NormalizeError::UnsupportedSchema { keys: key_set(raw) })),
        }
    }
}

/// `search_results` holding an object with `outbound_flights`/`inbound_flights`
/// instead of a flat list.
pub struct LegacyNestedDetector;

impl ShapeDetector for LegacyNestedDetector {
    fn name(&self) -> &'static str {
        "legacy-nested"
    }

    fn detect(&self, raw: &Value, _: &Normalizer, _: usize) -> Option<NormalizeResult<SearchResponse>> {
        let (nested, parent) = [raw.get("data"), Some(raw)]
            .into_iter()
            .flatten()
            .filter_map(|parent| {
                let nested = parent.get("search_results")?.as_object()?;
                let has_leg = nested.get("outbound_flights").map_or(false, Value::is_array)
                    || nested.get("inbound_flights").map_or(false, Value::is_array);
                has_leg.then_some((nested, parent.as_object()?))
            })
            .next()?;

        let outbound = parse_flights(&flatten(nested.get("outbound_flights")));
        let inbound = parse_flights(&flatten(nested.get("inbound_flights")));
        Some(Ok(SearchResponse::RoundTrip(round_trip(
            nested,
            Some(parent),
            outbound,
            inbound,
        ))))
    }
}

/// Last resort: any pair of alternate-named arrays that look like flights.
pub struct VariantKeyDetector;

impl ShapeDetector for VariantKeyDetector {
    fn name(&self) -> &'static str {
        "variant-keys"
    }

    fn detect(&self, raw: &Value, _: &Normalizer, _: usize) -> Option<NormalizeResult<SearchResponse>> {
        let containers = [
            Some(raw),
            raw.get("data"),
            raw.get("search_results"),
            raw.get("data").and_then(|d| d.get("search_results")),
            raw.get("results"),
        ];

        for container in containers.into_iter().flatten() {
            let Some(obj) = container.as_object() else {
                continue;
            };
            let outbound = find_flight_list(obj, OUTBOUND_KEY_VARIANTS);
            let inbound = find_flight_list(obj, INBOUND_KEY_VARIANTS);
            if let (Some(outbound), Some(inbound)) = (outbound, inbound) {
                let results = round_trip(obj, None, parse_flights(outbound), parse_flights(inbound));
                return Some(Ok(SearchResponse::RoundTrip(results)));
            }
        }
        None
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn has_envelope(raw: &Value) -> bool {
    raw.get("status").map_or(false, Value::is_boolean)
}

fn key_set(raw: &Value) -> Vec<String> {
    let mut keys: Vec<String> = raw
        .as_object()
        .map(|obj| obj.keys().cloned().collect())
        .unwrap_or_default();
    keys.sort();
    keys
}

/// Non-negative integer from a number or numeric string.
fn count(value: Option<&Value>) -> Option<u64> {
    match value? {
        Value::Number(n) => n.as_u64().or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }
}

fn airport_code(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Object(obj) => ["code", "iata_code", "airport_code"]
            .iter()
            .find_map(|key| obj.get(*key).and_then(Value::as_str))
            .map(str::to_string),
        _ => None,
    }
}

fn pages_for(total: u64, limit: u64) -> u64 {
    if limit == 0 {
        1
    } else {
        total.div_ceil(limit).max(1)
    }
}

/// Whether a JSON value has the minimal structure of a flight record.
pub fn looks_like_flight(value: &Value) -> bool {
    let identity = value
        .get("flight_id")
        .or_else(|| value.get("id"))
        .map_or(false, |id| id.is_i64() || id.is_u64());
    let priced = value
        .get("pricing")
        .and_then(|p| p.get("grand_total"))
        .map_or(false, Value::is_number);
    identity && priced
}

fn find_flight_list<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a [Value]> {
    keys.iter()
        .filter_map(|key| obj.get(*key).and_then(Value::as_array))
        .find(|list| list.first().map_or(false, looks_like_flight))
        .map(Vec::as_slice)
}

/// Legacy payloads sometimes group flights in nested lists.
fn flatten(value: Option<&Value>) -> Vec<Value> {
    let mut out = Vec::new();
    if let Some(items) = value.and_then(Value::as_array) {
        for item in items {
            match item {
                Value::Array(inner) => out.extend(inner.iter().cloned()),
                other => out.push(other.clone()),
            }
        }
    }
    out
}

/// Records with an unparsable price are dropped here, one by one.
fn parse_flights(items: &[Value]) -> Vec<FlightRecord> {
    items
        .iter()
        .enumerate()
        .filter_map(|(idx, item)| match serde_json::from_value::<FlightRecord>(item.clone()) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("Rejecting flight record #{}: {}", idx, e);
                None
            }
        })
        .collect()
}

fn one_way(obj: &Map<String, Value>, flights: &[Value]) -> OneWayResults {
    let search_results = parse_flights(flights);
    let loaded = search_results.len() as u64;
    let limit = count(obj.get("limit")).unwrap_or(loaded);
    let total_count = count(obj.get("total_count")).unwrap_or(loaded);
    OneWayResults {
        total_count,
        total_pages: count(obj.get("total_pages")).unwrap_or_else(|| pages_for(total_count, limit)),
        page: count(obj.get("page")).unwrap_or(1),
        limit,
        departure_airport: airport_code(obj.get("departure_airport")),
        arrival_airport: airport_code(obj.get("arrival_airport")),
        search_results,
    }
}

/// Counts are read from the leg container first, then its parent, and
/// finally derived from the loaded lists.
fn round_trip(
    obj: &Map<String, Value>,
    parent: Option<&Map<String, Value>>,
    outbound: Vec<FlightRecord>,
    inbound: Vec<FlightRecord>,
) -> RoundTripResults {
    let field = |key: &str| count(obj.get(key)).or_else(|| parent.and_then(|p| count(p.get(key))));

    let outbound_total_count = field("outbound_total_count").unwrap_or(outbound.len() as u64);
    let inbound_total_count = field("inbound_total_count").unwrap_or(inbound.len() as u64);
    let limit = field("limit").unwrap_or(outbound.len().max(inbound.len()) as u64);
    let return_date = obj
        .get("return_date")
        .or_else(|| parent.and_then(|p| p.get("return_date")))
        .and_then(Value::as_str)
        .map(str::to_string);

    RoundTripResults {
        outbound_total_pages: field("outbound_total_pages")
            .unwrap_or_else(|| pages_for(outbound_total_count, limit)),
        inbound_total_pages: field("inbound_total_pages")
            .unwrap_or_else(|| pages_for(inbound_total_count, limit)),
        outbound_total_count,
        inbound_total_count,
        page: field("page").unwrap_or(1),
        limit,
        return_date,
        outbound_search_results: outbound,
        inbound_search_results: inbound,
    }
}

fn month_meta(meta: &Map<String, Value>) -> Option<MonthMeta> {
    serde_json::from_value::<MonthMeta>(Value::Object(meta.clone())).ok()
}

fn day_results(entry: &Value) -> Option<DayResults> {
    let day = entry
        .get("day")
        .and_then(Value::as_str)
        .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())?;
    let direction = entry
        .get("direction")
        .and_then(Value::as_str)
        .and_then(|s| s.parse::<Direction>().ok())
        .unwrap_or_default();
    let flights = parse_flights(entry.get("flights").and_then(Value::as_array).map(Vec::as_slice).unwrap_or_default());
    Some(DayResults { day, direction, flights })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn flight(id: i64, total: f64) -> Value {
        json!({
            "flight_id": id,
            "flight_number": format!("GA{}", id),
            "airline_name": "Garuda Indonesia",
            "departure_time": "2025-08-01T08:00:00Z",
            "duration_minutes": 110,
            "pricing": { "grand_total": total, "currency": "IDR" }
        })
    }

    #[test]
    fn test_one_way_direct() {
        let raw = json!({
            "search_results": [flight(1, 1200000.0), flight(2, 900000.0)],
            "total_count": 57,
            "total_pages": 3,
            "page": 1,
            "limit": 20,
            "departure_airport": { "code": "CGK", "name": "Soekarno-Hatta" },
            "arrival_airport": "DPS"
        });

        let SearchResponse::OneWay(res) = normalize(&raw).unwrap() else {
            panic!("expected one-way");
        };
        assert_eq!(res.search_results.len(), 2);
        assert_eq!(res.total_count, 57);
        assert_eq!(res.departure_airport.as_deref(), Some("CGK"));
        assert_eq!(res.arrival_airport.as_deref(), Some("DPS"));
        assert!(res.search_results.iter().all(|f| f.pricing.grand_total.is_finite()));
    }

    #[test]
    fn test_unparsable_price_record_is_dropped() {
        let mut bad = flight(3, 0.0);
        bad["pricing"]["grand_total"] = json!("TBA");
        let raw = json!({ "search_results": [flight(1, 100.0), bad], "total_count": 2 });

        let response = normalize(&raw).unwrap();
        assert_eq!(response.outbound().len(), 1);
        assert_eq!(response.outbound()[0].flight_id, 1);
    }

    #[test]
    fn test_null_optional_fields_keep_record() {
        let raw = json!({ "search_results": [{
            "flight_id": 1,
            "flight_number": null,
            "arrival_airport_name": null,
            "fare_class": null,
            "pricing": { "grand_total": 100, "currency": null, "base_price": null }
        }] });

        let response = normalize(&raw).unwrap();
        assert_eq!(response.outbound().len(), 1);
        let record = &response.outbound()[0];
        assert!(record.flight_number.is_empty());
        assert!(record.arrival_airport_name.is_empty());
        assert_eq!(record.pricing.base_price.adult, 0.0);
    }

    #[test]
    fn test_flight_id_wins_over_id() {
        let raw = json!({ "search_results": [{
            "id": 9,
            "flight_id": 1,
            "pricing": { "grand_total": 100 }
        }] });

        let response = normalize(&raw).unwrap();
        assert_eq!(response.outbound().len(), 1);
        assert_eq!(response.outbound()[0].flight_id, 1);
    }

    #[test]
    fn test_float_and_string_counts_are_accepted() {
        let raw = json!({ "search_results": [{
            "flight_id": 1,
            "duration_minutes": 95.0,
            "stops": "1",
            "airline_id": "12",
            "pricing": { "grand_total": 100 }
        }] });

        let response = normalize(&raw).unwrap();
        assert_eq!(response.outbound().len(), 1);
        let record = &response.outbound()[0];
        assert_eq!(record.duration_minutes, 95);
        assert_eq!(record.stops, 1);
        assert_eq!(record.airline_id, Some(12));
    }

    #[test]
    fn test_envelope_unwraps_round_trip() {
        let raw = json!({
            "status": true,
            "data": {
                "outbound_search_results": [flight(1, 10.0)],
                "inbound_search_results": null,
                "outbound_total_count": 12,
                "return_date": "2025-08-10"
            }
        });

        let SearchResponse::RoundTrip(res) = normalize(&raw).unwrap() else {
            panic!("expected round trip");
        };
        assert_eq!(res.outbound_search_results.len(), 1);
        assert!(res.inbound_search_results.is_empty());
        assert_eq!(res.outbound_total_count, 12);
        assert_eq!(res.return_date.as_deref(), Some("2025-08-10"));
    }

    #[test]
    fn test_false_status_is_backend_error() {
        let raw = json!({ "status": false, "errorMessage": "Route not served" });
        let err = normalize(&raw).unwrap_err();
        assert_eq!(err, NormalizeError::BackendError(Some("Route not served".into())));
        assert_eq!(err.user_message(), "Route not served");

        let silent = normalize(&json!({ "status": false })).unwrap_err();
        assert_eq!(silent.user_message(), crate::GENERIC_BACKEND_ERROR);
    }

    #[test]
    fn test_legacy_nested_round_trip() {
        let raw = json!({
            "status": true,
            "data": {
                "search_results": {
                    "outbound_flights": [[flight(1, 10.0), flight(2, 20.0)], [flight(3, 30.0)]],
                    "inbound_flights": [flight(4, 40.0)]
                }
            }
        });

        let SearchResponse::RoundTrip(res) = normalize(&raw).unwrap() else {
            panic!("expected round trip");
        };
        assert_eq!(res.outbound_search_results.len(), 3);
        assert_eq!(res.inbound_search_results.len(), 1);
        assert_eq!(res.outbound_total_count, 3);
        assert_eq!(res.inbound_total_pages, 1);
    }

    #[test]
    fn test_legacy_nested_with_one_leg_still_exposes_both() {
        let raw = json!({ "data": { "search_results": { "outbound_flights": [flight(1, 10.0)] } } });
        let response = normalize(&raw).unwrap();
        assert!(matches!(response, SearchResponse::RoundTrip(_)));
        assert_eq!(response.outbound().len(), 1);
        assert!(response.inbound().is_empty());
    }

    #[test]
    fn test_variant_key_round_trip() {
        let raw = json!({
            "results": {
                "departing_flights": [flight(1, 10.0)],
                "returning_flights": [flight(2, 20.0), flight(3, 30.0)]
            }
        });

        let SearchResponse::RoundTrip(res) = normalize(&raw).unwrap() else {
            panic!("expected round trip");
        };
        assert_eq!(res.outbound_total_count, 1);
        assert_eq!(res.inbound_total_count, 2);
        assert_eq!(res.outbound_total_pages, 1);
    }

    #[test]
    fn test_variant_keys_require_flight_like_entries() {
        let raw = json!({
            "outbound": [{ "name": "not a flight" }],
            "inbound": [flight(2, 20.0)]
        });
        let err = normalize(&raw).unwrap_err();
        assert_eq!(
            err,
            NormalizeError::UnsupportedSchema { keys: vec!["inbound".into(), "outbound".into()] }
        );
        assert_eq!(err.user_message(), crate::GENERIC_READ_ERROR);
    }

    #[test]
    fn test_month_aggregate_orders_flattened_lists() {
        let raw = json!({
            "meta": { "month": 8, "year": 2025, "totalDays": 31, "loadedDays": 2, "loading": true, "phase": "done" },
            "data": {
                "per_day_results": [
                    { "day": "2025-08-01", "flights": [flight(1, 10.0)] },
                    { "day": "2025-08-02", "flights": [flight(2, 20.0), flight(3, 30.0)] },
                    { "day": "garbage", "flights": [] }
                ],
                "search_results": []
            }
        });

        let SearchResponse::Month(res) = normalize(&raw).unwrap() else {
            panic!("expected month aggregate");
        };
        assert_eq!(res.meta.loaded_days, 2);
        assert!(res.meta.loading);
        assert_eq!(res.data.per_day_results.len(), 2);
        assert_eq!(res.data.search_results.len(), 3);
        assert_eq!(res.data.total_count, 3);
    }

    #[test]
    fn test_non_boolean_status_is_not_an_envelope() {
        let raw = json!({ "status": "ok", "search_results": [flight(1, 10.0)] });
        assert!(matches!(normalize(&raw), Ok(SearchResponse::OneWay(_))));
    }

    #[test]
    fn test_envelope_depth_is_bounded() {
        let mut raw = json!({ "search_results": [] });
        for _ in 0..(MAX_ENVELOPE_DEPTH + 2) {
            raw = json!({ "status": true, "data": raw });
        }
        assert!(matches!(normalize(&raw), Err(NormalizeError::UnsupportedSchema { .. })));
    }

    #[test]
    fn test_normalize_str_rejects_garbage() {
        let err = Normalizer::new().normalize_str("{not json").unwrap_err();
        assert!(matches!(err, NormalizeError::InvalidPayload(_)));
    }

    #[test]
    fn test_serialized_response_normalizes_to_itself() {
        let raw = json!({ "search_results": [flight(1, 10.0)], "total_count": 9, "limit": 1 });
        let first = normalize(&raw).unwrap();
        let again = normalize(&serde_json::to_value(&first).unwrap()).unwrap();
        assert_eq!(first, again);
    }
}
