#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use farelane_core::{FlightSearchClient, SearchRequest, TransportError};
use farelane_shared::PassengerCounts;
use serde_json::{json, Value};
use tokio::sync::Notify;

type Responder = Box<dyn Fn(&SearchRequest, usize) -> Result<Value, TransportError> + Send + Sync>;

/// In-process backend answering from a closure. The closure gets the request
/// and the 1-based call number.
pub struct ScriptedClient {
    requests: Mutex<Vec<SearchRequest>>,
    responder: Responder,
    hang_after: Option<usize>,
    held_after: Option<(usize, Arc<Notify>)>,
}

impl ScriptedClient {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&SearchRequest, usize) -> Result<Value, TransportError> + Send + Sync + 'static,
    {
        Self {
            requests: Mutex::new(Vec::new()),
            responder: Box::new(responder),
            hang_after: None,
            held_after: None,
        }
    }

    /// Calls past `calls` never resolve.
    pub fn hang_after(mut self, calls: usize) -> Self {
        self.hang_after = Some(calls);
        self
    }

    /// Calls past `calls` wait for one `notify_one` on `gate` each before
    /// answering.
    pub fn hold_after(mut self, calls: usize, gate: Arc<Notify>) -> Self {
        self.held_after = Some((calls, gate));
        self
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<SearchRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl FlightSearchClient for ScriptedClient {
    async fn search(&self, request: &SearchRequest) -> Result<Value, TransportError> {
        let call = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(request.clone());
            requests.len()
        };
        if self.hang_after.is_some_and(|limit| call > limit) {
            std::future::pending::<()>().await;
        }
        if let Some((limit, gate)) = &self.held_after {
            if call > *limit {
                gate.notified().await;
            }
        }
        (self.responder)(request, call)
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Epoch millis at midnight UTC of the given date.
pub fn millis(y: i32, m: u32, d: u32) -> i64 {
    date(y, m, d).and_hms_opt(0, 0, 0).unwrap().and_utc().timestamp_millis()
}

pub fn flight(id: i64, airline: &str, price: u64, departure: &str) -> Value {
    json!({
        "flight_id": id,
        "flight_number": format!("FL{}", id),
        "airline_id": airline.len() as i64,
        "airline_name": airline,
        "departure_airport_code": "CGK",
        "arrival_airport_code": "DPS",
        "departure_time": departure,
        "arrival_time": departure,
        "duration_minutes": 110,
        "stops": 0,
        "pricing": {
            "base_price": { "adult": price },
            "total_price": { "adult": price },
            "grand_total": price,
            "currency": "IDR"
        }
    })
}

pub fn one_way_payload(flights: Vec<Value>, total_count: u64, limit: u32) -> Value {
    json!({
        "search_results": flights,
        "total_count": total_count,
        "page": 1,
        "limit": limit
    })
}

/// One flight per day, id derived from the date so days are distinguishable.
pub fn day_payload(request: &SearchRequest) -> Value {
    let day = request.departure_date;
    let id = day.format("%Y%m%d").to_string().parse::<i64>().unwrap();
    let departure = format!("{}T08:00:00+07:00", day);
    one_way_payload(vec![flight(id, "Garuda Indonesia", 1_000_000, &departure)], 1, 20)
}

pub fn one_way_request() -> SearchRequest {
    SearchRequest::one_way("CGK", "DPS", date(2025, 8, 1), PassengerCounts::new(2, 1, 0))
}

pub fn round_trip_request() -> SearchRequest {
    let mut request = one_way_request();
    request.return_date = Some(date(2025, 8, 5));
    request
}

/// Spin until the client has seen `calls` requests.
pub async fn wait_for_calls(client: &ScriptedClient, calls: usize) {
    while client.calls() < calls {
        tokio::task::yield_now().await;
    }
}

pub fn shared(client: ScriptedClient) -> Arc<ScriptedClient> {
    Arc::new(client)
}
