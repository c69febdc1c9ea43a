use axum::{
    extract::State,
    http::StatusCode,
    routing::{post, put},
    Json, Router,
};
use farelane_core::SearchRequest;
use farelane_search::{MonthSearchRequest, ResultsView};
use farelane_shared::TripType;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/search", post(start_search))
        .route("/v1/search/month", post(start_month_search).delete(cancel_month_search))
        .route("/v1/trip-type", put(set_trip_type))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripTypeRequest {
    pub trip_type: TripType,
}

/// POST /v1/search
/// Brand-new search; replaces whatever the session held.
pub async fn start_search(
    State(state): State<AppState>,
    Json(req): Json<SearchRequest>,
) -> Result<Json<ResultsView>, AppError> {
    let mut results = state.results.lock().await;
    results.search(req).await.map_err(AppError::search)?;
    Ok(Json(results.view()))
}

/// POST /v1/search/month
/// Runs in the background; poll GET /v1/results or listen on /v1/events.
pub async fn start_month_search(
    State(state): State<AppState>,
    Json(req): Json<MonthSearchRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let mut results = state.results.lock().await;
    let search_id = results.search_month(req).await.map_err(AppError::search)?;
    Ok((StatusCode::ACCEPTED, Json(json!({ "searchId": search_id }))))
}

/// DELETE /v1/search/month
pub async fn cancel_month_search(State(state): State<AppState>) -> Json<Value> {
    let cancelled = state.results.lock().await.cancel_month_search();
    Json(json!({ "cancelled": cancelled }))
}

/// PUT /v1/trip-type
pub async fn set_trip_type(
    State(state): State<AppState>,
    Json(req): Json<TripTypeRequest>,
) -> Result<Json<ResultsView>, AppError> {
    let mut results = state.results.lock().await;
    results.set_trip_type(req.trip_type).await.map_err(AppError::search)?;
    Ok(Json(results.view()))
}
