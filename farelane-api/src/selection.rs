use axum::{
    extract::{Path, State},
    routing::{post, put},
    Json, Router,
};
use farelane_search::ResultsView;
use farelane_shared::Direction;
use serde::Deserialize;

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/selection/tab", put(set_active_tab))
        .route("/v1/selection/{direction}", post(select_flight).delete(clear_selection))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectFlightRequest {
    pub flight_id: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveTabRequest {
    pub tab: Direction,
    #[serde(default)]
    pub allow_backward: bool,
}

/// POST /v1/selection/{direction}
pub async fn select_flight(
    State(state): State<AppState>,
    Path(direction): Path<Direction>,
    Json(req): Json<SelectFlightRequest>,
) -> Result<Json<ResultsView>, AppError> {
    let mut results = state.results.lock().await;
    results
        .select_flight(direction, req.flight_id)
        .map_err(AppError::selection)?;
    Ok(Json(results.view()))
}

/// DELETE /v1/selection/{direction}
pub async fn clear_selection(
    State(state): State<AppState>,
    Path(direction): Path<Direction>,
) -> Json<ResultsView> {
    let mut results = state.results.lock().await;
    results.clear_selection(direction);
    Json(results.view())
}

/// PUT /v1/selection/tab
pub async fn set_active_tab(
    State(state): State<AppState>,
    Json(req): Json<ActiveTabRequest>,
) -> Result<Json<ResultsView>, AppError> {
    let mut results = state.results.lock().await;
    results
        .set_active_tab(req.tab, req.allow_backward)
        .map_err(AppError::selection)?;
    Ok(Json(results.view()))
}
