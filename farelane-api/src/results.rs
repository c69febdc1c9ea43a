use axum::{
    extract::State,
    routing::{get, post, put},
    Json, Router,
};
use farelane_core::FilterCriteria;
use farelane_search::ResultsView;
use serde::Deserialize;

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/results", get(current_results))
        .route("/v1/results/filters", put(update_filters))
        .route("/v1/results/load-more", post(load_more))
        .route("/v1/results/ensure", post(ensure_loaded))
        .route("/v1/results/other-airlines", post(reveal_other_airlines))
        .route("/v1/results/other-airlines/adopt", post(adopt_other_airlines))
}

#[derive(Debug, Deserialize)]
pub struct FiltersRequest {
    /// Airline names or slugs; empty shows every airline.
    pub airlines: Option<Vec<String>>,
    pub criteria: Option<FilterCriteria>,
}

#[derive(Debug, Deserialize)]
pub struct EnsureRequest {
    pub count: usize,
}

/// GET /v1/results
/// Applies pending session changes and reveal timers before answering.
pub async fn current_results(State(state): State<AppState>) -> Result<Json<ResultsView>, AppError> {
    let mut results = state.results.lock().await;
    results.sync().await.map_err(AppError::search)?;
    results.tick().await.map_err(AppError::search)?;
    Ok(Json(results.view()))
}

/// PUT /v1/results/filters
pub async fn update_filters(
    State(state): State<AppState>,
    Json(req): Json<FiltersRequest>,
) -> Json<ResultsView> {
    let mut results = state.results.lock().await;
    if let Some(airlines) = req.airlines {
        results.set_selected_airlines(airlines);
    }
    if let Some(criteria) = req.criteria {
        results.set_criteria(criteria);
    }
    Json(results.view())
}

/// POST /v1/results/load-more
pub async fn load_more(State(state): State<AppState>) -> Result<Json<ResultsView>, AppError> {
    let mut results = state.results.lock().await;
    let added = results.load_more().await.map_err(AppError::search)?;
    tracing::debug!("Load more added {} results", added);
    Ok(Json(results.view()))
}

/// POST /v1/results/ensure
pub async fn ensure_loaded(
    State(state): State<AppState>,
    Json(req): Json<EnsureRequest>,
) -> Result<Json<ResultsView>, AppError> {
    let mut results = state.results.lock().await;
    results.ensure_loaded(req.count).await.map_err(AppError::search)?;
    Ok(Json(results.view()))
}

/// POST /v1/results/other-airlines
pub async fn reveal_other_airlines(State(state): State<AppState>) -> Result<Json<ResultsView>, AppError> {
    let mut results = state.results.lock().await;
    results.reveal_other_airlines().await.map_err(AppError::search)?;
    Ok(Json(results.view()))
}

/// POST /v1/results/other-airlines/adopt
pub async fn adopt_other_airlines(State(state): State<AppState>) -> Result<Json<ResultsView>, AppError> {
    let mut results = state.results.lock().await;
    results.adopt_suggested_airlines().await.map_err(AppError::search)?;
    Ok(Json(results.view()))
}
