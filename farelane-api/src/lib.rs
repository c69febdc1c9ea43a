use std::time::Duration;

use axum::{http::Method, routing::get, Json, Router};
use serde_json::{json, Value};
use tokio::task::JoinHandle;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod backend;
pub mod error;
pub mod events;
pub mod results;
pub mod search;
pub mod selection;
pub mod state;

pub use state::AppState;

pub fn app(state: AppState) -> Router {
    // CORS Middleware
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::USER_AGENT,
        ]);

    Router::new()
        .route("/health", get(health))
        .merge(search::routes())
        .merge(results::routes())
        .merge(selection::routes())
        .merge(events::routes())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Keep the controller moving without a client polling: apply store
/// notifications (month search progress) and reveal timers every `period`.
pub fn spawn_ticker(state: AppState, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            let mut results = state.results.lock().await;
            if let Err(e) = results.sync().await {
                tracing::warn!("Session sync failed: {}", e);
                continue;
            }
            if let Err(e) = results.tick().await {
                tracing::warn!("Reveal tick failed: {}", e);
            }
        }
    })
}
