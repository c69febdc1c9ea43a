use std::convert::Infallible;
use std::time::Duration;

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
    Router,
};
use futures_util::stream::{Stream, StreamExt};
use tokio_stream::wrappers::{errors::BroadcastStreamRecvError, BroadcastStream};
use tracing::{debug, info, warn};

use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/events", get(session_events))
}

/// GET /v1/events
/// One `session_changed` event per session store write.
pub async fn session_events(State(state): State<AppState>) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    info!("New SSE client connected to session events");
    let rx = state.store.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(|message| async move {
        match message {
            Ok(event) => match Event::default().event("session_changed").json_data(&event) {
                Ok(sse) => Some(Ok(sse)),
                Err(e) => {
                    warn!("SSE: failed to serialize session event: {}", e);
                    None
                }
            },
            Err(BroadcastStreamRecvError::Lagged(missed)) => {
                debug!("SSE: client lagged, skipped {} events", missed);
                None
            }
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)).text("heartbeat"))
}
