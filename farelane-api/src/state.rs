use std::sync::Arc;

use farelane_search::ResultsController;
use farelane_store::SessionStore;
use tokio::sync::Mutex;

/// One controller per process: the API serves a single traveller session.
#[derive(Clone)]
pub struct AppState {
    pub results: Arc<Mutex<ResultsController>>,
    pub store: Arc<SessionStore>,
}

impl AppState {
    pub fn new(results: ResultsController, store: Arc<SessionStore>) -> Self {
        Self {
            results: Arc::new(Mutex::new(results)),
            store,
        }
    }
}
