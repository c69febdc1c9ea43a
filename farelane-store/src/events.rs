use farelane_shared::{CacheKey, SessionChangedEvent};
use tokio::sync::broadcast;
use tracing::debug;

/// Same-process change signal for the session cache. Unlike a storage
/// event between browser tabs, listeners in this process are told about
/// their own writes too.
#[derive(Clone)]
pub struct ChangeNotifier {
    tx: broadcast::Sender<SessionChangedEvent>,
}

impl ChangeNotifier {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionChangedEvent> {
        self.tx.subscribe()
    }

    pub fn publish(&self, key: Option<CacheKey>, search_id: Option<u64>) {
        let event = SessionChangedEvent {
            key,
            search_id,
            timestamp: chrono::Utc::now().timestamp_millis(),
        };
        // No receivers is fine: nobody is rendering yet.
        if self.tx.send(event).is_err() {
            debug!("Session change for {:?} had no listeners", key);
        }
    }
}
