use std::sync::Arc;

use farelane_shared::{CacheKey, PassengerCounts, SearchResponse, SessionChangedEvent, TripType};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::backend::{MemoryBackend, SessionBackend};
use crate::events::ChangeNotifier;
use crate::StoreError;

const EVENT_CAPACITY: usize = 256;

/// Typed facade over the session cache.
///
/// Each entry is written as a whole JSON value, never patched, and every
/// write is followed by a [`SessionChangedEvent`].
pub struct SessionStore {
    backend: Arc<dyn SessionBackend>,
    notifier: ChangeNotifier,
}

impl SessionStore {
    pub fn new(backend: Arc<dyn SessionBackend>) -> Self {
        Self {
            backend,
            notifier: ChangeNotifier::new(EVENT_CAPACITY),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryBackend::new()))
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionChangedEvent> {
        self.notifier.subscribe()
    }

    // ------------------------------------------------------------------
    // Search identity
    // ------------------------------------------------------------------

    /// Start a new search: bump the monotonic id and stamp the start time.
    pub async fn begin_search(&self, started_at_ms: i64) -> Result<u64, StoreError> {
        let next = self.search_id().await?.unwrap_or(0) + 1;
        self.write_json(CacheKey::SearchStartedAt, &started_at_ms, Some(next)).await?;
        self.write_json(CacheKey::SearchId, &next, Some(next)).await?;
        info!("Search #{} started", next);
        Ok(next)
    }

    pub async fn search_id(&self) -> Result<Option<u64>, StoreError> {
        self.read_json(CacheKey::SearchId).await
    }

    pub async fn search_started_at(&self) -> Result<Option<i64>, StoreError> {
        self.read_json(CacheKey::SearchStartedAt).await
    }

    /// Whether `search_id` is still the current search.
    pub async fn is_current(&self, search_id: u64) -> Result<bool, StoreError> {
        Ok(self.search_id().await? == Some(search_id))
    }

    // ------------------------------------------------------------------
    // Payloads
    // ------------------------------------------------------------------

    /// Last raw payload. Unparsable content counts as "no prior search".
    pub async fn last_search_result(&self) -> Result<Option<Value>, StoreError> {
        self.read_json(CacheKey::LastSearchResult).await
    }

    pub async fn save_search_result(&self, search_id: u64, raw: &Value) -> Result<(), StoreError> {
        self.write_json(CacheKey::LastSearchResult, raw, Some(search_id)).await
    }

    pub async fn snapshot(&self) -> Result<Option<Value>, StoreError> {
        self.read_json(CacheKey::ResultSnapshot).await
    }

    pub async fn save_snapshot(
        &self,
        search_id: Option<u64>,
        response: &SearchResponse,
    ) -> Result<(), StoreError> {
        self.write_json(CacheKey::ResultSnapshot, response, search_id).await
    }

    // ------------------------------------------------------------------
    // Request context
    // ------------------------------------------------------------------

    pub async fn trip_type(&self) -> Result<Option<TripType>, StoreError> {
        self.read_json(CacheKey::TripType).await
    }

    pub async fn set_trip_type(&self, trip_type: TripType) -> Result<(), StoreError> {
        self.write_json(CacheKey::TripType, &trip_type, None).await
    }

    pub async fn last_passengers(&self) -> Result<Option<PassengerCounts>, StoreError> {
        self.read_json(CacheKey::LastPassengers).await
    }

    pub async fn set_last_passengers(&self, passengers: &PassengerCounts) -> Result<(), StoreError> {
        self.write_json(CacheKey::LastPassengers, passengers, None).await
    }

    // ------------------------------------------------------------------
    // Progressive reveal marker
    // ------------------------------------------------------------------

    pub async fn reveal_applied_for(&self) -> Result<Option<u64>, StoreError> {
        self.read_json(CacheKey::RevealAppliedFor).await
    }

    pub async fn mark_reveal_applied(&self, search_id: u64) -> Result<(), StoreError> {
        self.write_json(CacheKey::RevealAppliedFor, &search_id, Some(search_id)).await
    }

    /// Drop everything except the search counter, which must stay monotonic
    /// across clears so stale orchestrators keep seeing themselves superseded.
    pub async fn clear(&self) -> Result<(), StoreError> {
        for key in CacheKey::ALL.into_iter().filter(|k| *k != CacheKey::SearchId) {
            self.backend.remove(key).await?;
        }
        self.notifier.publish(None, None);
        Ok(())
    }

    async fn read_json<T: DeserializeOwned>(&self, key: CacheKey) -> Result<Option<T>, StoreError> {
        let Some(raw) = self.backend.get(key).await? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!("Ignoring malformed session entry {}: {}", key.as_str(), e);
                Ok(None)
            }
        }
    }

    async fn write_json<T: Serialize + ?Sized>(
        &self,
        key: CacheKey,
        value: &T,
        search_id: Option<u64>,
    ) -> Result<(), StoreError> {
        let json = serde_json::to_string(value)?;
        self.backend.set(key, json).await?;
        self.notifier.publish(Some(key), search_id);
        Ok(())
    }
}
