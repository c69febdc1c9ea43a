use async_trait::async_trait;
use farelane_shared::CacheKey;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::StoreError;

/// Raw key-value storage behind the session store. Values are opaque
/// strings; every write replaces the whole entry.
#[async_trait]
pub trait SessionBackend: Send + Sync {
    async fn get(&self, key: CacheKey) -> Result<Option<String>, StoreError>;

    async fn set(&self, key: CacheKey, value: String) -> Result<(), StoreError>;

    async fn remove(&self, key: CacheKey) -> Result<(), StoreError>;
}

/// Process-local backend; lives exactly as long as the session it serves.
#[derive(Default)]
pub struct MemoryBackend {
    entries: RwLock<HashMap<CacheKey, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an entry without going through the store, e.g. to simulate a
    /// value left behind by an older build.
    pub async fn insert_raw(&self, key: CacheKey, value: &str) {
        self.entries.write().await.insert(key, value.to_string());
    }
}

#[async_trait]
impl SessionBackend for MemoryBackend {
    async fn get(&self, key: CacheKey) -> Result<Option<String>, StoreError> {
        Ok(self.entries.read().await.get(&key).cloned())
    }

    async fn set(&self, key: CacheKey, value: String) -> Result<(), StoreError> {
        self.entries.write().await.insert(key, value);
        Ok(())
    }

    async fn remove(&self, key: CacheKey) -> Result<(), StoreError> {
        self.entries.write().await.remove(&key);
        Ok(())
    }
}
