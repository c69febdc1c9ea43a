use async_trait::async_trait;
use farelane_shared::CacheKey;
use redis::AsyncCommands;
use tracing::info;

use crate::backend::SessionBackend;
use crate::StoreError;

/// Session entries kept in one Redis hash, `{namespace}:session:{id}`.
/// Every write pushes the expiry out again, so the hash lives as long as
/// the browsing session keeps touching it.
#[derive(Clone)]
pub struct RedisSessionBackend {
    client: redis::Client,
    hash_key: String,
    ttl_seconds: u64,
}

impl RedisSessionBackend {
    pub async fn new(
        connection_string: &str,
        namespace: &str,
        session_id: &str,
        ttl_seconds: u64,
    ) -> Result<Self, StoreError> {
        let client = redis::Client::open(connection_string)?;
        let hash_key = format!("{}:session:{}", namespace, session_id);
        info!("Session cache backed by Redis hash {}", hash_key);
        Ok(Self { client, hash_key, ttl_seconds })
    }
}

#[async_trait]
impl SessionBackend for RedisSessionBackend {
    async fn get(&self, key: CacheKey) -> Result<Option<String>, StoreError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let value: Option<String> = conn.hget(&self.hash_key, key.as_str()).await?;
        Ok(value)
    }

    async fn set(&self, key: CacheKey, value: String) -> Result<(), StoreError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let _: () = redis::pipe()
            .atomic()
            .hset(&self.hash_key, key.as_str(), value)
            .ignore()
            .expire(&self.hash_key, self.ttl_seconds as i64)
            .ignore()
            .query_async(&mut conn)
            .await?;
        Ok(())
    }

    async fn remove(&self, key: CacheKey) -> Result<(), StoreError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.hdel::<_, _, ()>(&self.hash_key, key.as_str()).await?;
        Ok(())
    }
}
