pub mod app_config;
pub mod backend;
pub mod events;
pub mod redis_repo;
pub mod session;

use std::sync::Arc;

pub use backend::{MemoryBackend, SessionBackend};
pub use events::ChangeNotifier;
pub use redis_repo::RedisSessionBackend;
pub use session::SessionStore;

use app_config::{SessionBackendKind, SessionConfig};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Session backend error: {0}")]
    Backend(String),
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Build the session store selected in configuration.
pub async fn open_session_store(
    config: &SessionConfig,
    session_id: &str,
) -> Result<SessionStore, StoreError> {
    match config.backend {
        SessionBackendKind::Memory => Ok(SessionStore::in_memory()),
        SessionBackendKind::Redis => {
            let url = config.redis_url.as_deref().ok_or_else(|| {
                StoreError::Backend("session.redis_url is required for the redis backend".into())
            })?;
            let backend =
                RedisSessionBackend::new(url, &config.namespace, session_id, config.ttl_seconds).await?;
            Ok(SessionStore::new(Arc::new(backend)))
        }
    }
}
