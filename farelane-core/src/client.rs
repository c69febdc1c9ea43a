use async_trait::async_trait;
use serde_json::Value;

use crate::search::SearchRequest;

/// The flight-search backend, seen from the engine.
#[async_trait]
pub trait FlightSearchClient: Send + Sync {
    /// Run one search and hand back the raw payload, untouched.
    async fn search(&self, request: &SearchRequest) -> Result<Value, TransportError>;
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Request failed: {0}")]
    Request(String),
    #[error("Backend responded with status {0}")]
    Status(u16),
    #[error("Response body could not be decoded: {0}")]
    Decode(String),
    #[error("Request timed out")]
    Timeout,
    #[error("Request was cancelled")]
    Cancelled,
}

impl TransportError {
    pub fn user_message(&self) -> String {
        crate::GENERIC_TRANSPORT_ERROR.to_string()
    }
}
