use super::session::CacheKey;

/// Published on every session cache write so listeners in the same process
/// can re-read without polling.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
pub struct SessionChangedEvent {
    pub key: Option<CacheKey>, // None when the whole session was cleared
    pub search_id: Option<u64>,
    pub timestamp: i64,
}

impl SessionChangedEvent {
    pub fn touches(&self, key: CacheKey) -> bool {
        self.key.map_or(true, |k| k == key)
    }
}
