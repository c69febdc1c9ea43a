use serde::{Deserialize, Serialize};

/// Fixed set of entries held in the session cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheKey {
    LastSearchResult,
    TripType,
    LastPassengers,
    SearchStartedAt,
    SearchId,
    RevealAppliedFor,
    ResultSnapshot,
}

impl CacheKey {
    pub const ALL: [CacheKey; 7] = [
        CacheKey::LastSearchResult,
        CacheKey::TripType,
        CacheKey::LastPassengers,
        CacheKey::SearchStartedAt,
        CacheKey::SearchId,
        CacheKey::RevealAppliedFor,
        CacheKey::ResultSnapshot,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CacheKey::LastSearchResult => "last_search_result",
            CacheKey::TripType => "trip_type",
            CacheKey::LastPassengers => "last_passengers",
            CacheKey::SearchStartedAt => "search_started_at",
            CacheKey::SearchId => "search_id",
            CacheKey::RevealAppliedFor => "reveal_applied_for",
            CacheKey::ResultSnapshot => "result_snapshot",
        }
    }
}
