pub mod client;
pub mod filter;
pub mod normalizer;
pub mod passengers;
pub mod search;

pub use client::{FlightSearchClient, TransportError};
pub use filter::{filter_and_sort, FilterCriteria, SortKey};
pub use normalizer::{normalize, NormalizeError, Normalizer, ShapeDetector};
pub use passengers::reconcile;
pub use search::{SearchRequest, SortOrder};

pub const GENERIC_READ_ERROR: &str = "Search results could not be read. Please try again.";
pub const GENERIC_BACKEND_ERROR: &str = "The flight search service reported an error.";
pub const GENERIC_TRANSPORT_ERROR: &str =
    "We could not reach the flight search service. Please try again.";

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    ValidationError(String),
    #[error(transparent)]
    Normalize(#[from] NormalizeError),
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl CoreError {
    /// Text safe to show to the traveller.
    pub fn user_message(&self) -> String {
        match self {
            CoreError::ValidationError(msg) => msg.clone(),
            CoreError::Normalize(err) => err.user_message(),
            CoreError::Transport(err) => err.user_message(),
        }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
