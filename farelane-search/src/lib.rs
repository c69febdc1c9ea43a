pub mod buckets;
pub mod clock;
pub mod controller;
pub mod month;
pub mod reveal;
pub mod selection;

pub use buckets::{group_by_month, MonthBucket};
pub use clock::{Clock, ManualClock, SystemClock};
pub use controller::{ResultsConfig, ResultsController, ResultsView};
pub use month::{MonthRunState, MonthSearchConfig, MonthSearchOrchestrator, MonthSearchOutcome, MonthSearchRequest};
pub use reveal::{ProgressiveReveal, RevealConfig, RevealPhase};
pub use selection::{RoundTripSelection, SelectionError};

use farelane_core::CoreError;
use farelane_store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("Invalid month {month}/{year}")]
    InvalidMonth { year: i32, month: u32 },
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error(transparent)]
    Selection(#[from] SelectionError),
    #[error("Session store error: {0}")]
    Store(#[from] StoreError),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Month search task failed: {0}")]
    Task(String),
}

impl SearchError {
    pub fn user_message(&self) -> String {
        match self {
            SearchError::InvalidMonth { .. } => "Please pick a valid month.".to_string(),
            SearchError::Core(err) => err.user_message(),
            SearchError::Selection(err) => err.to_string(),
            SearchError::Store(_) | SearchError::Serialization(_) | SearchError::Task(_) => {
                farelane_core::GENERIC_READ_ERROR.to_string()
            }
        }
    }

    /// Errors caused by the caller's input rather than by the system.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            SearchError::InvalidMonth { .. }
                | SearchError::Selection(_)
                | SearchError::Core(CoreError::ValidationError(_))
        )
    }
}

pub type SearchResult<T> = Result<T, SearchError>;
