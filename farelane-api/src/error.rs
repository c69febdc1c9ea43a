use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use farelane_search::{SearchError, SelectionError};
use serde_json::json;

#[derive(Debug)]
pub enum AppError {
    ValidationError(String),
    NotFoundError(String),
    ConflictError(String),
    Anyhow(anyhow::Error),
}

impl AppError {
    /// Caller mistakes become 4xx with a readable message, the rest 500.
    pub fn search(err: SearchError) -> Self {
        match err {
            SearchError::Selection(sel) => Self::selection(sel),
            err if err.is_client_error() => AppError::ValidationError(err.user_message()),
            err => AppError::Anyhow(err.into()),
        }
    }

    pub fn selection(err: SelectionError) -> Self {
        match err {
            SelectionError::FlightNotFound(_) => AppError::NotFoundError(err.to_string()),
            SelectionError::OutboundRequired | SelectionError::NotRoundTrip => {
                AppError::ConflictError(err.to_string())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFoundError(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::ConflictError(msg) => (StatusCode::CONFLICT, msg),
            AppError::Anyhow(err) => {
                tracing::error!("Internal Server Error: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self::Anyhow(err.into())
    }
}
