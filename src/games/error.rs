use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

/// Failures surfaced by the game repository. The transport mapping keeps
/// `NotFound` and `Validation` distinct; a store failure is never retried
/// here, it surfaces straight to the caller.
#[derive(Debug, Error)]
pub enum GameError {
    #[error("{0}")]
    Validation(String),
    /// Covers both "never existed" and "belongs to someone else"; the two
    /// are intentionally indistinguishable to the caller.
    #[error("Game not found")]
    NotFound,
    #[error("store unavailable: {0}")]
    Store(#[from] sqlx::Error),
}

impl IntoResponse for GameError {
    fn into_response(self) -> Response {
        let status = match &self {
            GameError::Validation(_) => StatusCode::BAD_REQUEST,
            GameError::NotFound => StatusCode::NOT_FOUND,
            GameError::Store(e) => {
                error!(error = %e, "game store failure");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, self.to_string()).into_response()
    }
}
