use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    /// Missing or malformed input. Nothing has been read or written.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The source content or source user does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Writing opportunities failed; no partial result is reported.
    #[error("Persistence error: {0}")]
    Persistence(anyhow::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AppError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            AppError::NotFound(what) => (
                StatusCode::NOT_FOUND,
                json!({ "error": "Not found", "details": format!("{what} not found") }),
            ),
            AppError::Persistence(e) => {
                tracing::error!("Persistence error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({
                        "error": "Internal server error",
                        "details": format!("Failed to persist opportunities: {e}")
                    }),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal server error", "details": e.to_string() }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
