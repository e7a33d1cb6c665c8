//! # error
//!
//! Centralised HTTP-surface error type.
//!
//! Every handler returns `Result<_, AppError>`.  The `IntoResponse` impl
//! converts these into structured JSON error bodies so the frontend always
//! gets a machine-readable response even on failure.
//!
//! Note what is *not* here: provider failures.  Those are recovered inside
//! the engine layer (empty series / mock substitution) and never cross the
//! store boundary as errors — the store's `error` field carries the only
//! user-visible advisory.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// The request was syntactically correct but semantically invalid
    /// (e.g. an empty search query).
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The requested resource (e.g. a watchlist entry) does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Catch-all for unexpected failures.
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Internal(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Internal error: {err}"),
            ),
        };

        let body = Json(json!({
            "ok":    false,
            "error": message,
        }));

        (status, body).into_response()
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
