//! # routes::watchlist
//!
//! Axum route handlers for the **watchlist**.
//!
//! ## Endpoints
//!
//! | Method | Path                     | Description                          |
//! |--------|--------------------------|--------------------------------------|
//! | GET    | `/api/watchlist`         | Current watchlist                    |
//! | POST   | `/api/watchlist`         | Track a stock (idempotent)           |
//! | DELETE | `/api/watchlist/:symbol` | Stop tracking a symbol               |
//! | POST   | `/api/watchlist/refresh` | Re-fetch quotes for tracked symbols  |

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use tracing::info;

use crate::{error::AppError, models::Stock, state::SharedState};

// ─── GET /api/watchlist ───────────────────────────────────────────────────────

pub async fn get_watchlist(State(state): State<SharedState>) -> impl IntoResponse {
    let snap = state.snapshot().await;
    Json(json!({
        "ok":        true,
        "count":     snap.watchlist.len(),
        "watchlist": snap.watchlist,
    }))
}

// ─── POST /api/watchlist ──────────────────────────────────────────────────────

/// Track a stock.  Adding an already-tracked symbol is a no-op `200`;
/// a fresh add answers `201`.
pub async fn add_stock(
    State(state): State<SharedState>,
    Json(stock): Json<Stock>,
) -> Result<impl IntoResponse, AppError> {
    if stock.symbol.trim().is_empty() {
        return Err(AppError::BadRequest("stock symbol is empty".into()));
    }

    let symbol = stock.symbol.clone();
    let added = state.add_to_watchlist(stock).await;

    if added {
        info!(symbol = %symbol, "Watchlist add");
    }

    let status = if added {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((
        status,
        Json(json!({
            "ok":     true,
            "symbol": symbol,
            "added":  added,
        })),
    ))
}

// ─── DELETE /api/watchlist/:symbol ────────────────────────────────────────────

pub async fn remove_stock(
    State(state): State<SharedState>,
    Path(symbol): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let symbol = symbol.trim().to_uppercase();

    if !state.remove_from_watchlist(&symbol).await {
        return Err(AppError::NotFound(format!("{symbol} is not tracked")));
    }

    info!(symbol = %symbol, "Watchlist remove");
    Ok(Json(json!({
        "ok":     true,
        "symbol": symbol,
    })))
}

// ─── POST /api/watchlist/refresh ──────────────────────────────────────────────

/// Single-shot refresh — the same operation the periodic task runs.
pub async fn refresh_watchlist(State(state): State<SharedState>) -> impl IntoResponse {
    state.refresh_watchlist().await;
    let snap = state.snapshot().await;

    Json(json!({
        "ok":        true,
        "watchlist": snap.watchlist,
        "error":     snap.error,
    }))
}
