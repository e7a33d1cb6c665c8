//! # routes::stocks
//!
//! Axum route handlers for **search and chart data**.
//!
//! ## Endpoints
//!
//! | Method | Path                          | Description                              |
//! |--------|-------------------------------|------------------------------------------|
//! | GET    | `/api/stocks/search?q=A,B`    | Batch quote search (mock fallback)       |
//! | GET    | `/api/stocks/:symbol/history` | Daily series + moving average + trend    |

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::{error::AppError, state::SharedState};

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    /// Comma-separated ticker symbols, case-insensitive.
    pub q: String,
}

// ─── GET /api/stocks/search ───────────────────────────────────────────────────

/// Run a batch quote search and return the resulting store snapshot.
///
/// Never fails on provider trouble — degraded batches come back `200` with
/// mock substitutions and the advisory in `error`.
pub async fn search_stocks(
    State(state): State<SharedState>,
    Query(params): Query<SearchParams>,
) -> Result<impl IntoResponse, AppError> {
    if params.q.trim().is_empty() {
        return Err(AppError::BadRequest("query parameter `q` is empty".into()));
    }

    state.search(&params.q).await;
    let snap = state.snapshot().await;

    Ok(Json(json!({
        "ok":      true,
        "results": snap.search_results,
        "error":   snap.error,
    })))
}

// ─── GET /api/stocks/:symbol/history ──────────────────────────────────────────

/// Fetch the daily series for one symbol and recompute the analytics slot.
///
/// An empty payload (`historicalData: []`, `trend: null`) means "no analytics
/// possible" — the provider failed or the symbol has no series.  That is not
/// an error status.
pub async fn stock_history(
    State(state): State<SharedState>,
    Path(symbol): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    if symbol.trim().is_empty() {
        return Err(AppError::BadRequest("symbol is empty".into()));
    }

    state.fetch_history(&symbol).await;
    let snap = state.snapshot().await;

    Ok(Json(json!({
        "ok":             true,
        "symbol":         symbol.trim().to_uppercase(),
        "historicalData": snap.historical_data,
        "movingAverages": snap.moving_averages,
        "trend":          snap.trend,
    })))
}
