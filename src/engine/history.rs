//! # engine::history
//!
//! **HistoricalSeriesFetcher** — retrieves a symbol's daily close series and
//! normalizes it for the analytics engine.
//!
//! This function *never fails*.  Every provider error kind (transport,
//! rate-limit, invalid symbol, malformed payload) degrades to an empty series;
//! callers must treat "empty" as "no analytics possible", not as a
//! distinguishable error code.

use std::collections::BTreeMap;

use tracing::warn;

use crate::models::PricePoint;
use crate::provider::SharedProvider;

/// Fetch the daily series for `symbol`, oldest → newest.
///
/// The provider delivers newest-first and may repeat a date key; this fetcher
/// deduplicates by date (last value wins) and inverts to chronological order —
/// the ordering every downstream analytics function requires.
pub async fn fetch_daily_history(provider: &SharedProvider, symbol: &str) -> Vec<PricePoint> {
    let raw = match provider.get_daily_series(symbol).await {
        Ok(points) => points,
        Err(err) => {
            warn!(symbol, error = %err, "Daily series unavailable — returning empty series");
            return Vec::new();
        }
    };

    // BTreeMap keyed by date handles dedup and ascending order in one pass.
    let by_date: BTreeMap<_, _> = raw.into_iter().map(|p| (p.date, p.close)).collect();

    by_date
        .into_iter()
        .map(|(date, close)| PricePoint { date, close })
        .collect()
}

// ─── Tests ────────────────────────────────────────────────────────────────────
