//! # engine::mock
//!
//! **MockStockGenerator** — produces a synthetic but internally-consistent
//! [`Stock`] for a symbol.  This is the bottom of every fallback path: when
//! the provider is unreachable, rate-limited or returns junk, the batch
//! fetcher substitutes one of these per symbol so the Presenter always has a
//! renderable record.
//!
//! Deterministic *shape*, non-deterministic *values*.  Always succeeds.

use chrono::Utc;
use rand::Rng;

use crate::models::Stock;

use super::round2;

/// Company names for the tickers the dashboard ships with.  Symbols outside
/// this table fall back to the symbol itself as the display name.
const KNOWN_NAMES: &[(&str, &str)] = &[
    ("AAPL", "Apple Inc."),
    ("GOOGL", "Alphabet Inc."),
    ("MSFT", "Microsoft Corporation"),
    ("TSLA", "Tesla Inc."),
    ("AMZN", "Amazon.com Inc."),
    ("META", "Meta Platforms Inc."),
    ("NVDA", "NVIDIA Corporation"),
    ("NFLX", "Netflix Inc."),
    ("AMD", "Advanced Micro Devices"),
    ("UBER", "Uber Technologies"),
    ("SPOT", "Spotify Technology"),
    ("COIN", "Coinbase Global"),
    ("SQ", "Block Inc."),
    ("PYPL", "PayPal Holdings"),
    ("ZOOM", "Zoom Video Communications"),
];

/// Look up the display name for `symbol`, falling back to the symbol itself.
pub fn known_name(symbol: &str) -> &str {
    KNOWN_NAMES
        .iter()
        .find(|(sym, _)| *sym == symbol)
        .map(|(_, name)| *name)
        .unwrap_or(symbol)
}

/// Generate a synthetic quote record for `symbol`.
///
/// Value ranges:
/// * price          — uniform `[50, 550)`
/// * change         — uniform `[-10, 10)`; `change_percent` derived from it,
///   so the two always agree in sign
/// * volume         — integer `[1_000_000, 11_000_000)`
/// * market cap     — integer `[10e9, 1.01e12)`
/// * 52-week high   — `price × (1 + u)`, `u ∈ [0, 0.5)`
/// * 52-week low    — `price × (1 − u)`, `u ∈ [0, 0.3)`
pub fn generate(symbol: &str, name: &str) -> Stock {
    let mut rng = rand::thread_rng();

    let base_price: f64 = rng.gen_range(50.0..550.0);
    let change: f64 = rng.gen_range(-10.0..10.0);
    let change_percent = change / base_price * 100.0;

    Stock {
        symbol: symbol.to_string(),
        name: name.to_string(),
        price: round2(base_price),
        change: round2(change),
        change_percent: round2(change_percent),
        volume: rng.gen_range(1_000_000..11_000_000),
        market_cap: rng.gen_range(10_000_000_000..1_010_000_000_000),
        high_52_week: round2(base_price * (1.0 + rng.gen_range(0.0..0.5))),
        low_52_week: round2(base_price * (1.0 - rng.gen_range(0.0..0.3))),
        last_update: Utc::now(),
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
