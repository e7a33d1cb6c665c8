//! # provider
//!
//! The **QuoteProvider boundary** — the only place Stockdeck talks to the
//! outside world for market data.
//!
//! ## Design Decisions
//!
//! * A trait object (`Arc<dyn QuoteProvider>`) rather than a concrete client,
//!   so the engine and store can be exercised against a scripted stub without
//!   touching any fetch or evaluation code.
//! * The trait surfaces failures as a small closed taxonomy
//!   ([`ProviderError`]).  Callers *never* propagate these upward — the
//!   history fetcher degrades to an empty series and the batch fetcher
//!   substitutes mock data.  Nothing behind this boundary is fatal.

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;

use crate::models::PricePoint;

pub mod alpha_vantage;

pub use alpha_vantage::AlphaVantageClient;

// ─── ProviderError ────────────────────────────────────────────────────────────

/// Everything that can go wrong talking to the quote provider.
///
/// All four kinds are recovered locally by the callers; the variant only
/// matters for logging and for the provider's own classification logic.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Network or body-read failure before a payload could be inspected.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The provider reported throttling (Alpha Vantage sends a `"Note"`).
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// The provider does not recognise the symbol.
    #[error("invalid symbol: {0}")]
    InvalidSymbol(String),

    /// The response parsed as JSON but did not have the expected shape.
    #[error("malformed payload: {0}")]
    MalformedPayload(String),
}

// ─── ProviderQuote ────────────────────────────────────────────────────────────

/// The raw quote the provider echoes back for one symbol.
///
/// Deliberately narrower than [`crate::models::Stock`]: the batch quote
/// endpoint does not carry market cap or 52-week levels, so the fetcher
/// defaults those to zero when mapping.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProviderQuote {
    pub symbol: String,
    pub price: f64,
    pub change: f64,
    pub change_percent: f64,
    pub volume: u64,
}

// ─── QuoteProvider ────────────────────────────────────────────────────────────

/// Upstream market-data capability consumed by the engine layer.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Fetch the current quote for one symbol.
    async fn get_quote(&self, symbol: &str) -> Result<ProviderQuote, ProviderError>;

    /// Fetch the daily close series for one symbol.
    ///
    /// Wire order is **newest-first** (provider convention); callers that need
    /// chronological order must sort.  Duplicate dates are possible and must
    /// be deduplicated by the caller.
    async fn get_daily_series(&self, symbol: &str) -> Result<Vec<PricePoint>, ProviderError>;
}

/// Convenience alias — the form the provider is injected in everywhere.
pub type SharedProvider = Arc<dyn QuoteProvider>;

// ─── Test Stub ────────────────────────────────────────────────────────────────
