//! # engine::fetcher
//!
//! **ResilientQuoteFetcher** — fetches a batch of quotes, substituting a
//! synthetic record per symbol whenever the provider fails, and reporting
//! whether the batch as a whole is running in degraded mode.
//!
//! ## Design Decisions
//!
//! * Per-symbol calls are issued **concurrently** (`join_all`), but the result
//!   vector always matches the input order — the Presenter renders rows in
//!   the order the user typed them.
//! * Fallback is *per symbol*: one bad symbol never loses data for the rest
//!   of the batch.
//! * `degraded` is true whenever at least one substitution happened,
//!   regardless of the failure kind.  The flag tells the user "some of what
//!   you see is synthetic"; the transport/malformed distinction only matters
//!   in the logs.

use chrono::Utc;
use futures_util::future::join_all;
use tracing::{debug, warn};

use crate::models::Stock;
use crate::provider::{ProviderQuote, SharedProvider};

use super::mock;

/// Result of one batch fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchQuotes {
    /// One `Stock` per requested symbol, in input order.
    pub stocks: Vec<Stock>,
    /// True when any entry is a mock substitution.
    pub degraded: bool,
}

/// Map a well-formed provider quote into a `Stock`.
///
/// The batch quote endpoint does not carry market cap or 52-week levels —
/// those default to 0 and only the mock path fills them in.
fn stock_from_quote(quote: ProviderQuote) -> Stock {
    Stock {
        name: quote.symbol.clone(), // provider echoes no name on this path
        symbol: quote.symbol,
        price: quote.price,
        change: quote.change,
        change_percent: quote.change_percent,
        volume: quote.volume,
        market_cap: 0,
        high_52_week: 0.0,
        low_52_week: 0.0,
        last_update: Utc::now(),
    }
}

/// Fetch quotes for every symbol in `symbols`, in order.
pub async fn fetch_batch(provider: &SharedProvider, symbols: &[String]) -> BatchQuotes {
    let lookups = symbols.iter().map(|symbol| async move {
        match provider.get_quote(symbol).await {
            Ok(quote) => {
                debug!(symbol = %quote.symbol, price = quote.price, "Live quote");
                (stock_from_quote(quote), false)
            }
            Err(err) => {
                warn!(symbol = %symbol, error = %err, "Quote failed — substituting mock data");
                (mock::generate(symbol, mock::known_name(symbol)), true)
            }
        }
    });

    // join_all preserves input order regardless of completion order.
    let mut stocks = Vec::with_capacity(symbols.len());
    let mut degraded = false;
    for (stock, substituted) in join_all(lookups).await {
        degraded |= substituted;
        stocks.push(stock);
    }

    BatchQuotes { stocks, degraded }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
