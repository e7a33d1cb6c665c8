//! # state
//!
//! The **WatchlistStore** — the single source of truth every route handler,
//! periodic task and Presenter snapshot reads from.
//!
//! ## Design Decisions
//!
//! * `Arc<AppState>` is cloned cheaply into every Axum handler via
//!   `axum::extract::State`; there is no ambient global — all mutation goes
//!   through the named operations below.
//! * All replaceable fields live behind **one** `tokio::sync::RwLock` so each
//!   operation's writes land atomically between suspension points.
//! * Overlapping `search` calls are resolved with a monotonic request id:
//!   a completion that is no longer the newest search discards its result
//!   instead of racing last-write-wins on the shared fields.
//! * Analytics fields are a **single slot**: they hold the most recently
//!   requested symbol only and are fully replaced (or cleared) on every
//!   history fetch.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use rand::Rng;
use serde::Serialize;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info, warn};

use crate::engine::analytics::{detect_trend, moving_average, MA_WINDOW, TREND_PERIOD};
use crate::engine::fetcher::fetch_batch;
use crate::engine::history::fetch_daily_history;
use crate::events::WsEvent;
use crate::models::{MovingAveragePoint, PricePoint, Stock, TrendLabel};
use crate::persist;
use crate::provider::SharedProvider;

/// The only user-visible failure state in the whole system.
pub const DEGRADED_ADVISORY: &str = "API failed or rate limit hit — showing mock data.";

// ─── Store fields ─────────────────────────────────────────────────────────────

/// The replaceable store fields, snapshotted as one unit for the Presenter.
///
/// `watchlist` is the only field a persistence collaborator durably stores;
/// everything else is ephemeral or derived and must never be persisted.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreFields {
    /// Most recent search, fully replaced per search, unique by symbol.
    pub search_results: Vec<Stock>,

    /// Tracked stocks, keyed by symbol, insertion order preserved.
    /// Entries change only via add / remove / refresh-merge — never pruned.
    pub watchlist: Vec<Stock>,

    /// Single-slot analytics for the most recently charted symbol.
    pub historical_data: Vec<PricePoint>,
    pub moving_averages: Vec<MovingAveragePoint>,
    pub trend: Option<TrendLabel>,

    pub is_loading: bool,
    /// Degraded-mode advisory, or `None` when all data is live.
    pub error: Option<String>,
}

// ─── AppState ─────────────────────────────────────────────────────────────────

/// Top-level shared state injected into every Axum handler and task.
pub struct AppState {
    /// The upstream quote capability.  Injected so tests run against a stub.
    pub provider: SharedProvider,

    /// All replaceable store fields.
    store: RwLock<StoreFields>,

    /// Monotonic id of the newest `search` call; stale completions bail out.
    search_epoch: AtomicU64,

    /// Broadcast channel feeding the WebSocket monitor stream.
    /// Payloads are pre-serialized `WsEvent` JSON.
    pub broadcast_tx: broadcast::Sender<String>,

    /// Where the watchlist snapshot lives; `None` disables persistence.
    watchlist_path: Option<PathBuf>,

    // ── Metrics ───────────────────────────────────────────────────────────────
    pub search_count: AtomicU64,
    pub refresh_count: AtomicU64,
}

/// Convenience type alias so callers can write `SharedState`.
pub type SharedState = Arc<AppState>;

/// Construct the shared store ready for injection into the Axum router.
pub fn build_state(provider: SharedProvider, watchlist_path: Option<PathBuf>) -> SharedState {
    Arc::new(AppState::new(provider, watchlist_path))
}

impl AppState {
    pub fn new(provider: SharedProvider, watchlist_path: Option<PathBuf>) -> Self {
        let (broadcast_tx, _) = broadcast::channel(256);

        Self {
            provider,
            store: RwLock::new(StoreFields::default()),
            search_epoch: AtomicU64::new(0),
            broadcast_tx,
            watchlist_path,
            search_count: AtomicU64::new(0),
            refresh_count: AtomicU64::new(0),
        }
    }

    /// Broadcast an event to all WebSocket subscribers.
    /// Safe with zero listeners (headless mode).
    pub fn broadcast(&self, event: &WsEvent) {
        // Err only means no receivers are subscribed right now.
        let _ = self.broadcast_tx.send(event.to_json());
    }

    /// Read-only copy of every store field for the Presenter.
    pub async fn snapshot(&self) -> StoreFields {
        self.store.read().await.clone()
    }

    // ── search ────────────────────────────────────────────────────────────────

    /// Split a raw query on commas into trimmed, uppercased, deduplicated
    /// symbols, preserving first-occurrence order.
    pub fn parse_query(query: &str) -> Vec<String> {
        let mut symbols: Vec<String> = Vec::new();
        for part in query.split(',') {
            let symbol = part.trim().to_uppercase();
            if !symbol.is_empty() && !symbols.contains(&symbol) {
                symbols.push(symbol);
            }
        }
        symbols
    }

    /// Fetch quotes for a comma-separated query and replace `search_results`.
    ///
    /// Sets the degraded-mode advisory in `error` when any result is a mock
    /// substitution.  If a newer search starts while this one is in flight,
    /// this one's result is discarded on completion.
    pub async fn search(&self, query: &str) {
        let symbols = Self::parse_query(query);
        let epoch = self.search_epoch.fetch_add(1, Ordering::SeqCst) + 1;
        self.search_count.fetch_add(1, Ordering::Relaxed);

        {
            let mut store = self.store.write().await;
            store.is_loading = true;
            store.error = None;
        }

        let batch = fetch_batch(&self.provider, &symbols).await;

        if self.search_epoch.load(Ordering::SeqCst) != epoch {
            debug!(query, "Search superseded — discarding stale result");
            return;
        }

        let count = batch.stocks.len();
        {
            let mut store = self.store.write().await;
            store.is_loading = false;
            store.error = batch.degraded.then(|| DEGRADED_ADVISORY.to_string());
            store.search_results = batch.stocks;
        }

        info!(query, count, degraded = batch.degraded, "Search results replaced");
        self.broadcast(&WsEvent::SearchUpdated {
            count,
            degraded: batch.degraded,
        });
    }

    // ── history / analytics ───────────────────────────────────────────────────

    /// Fetch the daily series for `symbol` and recompute the analytics slot.
    ///
    /// An empty series *clears* the slot rather than leaving stale data from
    /// a previously charted symbol.
    pub async fn fetch_history(&self, symbol: &str) {
        let symbol = symbol.trim().to_uppercase();

        {
            let mut store = self.store.write().await;
            store.is_loading = true;
            store.error = None;
        }

        let series = fetch_daily_history(&self.provider, &symbol).await;

        let (points, trend) = {
            let mut store = self.store.write().await;
            store.is_loading = false;

            if series.is_empty() {
                store.historical_data.clear();
                store.moving_averages.clear();
                store.trend = None;
                (0, None)
            } else {
                let averages = moving_average(&series, MA_WINDOW);
                let trend = detect_trend(&series, TREND_PERIOD);
                let points = series.len();

                store.historical_data = series;
                store.moving_averages = averages;
                store.trend = Some(trend);
                (points, Some(trend))
            }
        };

        info!(symbol = %symbol, points, trend = ?trend, "Analytics slot replaced");
        self.broadcast(&WsEvent::AnalyticsUpdated {
            symbol,
            points,
            trend,
        });
    }

    // ── watchlist ─────────────────────────────────────────────────────────────

    /// Append `stock` unless its symbol is already tracked.  Idempotent.
    /// Returns whether the watchlist changed.
    ///
    /// The symbol is normalized to its uppercase form first, so a client that
    /// POSTs `"aapl"` ends up with the same key `DELETE /api/watchlist/AAPL`
    /// targets.
    pub async fn add_to_watchlist(&self, mut stock: Stock) -> bool {
        stock.symbol = stock.symbol.trim().to_uppercase();
        let symbols = {
            let mut store = self.store.write().await;
            if store.watchlist.iter().any(|s| s.symbol == stock.symbol) {
                return false;
            }
            store.watchlist.push(stock);
            watched_symbols(&store.watchlist)
        };

        self.after_watchlist_change(symbols).await;
        true
    }

    /// Remove the entry for `symbol`.  No-op when absent.
    /// Returns whether the watchlist changed.
    pub async fn remove_from_watchlist(&self, symbol: &str) -> bool {
        let symbols = {
            let mut store = self.store.write().await;
            let before = store.watchlist.len();
            store.watchlist.retain(|s| s.symbol != symbol);
            if store.watchlist.len() == before {
                return false;
            }
            watched_symbols(&store.watchlist)
        };

        self.after_watchlist_change(symbols).await;
        true
    }

    /// Re-fetch quotes for every tracked symbol as one batch and merge fresh
    /// data back per symbol.  No-op when the watchlist is empty.
    pub async fn refresh_watchlist(&self) {
        let symbols = {
            let store = self.store.read().await;
            watched_symbols(&store.watchlist)
        };
        if symbols.is_empty() {
            return;
        }
        self.refresh_count.fetch_add(1, Ordering::Relaxed);

        let batch = fetch_batch(&self.provider, &symbols).await;

        let merged = {
            let mut store = self.store.write().await;
            merge_fresh_quotes(&mut store.watchlist, batch.stocks);
            // A fully-live refresh clears any earlier advisory; a degraded one
            // (re)sets it.  The flag always reflects the newest fetch.
            store.error = batch.degraded.then(|| DEGRADED_ADVISORY.to_string());
            watched_symbols(&store.watchlist)
        };

        debug!(count = merged.len(), degraded = batch.degraded, "Watchlist refreshed");
        self.after_watchlist_change(merged).await;
    }

    /// Restore a persisted watchlist snapshot at startup.
    pub async fn restore_watchlist(&self, entries: Vec<Stock>) {
        let mut store = self.store.write().await;
        store.watchlist = entries;
    }

    /// Broadcast the change and save the snapshot (save-on-change contract).
    async fn after_watchlist_change(&self, symbols: Vec<String>) {
        self.broadcast(&WsEvent::WatchlistChanged {
            symbols: symbols.clone(),
        });

        if let Some(path) = &self.watchlist_path {
            let watchlist = {
                let store = self.store.read().await;
                store.watchlist.clone()
            };
            if let Err(err) = persist::save_watchlist(path, &watchlist).await {
                // Persistence is advisory — never fatal.
                warn!(path = %path.display(), error = %err, "Watchlist snapshot save failed");
            }
        }
    }

    // ── jitter ────────────────────────────────────────────────────────────────

    /// Apply small random perturbations to every held quote — a local
    /// simulation of live ticking, not derived from any provider call.
    pub async fn jitter_prices(&self) {
        {
            let mut store = self.store.write().await;
            let mut rng = rand::thread_rng();

            let StoreFields {
                search_results,
                watchlist,
                ..
            } = &mut *store;

            for stock in search_results.iter_mut().chain(watchlist.iter_mut()) {
                stock.price += rng.gen_range(-1.0..1.0);
                stock.change += rng.gen_range(-0.25..0.25);
                stock.last_update = Utc::now();
            }
        }

        self.broadcast(&WsEvent::PricesTicked);
    }
}

// ─── Merge helpers ────────────────────────────────────────────────────────────

fn watched_symbols(watchlist: &[Stock]) -> Vec<String> {
    watchlist.iter().map(|s| s.symbol.clone()).collect()
}

/// Merge freshly fetched quotes into the watchlist in place.
///
/// Entries are updated per symbol; tracked symbols the refetch omitted are
/// retained unchanged — a partial result never drops an entry.
fn merge_fresh_quotes(watchlist: &mut [Stock], fresh: Vec<Stock>) {
    for quote in fresh {
        if let Some(entry) = watchlist.iter_mut().find(|s| s.symbol == quote.symbol) {
            *entry = quote;
        }
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::mock;
    use crate::provider::stub::{make_quote, StubProvider};
    use crate::provider::ProviderError;
    use chrono::NaiveDate;

    fn make_state(stub: StubProvider) -> SharedState {
        build_state(stub.shared(), None)
    }

    fn make_stock(symbol: &str, price: f64) -> Stock {
        let mut stock = mock::generate(symbol, mock::known_name(symbol));
        stock.price = price;
        stock
    }

    fn make_series(closes: &[f64]) -> Vec<PricePoint> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PricePoint {
                date: start + chrono::Days::new(i as u64),
                close,
            })
            .collect()
    }

    #[test]
    fn test_parse_query_normalizes() {
        assert_eq!(
            AppState::parse_query(" aapl, msft ,AAPL,, nvda"),
            vec!["AAPL", "MSFT", "NVDA"]
        );
        assert!(AppState::parse_query("  ,  ,").is_empty());
    }

    #[tokio::test]
    async fn test_search_replaces_results() {
        let state = make_state(
            StubProvider::new()
                .with_quote("AAPL", make_quote("AAPL", 182.31))
                .with_quote("MSFT", make_quote("MSFT", 415.50)),
        );

        state.search("aapl,msft").await;
        let snap = state.snapshot().await;

        assert_eq!(snap.search_results.len(), 2);
        assert_eq!(snap.search_results[0].symbol, "AAPL");
        assert!(snap.error.is_none());
        assert!(!snap.is_loading);

        // A second search fully replaces, never appends.
        state.search("msft").await;
        let snap = state.snapshot().await;
        assert_eq!(snap.search_results.len(), 1);
        assert_eq!(snap.search_results[0].symbol, "MSFT");
    }

    #[tokio::test]
    async fn test_search_degraded_sets_advisory() {
        let state = make_state(
            StubProvider::new()
                .with_quote("AAPL", make_quote("AAPL", 182.31))
                .with_failure("BADSYM", || ProviderError::InvalidSymbol("BADSYM".into())),
        );

        state.search("AAPL,BADSYM").await;
        let snap = state.snapshot().await;

        assert_eq!(snap.search_results.len(), 2);
        assert_eq!(snap.search_results[1].symbol, "BADSYM");
        assert_eq!(snap.error.as_deref(), Some(DEGRADED_ADVISORY));
    }

    #[tokio::test]
    async fn test_stale_search_discarded() {
        let state = make_state(
            StubProvider::new()
                .with_slow_quote("SLOW", make_quote("SLOW", 1.0), 80)
                .with_quote("FAST", make_quote("FAST", 2.0)),
        );

        let slow = {
            let state = Arc::clone(&state);
            tokio::spawn(async move { state.search("SLOW").await })
        };
        // Let the slow search take its epoch and start its fetch first.
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;

        state.search("FAST").await;
        slow.await.unwrap();

        // The superseded result must not have overwritten the newer one.
        let snap = state.snapshot().await;
        assert_eq!(snap.search_results.len(), 1);
        assert_eq!(snap.search_results[0].symbol, "FAST");
    }

    #[tokio::test]
    async fn test_fetch_history_sets_analytics_slot() {
        let closes: Vec<f64> = (0..25).map(|i| 100.0 + i as f64 * 2.0).collect();
        let state = make_state(StubProvider::new().with_series("AAPL", make_series(&closes)));

        state.fetch_history("aapl").await;
        let snap = state.snapshot().await;

        assert_eq!(snap.historical_data.len(), 25);
        assert_eq!(snap.moving_averages.len(), 25 - MA_WINDOW + 1);
        assert_eq!(snap.trend, Some(TrendLabel::Uptrend));
    }

    #[tokio::test]
    async fn test_fetch_history_empty_clears_slot() {
        let closes: Vec<f64> = (0..25).map(|i| 100.0 + i as f64).collect();
        let state = make_state(
            StubProvider::new()
                .with_series("AAPL", make_series(&closes))
                .with_failure("MSFT", || ProviderError::RateLimited("throttled".into())),
        );

        state.fetch_history("AAPL").await;
        assert!(state.snapshot().await.trend.is_some());

        // Failed fetch clears the slot instead of leaving AAPL's data behind.
        state.fetch_history("MSFT").await;
        let snap = state.snapshot().await;
        assert!(snap.historical_data.is_empty());
        assert!(snap.moving_averages.is_empty());
        assert!(snap.trend.is_none());
    }

    #[tokio::test]
    async fn test_add_to_watchlist_is_idempotent() {
        let state = make_state(StubProvider::new());

        assert!(state.add_to_watchlist(make_stock("AAPL", 180.0)).await);
        assert!(!state.add_to_watchlist(make_stock("AAPL", 999.0)).await);

        let snap = state.snapshot().await;
        assert_eq!(snap.watchlist.len(), 1);
        // The duplicate add changed nothing.
        assert_eq!(snap.watchlist[0].price, 180.0);
    }

    #[tokio::test]
    async fn test_add_normalizes_symbol_for_removal() {
        let state = make_state(StubProvider::new());

        // A client may POST a lowercase symbol; the stored key must still be
        // the uppercase form the DELETE route targets.
        assert!(state.add_to_watchlist(make_stock(" aapl ", 180.0)).await);
        assert_eq!(state.snapshot().await.watchlist[0].symbol, "AAPL");

        assert!(!state.add_to_watchlist(make_stock("AAPL", 999.0)).await);
        assert!(state.remove_from_watchlist("AAPL").await);
        assert!(state.snapshot().await.watchlist.is_empty());
    }

    #[tokio::test]
    async fn test_remove_from_watchlist() {
        let state = make_state(StubProvider::new());
        state.add_to_watchlist(make_stock("AAPL", 180.0)).await;
        state.add_to_watchlist(make_stock("MSFT", 410.0)).await;

        assert!(state.remove_from_watchlist("AAPL").await);
        assert!(!state.remove_from_watchlist("AAPL").await);

        let snap = state.snapshot().await;
        assert_eq!(snap.watchlist.len(), 1);
        assert_eq!(snap.watchlist[0].symbol, "MSFT");
    }

    #[test]
    fn test_partial_refresh_retains_omitted_entries() {
        let mut watchlist = vec![
            make_stock("AAPL", 180.0),
            make_stock("MSFT", 410.0),
            make_stock("NVDA", 890.0),
        ];

        // Refetch came back with only two of the three tracked symbols.
        merge_fresh_quotes(
            &mut watchlist,
            vec![make_stock("AAPL", 181.5), make_stock("NVDA", 901.0)],
        );

        assert_eq!(watchlist.len(), 3);
        assert_eq!(watchlist[0].price, 181.5);
        assert_eq!(watchlist[1].price, 410.0); // retained unchanged
        assert_eq!(watchlist[2].price, 901.0);
    }

    #[tokio::test]
    async fn test_refresh_watchlist_updates_in_place() {
        let state = make_state(
            StubProvider::new()
                .with_quote("AAPL", make_quote("AAPL", 200.0))
                .with_quote("MSFT", make_quote("MSFT", 420.0)),
        );
        state.add_to_watchlist(make_stock("AAPL", 180.0)).await;
        state.add_to_watchlist(make_stock("MSFT", 410.0)).await;

        state.refresh_watchlist().await;
        let snap = state.snapshot().await;

        assert_eq!(snap.watchlist.len(), 2);
        assert_eq!(snap.watchlist[0].price, 200.0);
        assert_eq!(snap.watchlist[1].price, 420.0);
        // Insertion order survives the merge.
        assert_eq!(snap.watchlist[0].symbol, "AAPL");
    }

    #[tokio::test]
    async fn test_live_refresh_clears_degraded_advisory() {
        let state = make_state(
            StubProvider::new()
                .with_quote("AAPL", make_quote("AAPL", 200.0))
                .with_failure("BADSYM", || ProviderError::RateLimited("throttled".into())),
        );
        state.add_to_watchlist(make_stock("AAPL", 180.0)).await;

        // A degraded search leaves the advisory behind...
        state.search("AAPL,BADSYM").await;
        assert_eq!(
            state.snapshot().await.error.as_deref(),
            Some(DEGRADED_ADVISORY)
        );

        // ...and the next fully-live refresh clears it again.
        state.refresh_watchlist().await;
        assert!(state.snapshot().await.error.is_none());
    }

    #[tokio::test]
    async fn test_refresh_empty_watchlist_is_noop() {
        let state = make_state(StubProvider::new());
        state.refresh_watchlist().await;
        assert_eq!(state.refresh_count.load(Ordering::Relaxed), 0);
    }

    #[tokio::test]
    async fn test_jitter_perturbs_within_bounds() {
        let state = make_state(StubProvider::new());
        state.add_to_watchlist(make_stock("AAPL", 180.0)).await;

        state.jitter_prices().await;
        let snap = state.snapshot().await;

        let price = snap.watchlist[0].price;
        assert!(price > 179.0 && price < 181.0);
    }
}
