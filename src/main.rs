//! # Stockdeck — Resilient Stock-Watching Backend
//!
//! ## Architecture Overview
//!
//! ```text
//!  ┌──────────────┐  GET /api/stocks/search      ┌──────────────────────┐
//!  │  Dashboard   │ ────────────────────────────▶│   WatchlistStore     │
//!  │  Frontend    │  GET /api/stocks/:s/history  │   (AppState)         │
//!  └──────────────┘                              │                      │
//!        ▲                                       │  [Engine]            │
//!        │  WS /ws/monitor (store events)        │  fetch_batch ────────┼──▶ QuoteProvider
//!        └───────────────────────────────────────┤  fetch_history ──────┼──▶ (Alpha Vantage)
//!                                                │  analytics (pure)    │
//!  watchlist.json ◀── save-on-change ────────────┤  mock fallback       │
//!                 ──▶ load-on-start              └──────────────────────┘
//!                                                        ▲
//!                       periodic tasks: refresh / jitter ┘
//! ```
//!
//! Provider failures never surface as hard errors: the engine substitutes
//! mock data per symbol and the store carries a single advisory string.
//!
//! ## Environment Variables
//!
//! | Variable                | Default                       | Description                  |
//! |-------------------------|-------------------------------|------------------------------|
//! | `BIND_ADDR`             | `0.0.0.0:3000`                | Address Axum listens on      |
//! | `ALPHA_VANTAGE_API_KEY` | `demo`                        | Quote provider API key       |
//! | `PROVIDER_URL`          | `https://www.alphavantage.co` | Quote provider base URL      |
//! | `REFRESH_INTERVAL_SECS` | `60`                          | Watchlist auto-refresh period|
//! | `JITTER_INTERVAL_SECS`  | `5`                           | Local price-jitter period    |
//! | `WATCHLIST_PATH`        | `watchlist.json`              | Snapshot file (empty = off)  |
//! | `RUST_LOG`              | `stockdeck=info`              | Tracing filter               |

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;
mod engine;
mod error;
mod events;
mod models;
mod persist;
mod provider;
mod routes;
mod state;
mod tasks;

use config::Config;
use provider::{AlphaVantageClient, SharedProvider};
use routes::{
    monitor::{health_check, ws_monitor},
    stocks::{search_stocks, stock_history},
    watchlist::{add_stock, get_watchlist, refresh_watchlist, remove_stock},
};
use state::build_state;

// ─── Entry Point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Load .env (optional — CI/prod can use real env vars) ──────────────
    dotenvy::dotenv().ok();

    // ── 2. Initialise structured logging ─────────────────────────────────────
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env()
            .add_directive("stockdeck=debug".parse()?)
            .add_directive("tower_http=info".parse()?))
        .init();

    info!(
        r#"

  ╔═══════════════════════════════════════════════╗
  ║        STOCKDECK — Watchlist Backend          ║
  ║        Rust + Axum  ·  Quotes & Trends        ║
  ╚═══════════════════════════════════════════════╝"#
    );

    // ── 3. Config, provider, shared state ────────────────────────────────────
    let config = Config::from_env().context("Failed to load config")?;

    let provider: SharedProvider = Arc::new(AlphaVantageClient::new(
        config.api_key.clone(),
        config.provider_url.clone(),
    ));
    let state = build_state(provider, config.watchlist_path.clone());

    // ── 4. Restore the persisted watchlist (load-on-start) ───────────────────
    if let Some(path) = &config.watchlist_path {
        match persist::load_watchlist(path).await {
            Ok(entries) if !entries.is_empty() => state.restore_watchlist(entries).await,
            Ok(_) => {}
            Err(err) => warn!(error = %err, "Watchlist snapshot unreadable — starting empty"),
        }
    }

    // ── 5. Build CORS layer (allow the dashboard dev server) ─────────────────
    let cors = CorsLayer::new()
        .allow_origin(Any)   // Tighten in production!
        .allow_methods(Any)
        .allow_headers(Any);

    // ── 6. Build the Axum router ─────────────────────────────────────────────
    let app = Router::new()
        // ── Search & chart data ──────────────────────────────────────────────
        .route("/api/stocks/search",          get(search_stocks))
        .route("/api/stocks/:symbol/history", get(stock_history))
        // ── Watchlist ────────────────────────────────────────────────────────
        .route("/api/watchlist",              get(get_watchlist))
        .route("/api/watchlist",              post(add_stock))
        .route("/api/watchlist/refresh",      post(refresh_watchlist))
        .route("/api/watchlist/:symbol",      delete(remove_stock))
        // ── Monitoring ───────────────────────────────────────────────────────
        .route("/api/health",                 get(health_check))
        .route("/ws/monitor",                 get(ws_monitor))
        // ── Middleware ───────────────────────────────────────────────────────
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state.clone());

    // ── 7. Start the periodic tasks (stopped again on shutdown) ─────────────
    let refresh_task = tasks::spawn_watchlist_refresh(state.clone(), config.refresh_interval);
    let jitter_task = tasks::spawn_price_jitter(state.clone(), config.jitter_interval);

    // ── 8. Serve ──────────────────────────────────────────────────────────────
    let addr: SocketAddr = config.bind_addr.parse().context("Invalid BIND_ADDR")?;
    info!(?addr, "Stockdeck server starting");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // The owning view is going away — cancel the timers before the store.
    refresh_task.stop().await;
    jitter_task.stop().await;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("Shutdown signal received");
}
