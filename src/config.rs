//! # config — environment-driven configuration
//!
//! Everything tunable comes from environment variables (a `.env` file is
//! loaded in `main` for development).  Every knob has a default so the server
//! boots with zero configuration — without a real API key the provider's
//! calls fail and the store degrades to mock data, which is exactly the
//! demo experience.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;

/// Complete runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address Axum listens on.
    pub bind_addr: String,
    /// Alpha Vantage API key.  The `demo` key only answers for a few symbols.
    pub api_key: String,
    /// Provider base URL — overridable for pointing at a local fake.
    pub provider_url: String,
    /// Period of the watchlist auto-refresh task.
    pub refresh_interval: Duration,
    /// Period of the local price-jitter task.
    pub jitter_interval: Duration,
    /// Watchlist snapshot location.  Empty string disables persistence.
    pub watchlist_path: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let refresh_secs: u64 = std::env::var("REFRESH_INTERVAL_SECS")
            .unwrap_or_else(|_| "60".to_string())
            .parse()
            .context("REFRESH_INTERVAL_SECS must be a number")?;

        let jitter_secs: u64 = std::env::var("JITTER_INTERVAL_SECS")
            .unwrap_or_else(|_| "5".to_string())
            .parse()
            .context("JITTER_INTERVAL_SECS must be a number")?;

        let watchlist_path = match std::env::var("WATCHLIST_PATH") {
            Ok(p) if p.is_empty() => None,
            Ok(p) => Some(PathBuf::from(p)),
            Err(_) => Some(PathBuf::from("watchlist.json")),
        };

        Ok(Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            api_key: std::env::var("ALPHA_VANTAGE_API_KEY")
                .unwrap_or_else(|_| "demo".to_string()),
            provider_url: std::env::var("PROVIDER_URL")
                .unwrap_or_else(|_| "https://www.alphavantage.co".to_string()),
            refresh_interval: Duration::from_secs(refresh_secs),
            jitter_interval: Duration::from_secs(jitter_secs),
            watchlist_path,
        })
    }
}
