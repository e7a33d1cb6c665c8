//! # events
//!
//! Defines [`WsEvent`] — every event the store broadcasts to subscribed
//! Presenter clients over the WebSocket monitor stream.
//!
//! Events travel through a `tokio::sync::broadcast::Sender<String>` as
//! pre-serialized JSON, which keeps the channel free of Clone constraints on
//! the payload types.

use serde::Serialize;

use crate::models::TrendLabel;

/// Everything a dashboard client receives in real time.
///
/// Events carry summaries, not full payloads — a client that cares about the
/// data re-reads the relevant REST snapshot, which is the single source of
/// truth.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WsEvent {
    /// `search_results` was fully replaced.
    SearchUpdated {
        count: usize,
        /// True when any result is a mock substitution.
        degraded: bool,
    },

    /// The single-slot analytics fields were replaced for `symbol`.
    /// `trend` is `None` when the series came back empty and the slots were
    /// cleared instead.
    AnalyticsUpdated {
        symbol: String,
        points: usize,
        trend: Option<TrendLabel>,
    },

    /// The watchlist changed (add / remove / refresh merge).
    WatchlistChanged {
        symbols: Vec<String>,
    },

    /// Local price jitter tick was applied to all held quotes.
    PricesTicked,
}

impl WsEvent {
    /// Serialize for the broadcast channel.
    #[inline]
    pub fn to_json(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|_| r#"{"event":"SERIALIZATION_ERROR"}"#.to_string())
    }
}
