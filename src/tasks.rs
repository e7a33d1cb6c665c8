//! # tasks
//!
//! The two periodic loops: watchlist auto-refresh and local price jitter.
//!
//! The store itself only exposes single-shot operations — all scheduling
//! lives here, and every loop is a **cancellable repeating task**: the owner
//! holds a [`TaskHandle`] and calls `stop()` when it tears down, so a timer
//! can never fire against a disposed store.

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::state::SharedState;

// ─── TaskHandle ───────────────────────────────────────────────────────────────

/// Handle to one running periodic task.
pub struct TaskHandle {
    name: &'static str,
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl TaskHandle {
    /// Signal the loop to exit and wait for it to finish.
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        let _ = self.handle.await;
        info!(task = self.name, "Periodic task stopped");
    }
}

fn spawn_periodic<F, Fut>(name: &'static str, period: Duration, tick: F) -> TaskHandle
where
    F: Fn() -> Fut + Send + 'static,
    Fut: std::future::Future<Output = ()> + Send,
{
    let (shutdown, mut shutdown_rx) = watch::channel(false);

    let handle = tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        // The first tick of a tokio interval fires immediately; skip it so a
        // freshly started server doesn't refresh before anyone has searched.
        interval.tick().await;

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    debug!(task = name, "Periodic tick");
                    tick().await;
                }
                _ = shutdown_rx.changed() => break,
            }
        }
    });

    info!(task = name, period = ?period, "Periodic task started");
    TaskHandle {
        name,
        shutdown,
        handle,
    }
}

// ─── The two loops ────────────────────────────────────────────────────────────

/// Re-fetch quotes for every tracked symbol, every `period`.
pub fn spawn_watchlist_refresh(state: SharedState, period: Duration) -> TaskHandle {
    spawn_periodic("watchlist-refresh", period, move || {
        let state = state.clone();
        async move { state.refresh_watchlist().await }
    })
}

/// Apply local price jitter to all held quotes, every `period`.
pub fn spawn_price_jitter(state: SharedState, period: Duration) -> TaskHandle {
    spawn_periodic("price-jitter", period, move || {
        let state = state.clone();
        async move { state.jitter_prices().await }
    })
}

// ─── Tests ────────────────────────────────────────────────────────────────────
