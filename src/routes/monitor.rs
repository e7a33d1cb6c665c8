//! # routes::monitor
//!
//! Health check and the **WebSocket event stream** the dashboard subscribes
//! to (observer pattern: every store field replacement publishes an event so
//! the UI re-renders).
//!
//! ## Endpoints
//!
//! | Method   | Path          | Description                          |
//! |----------|---------------|--------------------------------------|
//! | GET      | `/api/health` | Liveness + operation counters        |
//! | GET (WS) | `/ws/monitor` | Real-time store-change event stream  |

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
    Json,
};
use futures_util::{SinkExt, StreamExt};
use serde_json::json;
use std::sync::atomic::Ordering;
use tracing::{debug, info};

use crate::state::SharedState;

// ─── GET /api/health ──────────────────────────────────────────────────────────

pub async fn health_check(State(state): State<SharedState>) -> impl IntoResponse {
    let snap = state.snapshot().await;

    Json(json!({
        "ok":              true,
        "search_count":    state.search_count.load(Ordering::Relaxed),
        "refresh_count":   state.refresh_count.load(Ordering::Relaxed),
        "watchlist_size":  snap.watchlist.len(),
        "degraded":        snap.error.is_some(),
    }))
}

// ─── WebSocket Handler ────────────────────────────────────────────────────────

/// Upgrade HTTP → WebSocket and subscribe to the store's broadcast channel.
///
/// Every `WsEvent` arrives as a JSON text frame; on connect the client first
/// receives a full store snapshot so it can render without a REST round trip.
pub async fn ws_monitor(
    ws: WebSocketUpgrade,
    State(state): State<SharedState>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: SharedState) {
    let mut rx = state.broadcast_tx.subscribe();
    let (mut sender, mut receiver) = socket.split();

    info!("WebSocket client connected");

    // ── Send the current snapshot immediately on connect ─────────────────────
    let snapshot = {
        let snap = state.snapshot().await;
        json!({
            "event": "SNAPSHOT",
            "store": snap,
        })
        .to_string()
    };

    if sender.send(Message::Text(snapshot.into())).await.is_err() {
        return; // Client closed before the snapshot went out.
    }

    // ── Event Loop ────────────────────────────────────────────────────────────
    loop {
        tokio::select! {
            // Store event → forward to the client.
            result = rx.recv() => {
                match result {
                    Ok(json_str) => {
                        if sender.send(Message::Text(json_str.into())).await.is_err() {
                            break; // Client disconnected.
                        }
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                        // Slow reader — some events were skipped.
                        debug!("WS client lagged, skipped {n} events");
                    }
                    Err(_) => break, // Channel closed.
                }
            }

            // Client frames (Ping / Close).
            result = receiver.next() => {
                match result {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(Message::Ping(data))) => {
                        let _ = sender.send(Message::Pong(data)).await;
                    }
                    _ => {} // Text/Binary from client — ignored.
                }
            }
        }
    }

    info!("WebSocket client disconnected");
}
