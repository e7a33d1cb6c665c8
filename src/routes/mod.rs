//! Axum route handlers — the Presenter boundary.

pub mod monitor;
pub mod stocks;
pub mod watchlist;
