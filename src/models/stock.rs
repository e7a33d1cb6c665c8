//! # models::stock
//!
//! Defines [`Stock`] — the quote record everything in the store revolves
//! around.  A `Stock` is either mapped from a live provider quote or produced
//! synthetically by the mock generator when the provider fails; the two are
//! indistinguishable by shape (by design — the Presenter always has something
//! renderable).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A point-in-time price/volume snapshot for one ticker.
///
/// Serialized camelCase — this is the exact JSON contract the dashboard
/// frontend consumes, so field names are part of the wire format.
///
/// Invariants:
/// * `symbol` is the unique key (uppercase ticker) within any collection.
/// * `change` and `change_percent` always agree in sign.
/// * `low_52_week <= price <= high_52_week` is a *display assumption* only —
///   real or mock data may violate it transiently and nothing enforces it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stock {
    /// Uppercase ticker symbol, e.g. `"AAPL"`.
    pub symbol: String,

    /// Company name, or the symbol itself when no name is known.
    pub name: String,

    /// Last traded price.
    pub price: f64,

    /// Absolute price change since previous close.
    pub change: f64,

    /// Relative price change since previous close, in percent.
    pub change_percent: f64,

    /// Daily traded volume.
    pub volume: u64,

    /// Market capitalisation.  `0` on the batch-search path — only the
    /// single-symbol detail path (and the mock generator) fills this in.
    pub market_cap: u64,

    /// 52-week high.  `0.0` when the provider path does not supply it.
    #[serde(rename = "high52Week")]
    pub high_52_week: f64,

    /// 52-week low.  `0.0` when the provider path does not supply it.
    #[serde(rename = "low52Week")]
    pub low_52_week: f64,

    /// UTC timestamp of the last update to this record.
    pub last_update: DateTime<Utc>,
}
