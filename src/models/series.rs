//! # models::series
//!
//! Historical-series and analytics types: [`PricePoint`],
//! [`MovingAveragePoint`] and [`TrendLabel`].
//!
//! Every series flowing through the analytics engine is **oldest → newest**
//! with strictly increasing dates — the history fetcher is responsible for
//! establishing that ordering, everything downstream relies on it.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ─── PricePoint ───────────────────────────────────────────────────────────────

/// One daily closing price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Calendar date of this close (serialized ISO `YYYY-MM-DD`).
    pub date: NaiveDate,
    /// Closing price.  Positive for any real series.
    pub close: f64,
}

// ─── MovingAveragePoint ───────────────────────────────────────────────────────

/// One moving-average sample.
///
/// `date` is the date of the *last* point in its window, so the moving-average
/// series lines up with the tail of the price series when charted together.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MovingAveragePoint {
    pub date: NaiveDate,
    /// Arithmetic mean of the window's closes, rounded to 2 fraction digits.
    pub average: f64,
}

// ─── TrendLabel ───────────────────────────────────────────────────────────────

/// Coarse classification of price direction over a series.
///
/// Derived data — recomputed from scratch on every new series, never stored
/// independently of the series it was computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendLabel {
    #[serde(rename = "uptrend")]
    Uptrend,
    #[serde(rename = "downtrend")]
    Downtrend,
    #[serde(rename = "sideways")]
    Sideways,
    /// The series is too short for the requested comparison period.
    #[serde(rename = "insufficient data")]
    InsufficientData,
}

impl std::fmt::Display for TrendLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TrendLabel::Uptrend => "uptrend",
            TrendLabel::Downtrend => "downtrend",
            TrendLabel::Sideways => "sideways",
            TrendLabel::InsufficientData => "insufficient data",
        };
        write!(f, "{s}")
    }
}
