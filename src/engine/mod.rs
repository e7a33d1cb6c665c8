//! The engine layer: pure analytics plus the two resilient fetch paths.
//!
//! Nothing in here returns a hard failure to its caller — provider errors
//! degrade to empty series or synthetic substitutions.

pub mod analytics;
pub mod fetcher;
pub mod history;
pub mod mock;

/// Round to 2 fraction digits.  Every decimal the engine emits is stored
/// pre-rounded so serialized output is stable across runs.
#[inline]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
