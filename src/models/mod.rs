//! Domain models shared across the entire Stockdeck system.

pub mod series;
pub mod stock;

pub use series::{MovingAveragePoint, PricePoint, TrendLabel};
pub use stock::Stock;
