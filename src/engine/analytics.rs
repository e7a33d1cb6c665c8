//! # engine::analytics
//!
//! **TrendAnalytics** — pure functions over an ordered daily price series:
//! sliding-window moving average and two-window trend classification.
//!
//! Both functions assume the input series is oldest → newest (the history
//! fetcher guarantees this) and are deterministic: identical series produce
//! bit-identical output, which the reproducibility tests rely on.

use crate::models::{MovingAveragePoint, PricePoint, TrendLabel};

use super::round2;

// ─── Policy constants ─────────────────────────────────────────────────────────

/// Moving-average window the store uses for chart overlays.
pub const MA_WINDOW: usize = 5;

/// Number of closes averaged at each end of the series for trend detection.
pub const TREND_PERIOD: usize = 10;

/// Percent delta between the early and late window averages beyond which a
/// series stops counting as sideways.
pub const TREND_THRESHOLD_PCT: f64 = 2.0;

// ─── Moving average ───────────────────────────────────────────────────────────

/// Slide a window of exactly `window` points across `series` and emit the
/// arithmetic mean of each window, dated at the window's last point.
///
/// Returns exactly `len − window + 1` points, or an empty vec when the series
/// is shorter than the window (that is a normal condition, not an error).
/// Averages are rounded to 2 fraction digits.
pub fn moving_average(series: &[PricePoint], window: usize) -> Vec<MovingAveragePoint> {
    if window == 0 || series.len() < window {
        return Vec::new();
    }

    let mut averages = Vec::with_capacity(series.len() - window + 1);

    // Running sum: seed with the first window, then slide by one point.
    let mut sum: f64 = series[..window].iter().map(|p| p.close).sum();
    averages.push(MovingAveragePoint {
        date: series[window - 1].date,
        average: round2(sum / window as f64),
    });

    for i in window..series.len() {
        sum += series[i].close - series[i - window].close;
        averages.push(MovingAveragePoint {
            date: series[i].date,
            average: round2(sum / window as f64),
        });
    }

    averages
}

// ─── Trend detection ──────────────────────────────────────────────────────────

/// Classify the series direction by comparing the mean of the first `period`
/// closes against the mean of the last `period` closes.
///
/// Requires `len ≥ 2 × period` — at exactly `2 × period` the two windows are
/// disjoint; beyond that they are positional and may overlap, which is fine.
/// Shorter series classify as [`TrendLabel::InsufficientData`].
pub fn detect_trend(series: &[PricePoint], period: usize) -> TrendLabel {
    if period == 0 || series.len() < period * 2 {
        return TrendLabel::InsufficientData;
    }

    let start_avg: f64 =
        series[..period].iter().map(|p| p.close).sum::<f64>() / period as f64;
    let end_avg: f64 = series[series.len() - period..]
        .iter()
        .map(|p| p.close)
        .sum::<f64>()
        / period as f64;

    let diff_percent = (end_avg - start_avg) / start_avg * 100.0;

    if diff_percent > TREND_THRESHOLD_PCT {
        TrendLabel::Uptrend
    } else if diff_percent < -TREND_THRESHOLD_PCT {
        TrendLabel::Downtrend
    } else {
        TrendLabel::Sideways
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn make_series(closes: &[f64]) -> Vec<PricePoint> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PricePoint {
                date: start + chrono::Days::new(i as u64),
                close,
            })
            .collect()
    }

    #[test]
    fn test_moving_average_point_count() {
        let series = make_series(&[10.0, 12.0, 11.0, 13.0, 14.0]);
        assert_eq!(moving_average(&series, 3).len(), 3);
        assert_eq!(moving_average(&series, 5).len(), 1);
        // Window larger than the series → empty, never an error.
        assert_eq!(moving_average(&series, 6).len(), 0);
        assert_eq!(moving_average(&series, 0).len(), 0);
    }

    #[test]
    fn test_moving_average_values_and_dates() {
        let series = make_series(&[10.0, 12.0, 11.0, 13.0, 14.0]);
        let ma = moving_average(&series, 3);

        assert_eq!(ma[0].average, 11.0);
        assert_eq!(ma[1].average, 12.0);
        assert_eq!(ma[2].average, 12.67); // 38 / 3 rounded

        // Each point dated at its window's last point.
        assert_eq!(ma[0].date, series[2].date);
        assert_eq!(ma[2].date, series[4].date);
    }

    #[test]
    fn test_moving_average_is_deterministic() {
        let series = make_series(&[101.5, 99.25, 103.75, 98.0, 104.5, 102.25, 100.0]);
        assert_eq!(moving_average(&series, 4), moving_average(&series, 4));
    }

    #[test]
    fn test_trend_insufficient_data() {
        let series = make_series(&[100.0; 19]);
        assert_eq!(detect_trend(&series, 10), TrendLabel::InsufficientData);
        assert_eq!(detect_trend(&[], 10), TrendLabel::InsufficientData);
        assert_eq!(detect_trend(&series, 0), TrendLabel::InsufficientData);
    }

    #[test]
    fn test_trend_flat_is_sideways() {
        let series = make_series(&[100.0; 20]);
        assert_eq!(detect_trend(&series, 10), TrendLabel::Sideways);
    }

    #[test]
    fn test_trend_rising_is_uptrend() {
        // 100 → 130 linearly over 20 points.
        let closes: Vec<f64> = (0..20).map(|i| 100.0 + i as f64 * 30.0 / 19.0).collect();
        let series = make_series(&closes);
        assert_eq!(detect_trend(&series, 5), TrendLabel::Uptrend);
    }

    #[test]
    fn test_trend_falling_is_downtrend() {
        let closes: Vec<f64> = (0..20).map(|i| 130.0 - i as f64 * 30.0 / 19.0).collect();
        let series = make_series(&closes);
        assert_eq!(detect_trend(&series, 5), TrendLabel::Downtrend);
    }

    #[test]
    fn test_trend_threshold_is_exclusive() {
        // Exactly +2% between window means stays sideways; just above flips.
        let mut closes = vec![100.0; 10];
        closes.extend(vec![102.0; 10]);
        assert_eq!(detect_trend(&make_series(&closes), 10), TrendLabel::Sideways);

        let mut closes = vec![100.0; 10];
        closes.extend(vec![102.1; 10]);
        assert_eq!(detect_trend(&make_series(&closes), 10), TrendLabel::Uptrend);
    }
}
