//! Window and distance helpers shared across the analytics and strategies.

use crate::OHLCV;

// ============================================================
// MINIMUM BAR COUNTS
// ============================================================

/// Bars needed before levels are detected
pub const MIN_LEVEL_BARS: usize = 10;
/// Bars needed before patterns are checked
pub const MIN_PATTERN_BARS: usize = 3;
/// Trend and RSI window
pub const TREND_WINDOW: usize = 14;
/// Moving-average and volume window
pub const MA_WINDOW: usize = 20;
/// Bars needed before the first-pullback setup is evaluated
pub const MIN_PULLBACK_BARS: usize = 25;

// ============================================================
// HELPERS
// ============================================================

/// Last `n` bars, or `None` if fewer are available.
#[inline]
pub fn tail<T>(bars: &[T], n: usize) -> Option<&[T]> {
    bars.len().checked_sub(n).map(|start| &bars[start..])
}

/// Arithmetic mean; 0.0 for an empty iterator.
pub fn mean(values: impl IntoIterator<Item = f64>) -> f64 {
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// |a - b| relative to `base`.
#[inline]
pub fn relative_distance(a: f64, b: f64, base: f64) -> f64 {
    (a - b).abs() / base
}

/// Simple moving average of the last `period` closes.
pub fn sma_close<T: OHLCV>(bars: &[T], period: usize) -> Option<f64> {
    if period == 0 {
        return None;
    }
    tail(bars, period).map(|w| w.iter().map(|b| b.close()).sum::<f64>() / period as f64)
}

/// 20-period moving average of closes, `None` below 20 bars.
#[inline]
pub fn ma20<T: OHLCV>(bars: &[T]) -> Option<f64> {
    sma_close(bars, MA_WINDOW)
}
