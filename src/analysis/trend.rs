//! Trend classification from higher-high / higher-low structure

use serde::{Deserialize, Serialize};

use super::helpers::{tail, TREND_WINDOW};
use crate::{Trend, OHLCV};

/// Score a side must beat to call a trend
pub const TREND_SCORE_THRESHOLD: f64 = 0.6;
/// Strength reported for a neutral reading
pub const NEUTRAL_TREND_STRENGTH: u8 = 50;
/// Strength attached to an externally supplied trend
pub const OVERRIDE_TREND_STRENGTH: u8 = 80;

/// Trend call with its strength (0..=100)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendReading {
    pub trend: Trend,
    pub strength: u8,
}

impl Default for TrendReading {
    fn default() -> Self {
        Self {
            trend: Trend::Neutral,
            strength: NEUTRAL_TREND_STRENGTH,
        }
    }
}

impl TrendReading {
    /// Reading for a trend supplied by an external indicator feed.
    pub fn external(trend: Trend) -> Self {
        Self {
            trend,
            strength: OVERRIDE_TREND_STRENGTH,
        }
    }
}

/// Classify the last 14 bars.
///
/// Each consecutive pair counts as a higher or lower high and, separately,
/// a higher or lower low. Equal values count as lower. Defaults to
/// neutral / 50 below 14 bars.
pub fn detect_trend<T: OHLCV>(bars: &[T]) -> TrendReading {
    let Some(window) = tail(bars, TREND_WINDOW) else {
        return TrendReading::default();
    };

    let (higher_highs, higher_lows) = window.windows(2).fold((0u32, 0u32), |(hh, hl), pair| {
        (
            hh + u32::from(pair[1].high() > pair[0].high()),
            hl + u32::from(pair[1].low() > pair[0].low()),
        )
    });

    let steps = (window.len() - 1) as u32;
    let lower_highs = steps - higher_highs;
    let lower_lows = steps - higher_lows;
    let total = f64::from(steps * 2);

    let bullish_score = f64::from(higher_highs + higher_lows) / total;
    let bearish_score = f64::from(lower_highs + lower_lows) / total;

    if bullish_score > TREND_SCORE_THRESHOLD {
        TrendReading {
            trend: Trend::Bullish,
            strength: (bullish_score * 100.0).round() as u8,
        }
    } else if bearish_score > TREND_SCORE_THRESHOLD {
        TrendReading {
            trend: Trend::Bearish,
            strength: (bearish_score * 100.0).round() as u8,
        }
    } else {
        TrendReading::default()
    }
}
