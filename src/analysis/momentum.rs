//! Simplified RSI and rate of change over the last 14 closes
//!
//! Gains and losses are summed over the 13 deltas of the window and divided
//! by 14. This is not Wilder's smoothing. When there are no losses RS is
//! pinned to 100, so RSI tops out just above 99 and never reaches 100.

use serde::{Deserialize, Serialize};

use super::helpers::{tail, TREND_WINDOW};
use crate::OHLCV;

/// Divisor applied to summed gains and losses
pub const RSI_DIVISOR: f64 = 14.0;
/// RS used when the window has no losses
pub const RS_CEILING: f64 = 100.0;

/// RSI bucket
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MomentumBias {
    Overbought,
    Oversold,
    Bullish,
    Bearish,
    #[default]
    Neutral,
}

impl MomentumBias {
    /// Full bucketing: >70 overbought, <30 oversold, >55 bullish, <45 bearish.
    pub fn from_rsi(rsi: f64) -> Self {
        match rsi {
            r if r > 70.0 => MomentumBias::Overbought,
            r if r < 30.0 => MomentumBias::Oversold,
            r if r > 55.0 => MomentumBias::Bullish,
            r if r < 45.0 => MomentumBias::Bearish,
            _ => MomentumBias::Neutral,
        }
    }

    /// Extremes only, used for externally supplied RSI values.
    pub fn extremes_only(rsi: f64) -> Self {
        match rsi {
            r if r > 70.0 => MomentumBias::Overbought,
            r if r < 30.0 => MomentumBias::Oversold,
            _ => MomentumBias::Neutral,
        }
    }
}

/// RSI, rate of change (percent) and bucket
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Momentum {
    pub rsi: f64,
    /// Rate of change over the window, in percent
    pub momentum: f64,
    pub strength: MomentumBias,
}

impl Default for Momentum {
    fn default() -> Self {
        Self {
            rsi: 50.0,
            momentum: 0.0,
            strength: MomentumBias::Neutral,
        }
    }
}

impl Momentum {
    /// Momentum for an RSI supplied by an external indicator feed.
    pub fn external(rsi: f64) -> Self {
        Self {
            rsi,
            momentum: 0.0,
            strength: MomentumBias::extremes_only(rsi),
        }
    }
}

/// Largest RSI value reported, the double just below 100
#[inline]
fn rsi_ceiling() -> f64 {
    f64::from_bits(100f64.to_bits() - 1)
}

/// Defaults to RSI 50, ROC 0, neutral below 14 bars.
pub fn compute_momentum<T: OHLCV>(bars: &[T]) -> Momentum {
    let Some(window) = tail(bars, TREND_WINDOW) else {
        return Momentum::default();
    };

    let (gains, losses) = window.windows(2).fold((0.0, 0.0), |(g, l), pair| {
        let diff = pair[1].close() - pair[0].close();
        if diff > 0.0 {
            (g + diff, l)
        } else {
            (g, l - diff)
        }
    });

    let avg_gain = gains / RSI_DIVISOR;
    let avg_loss = losses / RSI_DIVISOR;
    let rs = if avg_loss == 0.0 {
        RS_CEILING
    } else {
        avg_gain / avg_loss
    };
    // A vanishing loss sum can round the quotient to exactly 100
    let rsi = (100.0 - 100.0 / (1.0 + rs)).min(rsi_ceiling());

    let first = window[0].close();
    let last = window[window.len() - 1].close();
    let momentum = if first != 0.0 {
        (last - first) / first * 100.0
    } else {
        0.0
    };

    Momentum {
        rsi,
        momentum,
        strength: MomentumBias::from_rsi(rsi),
    }
}
