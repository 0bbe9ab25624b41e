//! Relative volume and VWAP over the last 20 bars

use serde::{Deserialize, Serialize};

use super::helpers::{tail, MA_WINDOW};
use crate::{OHLCVExt, OHLCV};

/// Ratio above which volume is "high"
pub const HIGH_VOLUME_RATIO: f64 = 1.5;
/// Ratio below which volume is "low"
pub const LOW_VOLUME_RATIO: f64 = 0.5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VolumeTrend {
    High,
    Low,
    #[default]
    Normal,
}

impl VolumeTrend {
    pub fn from_ratio(ratio: f64) -> Self {
        if ratio > HIGH_VOLUME_RATIO {
            VolumeTrend::High
        } else if ratio < LOW_VOLUME_RATIO {
            VolumeTrend::Low
        } else {
            VolumeTrend::Normal
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeProfile {
    pub trend: VolumeTrend,
    pub vwap: f64,
    /// Latest volume over the window average
    pub volume_ratio: f64,
    pub avg_volume: f64,
}

impl Default for VolumeProfile {
    fn default() -> Self {
        Self {
            trend: VolumeTrend::Normal,
            vwap: 0.0,
            volume_ratio: 1.0,
            avg_volume: 0.0,
        }
    }
}

/// Defaults to normal / VWAP 0 / ratio 1 below 20 bars, and also when the
/// window traded no volume at all.
pub fn analyze_volume<T: OHLCV>(bars: &[T]) -> VolumeProfile {
    let Some(window) = tail(bars, MA_WINDOW) else {
        return VolumeProfile::default();
    };

    let (sum_pv, sum_v) = window.iter().fold((0.0, 0.0), |(pv, v), bar| {
        (pv + bar.typical_price() * bar.volume(), v + bar.volume())
    });
    if sum_v <= 0.0 {
        return VolumeProfile::default();
    }

    let avg_volume = sum_v / MA_WINDOW as f64;
    let volume_ratio = window[window.len() - 1].volume() / avg_volume;

    VolumeProfile {
        trend: VolumeTrend::from_ratio(volume_ratio),
        vwap: sum_pv / sum_v,
        volume_ratio,
        avg_volume,
    }
}
