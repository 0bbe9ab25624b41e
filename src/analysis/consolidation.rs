//! Range contraction ("build-up") detection
//!
//! Compares the mean bar range of the first five bars of the window with the
//! last five. A window whose second half is markedly quieter than its first
//! is consolidating; its high/low bound the zone a breakout must clear.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::helpers::mean;
use crate::{
    params::{reject_unknown, ParamMeta, ParameterizedAnalyzer},
    OHLCVExt, Period, Ratio, Result, OHLCV,
};

/// Bars compared at each end of the window
pub const CONTRACTION_HALF: usize = 5;

/// Bounds and statistics of the examined window
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsolidationZone {
    pub zone_high: f64,
    pub zone_low: f64,
    pub avg_range: f64,
    /// Percent by which the late range shrank versus the early range
    pub contraction: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Consolidation {
    pub is_consolidating: bool,
    /// Present whenever the window had enough bars, consolidating or not
    #[serde(flatten)]
    pub zone: Option<ConsolidationZone>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsolidationDetector {
    /// Window length
    pub periods: Period,
    /// Late range must fall below this fraction of the early range
    pub contraction_threshold: Ratio,
}

impl Default for ConsolidationDetector {
    fn default() -> Self {
        Self {
            periods: Period::new_const(10),
            contraction_threshold: Ratio::new_const(0.7),
        }
    }
}

impl ConsolidationDetector {
    pub fn with_defaults() -> Self {
        Self::default()
    }

    pub fn with_periods(periods: Period) -> Self {
        Self {
            periods,
            ..Self::default()
        }
    }

    /// Not consolidating, with no zone, below `periods` bars.
    pub fn detect<T: OHLCV>(&self, bars: &[T]) -> Consolidation {
        let periods = self.periods.get();
        if bars.len() < periods {
            return Consolidation::default();
        }

        let window = &bars[bars.len() - periods..];
        let ranges: Vec<f64> = window.iter().map(|b| OHLCVExt::range(b)).collect();
        let avg_range = mean(ranges.iter().copied());

        let half = CONTRACTION_HALF.min(ranges.len());
        let first_half = mean(ranges[..half].iter().copied());
        let second_half = mean(ranges[ranges.len() - half..].iter().copied());

        let zone_high = window.iter().map(|b| b.high()).fold(f64::MIN, f64::max);
        let zone_low = window.iter().map(|b| b.low()).fold(f64::MAX, f64::min);
        let contraction = if first_half > 0.0 {
            (1.0 - second_half / first_half) * 100.0
        } else {
            0.0
        };

        Consolidation {
            is_consolidating: second_half < first_half * self.contraction_threshold.get(),
            zone: Some(ConsolidationZone {
                zone_high,
                zone_low,
                avg_range,
                contraction,
            }),
        }
    }
}

/// Detect consolidation over the last `periods` bars (0 is treated as 1).
pub fn detect_consolidation<T: OHLCV>(bars: &[T], periods: usize) -> Consolidation {
    ConsolidationDetector::with_periods(Period::new_const(periods.max(1))).detect(bars)
}

const CONSOLIDATION_PARAMS: [ParamMeta; 2] = [
    ParamMeta::period("periods", 10.0, (6.0, 30.0), "Bars in the examined window"),
    ParamMeta::ratio(
        "contraction_threshold",
        0.7,
        (0.4, 0.9),
        "Late/early range ratio below which the window is a build-up",
    ),
];

impl ParameterizedAnalyzer for ConsolidationDetector {
    fn param_meta() -> &'static [ParamMeta] {
        &CONSOLIDATION_PARAMS
    }

    fn with_params(params: &HashMap<&str, f64>) -> Result<Self> {
        reject_unknown(&CONSOLIDATION_PARAMS, params)?;
        let [periods, threshold] = &CONSOLIDATION_PARAMS;
        Ok(Self {
            periods: periods.period_from(params)?,
            contraction_threshold: threshold.ratio_from(params)?,
        })
    }

    fn analyzer_name() -> &'static str {
        "consolidation"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Candle;

    fn with_ranges(ranges: &[f64]) -> Vec<Candle> {
        ranges
            .iter()
            .enumerate()
            .map(|(i, &r)| Candle::new(i as i64, 1.1, 1.1 + r / 2.0, 1.1 - r / 2.0, 1.1, 100.0))
            .collect()
    }

    #[test]
    fn test_short_series_not_consolidating() {
        let result = detect_consolidation(&with_ranges(&[0.01; 9]), 10);
        assert!(!result.is_consolidating);
        assert!(result.zone.is_none());
    }

    #[test]
    fn test_sixty_percent_contraction() {
        let mut ranges = vec![0.010; 5];
        ranges.extend([0.004; 5]);
        let result = detect_consolidation(&with_ranges(&ranges), 10);
        assert!(result.is_consolidating);

        let zone = result.zone.unwrap();
        assert!((zone.contraction - 60.0).abs() < 1e-9);
        assert!((zone.avg_range - 0.007).abs() < 1e-12);
        assert!((zone.zone_high - 1.105).abs() < 1e-12);
        assert!((zone.zone_low - 1.095).abs() < 1e-12);
    }

    #[test]
    fn test_steady_range_not_consolidating() {
        let result = detect_consolidation(&with_ranges(&[0.01; 12]), 10);
        assert!(!result.is_consolidating);
        assert!(result.zone.unwrap().contraction.abs() < 1e-9);
    }

    #[test]
    fn test_zero_range_guard() {
        let result = detect_consolidation(&with_ranges(&[0.0; 10]), 10);
        assert!(!result.is_consolidating);
        assert_eq!(result.zone.unwrap().contraction, 0.0);
    }

    #[test]
    fn test_only_last_window_counts() {
        // quiet bars far in the past do not matter
        let mut ranges = vec![0.001; 10];
        ranges.extend([0.01; 10]);
        assert!(!detect_consolidation(&with_ranges(&ranges), 10).is_consolidating);
    }

    #[test]
    fn test_with_params() {
        let mut params = HashMap::new();
        params.insert("contraction_threshold", 0.5);
        let detector = ConsolidationDetector::with_params(&params).unwrap();
        assert_eq!(detector.periods.get(), 10);
        assert_eq!(detector.contraction_threshold.get(), 0.5);
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(detect_consolidation(&with_ranges(&[0.01; 10]), 10)).unwrap();
        assert_eq!(json["isConsolidating"], false);
        assert!(json.get("zoneHigh").is_some());
        assert!(json.get("contraction").is_some());
    }
}
