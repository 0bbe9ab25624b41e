//! Support / resistance detection
//!
//! Swing highs become resistance candidates, swing lows support candidates.
//! Candidates are sorted by price and merged into clusters whose members sit
//! within `cluster_tolerance` of the cluster's first (lowest) price. Only the
//! last `max_levels` clusters in ascending price order are kept per side.

use std::collections::HashMap;

use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::helpers::{mean, MIN_LEVEL_BARS};
use crate::{
    params::{reject_unknown, ParamMeta, ParameterizedAnalyzer},
    OHLCVExt, Period, Ratio, Result, OHLCV,
};

/// Base strength of a raw swing point
pub const SWING_BASE_STRENGTH: f64 = 70.0;
/// Width of the strength bonus added on top of the base, `[0, SPAN)`
pub const SWING_STRENGTH_SPAN: f64 = 20.0;
/// Per-member boost applied when a cluster collapses
pub const CLUSTER_MEMBER_BOOST: f64 = 5.0;
/// Cluster strength ceiling
pub const MAX_LEVEL_STRENGTH: f64 = 99.0;
/// Seed used by the default jitter model
pub const DEFAULT_LEVEL_SEED: u64 = 0x5EED_1E7E;

/// A clustered price level
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub price: f64,
    /// 0..=99
    pub strength: f64,
}

/// Detected levels, each side in ascending price order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Levels {
    pub support: Vec<Level>,
    pub resistance: Vec<Level>,
}

impl Levels {
    pub fn is_empty(&self) -> bool {
        self.support.is_empty() && self.resistance.is_empty()
    }
}

/// How a raw swing point is scored before clustering.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StrengthModel {
    /// Base strength plus a uniform bonus drawn from an RNG seeded per call.
    Jitter { seed: u64 },
    /// Base strength plus a bonus that grows with how far the swing stands
    /// out from its neighbours, relative to their mean bar range.
    Prominence,
}

impl Default for StrengthModel {
    fn default() -> Self {
        StrengthModel::Jitter {
            seed: DEFAULT_LEVEL_SEED,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Swing {
    price: f64,
    strength: f64,
}

enum Scorer {
    Jitter(StdRng),
    Prominence,
}

impl Scorer {
    fn new(model: StrengthModel) -> Self {
        match model {
            StrengthModel::Jitter { seed } => Scorer::Jitter(StdRng::seed_from_u64(seed)),
            StrengthModel::Prominence => Scorer::Prominence,
        }
    }

    /// `prominence` is how far the swing clears its nearest neighbour,
    /// `scale` the neighbourhood's mean range.
    fn score(&mut self, prominence: f64, scale: f64) -> f64 {
        let bonus = match self {
            Scorer::Jitter(rng) => rng.gen_range(0.0..SWING_STRENGTH_SPAN),
            Scorer::Prominence => {
                let denom = prominence + scale;
                if denom > 0.0 {
                    SWING_STRENGTH_SPAN * prominence / denom
                } else {
                    0.0
                }
            }
        };
        SWING_BASE_STRENGTH + bonus
    }
}

/// Swing-point support / resistance detector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelDetector {
    /// Neighbours required on each side of a swing point
    pub sensitivity: Period,
    /// Relative distance under which candidates join a cluster
    pub cluster_tolerance: Ratio,
    /// Clusters kept per side (the highest-priced ones)
    pub max_levels: Period,
    pub strength: StrengthModel,
}

impl Default for LevelDetector {
    fn default() -> Self {
        Self {
            sensitivity: Period::new_const(3),
            cluster_tolerance: Ratio::new_const(0.005),
            max_levels: Period::new_const(3),
            strength: StrengthModel::default(),
        }
    }
}

impl LevelDetector {
    pub fn with_defaults() -> Self {
        Self::default()
    }

    pub fn with_sensitivity(sensitivity: Period) -> Self {
        Self {
            sensitivity,
            ..Self::default()
        }
    }

    pub fn with_strength(mut self, strength: StrengthModel) -> Self {
        self.strength = strength;
        self
    }

    /// Find swing points and collapse them into clustered levels.
    ///
    /// Returns empty sides below 10 bars.
    pub fn detect<T: OHLCV>(&self, bars: &[T]) -> Levels {
        if bars.len() < MIN_LEVEL_BARS {
            return Levels::default();
        }

        let k = self.sensitivity.get();
        let mut scorer = Scorer::new(self.strength);
        let mut resistance = Vec::new();
        let mut support = Vec::new();

        for i in k..bars.len().saturating_sub(k) {
            let neighbours = || (1..=k).flat_map(move |j| [&bars[i - j], &bars[i + j]]);
            let high = bars[i].high();
            let low = bars[i].low();

            // Resistance first, then support, so the RNG draw order is stable
            if neighbours().all(|n| high > n.high()) {
                let clearance = neighbours()
                    .map(|n| high - n.high())
                    .fold(f64::INFINITY, f64::min);
                let scale = mean(neighbours().map(|n| OHLCVExt::range(n)));
                resistance.push(Swing {
                    price: high,
                    strength: scorer.score(clearance, scale),
                });
            }

            if neighbours().all(|n| low < n.low()) {
                let clearance = neighbours()
                    .map(|n| n.low() - low)
                    .fold(f64::INFINITY, f64::min);
                let scale = mean(neighbours().map(|n| OHLCVExt::range(n)));
                support.push(Swing {
                    price: low,
                    strength: scorer.score(clearance, scale),
                });
            }
        }

        tracing::trace!(
            swing_highs = resistance.len(),
            swing_lows = support.len(),
            "swing points found"
        );

        Levels {
            support: self.cluster(support),
            resistance: self.cluster(resistance),
        }
    }

    fn cluster(&self, mut swings: Vec<Swing>) -> Vec<Level> {
        swings.sort_by(|a, b| a.price.total_cmp(&b.price));
        let tolerance = self.cluster_tolerance.get();

        let clusters = swings.into_iter().fold(Vec::<Vec<Swing>>::new(), |mut acc, swing| {
            let joins = acc
                .last()
                .is_some_and(|c| (swing.price - c[0].price) / c[0].price < tolerance);
            match acc.last_mut().filter(|_| joins) {
                Some(cluster) => cluster.push(swing),
                None => acc.push(vec![swing]),
            }
            acc
        });

        let keep = self.max_levels.get();
        let skip = clusters.len().saturating_sub(keep);
        clusters.into_iter().skip(skip).map(collapse).collect()
    }
}

fn collapse(cluster: Vec<Swing>) -> Level {
    let count = cluster.len() as f64;
    let price = cluster.iter().map(|s| s.price).sum::<f64>() / count;
    let strongest = cluster.iter().map(|s| s.strength).fold(f64::MIN, f64::max);
    Level {
        price,
        strength: (strongest + CLUSTER_MEMBER_BOOST * count).min(MAX_LEVEL_STRENGTH),
    }
}

/// Detect levels with the default detector at the given sensitivity.
///
/// A sensitivity of 0 is treated as 1.
pub fn detect_levels<T: OHLCV>(bars: &[T], sensitivity: usize) -> Levels {
    LevelDetector::with_sensitivity(Period::new_const(sensitivity.max(1))).detect(bars)
}

const LEVEL_PARAMS: [ParamMeta; 3] = [
    ParamMeta::period(
        "sensitivity",
        3.0,
        (2.0, 8.0),
        "Neighbours on each side a swing point must exceed",
    ),
    ParamMeta::ratio(
        "cluster_tolerance",
        0.005,
        (0.001, 0.02),
        "Relative price distance for merging swing points",
    ),
    ParamMeta::period("max_levels", 3.0, (1.0, 10.0), "Clusters kept per side"),
];

impl ParameterizedAnalyzer for LevelDetector {
    fn param_meta() -> &'static [ParamMeta] {
        &LEVEL_PARAMS
    }

    fn with_params(params: &HashMap<&str, f64>) -> Result<Self> {
        reject_unknown(&LEVEL_PARAMS, params)?;
        let [sensitivity, tolerance, max_levels] = &LEVEL_PARAMS;
        Ok(Self {
            sensitivity: sensitivity.period_from(params)?,
            cluster_tolerance: tolerance.ratio_from(params)?,
            max_levels: max_levels.period_from(params)?,
            strength: StrengthModel::default(),
        })
    }

    fn analyzer_name() -> &'static str {
        "levels"
    }
}
