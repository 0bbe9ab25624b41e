//! Signal orchestration
//!
//! [`SignalGenerator`] runs every analytic over the bar series, merges in any
//! externally supplied indicator values, evaluates the selected strategy and
//! packages the result into a [`Signal`].
//!
//! # Example
//!
//! ```rust
//! use pricecall::prelude::*;
//!
//! let bars: Vec<Candle> = (0..40)
//!     .map(|i| Candle::new(i, 1.10, 1.1010, 1.0990, 1.10, 500.0))
//!     .collect();
//!
//! let overrides = IndicatorOverride {
//!     rsi: Some(72.0),
//!     recommendation: Some("STRONG BUY".into()),
//!     ..IndicatorOverride::default()
//! };
//! let signal = SignalGenerator::default().generate(&bars, 1.10, Strategy::PriceAction, Some(&overrides));
//!
//! assert_eq!(signal.action, Action::Wait);
//! assert_eq!(signal.momentum.strength, MomentumBias::Overbought);
//! assert_eq!(signal.risk_reward, "N/A");
//! ```

use serde::{Deserialize, Serialize};

use crate::{
    analysis::{
        analyze_volume, compute_momentum, detect_patterns, detect_trend, ma20, Consolidation,
        ConsolidationDetector, LevelDetector, Levels, Momentum, Pattern, TrendReading,
        VolumeProfile,
    },
    risk::calculate_risk_reward,
    strategies::{Decision, Strategy, StrategyInput, TradePlan},
    validate_bars, Action, AnalysisError, Result, Side, Trend, OHLCV,
};

/// Confidence added for a directional external recommendation
pub const DEFAULT_BOOST_POINTS: f64 = 5.0;
/// Risk:reward label on a WAIT signal
pub const NO_RISK_REWARD: &str = "N/A";

// ============================================================
// EXTERNAL INDICATORS
// ============================================================

/// Aggregate rating from an external technical-analysis feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Recommendation {
    #[serde(rename = "STRONG BUY")]
    StrongBuy,
    #[serde(rename = "BUY")]
    Buy,
    #[serde(rename = "NEUTRAL")]
    Neutral,
    #[serde(rename = "SELL")]
    Sell,
    #[serde(rename = "STRONG SELL")]
    StrongSell,
}

impl Recommendation {
    /// Bucket a -1..=1 aggregate score.
    pub fn from_score(score: f64) -> Self {
        match score {
            s if s > 0.5 => Recommendation::StrongBuy,
            s if s > 0.1 => Recommendation::Buy,
            s if s < -0.5 => Recommendation::StrongSell,
            s if s < -0.1 => Recommendation::Sell,
            _ => Recommendation::Neutral,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Recommendation::StrongBuy => "STRONG BUY",
            Recommendation::Buy => "BUY",
            Recommendation::Neutral => "NEUTRAL",
            Recommendation::Sell => "SELL",
            Recommendation::StrongSell => "STRONG SELL",
        }
    }
}

impl std::fmt::Display for Recommendation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Indicator values from an external feed. Every field is optional.
///
/// Zero and non-finite numbers count as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IndicatorOverride {
    pub trend: Option<Trend>,
    pub rsi: Option<f64>,
    pub ma20: Option<f64>,
    /// Free-form rating such as `"STRONG BUY"`
    pub recommendation: Option<String>,
}

#[inline]
fn usable(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v != 0.0)
}

impl IndicatorOverride {
    /// Build overrides from a quote-feed snapshot.
    ///
    /// The trend is bullish when `price` sits above the MA and bearish
    /// otherwise; it is left unset without a usable MA.
    pub fn from_quote(
        price: f64,
        rsi: Option<f64>,
        ma20: Option<f64>,
        recommend_score: Option<f64>,
    ) -> Self {
        let ma20 = usable(ma20);
        Self {
            trend: ma20.map(|ma| if price > ma { Trend::Bullish } else { Trend::Bearish }),
            rsi: usable(rsi),
            ma20,
            recommendation: recommend_score
                .filter(|s| s.is_finite())
                .map(|s| Recommendation::from_score(s).to_string()),
        }
    }

    pub fn trend_reading(&self) -> Option<TrendReading> {
        self.trend.map(TrendReading::external)
    }

    pub fn momentum(&self) -> Option<Momentum> {
        usable(self.rsi).map(Momentum::external)
    }

    pub fn ma20_value(&self) -> Option<f64> {
        usable(self.ma20)
    }

    /// Side named by the recommendation text. BUY is checked before SELL.
    pub fn recommendation_side(&self) -> Option<Side> {
        let text = self.recommendation.as_deref()?;
        if text.contains("BUY") {
            Some(Side::Buy)
        } else if text.contains("SELL") {
            Some(Side::Sell)
        } else {
            None
        }
    }
}

// ============================================================
// CONFIGURATION
// ============================================================

/// Where an indicator value comes from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SourcePreference {
    /// External value when usable, local computation otherwise
    #[default]
    PreferOverride,
    /// Always compute locally
    LocalOnly,
}

impl SourcePreference {
    fn resolve<V>(self, external: Option<V>, local: impl FnOnce() -> V) -> V {
        match (self, external) {
            (SourcePreference::PreferOverride, Some(value)) => value,
            _ => local(),
        }
    }
}

/// Source preference per overridable indicator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorPolicy {
    pub trend: SourcePreference,
    pub rsi: SourcePreference,
    pub ma20: SourcePreference,
}

/// When an external recommendation raises confidence
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RecommendationBoost {
    /// Any BUY/SELL recommendation sets the confidence of a WAIT; a strategy
    /// entry keeps its own confidence
    #[default]
    WaitOnly,
    /// Any BUY/SELL recommendation adds to every signal, entries included
    Unconditional,
    /// Only a recommendation on the same side as the signal boosts
    Aligned,
    Disabled,
}

/// Generator configuration
///
/// ```rust
/// use pricecall::prelude::*;
///
/// let config: SignalConfig = serde_json::from_str(
///     r#"{ "recommendationBoost": "aligned", "validateData": true }"#,
/// ).unwrap();
/// assert_eq!(config.recommendation_boost, RecommendationBoost::Aligned);
/// assert_eq!(config.boost_points, 5.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SignalConfig {
    pub levels: LevelDetector,
    pub consolidation: ConsolidationDetector,
    pub indicator_policy: IndicatorPolicy,
    pub recommendation_boost: RecommendationBoost,
    pub boost_points: f64,
    /// Reject malformed bars and prices in [`SignalGenerator::try_generate`]
    pub validate_data: bool,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            levels: LevelDetector::default(),
            consolidation: ConsolidationDetector::default(),
            indicator_policy: IndicatorPolicy::default(),
            recommendation_boost: RecommendationBoost::default(),
            boost_points: DEFAULT_BOOST_POINTS,
            validate_data: false,
        }
    }
}

impl SignalConfig {
    /// Check the values serde cannot check on its own.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=100.0).contains(&self.boost_points) {
            return Err(AnalysisError::InvalidConfig(format!(
                "boost_points must be within 0..=100, got {}",
                self.boost_points
            )));
        }
        Ok(())
    }
}

// ============================================================
// SIGNAL
// ============================================================

/// Complete output of one generation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Signal {
    #[serde(rename = "signal")]
    pub action: Action,
    pub strategy: Strategy,
    /// 0..=100
    pub confidence: u8,
    /// The current price
    pub entry: f64,
    /// Present exactly when `action` is BUY or SELL
    #[serde(flatten)]
    pub plan: Option<TradePlan>,
    /// `"1:x.x"`, or `"N/A"` on WAIT
    pub risk_reward: String,
    pub reasons: Vec<String>,
    pub patterns: Vec<Pattern>,
    pub trend: TrendReading,
    pub momentum: Momentum,
    pub volume: VolumeProfile,
    pub ma20: Option<f64>,
    pub consolidation: Consolidation,
    #[serde(flatten)]
    pub levels: Levels,
}

impl Signal {
    #[inline]
    pub fn stop_loss(&self) -> Option<f64> {
        self.plan.map(|p| p.stop_loss)
    }

    #[inline]
    pub fn take_profit(&self) -> Option<f64> {
        self.plan.map(|p| p.take_profit)
    }

    #[inline]
    pub fn is_actionable(&self) -> bool {
        self.action != Action::Wait
    }
}

// ============================================================
// GENERATOR
// ============================================================

#[derive(Debug, Clone, Default)]
pub struct SignalGenerator {
    config: SignalConfig,
}

impl SignalGenerator {
    pub fn new(config: SignalConfig) -> Self {
        Self { config }
    }

    /// [`new`](Self::new) for configurations loaded from outside the program.
    pub fn try_new(config: SignalConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SignalConfig {
        &self.config
    }

    /// Generate a signal. Never fails; short series degrade to WAIT with
    /// neutral analytics.
    pub fn generate<T: OHLCV>(
        &self,
        bars: &[T],
        current_price: f64,
        strategy: Strategy,
        overrides: Option<&IndicatorOverride>,
    ) -> Signal {
        let config = &self.config;
        let policy = config.indicator_policy;

        let levels = config.levels.detect(bars);
        let patterns = detect_patterns(bars);
        let consolidation = config.consolidation.detect(bars);
        let volume = analyze_volume(bars);
        let local_trend = detect_trend(bars);
        let local_ma20 = ma20(bars);
        let trend = policy
            .trend
            .resolve(overrides.and_then(IndicatorOverride::trend_reading), || local_trend);
        let momentum = policy
            .rsi
            .resolve(overrides.and_then(IndicatorOverride::momentum), || compute_momentum(bars));
        let ma20 = policy.ma20.resolve(
            overrides.and_then(IndicatorOverride::ma20_value).map(Some),
            || local_ma20,
        );

        let input = StrategyInput {
            bars,
            current_price,
            levels: &levels,
            patterns: &patterns,
            trend,
            ma20,
            local_trend,
            local_ma20,
            consolidation: &consolidation,
            consolidation_detector: &config.consolidation,
        };
        let decision = strategy.evaluate(&input);
        let boost = self.boost(overrides, decision.action());

        let Decision { entry, reasons } = decision;
        let (action, base_confidence, plan) = match entry {
            Some(e) => (Action::from(e.side), e.confidence, Some(e.plan)),
            None => (Action::Wait, 0.0, None),
        };
        let confidence = (base_confidence + boost).clamp(0.0, 100.0).round() as u8;
        let risk_reward = plan.map_or_else(
            || NO_RISK_REWARD.to_string(),
            |p| calculate_risk_reward(current_price, p.stop_loss, p.take_profit).formatted,
        );

        tracing::debug!(
            strategy = strategy.tag(),
            action = %action,
            confidence,
            bars = bars.len(),
            "signal generated"
        );

        Signal {
            action,
            strategy,
            confidence,
            entry: current_price,
            plan,
            risk_reward,
            reasons,
            patterns,
            trend,
            momentum,
            volume,
            ma20,
            consolidation,
            levels,
        }
    }

    /// [`generate`](Self::generate) that first checks the bars and price when
    /// `validate_data` is set.
    pub fn try_generate<T: OHLCV>(
        &self,
        bars: &[T],
        current_price: f64,
        strategy: Strategy,
        overrides: Option<&IndicatorOverride>,
    ) -> Result<Signal> {
        if self.config.validate_data {
            validate_bars(bars)?;
            if !current_price.is_finite() || current_price <= 0.0 {
                return Err(AnalysisError::InvalidValue(
                    "current price must be finite and positive",
                ));
            }
        }
        Ok(self.generate(bars, current_price, strategy, overrides))
    }

    fn boost(&self, overrides: Option<&IndicatorOverride>, action: Action) -> f64 {
        let Some(side) = overrides.and_then(IndicatorOverride::recommendation_side) else {
            return 0.0;
        };
        let applies = match self.config.recommendation_boost {
            RecommendationBoost::WaitOnly => action == Action::Wait,
            RecommendationBoost::Unconditional => true,
            RecommendationBoost::Aligned => action == Action::from(side),
            RecommendationBoost::Disabled => false,
        };
        if applies {
            tracing::trace!(?side, points = self.config.boost_points, "recommendation boost");
            self.config.boost_points
        } else {
            0.0
        }
    }
}

/// Generate a signal with the default configuration.
pub fn generate_signal<T: OHLCV>(
    bars: &[T],
    current_price: f64,
    strategy: Strategy,
    overrides: Option<&IndicatorOverride>,
) -> Signal {
    SignalGenerator::default().generate(bars, current_price, strategy, overrides)
}
