//! # pricecall - price-action signal engine
//!
//! Turns a series of OHLCV bars into a BUY / SELL / WAIT call with entry,
//! stop and target levels, a confidence score and human-readable reasons.
//!
//! ## Quick Start
//!
//! ```rust
//! use pricecall::prelude::*;
//!
//! let bars: Vec<Candle> = (0..30)
//!     .map(|i| {
//!         let base = 1.1000 + i as f64 * 0.0005;
//!         Candle::new(i, base, base + 0.0008, base - 0.0004, base + 0.0004, 1_000.0)
//!     })
//!     .collect();
//!
//! let price = bars.last().map(|b| b.close).unwrap_or_default();
//! let signal = generate_signal(&bars, price, Strategy::FirstPullback, None);
//!
//! assert_eq!(signal.plan.is_some(), signal.action != Action::Wait);
//! ```

pub mod analysis;
pub mod params;
pub mod risk;
pub mod signal;
pub mod strategies;

pub mod prelude {
    pub use crate::{
        // Analytics
        analysis::*,
        // Parameters
        params::{ParamKind, ParamMeta, ParameterizedAnalyzer},
        // Risk
        risk::{
            calculate_position_size, calculate_risk_reward, try_calculate_position_size,
            PositionLabels, PositionSize, RiskGrade, RiskReward,
        },
        // Parallel
        scan_watchlist,
        // Orchestration
        signal::{
            generate_signal, IndicatorOverride, IndicatorPolicy, Recommendation,
            RecommendationBoost, Signal, SignalConfig, SignalGenerator, SourcePreference,
        },
        // Strategies
        strategies::{Decision, Entry, Strategy, StrategyInput, TradePlan},
        // Types
        Action,
        // Errors
        AnalysisError,
        Candle,
        Direction,
        OHLCVExt,
        Period,
        Ratio,
        Result,
        ScanError,
        Side,
        Trend,
        validate_bars,
        WatchlistItem,
        WatchlistSignal,
        OHLCV,
    };
}

// ============================================================
// ERRORS
// ============================================================

pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Errors raised by configuration, validation and checked calculators.
///
/// The analytics themselves never fail; below their minimum bar count they
/// return a neutral default instead.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AnalysisError {
    #[error("Invalid value: {0}")]
    InvalidValue(&'static str),

    #[error("{field} = {value} out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Invalid OHLCV at index {index}: {reason}")]
    InvalidOHLCV { index: usize, reason: &'static str },

    #[error("Unknown strategy tag: {0}")]
    UnknownStrategy(String),

    #[error("Entry and stop loss are equal, position size is unbounded")]
    ZeroStopDistance,
}

// ============================================================
// VALIDATED TYPES
// ============================================================

/// Normalized value in range 0.0..=1.0
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Ratio(f64);

impl Ratio {
    /// Create a new Ratio, validating the value is in [0.0, 1.0]
    pub fn new(value: f64) -> Result<Self> {
        if value.is_nan() || value.is_infinite() {
            return Err(AnalysisError::InvalidValue(
                "Ratio cannot be NaN or infinite",
            ));
        }
        if !(0.0..=1.0).contains(&value) {
            return Err(AnalysisError::OutOfRange {
                field: "Ratio",
                value,
                min: 0.0,
                max: 1.0,
            });
        }
        Ok(Self(value))
    }

    /// Create a Ratio from a compile-time constant (library internal use)
    #[doc(hidden)]
    pub const fn new_const(value: f64) -> Self {
        Self(value)
    }

    #[inline]
    pub fn get(self) -> f64 {
        self.0
    }
}

impl serde::Serialize for Ratio {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(s)
    }
}

impl<'de> serde::Deserialize<'de> for Ratio {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let value = f64::deserialize(d)?;
        Ratio::new(value).map_err(serde::de::Error::custom)
    }
}

/// Period (must be > 0)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Period(usize);

impl Period {
    /// Create a new Period, validating value is > 0
    pub fn new(value: usize) -> Result<Self> {
        if value == 0 {
            return Err(AnalysisError::InvalidValue("Period must be > 0"));
        }
        Ok(Self(value))
    }

    #[doc(hidden)]
    pub const fn new_const(value: usize) -> Self {
        Self(value)
    }

    #[inline]
    pub fn get(self) -> usize {
        self.0
    }
}

impl serde::Serialize for Period {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(s)
    }
}

impl<'de> serde::Deserialize<'de> for Period {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let value = usize::deserialize(d)?;
        Period::new(value).map_err(serde::de::Error::custom)
    }
}

// ============================================================
// OHLCV TRAITS
// ============================================================

/// Core OHLCV data trait
pub trait OHLCV {
    fn open(&self) -> f64;
    fn high(&self) -> f64;
    fn low(&self) -> f64;
    fn close(&self) -> f64;
    fn volume(&self) -> f64;

    fn timestamp(&self) -> Option<i64> {
        None
    }
}

/// Extension trait with computed properties for OHLCV data
pub trait OHLCVExt: OHLCV {
    #[inline]
    fn body(&self) -> f64 {
        (self.close() - self.open()).abs()
    }

    #[inline]
    fn range(&self) -> f64 {
        self.high() - self.low()
    }

    #[inline]
    fn upper_wick(&self) -> f64 {
        self.high() - self.open().max(self.close())
    }

    #[inline]
    fn lower_wick(&self) -> f64 {
        self.open().min(self.close()) - self.low()
    }

    /// (high + low + close) / 3, the price VWAP weights by volume
    #[inline]
    fn typical_price(&self) -> f64 {
        (self.high() + self.low() + self.close()) / 3.0
    }

    #[inline]
    fn is_bullish(&self) -> bool {
        self.close() > self.open()
    }

    #[inline]
    fn is_bearish(&self) -> bool {
        self.close() < self.open()
    }

    /// Validate OHLCV data consistency
    fn validate(&self) -> Result<()> {
        let prices = [self.open(), self.high(), self.low(), self.close()];
        if prices.iter().any(|p| p.is_nan()) {
            return Err(AnalysisError::InvalidOHLCV {
                index: 0,
                reason: "NaN in OHLCV",
            });
        }
        if prices.iter().any(|p| p.is_infinite()) {
            return Err(AnalysisError::InvalidOHLCV {
                index: 0,
                reason: "Infinite value in OHLCV",
            });
        }
        if self.high() < self.low() {
            return Err(AnalysisError::InvalidOHLCV {
                index: 0,
                reason: "high < low",
            });
        }
        if self.volume().is_nan() || self.volume() < 0.0 {
            return Err(AnalysisError::InvalidOHLCV {
                index: 0,
                reason: "volume must be >= 0",
            });
        }
        Ok(())
    }
}

impl<T: OHLCV> OHLCVExt for T {}

/// A single price bar as delivered by the market-data feed.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Candle {
    /// Bar open time (epoch seconds or milliseconds, caller's convention)
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub volume: f64,
}

impl Candle {
    pub fn new(time: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            time,
            open,
            high,
            low,
            close,
            volume,
        }
    }
}

impl OHLCV for Candle {
    fn open(&self) -> f64 {
        self.open
    }

    fn high(&self) -> f64 {
        self.high
    }

    fn low(&self) -> f64 {
        self.low
    }

    fn close(&self) -> f64 {
        self.close
    }

    fn volume(&self) -> f64 {
        self.volume
    }

    fn timestamp(&self) -> Option<i64> {
        Some(self.time)
    }
}

/// Validate every bar, reporting the first offending index.
pub fn validate_bars<T: OHLCV>(bars: &[T]) -> Result<()> {
    for (i, bar) in bars.iter().enumerate() {
        bar.validate().map_err(|e| match e {
            AnalysisError::InvalidOHLCV { reason, .. } => {
                AnalysisError::InvalidOHLCV { index: i, reason }
            }
            other => other,
        })?;
    }
    Ok(())
}

// ============================================================
// SHARED CLASSIFICATIONS
// ============================================================

/// Bias of a candlestick pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Bullish,
    Bearish,
}

impl Direction {
    #[inline]
    pub fn is_bullish(self) -> bool {
        matches!(self, Direction::Bullish)
    }

    #[inline]
    pub fn is_bearish(self) -> bool {
        matches!(self, Direction::Bearish)
    }
}

/// Directional bias of recent price structure
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Bullish,
    Bearish,
    #[default]
    Neutral,
}

impl Trend {
    #[inline]
    pub fn is_up(self) -> bool {
        matches!(self, Trend::Bullish)
    }

    #[inline]
    pub fn is_down(self) -> bool {
        matches!(self, Trend::Bearish)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Trend::Bullish => "bullish",
            Trend::Bearish => "bearish",
            Trend::Neutral => "neutral",
        }
    }
}

impl std::fmt::Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Side of a directional trade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// The pattern bias that confirms this side
    #[inline]
    pub fn direction(self) -> Direction {
        match self {
            Side::Buy => Direction::Bullish,
            Side::Sell => Direction::Bearish,
        }
    }
}

/// Final recommendation emitted by the signal generator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Action {
    Buy,
    Sell,
    #[default]
    Wait,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Action::Buy => "BUY",
            Action::Sell => "SELL",
            Action::Wait => "WAIT",
        }
    }
}

impl From<Side> for Action {
    fn from(side: Side) -> Self {
        match side {
            Side::Buy => Action::Buy,
            Side::Sell => Action::Sell,
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================
// PARALLEL SCANNING
// ============================================================

use rayon::prelude::*;

use signal::{IndicatorOverride, Signal, SignalGenerator};
use strategies::Strategy;

/// One symbol to evaluate in a watchlist scan
#[derive(Debug, Clone, Copy)]
pub struct WatchlistItem<'a, T> {
    pub symbol: &'a str,
    pub bars: &'a [T],
    pub current_price: f64,
    pub overrides: Option<&'a IndicatorOverride>,
}

/// Result of scanning a single instrument
#[derive(Debug)]
pub struct WatchlistSignal {
    pub symbol: String,
    pub signal: Signal,
}

/// Error from scanning a single instrument
#[derive(Debug)]
pub struct ScanError {
    pub symbol: String,
    pub error: AnalysisError,
}

/// Evaluate one strategy over many symbols in parallel.
///
/// Symbols are independent; a failure on one (only possible when the
/// generator validates data) is reported without affecting the others.
pub fn scan_watchlist<'a, T, I>(
    generator: &SignalGenerator,
    strategy: Strategy,
    instruments: I,
) -> (Vec<WatchlistSignal>, Vec<ScanError>)
where
    T: OHLCV + Sync + 'a,
    I: IntoParallelIterator<Item = WatchlistItem<'a, T>>,
{
    let results: Vec<_> = instruments
        .into_par_iter()
        .map(|item| {
            generator
                .try_generate(item.bars, item.current_price, strategy, item.overrides)
                .map(|signal| WatchlistSignal {
                    symbol: item.symbol.to_string(),
                    signal,
                })
                .map_err(|error| ScanError {
                    symbol: item.symbol.to_string(),
                    error,
                })
        })
        .collect();

    let mut successes = Vec::new();
    let mut errors = Vec::new();

    for result in results {
        match result {
            Ok(r) => successes.push(r),
            Err(e) => errors.push(e),
        }
    }

    (successes, errors)
}

// ============================================================
// TESTS
// ============================================================
