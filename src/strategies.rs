//! Strategy decision procedures
//!
//! Four price-action setups, each turning the shared analytics into either a
//! WAIT (with diagnostic reasons) or a directional entry with stop and
//! target. A [`Decision`] without an [`Entry`] is a WAIT, so a stop and a
//! target exist exactly when a side was chosen.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{
    analysis::{
        find_pattern, relative_distance, Consolidation, ConsolidationDetector, Level, Levels,
        Pattern, TrendReading, MIN_PULLBACK_BARS,
    },
    Action, AnalysisError, OHLCVExt, Side, Trend, OHLCV,
};

// ============================================================
// THRESHOLDS
// ============================================================

/// Price must sit this close to a level for a price-action setup
pub const LEVEL_PROXIMITY: f64 = 0.003;
/// Stops sit this far beyond the level or zone they protect
pub const LEVEL_STOP_BUFFER: f64 = 0.005;
/// Target used when no opposite level is known
pub const FALLBACK_TARGET: f64 = 0.02;
/// False-break stop used when no level is known on the stop side
pub const FALLBACK_FALSE_BREAK_STOP: f64 = 0.015;
/// Bars needed for a false-break check
pub const MIN_FALSE_BREAK_BARS: usize = 5;
/// Bars needed for a breakout-with-build-up check (14 prior + latest)
pub const MIN_BREAKOUT_BARS: usize = 15;
/// Broken zone boundary must sit this close to a known level
pub const BREAKOUT_LEVEL_PROXIMITY: f64 = 0.005;
/// Latest close must sit this close to the 20 MA for a pullback
pub const MA_PROXIMITY: f64 = 0.005;
/// Pullback stops sit this far beyond the 20 MA
pub const MA_STOP_BUFFER: f64 = 0.01;
pub const BREAKOUT_TARGET_MULTIPLE: f64 = 2.0;
pub const PULLBACK_TARGET_MULTIPLE: f64 = 3.0;

pub const PRICE_ACTION_CONFIDENCE: f64 = 80.0;
pub const FALSE_BREAK_CONFIDENCE: f64 = 80.0;
pub const BREAKOUT_CONFIDENCE: f64 = 85.0;
pub const PULLBACK_CONFIDENCE: f64 = 75.0;
/// Added when trend (price action) or a pattern (pullback) confirms
pub const CONFLUENCE_BONUS: f64 = 10.0;

// ============================================================
// DECISIONS
// ============================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradePlan {
    pub stop_loss: f64,
    pub take_profit: f64,
}

/// A directional call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Entry {
    pub side: Side,
    /// Base confidence before any external boost
    pub confidence: f64,
    pub plan: TradePlan,
}

/// Outcome of one strategy procedure
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Decision {
    pub entry: Option<Entry>,
    pub reasons: Vec<String>,
}

impl Decision {
    pub fn wait(reasons: Vec<String>) -> Self {
        Self {
            entry: None,
            reasons,
        }
    }

    pub fn enter(entry: Entry, reasons: Vec<String>) -> Self {
        Self {
            entry: Some(entry),
            reasons,
        }
    }

    pub fn action(&self) -> Action {
        self.entry.map_or(Action::Wait, |e| e.side.into())
    }
}

/// Everything a procedure may look at
#[derive(Debug, Clone, Copy)]
pub struct StrategyInput<'a, T> {
    pub bars: &'a [T],
    pub current_price: f64,
    pub levels: &'a Levels,
    pub patterns: &'a [Pattern],
    /// Trend after applying indicator overrides
    pub trend: TrendReading,
    /// 20 MA after applying indicator overrides
    pub ma20: Option<f64>,
    /// Trend computed from the bars alone
    pub local_trend: TrendReading,
    /// 20 MA computed from the bars alone
    pub local_ma20: Option<f64>,
    /// Consolidation over the full series, used for WAIT diagnostics
    pub consolidation: &'a Consolidation,
    /// Detector applied to the pre-breakout window
    pub consolidation_detector: &'a ConsolidationDetector,
}

// ============================================================
// STRATEGY
// ============================================================

/// Selectable trading strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strategy {
    /// Support/resistance reaction confirmed by a candlestick pattern
    #[serde(rename = "priceAction")]
    PriceAction,
    /// Failed break of a level, trading the reversal
    #[serde(rename = "falseBreak")]
    FalseBreak,
    /// Breakout of a contracting range sitting at a level
    #[serde(rename = "bwab")]
    BreakoutWithBuildup,
    /// First retracement to the 20 MA inside a trend
    #[serde(rename = "firstPullback")]
    FirstPullback,
}

impl Strategy {
    pub const ALL: [Strategy; 4] = [
        Strategy::PriceAction,
        Strategy::FalseBreak,
        Strategy::BreakoutWithBuildup,
        Strategy::FirstPullback,
    ];

    /// Dashboard selection tag
    pub fn tag(self) -> &'static str {
        match self {
            Strategy::PriceAction => "priceAction",
            Strategy::FalseBreak => "falseBreak",
            Strategy::BreakoutWithBuildup => "bwab",
            Strategy::FirstPullback => "firstPullback",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Strategy::PriceAction => "Price Action",
            Strategy::FalseBreak => "False Break",
            Strategy::BreakoutWithBuildup => "Breakout with Build-up",
            Strategy::FirstPullback => "First Pullback",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Strategy::PriceAction => "Trade S/R levels with candlestick confirmation",
            Strategy::FalseBreak => "Reversal strategy - trap breakout traders at key levels",
            Strategy::BreakoutWithBuildup => "Catch explosive moves after consolidation at S/R",
            Strategy::FirstPullback => "Enter trends on first retracement to moving average",
        }
    }

    /// Analytics the setup leans on
    pub fn tools(self) -> &'static [&'static str] {
        match self {
            Strategy::PriceAction => &["S/R Zones", "Candlestick Patterns", "Trend Structure", "Key Levels"],
            Strategy::FalseBreak => &["S/R Zones", "Breakout Detection", "Reversal Patterns", "Trap Identification"],
            Strategy::BreakoutWithBuildup => &["Consolidation Finder", "Build-up Detection", "Breakout Trigger", "Momentum Confirm"],
            Strategy::FirstPullback => &["Trend Detection", "20 MA", "Pullback Finder", "Rejection Candles"],
        }
    }

    /// Run this strategy's procedure.
    pub fn evaluate<T: OHLCV>(self, input: &StrategyInput<'_, T>) -> Decision {
        let decision = match self {
            Strategy::PriceAction => price_action(input),
            Strategy::FalseBreak => false_break(input),
            Strategy::BreakoutWithBuildup => breakout_with_buildup(input),
            Strategy::FirstPullback => first_pullback(input),
        };
        tracing::debug!(
            strategy = self.tag(),
            action = %decision.action(),
            reasons = decision.reasons.len(),
            "strategy evaluated"
        );
        decision
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Strategy {
    type Err = AnalysisError;

    /// Accepts the dashboard tags and their snake_case spellings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "priceAction" | "price_action" => Ok(Strategy::PriceAction),
            "falseBreak" | "false_break" => Ok(Strategy::FalseBreak),
            "bwab" | "breakout_with_buildup" => Ok(Strategy::BreakoutWithBuildup),
            "firstPullback" | "first_pullback" => Ok(Strategy::FirstPullback),
            other => Err(AnalysisError::UnknownStrategy(other.to_string())),
        }
    }
}

// ============================================================
// PROCEDURES
// ============================================================

/// +1 for longs, -1 for shorts
#[inline]
fn sign(side: Side) -> f64 {
    match side {
        Side::Buy => 1.0,
        Side::Sell => -1.0,
    }
}

/// `price` moved `pct` in the trade's favour (negative `pct` moves against it)
#[inline]
fn favour(side: Side, price: f64, pct: f64) -> f64 {
    price * (1.0 + sign(side) * pct)
}

fn first_price(levels: &[Level]) -> Option<f64> {
    levels.first().map(|l| l.price)
}

fn price_action<T: OHLCV>(input: &StrategyInput<'_, T>) -> Decision {
    let price = input.current_price;
    let near = |levels: &[Level]| {
        levels
            .iter()
            .find(|l| relative_distance(price, l.price, price) < LEVEL_PROXIMITY)
            .copied()
    };

    let at_support = near(&input.levels.support)
        .map(|level| level_reaction(input, Side::Buy, level, &input.levels.resistance));
    let at_resistance = near(&input.levels.resistance)
        .map(|level| level_reaction(input, Side::Sell, level, &input.levels.support));

    // A resistance reaction supersedes a support one; both keep their reasons
    let (support_reasons, support_entry) = at_support.unwrap_or_default();
    let (resistance_reasons, resistance_entry) = at_resistance.unwrap_or_default();
    let reasons = support_reasons.into_iter().chain(resistance_reasons).collect();

    match resistance_entry.or(support_entry) {
        Some(entry) => Decision::enter(entry, reasons),
        None => Decision::wait(reasons),
    }
}

fn level_reaction<T: OHLCV>(
    input: &StrategyInput<'_, T>,
    side: Side,
    level: Level,
    opposite: &[Level],
) -> (Vec<String>, Option<Entry>) {
    let (noun, verb, trend_word) = match side {
        Side::Buy => ("support", "Bounce off", "uptrend"),
        Side::Sell => ("resistance", "Rejection at", "downtrend"),
    };

    let Some(pattern) = find_pattern(input.patterns, side.direction()) else {
        return (
            vec![format!(
                "At {noun} {:.4} - waiting for rejection candle",
                level.price
            )],
            None,
        );
    };

    let confluence = match side {
        Side::Buy => input.trend.trend.is_up(),
        Side::Sell => input.trend.trend.is_down(),
    };

    let mut reasons = vec![
        format!("{verb} {noun} {:.4}", level.price),
        format!("Pattern: {}", pattern.name()),
    ];
    if confluence {
        reasons.push(format!("Confluence with {trend_word}"));
    }

    let entry = Entry {
        side,
        confidence: PRICE_ACTION_CONFIDENCE + if confluence { CONFLUENCE_BONUS } else { 0.0 },
        plan: TradePlan {
            stop_loss: favour(side, level.price, -LEVEL_STOP_BUFFER),
            take_profit: first_price(opposite)
                .unwrap_or_else(|| favour(side, input.current_price, FALLBACK_TARGET)),
        },
    };
    (reasons, Some(entry))
}

fn false_break<T: OHLCV>(input: &StrategyInput<'_, T>) -> Decision {
    let bars = input.bars;
    if bars.len() < MIN_FALSE_BREAK_BARS {
        return Decision::wait(Vec::new());
    }
    let prev = &bars[bars.len() - 2];
    let latest = &bars[bars.len() - 1];
    let levels = input.levels;

    // The break may have printed on the prior bar or intrabar on the latest
    let poke_high = prev.high().max(latest.high());
    let poke_low = prev.low().min(latest.low());

    let trap_above = levels
        .resistance
        .iter()
        .find(|r| poke_high > r.price && latest.close() < r.price && latest.close() < prev.close())
        .map(|r| (Side::Sell, format!("False break above resistance {:.4}", r.price)));
    let trap_below = || {
        levels
            .support
            .iter()
            .find(|s| poke_low < s.price && latest.close() > s.price && latest.close() > prev.close())
            .map(|s| (Side::Buy, format!("False break below support {:.4}", s.price)))
    };

    let Some((side, reason)) = trap_above.or_else(trap_below) else {
        return Decision::wait(Vec::new());
    };

    let price = input.current_price;
    let (stop_levels, target_levels) = match side {
        Side::Buy => (&levels.support, &levels.resistance),
        Side::Sell => (&levels.resistance, &levels.support),
    };
    let plan = TradePlan {
        stop_loss: first_price(stop_levels).map_or_else(
            || favour(side, price, -FALLBACK_FALSE_BREAK_STOP),
            |p| favour(side, p, -LEVEL_STOP_BUFFER),
        ),
        take_profit: first_price(target_levels)
            .unwrap_or_else(|| favour(side, price, FALLBACK_TARGET)),
    };

    Decision::enter(
        Entry {
            side,
            confidence: FALSE_BREAK_CONFIDENCE,
            plan,
        },
        vec![reason, format!("Trend: {}", input.trend.trend)],
    )
}

fn breakout_with_buildup<T: OHLCV>(input: &StrategyInput<'_, T>) -> Decision {
    let idle = || {
        if input.consolidation.is_consolidating {
            let contraction = input.consolidation.zone.map_or(0.0, |z| z.contraction);
            vec![
                format!("Build-up forming ({contraction:.0}% contraction)"),
                "Waiting for breakout...".to_string(),
            ]
        } else {
            Vec::new()
        }
    };

    let bars = input.bars;
    if bars.len() < MIN_BREAKOUT_BARS {
        return Decision::wait(idle());
    }
    let prior = &bars[bars.len() - MIN_BREAKOUT_BARS..bars.len() - 1];
    let build_up = input.consolidation_detector.detect(prior);
    let zone = match build_up.zone {
        Some(zone) if build_up.is_consolidating => zone,
        _ => return Decision::wait(idle()),
    };

    let close = bars[bars.len() - 1].close();
    let at_level = |levels: &[Level], boundary: f64| {
        levels
            .iter()
            .any(|l| relative_distance(boundary, l.price, l.price) < BREAKOUT_LEVEL_PROXIMITY)
    };

    let breakout = if close > zone.zone_high && at_level(&input.levels.resistance, zone.zone_high) {
        Some((Side::Buy, zone.zone_high, zone.zone_low, "above"))
    } else if close < zone.zone_low && at_level(&input.levels.support, zone.zone_low) {
        Some((Side::Sell, zone.zone_low, zone.zone_high, "below"))
    } else {
        None
    };
    let Some((side, broken, opposite, word)) = breakout else {
        return Decision::wait(idle());
    };

    let price = input.current_price;
    Decision::enter(
        Entry {
            side,
            confidence: BREAKOUT_CONFIDENCE,
            plan: TradePlan {
                stop_loss: favour(side, opposite, -LEVEL_STOP_BUFFER),
                take_profit: price + (price - opposite) * BREAKOUT_TARGET_MULTIPLE,
            },
        },
        vec![
            format!("Breakout with build-up {word} {broken:.4}"),
            "Consolidation detected".to_string(),
        ],
    )
}

fn first_pullback<T: OHLCV>(input: &StrategyInput<'_, T>) -> Decision {
    let idle = || {
        let mut reasons = vec![format!(
            "Trend: {} ({}%)",
            input.trend.trend, input.trend.strength
        )];
        if let Some(ma) = input.ma20 {
            reasons.push(format!("20 MA: {ma:.4}"));
        }
        reasons
    };

    // The trigger reads the bars' own trend and MA; overrides only move the plan
    let bars = input.bars;
    let (Some(ma), Some(latest)) = (input.local_ma20, bars.last()) else {
        return Decision::wait(idle());
    };
    let side = match input.local_trend.trend {
        _ if bars.len() < MIN_PULLBACK_BARS => return Decision::wait(idle()),
        Trend::Bullish => Side::Buy,
        Trend::Bearish => Side::Sell,
        Trend::Neutral => return Decision::wait(idle()),
    };

    let close = latest.close();
    let near_ma = relative_distance(close, ma, ma) < MA_PROXIMITY;
    let trend_side_of_ma = sign(side) * (close - ma) > 0.0;
    let pattern = find_pattern(input.patterns, side.direction());
    let bar_agrees = match side {
        Side::Buy => latest.is_bullish(),
        Side::Sell => latest.is_bearish(),
    };

    if !(near_ma && trend_side_of_ma && (pattern.is_some() || bar_agrees)) {
        return Decision::wait(idle());
    }

    let trend_word = match side {
        Side::Buy => "uptrend",
        Side::Sell => "downtrend",
    };
    let suffix = pattern.map_or_else(String::new, |p| format!(" + {}", p.name()));
    let price = input.current_price;
    let anchor = input.ma20.unwrap_or(ma);

    Decision::enter(
        Entry {
            side,
            confidence: PULLBACK_CONFIDENCE + if pattern.is_some() { CONFLUENCE_BONUS } else { 0.0 },
            plan: TradePlan {
                stop_loss: favour(side, anchor, -MA_STOP_BUFFER),
                take_profit: price + (price - anchor) * PULLBACK_TARGET_MULTIPLE,
            },
        },
        vec![
            format!("First pullback to 20 MA in {trend_word}{suffix}"),
            format!("20 MA: {ma:.4}"),
        ],
    )
}
