//! Reversal candlestick patterns on the latest bar
//!
//! Only the last two bars are examined. The rules are independent, so any
//! subset may fire on the same candle (a long-wicked hammer is usually also
//! a rejection candle).

use serde::{Deserialize, Serialize};

use super::helpers::MIN_PATTERN_BARS;
use crate::{Direction, OHLCVExt, OHLCV};

/// Lower (upper) wick must exceed this multiple of the body for a hammer (star)
pub const HAMMER_WICK_FACTOR: f64 = 2.0;
/// Opposite wick must stay under this multiple of the body
pub const HAMMER_OPPOSITE_WICK_FACTOR: f64 = 0.5;
/// Wick share of the total range that marks a rejection candle
pub const REJECTION_WICK_RATIO: f64 = 0.6;

/// Recognised pattern types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PatternKind {
    #[serde(rename = "Bullish Engulfing")]
    BullishEngulfing,
    #[serde(rename = "Bearish Engulfing")]
    BearishEngulfing,
    Hammer,
    #[serde(rename = "Shooting Star")]
    ShootingStar,
    #[serde(rename = "Bullish Rejection")]
    BullishRejection,
    #[serde(rename = "Bearish Rejection")]
    BearishRejection,
}

impl PatternKind {
    pub fn name(self) -> &'static str {
        match self {
            PatternKind::BullishEngulfing => "Bullish Engulfing",
            PatternKind::BearishEngulfing => "Bearish Engulfing",
            PatternKind::Hammer => "Hammer",
            PatternKind::ShootingStar => "Shooting Star",
            PatternKind::BullishRejection => "Bullish Rejection",
            PatternKind::BearishRejection => "Bearish Rejection",
        }
    }

    pub fn direction(self) -> Direction {
        match self {
            PatternKind::BullishEngulfing | PatternKind::Hammer | PatternKind::BullishRejection => {
                Direction::Bullish
            }
            PatternKind::BearishEngulfing
            | PatternKind::ShootingStar
            | PatternKind::BearishRejection => Direction::Bearish,
        }
    }

    /// Fixed strength score, 0..=100
    pub fn strength(self) -> u8 {
        match self {
            PatternKind::BullishEngulfing | PatternKind::BearishEngulfing => 85,
            PatternKind::Hammer | PatternKind::ShootingStar => 75,
            PatternKind::BullishRejection | PatternKind::BearishRejection => 70,
        }
    }
}

impl std::fmt::Display for PatternKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A pattern found on the latest bar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pattern {
    #[serde(rename = "name")]
    pub kind: PatternKind,
    #[serde(rename = "type")]
    pub direction: Direction,
    pub strength: u8,
}

impl Pattern {
    pub fn new(kind: PatternKind) -> Self {
        Self {
            kind,
            direction: kind.direction(),
            strength: kind.strength(),
        }
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.kind.name()
    }
}

/// First pattern in `patterns` with the given bias.
pub fn find_pattern(patterns: &[Pattern], direction: Direction) -> Option<&Pattern> {
    patterns.iter().find(|p| p.direction == direction)
}

/// Check the latest bar (and its predecessor) for reversal patterns.
///
/// Returns an empty list below 3 bars.
pub fn detect_patterns<T: OHLCV>(bars: &[T]) -> Vec<Pattern> {
    if bars.len() < MIN_PATTERN_BARS {
        return Vec::new();
    }
    let curr = &bars[bars.len() - 1];
    let prev = &bars[bars.len() - 2];

    let body = curr.body();
    let range = OHLCVExt::range(curr);
    let upper = curr.upper_wick();
    let lower = curr.lower_wick();

    // Engulfing: the current body covers the prior opposite-colour body
    let bullish_engulfing = prev.is_bearish()
        && curr.is_bullish()
        && curr.open() <= prev.close()
        && curr.close() >= prev.open();
    let bearish_engulfing = prev.is_bullish()
        && curr.is_bearish()
        && curr.open() >= prev.close()
        && curr.close() <= prev.open();

    let hammer = lower > body * HAMMER_WICK_FACTOR && upper < body * HAMMER_OPPOSITE_WICK_FACTOR;
    let shooting_star =
        upper > body * HAMMER_WICK_FACTOR && lower < body * HAMMER_OPPOSITE_WICK_FACTOR;

    let bullish_rejection = lower > range * REJECTION_WICK_RATIO;
    let bearish_rejection = upper > range * REJECTION_WICK_RATIO;

    [
        (bullish_engulfing, PatternKind::BullishEngulfing),
        (bearish_engulfing, PatternKind::BearishEngulfing),
        (hammer, PatternKind::Hammer),
        (shooting_star, PatternKind::ShootingStar),
        (bullish_rejection, PatternKind::BullishRejection),
        (bearish_rejection, PatternKind::BearishRejection),
    ]
    .into_iter()
    .filter_map(|(fired, kind)| fired.then(|| Pattern::new(kind)))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Candle;

    fn bar(o: f64, h: f64, l: f64, c: f64) -> Candle {
        Candle::new(0, o, h, l, c, 1000.0)
    }

    fn lead() -> Candle {
        bar(1.0900, 1.0910, 1.0890, 1.0905)
    }

    #[test]
    fn test_needs_three_bars() {
        let bars = vec![bar(1.10, 1.101, 1.094, 1.095), bar(1.094, 1.103, 1.093, 1.102)];
        assert!(detect_patterns(&bars).is_empty());
    }

    #[test]
    fn test_bullish_engulfing() {
        let bars = vec![
            lead(),
            bar(1.100, 1.101, 1.094, 1.095),
            bar(1.094, 1.103, 1.093, 1.102),
        ];
        let patterns = detect_patterns(&bars);
        let engulfing = patterns
            .iter()
            .find(|p| p.kind == PatternKind::BullishEngulfing)
            .expect("bullish engulfing");
        assert_eq!(engulfing.name(), "Bullish Engulfing");
        assert_eq!(engulfing.direction, Direction::Bullish);
        assert_eq!(engulfing.strength, 85);
    }

    #[test]
    fn test_bearish_engulfing() {
        let bars = vec![
            lead(),
            bar(1.095, 1.1005, 1.0945, 1.100),
            bar(1.101, 1.102, 1.093, 1.094),
        ];
        let patterns = detect_patterns(&bars);
        assert!(patterns.contains(&Pattern::new(PatternKind::BearishEngulfing)));
        assert!(!patterns.iter().any(|p| p.direction.is_bullish()));
    }

    #[test]
    fn test_hammer_is_also_rejection() {
        // body 0.0002, lower wick 0.0030, upper wick 0.00005
        let bars = vec![lead(), lead(), bar(1.1000, 1.10025, 1.0970, 1.1002)];
        let kinds: Vec<PatternKind> = detect_patterns(&bars).iter().map(|p| p.kind).collect();
        assert_eq!(
            kinds,
            vec![PatternKind::Hammer, PatternKind::BullishRejection]
        );
    }

    #[test]
    fn test_shooting_star() {
        let bars = vec![lead(), lead(), bar(1.1002, 1.1030, 1.09995, 1.1000)];
        let patterns = detect_patterns(&bars);
        assert_eq!(patterns[0], Pattern::new(PatternKind::ShootingStar));
        assert!(patterns.contains(&Pattern::new(PatternKind::BearishRejection)));
    }

    #[test]
    fn test_plain_bar_has_no_patterns() {
        let bars = vec![lead(), lead(), bar(1.1000, 1.1012, 1.0998, 1.1010)];
        assert!(detect_patterns(&bars).is_empty());
    }

    #[test]
    fn test_find_pattern() {
        let patterns = vec![
            Pattern::new(PatternKind::ShootingStar),
            Pattern::new(PatternKind::Hammer),
        ];
        assert_eq!(
            find_pattern(&patterns, Direction::Bullish).map(|p| p.kind),
            Some(PatternKind::Hammer)
        );
    }

    #[test]
    fn test_serializes_like_dashboard() {
        let json = serde_json::to_string(&Pattern::new(PatternKind::BullishEngulfing)).unwrap();
        assert_eq!(
            json,
            r#"{"name":"Bullish Engulfing","type":"bullish","strength":85}"#
        );
    }
}
