//! Position sizing and risk:reward
//!
//! Both calculators are plain arithmetic on caller-supplied prices. Pip
//! figures assume a 4/5-decimal quote (1 pip = 0.0001).

use serde::{Deserialize, Serialize};

use crate::{AnalysisError, Result};

/// Price distance to pips for 4/5-decimal quotes
pub const PIPS_PER_UNIT: f64 = 10_000.0;

/// Output of [`calculate_position_size`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionSize {
    /// Account currency put at risk
    pub risk_amount: f64,
    /// Units such that hitting the stop loses `risk_amount`
    pub position_size: f64,
    /// Stop distance in pips
    pub pip_risk: f64,
}

/// Fixed-decimal renderings of a [`PositionSize`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionLabels {
    pub risk_amount: String,
    pub position_size: String,
    pub pip_risk: String,
}

impl PositionSize {
    pub fn labels(&self) -> PositionLabels {
        PositionLabels {
            risk_amount: format!("{:.2}", self.risk_amount),
            position_size: format!("{:.2}", self.position_size),
            pip_risk: format!("{:.1}", self.pip_risk),
        }
    }
}

/// Size a position so that a stop-out costs `risk_percent` of `balance`.
///
/// The stop distance is not checked: `entry == stop_loss` yields an infinite
/// (or NaN) size. Use [`try_calculate_position_size`] to have that rejected.
pub fn calculate_position_size(
    balance: f64,
    risk_percent: f64,
    entry: f64,
    stop_loss: f64,
) -> PositionSize {
    let risk_amount = balance * risk_percent / 100.0;
    let stop_distance = (entry - stop_loss).abs();
    PositionSize {
        risk_amount,
        position_size: risk_amount / stop_distance,
        pip_risk: stop_distance * PIPS_PER_UNIT,
    }
}

/// [`calculate_position_size`] that refuses a zero stop distance.
pub fn try_calculate_position_size(
    balance: f64,
    risk_percent: f64,
    entry: f64,
    stop_loss: f64,
) -> Result<PositionSize> {
    if entry == stop_loss {
        return Err(AnalysisError::ZeroStopDistance);
    }
    Ok(calculate_position_size(balance, risk_percent, entry, stop_loss))
}

/// Quality bucket for a risk:reward ratio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskGrade {
    /// 1:2 or better
    Good,
    /// 1:1 up to 1:2
    Acceptable,
    Poor,
}

/// Output of [`calculate_risk_reward`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskReward {
    pub risk: f64,
    pub reward: f64,
    pub ratio: f64,
    /// `"1:<ratio to 1 decimal>"`
    pub formatted: String,
}

impl RiskReward {
    /// Ratio to two decimals
    pub fn ratio_label(&self) -> String {
        format!("{:.2}", self.ratio)
    }

    pub fn grade(&self) -> RiskGrade {
        if self.ratio >= 2.0 {
            RiskGrade::Good
        } else if self.ratio >= 1.0 {
            RiskGrade::Acceptable
        } else {
            RiskGrade::Poor
        }
    }
}

pub fn calculate_risk_reward(entry: f64, stop_loss: f64, take_profit: f64) -> RiskReward {
    let risk = (entry - stop_loss).abs();
    let reward = (take_profit - entry).abs();
    let ratio = reward / risk;
    RiskReward {
        risk,
        reward,
        ratio,
        formatted: format!("1:{ratio:.1}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_size_eurusd() {
        let size = calculate_position_size(10_000.0, 1.0, 1.1000, 1.0950);
        let labels = size.labels();
        assert_eq!(labels.risk_amount, "100.00");
        assert_eq!(labels.pip_risk, "50.0");
        // 100 / 0.0050
        assert_eq!(labels.position_size, "20000.00");
    }

    #[test]
    fn test_position_size_is_side_agnostic() {
        let long = calculate_position_size(5_000.0, 2.0, 1.2500, 1.2400);
        let short = calculate_position_size(5_000.0, 2.0, 1.2400, 1.2500);
        assert_eq!(long, short);
    }

    #[test]
    fn test_zero_stop_distance() {
        let size = calculate_position_size(10_000.0, 1.0, 1.1, 1.1);
        assert!(size.position_size.is_infinite());
        assert!(matches!(
            try_calculate_position_size(10_000.0, 1.0, 1.1, 1.1),
            Err(AnalysisError::ZeroStopDistance)
        ));
    }

    #[test]
    fn test_risk_reward_two_to_one() {
        let entry = 1.5;
        let rr = calculate_risk_reward(entry, entry - 1.0, entry + 2.0);
        assert_eq!(rr.ratio_label(), "2.00");
        assert_eq!(rr.formatted, "1:2.0");
        assert_eq!(rr.grade(), RiskGrade::Good);
    }

    #[test]
    fn test_grades() {
        assert_eq!(calculate_risk_reward(1.0, 0.9, 1.15).grade(), RiskGrade::Acceptable);
        assert_eq!(calculate_risk_reward(1.0, 0.9, 1.05).grade(), RiskGrade::Poor);
    }
}
