//! Tunable knobs of the level and consolidation detectors.
//!
//! Each detector publishes a static table of [`ParamMeta`] and can be built
//! from a `name -> value` map, as a settings panel or a config file would
//! supply it. Values are checked against the table's bounds; missing names
//! take the table's default.
//!
//! ```rust
//! use std::collections::HashMap;
//! use pricecall::prelude::*;
//!
//! let settings = HashMap::from([("sensitivity", 4.0)]);
//! let detector = LevelDetector::with_params(&settings).unwrap();
//! assert_eq!(detector.sensitivity.get(), 4);
//! ```

use std::collections::HashMap;

use crate::{AnalysisError, Period, Ratio, Result};

/// Value domain of a parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// Fraction in `0.0..=1.0`
    Ratio,
    /// Whole number of bars or items, at least 1
    Period,
}

/// One tunable parameter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamMeta {
    pub name: &'static str,
    pub kind: ParamKind,
    pub default: f64,
    /// Inclusive bounds accepted from outside
    pub min: f64,
    pub max: f64,
    pub description: &'static str,
}

impl ParamMeta {
    pub const fn ratio(
        name: &'static str,
        default: f64,
        bounds: (f64, f64),
        description: &'static str,
    ) -> Self {
        Self { name, kind: ParamKind::Ratio, default, min: bounds.0, max: bounds.1, description }
    }

    pub const fn period(
        name: &'static str,
        default: f64,
        bounds: (f64, f64),
        description: &'static str,
    ) -> Self {
        Self { name, kind: ParamKind::Period, default, min: bounds.0, max: bounds.1, description }
    }

    /// Check a raw value against the bounds and the value domain.
    pub fn check(&self, value: f64) -> Result<()> {
        if !(self.min..=self.max).contains(&value) {
            return Err(AnalysisError::OutOfRange {
                field: self.name,
                value,
                min: self.min,
                max: self.max,
            });
        }
        match self.kind {
            ParamKind::Ratio => Ratio::new(value).map(drop),
            ParamKind::Period if value.fract() != 0.0 => {
                Err(AnalysisError::InvalidValue("Period must be a whole number"))
            }
            ParamKind::Period => Ok(()),
        }
    }

    fn pick(&self, params: &HashMap<&str, f64>) -> Result<f64> {
        let value = params.get(self.name).copied().unwrap_or(self.default);
        self.check(value)?;
        Ok(value)
    }

    /// Read this ratio from `params`, falling back to the default.
    pub fn ratio_from(&self, params: &HashMap<&str, f64>) -> Result<Ratio> {
        Ratio::new(self.pick(params)?)
    }

    /// Read this period from `params`, falling back to the default.
    pub fn period_from(&self, params: &HashMap<&str, f64>) -> Result<Period> {
        Period::new(self.pick(params)? as usize)
    }
}

/// Analyzer that can be described by and built from [`ParamMeta`]
pub trait ParameterizedAnalyzer: Sized {
    fn param_meta() -> &'static [ParamMeta];

    /// Build from a settings map. Missing names use their defaults; names the
    /// analyzer does not know are rejected.
    fn with_params(params: &HashMap<&str, f64>) -> Result<Self>;

    /// Key used in settings and logs
    fn analyzer_name() -> &'static str;

    /// Defaults keyed by name
    fn default_params() -> HashMap<&'static str, f64> {
        Self::param_meta().iter().map(|m| (m.name, m.default)).collect()
    }
}

/// Reject names that no entry of `meta` describes.
pub fn reject_unknown(meta: &[ParamMeta], params: &HashMap<&str, f64>) -> Result<()> {
    match params.keys().find(|k| !meta.iter().any(|m| m.name == **k)) {
        Some(_) => Err(AnalysisError::InvalidValue("unknown parameter name")),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{ConsolidationDetector, LevelDetector};

    const TOLERANCE: ParamMeta = ParamMeta::ratio("tolerance", 0.005, (0.001, 0.02), "Cluster tolerance");
    const WINDOW: ParamMeta = ParamMeta::period("window", 14.0, (10.0, 20.0), "Window");

    #[test]
    fn test_check_bounds_and_domain() {
        assert!(WINDOW.check(14.0).is_ok());
        assert!(WINDOW.check(10.0).is_ok());
        assert!(WINDOW.check(12.5).is_err());
        assert!(matches!(WINDOW.check(8.0), Err(AnalysisError::OutOfRange { field: "window", .. })));
        assert!(WINDOW.check(f64::NAN).is_err());
        assert!(TOLERANCE.check(0.03).is_err());
    }

    #[test]
    fn test_reads_with_fallback() {
        let params = HashMap::from([("tolerance", 0.01), ("window", 20.0)]);
        assert_eq!(TOLERANCE.ratio_from(&params).unwrap().get(), 0.01);
        assert_eq!(WINDOW.period_from(&params).unwrap().get(), 20);
        assert_eq!(WINDOW.period_from(&HashMap::new()).unwrap().get(), 14);
    }

    #[test]
    fn test_unknown_names_rejected() {
        let params = HashMap::from([("sensitivty", 4.0)]);
        assert!(reject_unknown(LevelDetector::param_meta(), &params).is_err());
        assert!(LevelDetector::with_params(&params).is_err());
        assert!(reject_unknown(LevelDetector::param_meta(), &HashMap::new()).is_ok());
    }

    #[test]
    fn test_defaults_build_default_detectors() {
        for meta in LevelDetector::param_meta().iter().chain(ConsolidationDetector::param_meta()) {
            assert!(meta.check(meta.default).is_ok(), "{} default out of range", meta.name);
        }
        let levels = LevelDetector::with_params(&LevelDetector::default_params()).unwrap();
        assert_eq!(levels.sensitivity, LevelDetector::default().sensitivity);
        let consolidation =
            ConsolidationDetector::with_params(&ConsolidationDetector::default_params()).unwrap();
        assert_eq!(consolidation.periods, ConsolidationDetector::default().periods);
        assert_eq!(LevelDetector::analyzer_name(), "levels");
        assert_eq!(ConsolidationDetector::analyzer_name(), "consolidation");
    }
}
