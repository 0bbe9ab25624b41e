//! Market analytics feeding the strategy procedures
//!
//! Every analytic is a pure function of the bar series. Each has a minimum
//! bar count; below it the analytic returns a documented neutral default
//! instead of failing.
//!
//! # Analytics
//!
//! - **Levels** (10 bars): clustered swing-high resistance and swing-low support
//! - **Patterns** (3 bars): engulfing, hammer, shooting star and rejection candles
//! - **Trend** (14 bars): higher-high / higher-low structure
//! - **Momentum** (14 bars): simplified RSI and rate of change
//! - **Volume** (20 bars): relative volume and VWAP
//! - **Consolidation** (10 bars by default): range contraction ("build-up")

pub mod helpers;

pub mod consolidation;
pub mod levels;
pub mod momentum;
pub mod patterns;
pub mod trend;
pub mod volume;

// Re-export all analytics for convenience
pub use consolidation::*;
pub use helpers::*;
pub use levels::*;
pub use momentum::*;
pub use patterns::*;
pub use trend::*;
pub use volume::*;
