//! Regression-based trend analysis over demographic/risk dimensions

mod analyzer;
mod regression;

pub use analyzer::{
    analyze, RiskWeights, TrendConfig, TrendDirection, TrendMetric, TrendResult,
};
pub use regression::{fit, LinearFit};
