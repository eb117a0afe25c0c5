//! Core value objects for reserve calculations

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Reserving method used for an estimate
///
/// Closed set: adding a method is a compile-time-checked change everywhere
/// this enum is matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReserveMethod {
    /// Chain ladder (volume-weighted development factors)
    ChainLadder,
    /// Bornhuetter-Ferguson (expected loss ratio blended with development)
    BornhuetterFerguson,
    /// Frequency-severity decomposition
    FrequencySeverity,
}

impl ReserveMethod {
    /// Stable identifier for reporting and cache keys
    pub fn as_str(&self) -> &'static str {
        match self {
            ReserveMethod::ChainLadder => "chain_ladder",
            ReserveMethod::BornhuetterFerguson => "bornhuetter_ferguson",
            ReserveMethod::FrequencySeverity => "frequency_severity",
        }
    }
}

/// Result of a reserve calculation
///
/// Immutable once returned; the reporting layer owns rendering. The interval
/// is symmetric around the point estimate at the configured confidence level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReserveEstimate {
    /// Method that produced this estimate
    pub method: ReserveMethod,

    /// Total projected reserves across all periods/segments
    pub total_reserves: f64,

    /// (lower, upper) bounds of the confidence interval
    pub confidence_interval: (f64, f64),

    /// Reserve amount per accident period (or segment)
    pub by_period: BTreeMap<usize, f64>,
}

impl ReserveEstimate {
    /// Half-width of the confidence interval
    pub fn interval_half_width(&self) -> f64 {
        (self.confidence_interval.1 - self.confidence_interval.0) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_identifiers() {
        assert_eq!(ReserveMethod::ChainLadder.as_str(), "chain_ladder");
        assert_eq!(
            ReserveMethod::BornhuetterFerguson.as_str(),
            "bornhuetter_ferguson"
        );
        assert_eq!(ReserveMethod::FrequencySeverity.as_str(), "frequency_severity");
    }

    #[test]
    fn test_estimate_serde_round_trip() {
        let mut by_period = BTreeMap::new();
        by_period.insert(0, 1_250.5);
        by_period.insert(3, 9_800.25);

        let estimate = ReserveEstimate {
            method: ReserveMethod::ChainLadder,
            total_reserves: 11_050.75,
            confidence_interval: (9_000.0, 13_101.5),
            by_period,
        };

        let json = serde_json::to_string(&estimate).unwrap();
        let back: ReserveEstimate = serde_json::from_str(&json).unwrap();
        assert_eq!(back, estimate);
        assert_eq!(back.total_reserves.to_bits(), estimate.total_reserves.to_bits());
    }

    #[test]
    fn test_interval_half_width() {
        let estimate = ReserveEstimate {
            method: ReserveMethod::FrequencySeverity,
            total_reserves: 100.0,
            confidence_interval: (80.0, 120.0),
            by_period: BTreeMap::new(),
        };
        assert!((estimate.interval_half_width() - 20.0).abs() < 1e-12);
    }
}
