//! Bornhuetter-Ferguson reserve estimation
//!
//! Blends exogenous expected-loss-ratio projections with observed
//! development, using exactly the same development factors as chain ladder.
//! The blend damps volatility for immature accident periods where chain
//! ladder is least reliable.

use crate::error::{EngineError, Result};
use crate::reserves::chain_ladder::interval_half_width;
use crate::reserves::factors::DevelopmentFactorSet;
use crate::reserves::triangle::LossTriangle;
use crate::reserves::types::{ReserveEstimate, ReserveMethod};
use std::collections::BTreeMap;

/// Estimate reserves from expected loss ratios and exposures.
///
/// Per accident period: expected_ultimate = exposure x expected loss ratio;
/// unreported fraction = 1 - 1/cumulative_factor_to_tail; reserve =
/// expected_ultimate x unreported fraction. Both inputs are exogenous
/// benchmarks supplied as configuration, never derived from the triangle.
///
/// Fails with `MissingExposure` naming the first accident period that lacks
/// either input.
pub fn estimate(
    triangle: &LossTriangle,
    expected_loss_ratios: &BTreeMap<usize, f64>,
    exposures: &BTreeMap<usize, f64>,
    tail_factor: f64,
    confidence_level: f64,
) -> Result<ReserveEstimate> {
    let factors = DevelopmentFactorSet::from_triangle(triangle, tail_factor)?;

    let mut by_period = BTreeMap::new();
    let mut total_reserves = 0.0;
    for accident in triangle.accident_periods() {
        let exposure = exposures
            .get(&accident)
            .copied()
            .ok_or(EngineError::MissingExposure(accident))?;
        let loss_ratio = expected_loss_ratios
            .get(&accident)
            .copied()
            .ok_or(EngineError::MissingExposure(accident))?;
        let (latest_dev, _) = match triangle.latest_observed(accident) {
            Some(observed) => observed,
            None => continue,
        };

        let expected_ultimate = exposure * loss_ratio;
        let unreported = 1.0 - 1.0 / factors.cumulative_to_ultimate(latest_dev);
        let reserve = expected_ultimate * unreported;
        total_reserves += reserve;
        by_period.insert(accident, reserve);
    }

    // Interval from the same factor-ratio dispersion as chain ladder,
    // scaled to this method's total
    let half_width = interval_half_width(triangle, total_reserves, confidence_level);
    log::debug!(
        "bornhuetter-ferguson: total reserves {:.2}, interval half-width {:.2}",
        total_reserves,
        half_width
    );

    Ok(ReserveEstimate {
        method: ReserveMethod::BornhuetterFerguson,
        total_reserves,
        confidence_interval: (total_reserves - half_width, total_reserves + half_width),
        by_period,
    })
}
