//! Chain ladder reserve estimation
//!
//! Projects ultimate losses per accident period from volume-weighted
//! development factors, with a normal-approximation confidence interval
//! derived from the dispersion of the individual historical age-to-age
//! ratios. The interval deliberately reflects factor uncertainty rather
//! than reserve variance, which would mask it.

use crate::error::Result;
use crate::reserves::factors::DevelopmentFactorSet;
use crate::reserves::triangle::LossTriangle;
use crate::reserves::types::{ReserveEstimate, ReserveMethod};
use crate::stats::z_score;
use std::collections::BTreeMap;

/// Estimate reserves from a cumulative loss triangle.
///
/// Ultimate loss per accident period = latest observed cumulative loss x
/// product of all development factors from its current development period
/// through the tail. Reserve = ultimate - latest observed. A period already
/// observed through the final development period projects to exactly its
/// latest cumulative loss (reserve 0).
pub fn estimate(
    triangle: &LossTriangle,
    tail_factor: f64,
    confidence_level: f64,
) -> Result<ReserveEstimate> {
    let factors = DevelopmentFactorSet::from_triangle(triangle, tail_factor)?;

    let mut by_period = BTreeMap::new();
    let mut total_reserves = 0.0;
    for accident in triangle.accident_periods() {
        let (latest_dev, latest) = match triangle.latest_observed(accident) {
            Some(observed) => observed,
            None => continue,
        };
        let ultimate = latest * factors.cumulative_to_ultimate(latest_dev);
        let reserve = ultimate - latest;
        total_reserves += reserve;
        by_period.insert(accident, reserve);
    }

    let half_width = interval_half_width(triangle, total_reserves, confidence_level);
    log::debug!(
        "chain ladder: total reserves {:.2}, interval half-width {:.2}",
        total_reserves,
        half_width
    );

    Ok(ReserveEstimate {
        method: ReserveMethod::ChainLadder,
        total_reserves,
        confidence_interval: (total_reserves - half_width, total_reserves + half_width),
        by_period,
    })
}

/// Symmetric half-width at the configured confidence level.
///
/// Standard error = total reserves x coefficient of variation of the
/// individual age-to-age ratios / sqrt(n). With fewer than two ratios there
/// is no dispersion to measure and the interval collapses to the point
/// estimate.
pub(crate) fn interval_half_width(
    triangle: &LossTriangle,
    total_reserves: f64,
    confidence_level: f64,
) -> f64 {
    let ratios = DevelopmentFactorSet::individual_ratios(triangle);
    if ratios.len() < 2 {
        return 0.0;
    }

    let n = ratios.len() as f64;
    let mean = ratios.iter().sum::<f64>() / n;
    if mean <= 0.0 {
        return 0.0;
    }
    let variance = ratios.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);
    let cv = variance.sqrt() / mean;

    let standard_error = total_reserves.abs() * cv / n.sqrt();
    z_score(confidence_level) * standard_error
}
