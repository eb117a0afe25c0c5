//! Age-to-age development factors shared by chain ladder and
//! Bornhuetter-Ferguson
//!
//! Both methods must project with identical factors, so derivation lives in
//! one pure function over the triangle rather than in either estimator.

use crate::error::{EngineError, Result};
use crate::reserves::triangle::LossTriangle;

/// Ordered development factors, one per development-period transition,
/// plus the configured tail factor
#[derive(Debug, Clone, PartialEq)]
pub struct DevelopmentFactorSet {
    factors: Vec<f64>,
    tail_factor: f64,
}

impl DevelopmentFactorSet {
    /// Derive volume-weighted factors from a triangle.
    ///
    /// Factor for transition d -> d+1 = sum of cumulative losses at d+1 over
    /// all accident periods observed at both d and d+1, divided by the sum
    /// at d over the same periods. The volume-weighted average is the
    /// numerically stable choice over a simple average of per-period ratios.
    ///
    /// A transition with no overlapping observations carries no development
    /// information and gets the identity factor 1.0. A computed factor that
    /// is non-finite or below 1.0 fails with `DegenerateFactor`; losses only
    /// grow or stay flat under the chain-ladder assumption, so a decrease is
    /// a data anomaly the caller must see.
    pub fn from_triangle(triangle: &LossTriangle, tail_factor: f64) -> Result<Self> {
        let transitions = triangle.development_periods().saturating_sub(1);
        let mut factors = Vec::with_capacity(transitions);

        for d in 0..transitions {
            let mut current_sum = 0.0;
            let mut next_sum = 0.0;
            let mut observed = false;

            for accident in triangle.accident_periods() {
                if let (Some(current), Some(next)) =
                    (triangle.cell(accident, d), triangle.cell(accident, d + 1))
                {
                    current_sum += current;
                    next_sum += next;
                    observed = true;
                }
            }

            if !observed {
                factors.push(1.0);
                continue;
            }

            let factor = next_sum / current_sum;
            if !factor.is_finite() || factor < 1.0 {
                return Err(EngineError::DegenerateFactor {
                    transition: d,
                    value: factor,
                });
            }
            factors.push(factor);
        }

        Ok(Self {
            factors,
            tail_factor,
        })
    }

    /// Per-transition factors, in development order
    pub fn factors(&self) -> &[f64] {
        &self.factors
    }

    /// Configured tail factor for development beyond the observed window
    pub fn tail_factor(&self) -> f64 {
        self.tail_factor
    }

    /// Cumulative factor from a development period to ultimate.
    ///
    /// A period already observed through the final development period is
    /// fully developed and projects to exactly its latest cumulative loss,
    /// so the tail does not apply and the factor is 1.0.
    pub fn cumulative_to_ultimate(&self, from_development: usize) -> f64 {
        if from_development >= self.factors.len() {
            return 1.0;
        }
        self.factors[from_development..]
            .iter()
            .product::<f64>()
            * self.tail_factor
    }

    /// Individual age-to-age ratios across all adjacent observed cell pairs,
    /// used for interval estimation from factor dispersion
    pub fn individual_ratios(triangle: &LossTriangle) -> Vec<f64> {
        let mut ratios = Vec::new();
        for accident in triangle.accident_periods() {
            for d in 0..triangle.development_periods().saturating_sub(1) {
                if let (Some(current), Some(next)) =
                    (triangle.cell(accident, d), triangle.cell(accident, d + 1))
                {
                    if current > 0.0 {
                        ratios.push(next / current);
                    }
                }
            }
        }
        ratios
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::collections::BTreeMap;

    fn triangle(rows: &[(usize, &[(usize, f64)])], periods: usize) -> LossTriangle {
        let mut cells = BTreeMap::new();
        for (accident, row) in rows {
            cells.insert(*accident, row.iter().copied().collect());
        }
        LossTriangle::from_cells(cells, periods).unwrap()
    }

    #[test]
    fn test_volume_weighted_factor() {
        // Transition 0 -> 1: (150 + 300) / (100 + 200) = 1.5
        let t = triangle(
            &[
                (0, &[(0, 100.0), (1, 150.0)]),
                (1, &[(0, 200.0), (1, 300.0)]),
            ],
            2,
        );
        let set = DevelopmentFactorSet::from_triangle(&t, 1.05).unwrap();
        assert_eq!(set.factors().len(), 1);
        assert_relative_eq!(set.factors()[0], 1.5, epsilon = 1e-12);
    }

    #[test]
    fn test_skips_periods_missing_a_cell() {
        // Accident 1 has no dev-1 cell and must not enter the transition sums
        let t = triangle(
            &[
                (0, &[(0, 100.0), (1, 120.0)]),
                (1, &[(0, 999.0)]),
            ],
            2,
        );
        let set = DevelopmentFactorSet::from_triangle(&t, 1.0).unwrap();
        assert_relative_eq!(set.factors()[0], 1.2, epsilon = 1e-12);
    }

    #[test]
    fn test_monotone_data_yields_factors_at_least_one() {
        let t = triangle(
            &[
                (0, &[(0, 100.0), (1, 140.0), (2, 160.0)]),
                (1, &[(0, 90.0), (1, 110.0)]),
                (2, &[(0, 80.0)]),
            ],
            3,
        );
        let set = DevelopmentFactorSet::from_triangle(&t, 1.05).unwrap();
        assert!(set.factors().iter().all(|&f| f >= 1.0));
    }

    #[test]
    fn test_decreasing_losses_are_degenerate() {
        let t = triangle(
            &[
                (0, &[(0, 100.0), (1, 80.0)]),
                (1, &[(0, 50.0), (1, 40.0)]),
            ],
            2,
        );
        let result = DevelopmentFactorSet::from_triangle(&t, 1.05);
        assert!(matches!(
            result,
            Err(EngineError::DegenerateFactor { transition: 0, .. })
        ));
    }

    #[test]
    fn test_zero_denominator_is_degenerate() {
        let t = triangle(
            &[
                (0, &[(0, 0.0), (1, 10.0)]),
                (1, &[(0, 0.0), (1, 5.0)]),
            ],
            2,
        );
        let result = DevelopmentFactorSet::from_triangle(&t, 1.05);
        assert!(matches!(result, Err(EngineError::DegenerateFactor { .. })));
    }

    #[test]
    fn test_cumulative_to_ultimate() {
        let t = triangle(
            &[
                (0, &[(0, 100.0), (1, 150.0), (2, 180.0)]),
                (1, &[(0, 200.0), (1, 300.0), (2, 360.0)]),
            ],
            3,
        );
        let set = DevelopmentFactorSet::from_triangle(&t, 1.05).unwrap();

        // From dev 0: 1.5 * 1.2 * 1.05
        assert_relative_eq!(set.cumulative_to_ultimate(0), 1.5 * 1.2 * 1.05, epsilon = 1e-12);
        // From dev 1: 1.2 * 1.05
        assert_relative_eq!(set.cumulative_to_ultimate(1), 1.2 * 1.05, epsilon = 1e-12);
        // Fully developed: no further development, tail not applied
        assert_relative_eq!(set.cumulative_to_ultimate(2), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_transition_without_overlap_is_identity() {
        // Nothing observed at dev 2 for either period
        let t = triangle(
            &[
                (0, &[(0, 100.0), (1, 120.0)]),
                (1, &[(0, 50.0), (1, 60.0)]),
            ],
            4,
        );
        let set = DevelopmentFactorSet::from_triangle(&t, 1.05).unwrap();
        assert_eq!(set.factors().len(), 3);
        assert_relative_eq!(set.factors()[1], 1.0, epsilon = 1e-12);
        assert_relative_eq!(set.factors()[2], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_individual_ratios() {
        let t = triangle(
            &[
                (0, &[(0, 100.0), (1, 150.0)]),
                (1, &[(0, 200.0), (1, 220.0)]),
            ],
            2,
        );
        let ratios = DevelopmentFactorSet::individual_ratios(&t);
        assert_eq!(ratios.len(), 2);
        assert!(ratios.contains(&1.5));
        assert!(ratios.contains(&1.1));
    }
}
