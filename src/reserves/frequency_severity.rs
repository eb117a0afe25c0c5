//! Frequency-severity reserve estimation
//!
//! Decomposes claims into frequency (claims per exposure unit) and severity
//! (average claim size), projecting ultimate losses as their product per
//! segment. The interval comes from delta-method variance for a product of
//! two random variables: Var(F*S) ~= F^2 Var(S) + S^2 Var(F), the standard
//! first-order approximation under treated-as-exact independence.

use crate::claims::{ClaimDataset, ClaimRecord};
use crate::error::{EngineError, Result};
use crate::reserves::triangle::BucketingPolicy;
use crate::reserves::types::{ReserveEstimate, ReserveMethod};
use crate::stats::z_score;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How records are segmented for frequency/severity estimation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Segmentation {
    /// One segment covering the whole dataset (keyed as segment 0)
    Overall,
    /// One segment per accident period from the bucketing policy
    ByAccidentPeriod,
}

/// Estimate reserves from frequency and severity per segment.
///
/// frequency = claimed count / exposure; severity = mean claimed charges;
/// ultimate = frequency x severity x exposure; reserve = ultimate minus
/// charges reported to date. Exposures are exogenous risk volumes keyed by
/// segment (the single key 0 for `Segmentation::Overall`).
///
/// A segment with records but zero claims has undefined severity and
/// contributes reserve 0 with zero variance rather than dividing by zero.
/// A segment with no records at all, a missing exposure entry, or a
/// non-positive exposure fails with `DegenerateSegment`.
pub fn estimate(
    dataset: &ClaimDataset,
    exposures: &BTreeMap<usize, f64>,
    segmentation: Segmentation,
    policy: &BucketingPolicy,
    confidence_level: f64,
) -> Result<ReserveEstimate> {
    if dataset.is_empty() {
        return Err(EngineError::InsufficientData(
            "frequency-severity requires at least one record".to_string(),
        ));
    }

    let mut segments: BTreeMap<usize, Vec<&ClaimRecord>> = BTreeMap::new();
    match segmentation {
        Segmentation::Overall => {
            segments.insert(0, dataset.records().iter().collect());
        }
        Segmentation::ByAccidentPeriod => {
            for record in dataset.records() {
                segments
                    .entry(policy.accident_period(record))
                    .or_default()
                    .push(record);
            }
        }
    }

    let mut by_period = BTreeMap::new();
    let mut total_reserves = 0.0;
    let mut total_variance = 0.0;
    for (segment, records) in &segments {
        let exposure = exposures
            .get(segment)
            .copied()
            .filter(|&e| e > 0.0)
            .ok_or_else(|| EngineError::DegenerateSegment(segment.to_string()))?;
        if records.is_empty() {
            return Err(EngineError::DegenerateSegment(segment.to_string()));
        }

        let projection = project_segment(records, exposure);
        total_reserves += projection.reserve;
        total_variance += projection.variance;
        by_period.insert(*segment, projection.reserve);
    }

    let half_width = if total_variance > 0.0 {
        z_score(confidence_level) * total_variance.sqrt()
    } else {
        0.0
    };
    log::debug!(
        "frequency-severity: total reserves {:.2}, interval half-width {:.2}",
        total_reserves,
        half_width
    );

    Ok(ReserveEstimate {
        method: ReserveMethod::FrequencySeverity,
        total_reserves,
        confidence_interval: (total_reserves - half_width, total_reserves + half_width),
        by_period,
    })
}

struct SegmentProjection {
    reserve: f64,
    variance: f64,
}

fn project_segment(records: &[&ClaimRecord], exposure: f64) -> SegmentProjection {
    let claimed: Vec<&&ClaimRecord> = records.iter().filter(|r| r.claimed).collect();
    let claim_count = claimed.len() as f64;

    // Zero claims: severity undefined, report a degenerate zero-width
    // contribution instead of dividing by zero
    if claimed.is_empty() {
        return SegmentProjection {
            reserve: 0.0,
            variance: 0.0,
        };
    }

    let frequency = claim_count / exposure;
    let severity = claimed.iter().map(|r| r.charges).sum::<f64>() / claim_count;
    let reported = claimed.iter().map(|r| r.charges).sum::<f64>();

    let ultimate = frequency * severity * exposure;
    let reserve = ultimate - reported;

    // Binomial-style frequency variance and sampling variance of the mean
    // severity, combined by the delta method and scaled to the exposure
    let frequency_variance = frequency * (1.0 - frequency).max(0.0) / exposure;
    let severity_variance = if claimed.len() > 1 {
        let sample_var = claimed
            .iter()
            .map(|r| (r.charges - severity).powi(2))
            .sum::<f64>()
            / (claim_count - 1.0);
        sample_var / claim_count
    } else {
        0.0
    };
    let product_variance =
        frequency * frequency * severity_variance + severity * severity * frequency_variance;
    let variance = exposure * exposure * product_variance;

    SegmentProjection { reserve, variance }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claims::{Region, Sex};
    use approx::assert_relative_eq;

    fn record(age: u8, charges: f64, claimed: bool) -> ClaimRecord {
        ClaimRecord {
            age,
            sex: Sex::Male,
            bmi: 30.0,
            children: 0,
            smoker: false,
            region: Region::Northwest,
            charges,
            claimed,
        }
    }

    fn overall_exposure(value: f64) -> BTreeMap<usize, f64> {
        BTreeMap::from([(0, value)])
    }

    #[test]
    fn test_half_frequency_projection() {
        // 50 claims of $10,000 against exposure 100:
        // frequency 0.5, severity 10,000 -> ultimate 0.5 * 10,000 * 100
        let mut records = Vec::new();
        for _ in 0..50 {
            records.push(record(40, 10_000.0, true));
        }
        for _ in 0..50 {
            records.push(record(40, 0.0, false));
        }
        let dataset = ClaimDataset::new(1, records);

        let claimed: f64 = 50.0;
        let exposure = 100.0;
        let frequency = claimed / exposure;
        let ultimate = frequency * 10_000.0 * exposure;
        assert_relative_eq!(ultimate, 500_000.0, epsilon = 1e-9);

        let result = estimate(
            &dataset,
            &overall_exposure(exposure),
            Segmentation::Overall,
            &BucketingPolicy::age_banded(12),
            0.95,
        )
        .unwrap();

        // Reported to date equals the projected ultimate here, so the point
        // reserve is zero while the interval still reflects sampling error
        assert_relative_eq!(result.total_reserves, 0.0, epsilon = 1e-9);
        let (low, high) = result.confidence_interval;
        assert!(high > low);
    }

    #[test]
    fn test_zero_claims_segment_is_degenerate_interval() {
        let dataset = ClaimDataset::new(1, vec![record(30, 0.0, false), record(35, 0.0, false)]);
        let result = estimate(
            &dataset,
            &overall_exposure(50.0),
            Segmentation::Overall,
            &BucketingPolicy::age_banded(12),
            0.95,
        )
        .unwrap();

        assert_eq!(result.total_reserves, 0.0);
        assert_eq!(result.confidence_interval, (0.0, 0.0));
    }

    #[test]
    fn test_missing_exposure_is_degenerate_segment() {
        let dataset = ClaimDataset::new(1, vec![record(30, 100.0, true)]);
        let result = estimate(
            &dataset,
            &BTreeMap::new(),
            Segmentation::Overall,
            &BucketingPolicy::age_banded(12),
            0.95,
        );
        assert!(matches!(result, Err(EngineError::DegenerateSegment(_))));
    }

    #[test]
    fn test_non_positive_exposure_is_degenerate_segment() {
        let dataset = ClaimDataset::new(1, vec![record(30, 100.0, true)]);
        let result = estimate(
            &dataset,
            &overall_exposure(0.0),
            Segmentation::Overall,
            &BucketingPolicy::age_banded(12),
            0.95,
        );
        assert!(matches!(result, Err(EngineError::DegenerateSegment(_))));
    }

    #[test]
    fn test_empty_dataset_is_insufficient() {
        let dataset = ClaimDataset::new(1, vec![]);
        let result = estimate(
            &dataset,
            &overall_exposure(10.0),
            Segmentation::Overall,
            &BucketingPolicy::age_banded(12),
            0.95,
        );
        assert!(matches!(result, Err(EngineError::InsufficientData(_))));
    }

    #[test]
    fn test_by_accident_period_segments() {
        // Two age bands, exposures exceeding observed counts so frequency
        // projects growth beyond reported charges
        let records = vec![
            record(20, 1_000.0, true),
            record(25, 3_000.0, true),
            record(50, 2_000.0, true),
            record(55, 0.0, false),
        ];
        let dataset = ClaimDataset::new(1, records);
        let exposures = BTreeMap::from([(0, 10.0), (3, 10.0)]);

        let result = estimate(
            &dataset,
            &exposures,
            Segmentation::ByAccidentPeriod,
            &BucketingPolicy::age_banded(12),
            0.95,
        )
        .unwrap();

        assert_eq!(result.by_period.len(), 2);
        assert!(result.by_period.contains_key(&0));
        assert!(result.by_period.contains_key(&3));
    }

    #[test]
    fn test_idempotent_bit_identical() {
        let dataset = ClaimDataset::new(
            1,
            vec![
                record(30, 5_000.0, true),
                record(31, 7_000.0, true),
                record(32, 0.0, false),
            ],
        );
        let exposures = overall_exposure(20.0);
        let policy = BucketingPolicy::age_banded(12);
        let first = estimate(&dataset, &exposures, Segmentation::Overall, &policy, 0.95).unwrap();
        let second = estimate(&dataset, &exposures, Segmentation::Overall, &policy, 0.95).unwrap();
        assert_eq!(
            first.confidence_interval.0.to_bits(),
            second.confidence_interval.0.to_bits()
        );
        assert_eq!(first, second);
    }
}
