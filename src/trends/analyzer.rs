//! Trend analysis over demographic/risk dimensions
//!
//! Buckets records into fixed-width age bands, computes a metric value per
//! non-empty bucket, and fits a linear regression of the metric against the
//! bucket ordinal. Direction is gated by a configurable near-zero slope
//! threshold; strength is the scale-invariant R-squared; the raw p-value is
//! always reported so callers decide what to suppress.

use crate::claims::{ClaimDataset, ClaimRecord};
use crate::error::{EngineError, Result};
use crate::trends::regression;
use serde::{Deserialize, Serialize};

/// Metric analyzed per age bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendMetric {
    /// Share of records with a filed claim
    ClaimFrequency,
    /// Mean billed charges
    AverageCharges,
    /// Mean body mass index
    AverageBmi,
    /// Share of smokers
    SmokerRate,
}

impl TrendMetric {
    /// Stable identifier for reporting
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendMetric::ClaimFrequency => "claim_frequency",
            TrendMetric::AverageCharges => "average_charges",
            TrendMetric::AverageBmi => "average_bmi",
            TrendMetric::SmokerRate => "smoker_rate",
        }
    }

    /// All metrics, in reporting order
    pub fn all() -> [TrendMetric; 4] {
        [
            TrendMetric::ClaimFrequency,
            TrendMetric::AverageCharges,
            TrendMetric::AverageBmi,
            TrendMetric::SmokerRate,
        ]
    }

    fn value(&self, record: &ClaimRecord) -> f64 {
        match self {
            TrendMetric::ClaimFrequency => {
                if record.claimed {
                    1.0
                } else {
                    0.0
                }
            }
            TrendMetric::AverageCharges => record.charges,
            TrendMetric::AverageBmi => record.bmi,
            TrendMetric::SmokerRate => {
                if record.smoker {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }
}

/// Direction of a fitted trend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
}

/// Weights for the composite risk score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskWeights {
    pub smoker: f64,
    pub bmi: f64,
    pub age: f64,
}

impl Default for RiskWeights {
    fn default() -> Self {
        Self {
            smoker: 0.5,
            bmi: 0.3,
            age: 0.2,
        }
    }
}

impl RiskWeights {
    /// Normalized risk score for one record, in [0, 1]
    pub fn score(&self, record: &ClaimRecord) -> f64 {
        let total = self.smoker + self.bmi + self.age;
        if total <= 0.0 {
            return 0.0;
        }
        let smoker = if record.smoker { 1.0 } else { 0.0 };
        let bmi = (record.bmi / 50.0).clamp(0.0, 1.0);
        let age = (f64::from(record.age) / 100.0).clamp(0.0, 1.0);
        (self.smoker * smoker + self.bmi * bmi + self.age * age) / total
    }
}

/// Configuration for the trend analyzer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendConfig {
    /// Number of fixed-width age buckets
    pub buckets: usize,

    /// Slopes within +/- this threshold are reported as stable, so noise is
    /// never flagged as a trend
    pub slope_epsilon: f64,

    /// Weights for the composite risk score
    pub risk_weights: RiskWeights,
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            buckets: 5,
            slope_epsilon: 1e-6,
            risk_weights: RiskWeights::default(),
        }
    }
}

/// Trend signal for one metric
///
/// `trend_strength` and `p_value` are statistical estimates from the
/// regression; `risk_score` is a derived convenience metric (weighted
/// normalized risk factors over the highest-claim-rate bucket) and carries
/// no significance of its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendResult {
    /// Metric identifier
    pub metric: String,

    /// Fitted direction after the epsilon gate
    pub trend_direction: TrendDirection,

    /// R-squared of the fit, in [0, 1]
    pub trend_strength: f64,

    /// Two-sided p-value of the slope t-test, in [0, 1]
    pub p_value: f64,

    /// Raw fitted slope (metric units per bucket)
    pub slope: f64,

    /// Composite risk score of the riskiest bucket
    pub risk_score: f64,
}

/// Analyze the configured metrics over a dataset snapshot.
///
/// Returns one `TrendResult` per requested metric, in request order. Every
/// metric is always reported with its raw statistics; nothing is dropped
/// for non-significance. Fails with `InsufficientData` when fewer than two
/// non-empty buckets exist.
pub fn analyze(
    dataset: &ClaimDataset,
    metrics: &[TrendMetric],
    config: &TrendConfig,
) -> Result<Vec<TrendResult>> {
    let buckets = bucket_records(dataset, config.buckets)?;
    let risk_score = riskiest_bucket_score(&buckets, &config.risk_weights);

    let mut results = Vec::with_capacity(metrics.len());
    for metric in metrics {
        let series: Vec<f64> = buckets
            .iter()
            .map(|bucket| {
                bucket.iter().map(|r| metric.value(r)).sum::<f64>() / bucket.len() as f64
            })
            .collect();

        let fit = regression::fit(&series).ok_or_else(|| {
            EngineError::InsufficientData(format!(
                "trend analysis for {} needs at least 2 buckets",
                metric.as_str()
            ))
        })?;

        let trend_direction = if fit.slope > config.slope_epsilon {
            TrendDirection::Increasing
        } else if fit.slope < -config.slope_epsilon {
            TrendDirection::Decreasing
        } else {
            TrendDirection::Stable
        };

        log::debug!(
            "trend {}: slope {:.6}, r2 {:.4}, p {:.4}",
            metric.as_str(),
            fit.slope,
            fit.r_squared,
            fit.p_value
        );

        results.push(TrendResult {
            metric: metric.as_str().to_string(),
            trend_direction,
            trend_strength: fit.r_squared,
            p_value: fit.p_value,
            slope: fit.slope,
            risk_score,
        });
    }

    Ok(results)
}

/// Partition records into fixed-width age buckets, dropping empty buckets
/// (absent, not zero) while preserving age order
fn bucket_records(dataset: &ClaimDataset, bucket_count: usize) -> Result<Vec<Vec<&ClaimRecord>>> {
    if bucket_count < 2 {
        return Err(EngineError::InsufficientData(
            "trend analysis requires at least 2 buckets".to_string(),
        ));
    }
    let records = dataset.records();
    let (min_age, max_age) = match records
        .iter()
        .map(|r| r.age)
        .fold(None, |acc: Option<(u8, u8)>, age| match acc {
            None => Some((age, age)),
            Some((lo, hi)) => Some((lo.min(age), hi.max(age))),
        }) {
        Some(range) => range,
        None => {
            return Err(EngineError::InsufficientData(
                "trend analysis requires at least one record".to_string(),
            ))
        }
    };

    let span = f64::from(max_age - min_age);
    let width = (span / bucket_count as f64).max(f64::EPSILON);

    let mut buckets: Vec<Vec<&ClaimRecord>> = vec![Vec::new(); bucket_count];
    for record in records {
        let offset = f64::from(record.age - min_age);
        let index = ((offset / width) as usize).min(bucket_count - 1);
        buckets[index].push(record);
    }

    let non_empty: Vec<Vec<&ClaimRecord>> =
        buckets.into_iter().filter(|b| !b.is_empty()).collect();
    if non_empty.len() < 2 {
        return Err(EngineError::InsufficientData(format!(
            "trend analysis requires at least 2 non-empty buckets, found {}",
            non_empty.len()
        )));
    }
    Ok(non_empty)
}

/// Mean per-record risk score of the bucket with the highest claim rate
fn riskiest_bucket_score(buckets: &[Vec<&ClaimRecord>], weights: &RiskWeights) -> f64 {
    let riskiest = buckets.iter().max_by(|a, b| {
        let rate_a = claim_rate(a);
        let rate_b = claim_rate(b);
        rate_a.partial_cmp(&rate_b).unwrap_or(std::cmp::Ordering::Equal)
    });
    match riskiest {
        Some(bucket) => {
            bucket.iter().map(|r| weights.score(r)).sum::<f64>() / bucket.len() as f64
        }
        None => 0.0,
    }
}

fn claim_rate(bucket: &[&ClaimRecord]) -> f64 {
    bucket.iter().filter(|r| r.claimed).count() as f64 / bucket.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claims::{Region, Sex};
    use approx::assert_relative_eq;

    fn record(age: u8, bmi: f64, smoker: bool, charges: f64, claimed: bool) -> ClaimRecord {
        ClaimRecord {
            age,
            sex: Sex::Female,
            bmi,
            children: 0,
            smoker,
            region: Region::Southeast,
            charges,
            claimed,
        }
    }

    /// Four age buckets with claim rates 0.1, 0.2, 0.3, 0.4 (10 records each)
    fn linear_claim_rate_dataset() -> ClaimDataset {
        let mut records = Vec::new();
        for (bucket, claims) in [(0u8, 1usize), (1, 2), (2, 3), (3, 4)] {
            let age = 20 + bucket * 10;
            for i in 0..10 {
                records.push(record(age, 25.0, false, 1_000.0, i < claims));
            }
        }
        ClaimDataset::new(1, records)
    }

    #[test]
    fn test_linear_claim_rate_is_increasing_and_significant() {
        let config = TrendConfig {
            buckets: 4,
            ..TrendConfig::default()
        };
        let results = analyze(
            &linear_claim_rate_dataset(),
            &[TrendMetric::ClaimFrequency],
            &config,
        )
        .unwrap();

        let trend = &results[0];
        assert_eq!(trend.metric, "claim_frequency");
        assert_eq!(trend.trend_direction, TrendDirection::Increasing);
        assert_relative_eq!(trend.trend_strength, 1.0, epsilon = 1e-9);
        assert!(trend.p_value < 0.05);
        assert_relative_eq!(trend.slope, 0.1, epsilon = 1e-9);
    }

    #[test]
    fn test_flat_metric_is_stable() {
        let config = TrendConfig {
            buckets: 4,
            ..TrendConfig::default()
        };
        // BMI constant across buckets
        let results = analyze(
            &linear_claim_rate_dataset(),
            &[TrendMetric::AverageBmi],
            &config,
        )
        .unwrap();
        assert_eq!(results[0].trend_direction, TrendDirection::Stable);
    }

    #[test]
    fn test_results_follow_request_order() {
        let results = analyze(
            &linear_claim_rate_dataset(),
            &[TrendMetric::SmokerRate, TrendMetric::ClaimFrequency],
            &TrendConfig::default(),
        )
        .unwrap();
        assert_eq!(results[0].metric, "smoker_rate");
        assert_eq!(results[1].metric, "claim_frequency");
    }

    #[test]
    fn test_risk_score_reflects_riskiest_bucket() {
        // Older bucket has all the claims and all the smokers
        let mut records = Vec::new();
        for _ in 0..5 {
            records.push(record(25, 22.0, false, 500.0, false));
            records.push(record(60, 35.0, true, 20_000.0, true));
        }
        let dataset = ClaimDataset::new(1, records);
        let config = TrendConfig {
            buckets: 2,
            ..TrendConfig::default()
        };
        let results = analyze(&dataset, &[TrendMetric::ClaimFrequency], &config).unwrap();

        let weights = RiskWeights::default();
        let expected = weights.score(&record(60, 35.0, true, 20_000.0, true));
        assert_relative_eq!(results[0].risk_score, expected, epsilon = 1e-12);
        // Distinct from the statistical outputs
        assert!(results[0].risk_score > 0.0 && results[0].risk_score <= 1.0);
    }

    #[test]
    fn test_single_age_is_insufficient() {
        let dataset = ClaimDataset::new(1, vec![record(30, 25.0, false, 100.0, true); 5]);
        let result = analyze(&dataset, &[TrendMetric::ClaimFrequency], &TrendConfig::default());
        assert!(matches!(result, Err(EngineError::InsufficientData(_))));
    }

    #[test]
    fn test_empty_dataset_is_insufficient() {
        let dataset = ClaimDataset::new(1, vec![]);
        let result = analyze(&dataset, &[TrendMetric::ClaimFrequency], &TrendConfig::default());
        assert!(matches!(result, Err(EngineError::InsufficientData(_))));
    }
}
