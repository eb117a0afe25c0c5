//! Estimation engine aggregator
//!
//! Packages the four calculation entry points behind one configured engine.
//! The engine is stateless: every call takes an immutable dataset snapshot
//! and returns a freshly allocated result, so the three reserving methods
//! run in parallel against the same snapshot.

use crate::claims::ClaimDataset;
use crate::error::Result;
use crate::reserves::{
    bornhuetter_ferguson, chain_ladder, frequency_severity, BucketingPolicy, LossTriangle,
    ReserveEstimate, Segmentation,
};
use crate::trends::{self, TrendConfig, TrendMetric, TrendResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

/// Engine configuration supplied by the data-store collaborator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Confidence level for symmetric intervals
    pub confidence_level: f64,

    /// Development horizon (number of development periods)
    pub development_periods: usize,

    /// Tail factor for development beyond the observed window
    pub tail_factor: f64,

    /// Frequency-severity segmentation
    pub segmentation: Segmentation,

    /// Trend analyzer configuration
    pub trend: TrendConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            confidence_level: 0.95,
            development_periods: 12,
            tail_factor: 1.05,
            segmentation: Segmentation::Overall,
            trend: TrendConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Stable fingerprint for memoization keys; float fields hash by their
    /// bit patterns so distinct configurations never collide silently
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.confidence_level.to_bits().hash(&mut hasher);
        self.development_periods.hash(&mut hasher);
        self.tail_factor.to_bits().hash(&mut hasher);
        (self.segmentation == Segmentation::ByAccidentPeriod).hash(&mut hasher);
        self.trend.buckets.hash(&mut hasher);
        self.trend.slope_epsilon.to_bits().hash(&mut hasher);
        self.trend.risk_weights.smoker.to_bits().hash(&mut hasher);
        self.trend.risk_weights.bmi.to_bits().hash(&mut hasher);
        self.trend.risk_weights.age.to_bits().hash(&mut hasher);
        hasher.finish()
    }
}

/// Exogenous Bornhuetter-Ferguson inputs, keyed by accident period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BfInputs {
    /// Expected loss ratio benchmarks per accident period
    pub expected_loss_ratios: BTreeMap<usize, f64>,
    /// Exposure (risk volume) per accident period
    pub exposures: BTreeMap<usize, f64>,
}

/// Complete result bundle for the reporting layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimationBundle {
    pub chain_ladder: ReserveEstimate,
    pub bornhuetter_ferguson: ReserveEstimate,
    pub frequency_severity: ReserveEstimate,
    pub trends: Vec<TrendResult>,
    pub calculated_at: DateTime<Utc>,
}

/// Stateless estimation engine
///
/// Holds configuration and the period bucketing policy; no computation
/// state survives a call, so one engine serves concurrent callers.
#[derive(Debug)]
pub struct EstimationEngine {
    config: EngineConfig,
    bucketing: BucketingPolicy,
}

impl EstimationEngine {
    /// Engine with the default age-banded bucketing policy
    pub fn new(config: EngineConfig) -> Self {
        let bucketing = BucketingPolicy::age_banded(config.development_periods);
        Self { config, bucketing }
    }

    /// Engine with caller-supplied period extractors (e.g., real claim dates)
    pub fn with_bucketing(config: EngineConfig, bucketing: BucketingPolicy) -> Self {
        Self { config, bucketing }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Build the cumulative loss triangle for a snapshot
    pub fn triangle(&self, dataset: &ClaimDataset) -> Result<LossTriangle> {
        LossTriangle::build(dataset, &self.bucketing, self.config.development_periods)
    }

    /// Chain ladder reserves
    pub fn chain_ladder(&self, dataset: &ClaimDataset) -> Result<ReserveEstimate> {
        log::info!("calculating chain ladder reserves (dataset v{})", dataset.version());
        let triangle = self.triangle(dataset)?;
        chain_ladder::estimate(&triangle, self.config.tail_factor, self.config.confidence_level)
    }

    /// Bornhuetter-Ferguson reserves
    pub fn bornhuetter_ferguson(
        &self,
        dataset: &ClaimDataset,
        inputs: &BfInputs,
    ) -> Result<ReserveEstimate> {
        log::info!(
            "calculating bornhuetter-ferguson reserves (dataset v{})",
            dataset.version()
        );
        let triangle = self.triangle(dataset)?;
        bornhuetter_ferguson::estimate(
            &triangle,
            &inputs.expected_loss_ratios,
            &inputs.exposures,
            self.config.tail_factor,
            self.config.confidence_level,
        )
    }

    /// Frequency-severity reserves
    pub fn frequency_severity(
        &self,
        dataset: &ClaimDataset,
        exposures: &BTreeMap<usize, f64>,
    ) -> Result<ReserveEstimate> {
        log::info!(
            "calculating frequency-severity reserves (dataset v{})",
            dataset.version()
        );
        frequency_severity::estimate(
            dataset,
            exposures,
            self.config.segmentation,
            &self.bucketing,
            self.config.confidence_level,
        )
    }

    /// Trend analysis over the requested metrics
    pub fn trend_analysis(
        &self,
        dataset: &ClaimDataset,
        metrics: &[TrendMetric],
    ) -> Result<Vec<TrendResult>> {
        log::info!("analyzing trends (dataset v{})", dataset.version());
        trends::analyze(dataset, metrics, &self.config.trend)
    }

    /// Run all three reserving methods and the trend analysis against one
    /// snapshot. The reserving methods execute in parallel; the whole bundle
    /// fails atomically if any calculation fails.
    pub fn estimate_all(
        &self,
        dataset: &ClaimDataset,
        bf_inputs: &BfInputs,
        fs_exposures: &BTreeMap<usize, f64>,
        metrics: &[TrendMetric],
    ) -> Result<EstimationBundle> {
        let ((cl, bf), fs) = rayon::join(
            || {
                rayon::join(
                    || self.chain_ladder(dataset),
                    || self.bornhuetter_ferguson(dataset, bf_inputs),
                )
            },
            || self.frequency_severity(dataset, fs_exposures),
        );

        let bundle = EstimationBundle {
            chain_ladder: cl?,
            bornhuetter_ferguson: bf?,
            frequency_severity: fs?,
            trends: self.trend_analysis(dataset, metrics)?,
            calculated_at: Utc::now(),
        };
        log::info!(
            "estimation complete: cl {:.2}, bf {:.2}, fs {:.2}, {} trends",
            bundle.chain_ladder.total_reserves,
            bundle.bornhuetter_ferguson.total_reserves,
            bundle.frequency_severity.total_reserves,
            bundle.trends.len()
        );
        Ok(bundle)
    }
}

impl Default for EstimationEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
