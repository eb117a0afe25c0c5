//! Reserve Engine - Actuarial estimation engine for insurance claims
//!
//! This library provides:
//! - Cumulative loss triangle construction with pluggable period bucketing
//! - Reserve projection via chain ladder, Bornhuetter-Ferguson, and
//!   frequency-severity methods, each with confidence intervals
//! - Regression-based trend analysis with significance testing over
//!   demographic/risk dimensions
//! - A stateless aggregator engine with explicit result memoization

pub mod claims;
pub mod engine;
pub mod error;
pub mod reserves;
pub mod stats;
pub mod trends;

// Re-export commonly used types
pub use claims::{ClaimDataset, ClaimRecord, Region, Sex};
pub use engine::{BfInputs, EngineConfig, EstimationBundle, EstimationEngine};
pub use error::{EngineError, Result};
pub use reserves::{
    BucketingPolicy, DevelopmentFactorSet, LossTriangle, ReserveEstimate, ReserveMethod,
    ResultCache, Segmentation,
};
pub use trends::{TrendConfig, TrendDirection, TrendMetric, TrendResult};
