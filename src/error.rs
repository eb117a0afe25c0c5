//! Error taxonomy for the estimation engine
//!
//! Every failure is atomic: an estimator either returns a complete result or
//! one of these typed errors naming the accident period, transition, or
//! segment that caused it. Nothing is silently coerced (a non-finite
//! development factor is an error, never treated as 1.0).

use thiserror::Error;

/// Errors raised by the estimation engine
#[derive(Debug, Error)]
pub enum EngineError {
    /// Not enough periods, records, or buckets to fit a method
    #[error("insufficient data: {0}")]
    InsufficientData(String),

    /// A development factor is non-finite or below 1.0
    #[error("degenerate development factor {value} at development transition {transition}")]
    DegenerateFactor { transition: usize, value: f64 },

    /// Bornhuetter-Ferguson lacks an exposure or expected loss ratio input
    #[error("missing exposure or expected loss ratio for accident period {0}")]
    MissingExposure(usize),

    /// Frequency-severity segment has no observations
    #[error("degenerate segment {0}: no observations or non-positive exposure")]
    DegenerateSegment(String),
}

/// Convenience alias used throughout the engine
pub type Result<T> = std::result::Result<T, EngineError>;
