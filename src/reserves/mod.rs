//! Reserve estimation: triangle construction and the three reserving methods
//!
//! This module provides claim liability projection under three independent
//! methods sharing one development-factor derivation:
//! - **Chain ladder**: volume-weighted age-to-age factors projected to a
//!   configured tail
//! - **Bornhuetter-Ferguson**: exogenous expected-loss-ratio projections
//!   blended with observed development (identical factors to chain ladder)
//! - **Frequency-severity**: claims-per-exposure times average claim size,
//!   with delta-method variance
//!
//! All estimators are pure functions over immutable snapshots; repeated
//! calls with the same inputs are bit-identical. Memoization, when wanted,
//! is the caller's explicit [`ResultCache`].

mod cache;
mod factors;
mod triangle;
mod types;

pub mod bornhuetter_ferguson;
pub mod chain_ladder;
pub mod frequency_severity;

pub use cache::{CacheKey, ResultCache};
pub use factors::DevelopmentFactorSet;
pub use frequency_severity::Segmentation;
pub use triangle::{BucketingPolicy, LossTriangle, PeriodExtractor};
pub use types::{ReserveEstimate, ReserveMethod};
