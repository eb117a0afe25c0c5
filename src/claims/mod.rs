//! Claim record data model and CSV ingestion
//!
//! The engine treats the dataset as a finalized, schema-validated snapshot:
//! records are immutable, the collection is read-only, and each snapshot
//! carries a version used as part of memoization keys.

mod data;
pub mod loader;

pub use data::{ClaimDataset, ClaimRecord, Region, Sex};
