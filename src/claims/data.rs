//! Claim record data structures matching the cleaned claims table format

use serde::{Deserialize, Serialize};

/// Sex of the insured, as encoded in the source table (0 = female, 1 = male)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sex {
    Female,
    Male,
}

/// Region of the insured, as encoded in the source table (0..3)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Region {
    Northeast,
    Northwest,
    Southeast,
    Southwest,
}

impl Region {
    /// Decode the integer region code used by the source table
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Region::Northeast),
            1 => Some(Region::Northwest),
            2 => Some(Region::Southeast),
            3 => Some(Region::Southwest),
            _ => None,
        }
    }
}

/// A single validated claim record
///
/// Immutable value object. Domain validation (plausible age/bmi/children
/// ranges, non-negative charges) happens upstream in the data pipeline; the
/// engine trusts the schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimRecord {
    /// Age of the insured in years
    pub age: u8,

    /// Sex of the insured
    pub sex: Sex,

    /// Body mass index
    pub bmi: f64,

    /// Number of covered dependents
    pub children: u8,

    /// Whether the insured is a smoker
    pub smoker: bool,

    /// Region of the insured
    pub region: Region,

    /// Billed charges, always >= 0
    pub charges: f64,

    /// Whether an insurance claim was filed
    pub claimed: bool,
}

/// A read-only snapshot of claim records
///
/// Constructed once per upload/reset by the external loader; the engine
/// never mutates it. The version distinguishes snapshots so cached results
/// for a replaced dataset are never served.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimDataset {
    version: u64,
    records: Vec<ClaimRecord>,
}

impl ClaimDataset {
    /// Wrap a finalized set of records as a versioned snapshot
    pub fn new(version: u64, records: Vec<ClaimRecord>) -> Self {
        Self { version, records }
    }

    /// Snapshot version, used in memoization keys
    pub fn version(&self) -> u64 {
        self.version
    }

    /// All records in upload order
    pub fn records(&self) -> &[ClaimRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
