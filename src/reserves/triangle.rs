//! Cumulative loss triangle construction
//!
//! Groups claim records into accident-period / development-period cells and
//! accumulates charges. The raw claims table carries no explicit claim date,
//! so both period keys are derived from record attributes through a
//! pluggable [`BucketingPolicy`]; production callers with dated claims
//! supply their own extractors.

use crate::claims::{ClaimDataset, ClaimRecord};
use crate::error::{EngineError, Result};
use std::collections::BTreeMap;

/// Extracts a period index from a record
pub type PeriodExtractor = Box<dyn Fn(&ClaimRecord) -> usize + Send + Sync>;

/// Pluggable accident/development period derivation
pub struct BucketingPolicy {
    accident: PeriodExtractor,
    development: PeriodExtractor,
}

impl BucketingPolicy {
    /// Build a policy from explicit extractor closures
    pub fn new<A, D>(accident: A, development: D) -> Self
    where
        A: Fn(&ClaimRecord) -> usize + Send + Sync + 'static,
        D: Fn(&ClaimRecord) -> usize + Send + Sync + 'static,
    {
        Self {
            accident: Box::new(accident),
            development: Box::new(development),
        }
    }

    /// Default derivation for the undated claims table: accident period from
    /// fixed-width age bands (18-27, 28-37, ..., 58+), development period
    /// from the dependent count capped at the development horizon.
    pub fn age_banded(development_periods: usize) -> Self {
        let dev_cap = development_periods.saturating_sub(1);
        Self::new(
            |record| (usize::from(record.age.saturating_sub(18)) / 10).min(4),
            move |record| usize::from(record.children).min(dev_cap),
        )
    }

    /// Accident period index for a record
    pub fn accident_period(&self, record: &ClaimRecord) -> usize {
        (self.accident)(record)
    }

    /// Development period index for a record
    pub fn development_period(&self, record: &ClaimRecord) -> usize {
        (self.development)(record)
    }
}

impl std::fmt::Debug for BucketingPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BucketingPolicy").finish_non_exhaustive()
    }
}

/// Cumulative loss triangle
///
/// Maps accident period -> development period -> cumulative loss. A cell is
/// present only where the accident period has at least one record at that
/// development period; an unobserved cell is absent, never zero, and factor
/// computation skips it.
#[derive(Debug, Clone, PartialEq)]
pub struct LossTriangle {
    cells: BTreeMap<usize, BTreeMap<usize, f64>>,
    development_periods: usize,
}

impl LossTriangle {
    /// Build a triangle from a dataset snapshot.
    ///
    /// Cumulative loss at (a, d) = sum of charges of all records in accident
    /// period a with development period <= d. Rows are non-decreasing by
    /// construction since charges are non-negative.
    pub fn build(
        dataset: &ClaimDataset,
        policy: &BucketingPolicy,
        development_periods: usize,
    ) -> Result<Self> {
        // Incremental losses per observed (accident, development) cell
        let mut incremental: BTreeMap<usize, BTreeMap<usize, f64>> = BTreeMap::new();
        for record in dataset.records() {
            let accident = policy.accident_period(record);
            let development = policy.development_period(record).min(
                development_periods.saturating_sub(1),
            );
            *incremental
                .entry(accident)
                .or_default()
                .entry(development)
                .or_insert(0.0) += record.charges;
        }

        // Accumulate within each accident period, keeping only observed cells
        let mut cells: BTreeMap<usize, BTreeMap<usize, f64>> = BTreeMap::new();
        for (accident, row) in incremental {
            let mut running = 0.0;
            let mut cumulative = BTreeMap::new();
            for (development, amount) in row {
                running += amount;
                cumulative.insert(development, running);
            }
            cells.insert(accident, cumulative);
        }

        Self::from_cells(cells, development_periods)
    }

    /// Construct a triangle from externally assembled cumulative cells
    /// (e.g., a prepared triangle from a dated claims system).
    pub fn from_cells(
        cells: BTreeMap<usize, BTreeMap<usize, f64>>,
        development_periods: usize,
    ) -> Result<Self> {
        if cells.len() < 2 {
            return Err(EngineError::InsufficientData(format!(
                "chain ladder requires at least 2 accident periods, found {}",
                cells.len()
            )));
        }
        Ok(Self {
            cells,
            development_periods,
        })
    }

    /// Accident periods present, in ascending order
    pub fn accident_periods(&self) -> impl Iterator<Item = usize> + '_ {
        self.cells.keys().copied()
    }

    /// Number of accident periods
    pub fn accident_period_count(&self) -> usize {
        self.cells.len()
    }

    /// Configured development horizon (number of development periods)
    pub fn development_periods(&self) -> usize {
        self.development_periods
    }

    /// Cumulative loss at a cell, absent if unobserved
    pub fn cell(&self, accident: usize, development: usize) -> Option<f64> {
        self.cells.get(&accident)?.get(&development).copied()
    }

    /// Latest observed (development period, cumulative loss) for an
    /// accident period
    pub fn latest_observed(&self, accident: usize) -> Option<(usize, f64)> {
        self.cells
            .get(&accident)?
            .iter()
            .next_back()
            .map(|(&d, &v)| (d, v))
    }

    /// Total of the latest observed cumulative losses (the diagonal)
    pub fn reported_to_date(&self) -> f64 {
        self.cells
            .keys()
            .filter_map(|&a| self.latest_observed(a))
            .map(|(_, v)| v)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claims::{ClaimRecord, Region, Sex};

    fn record(age: u8, children: u8, charges: f64) -> ClaimRecord {
        ClaimRecord {
            age,
            sex: Sex::Female,
            bmi: 28.0,
            children,
            smoker: false,
            region: Region::Northeast,
            charges,
            claimed: true,
        }
    }

    fn dataset(records: Vec<ClaimRecord>) -> ClaimDataset {
        ClaimDataset::new(1, records)
    }

    #[test]
    fn test_build_accumulates_charges() {
        let data = dataset(vec![
            record(20, 0, 100.0),
            record(22, 1, 50.0),
            record(45, 0, 200.0),
        ]);
        let policy = BucketingPolicy::age_banded(12);
        let triangle = LossTriangle::build(&data, &policy, 12).unwrap();

        // Age band 0: cumulative 100 at dev 0, 150 at dev 1
        assert_eq!(triangle.cell(0, 0), Some(100.0));
        assert_eq!(triangle.cell(0, 1), Some(150.0));
        // Age band 2: single cell
        assert_eq!(triangle.cell(2, 0), Some(200.0));
        assert_eq!(triangle.latest_observed(2), Some((0, 200.0)));
    }

    #[test]
    fn test_unobserved_cell_is_absent_not_zero() {
        let data = dataset(vec![
            record(20, 0, 100.0),
            record(21, 2, 40.0), // dev 2, nothing at dev 1
            record(45, 0, 200.0),
        ]);
        let policy = BucketingPolicy::age_banded(12);
        let triangle = LossTriangle::build(&data, &policy, 12).unwrap();

        assert_eq!(triangle.cell(0, 1), None);
        assert_eq!(triangle.cell(0, 2), Some(140.0));
    }

    #[test]
    fn test_rows_are_non_decreasing() {
        let data = dataset(vec![
            record(20, 0, 100.0),
            record(21, 1, 0.0),
            record(22, 2, 75.0),
            record(50, 0, 10.0),
        ]);
        let policy = BucketingPolicy::age_banded(12);
        let triangle = LossTriangle::build(&data, &policy, 12).unwrap();

        let mut previous = f64::NEG_INFINITY;
        for d in 0..12 {
            if let Some(value) = triangle.cell(0, d) {
                assert!(value >= previous);
                previous = value;
            }
        }
    }

    #[test]
    fn test_single_accident_period_is_insufficient() {
        let data = dataset(vec![record(20, 0, 100.0), record(22, 1, 50.0)]);
        let policy = BucketingPolicy::age_banded(12);
        let result = LossTriangle::build(&data, &policy, 12);
        assert!(matches!(result, Err(EngineError::InsufficientData(_))));
    }

    #[test]
    fn test_custom_extractors() {
        let data = dataset(vec![record(20, 0, 10.0), record(60, 0, 20.0)]);
        let policy = BucketingPolicy::new(
            |r| if r.age < 40 { 0 } else { 1 },
            |_| 0,
        );
        let triangle = LossTriangle::build(&data, &policy, 4).unwrap();
        assert_eq!(triangle.cell(0, 0), Some(10.0));
        assert_eq!(triangle.cell(1, 0), Some(20.0));
        assert_eq!(triangle.accident_period_count(), 2);
    }

    #[test]
    fn test_reported_to_date_sums_diagonal() {
        let mut cells = BTreeMap::new();
        cells.insert(0, BTreeMap::from([(0, 100.0), (1, 150.0)]));
        cells.insert(1, BTreeMap::from([(0, 80.0)]));
        let triangle = LossTriangle::from_cells(cells, 2).unwrap();
        assert!((triangle.reported_to_date() - 230.0).abs() < 1e-12);
    }
}
