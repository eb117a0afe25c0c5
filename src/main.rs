//! Reserve Engine CLI
//!
//! Runs all reserving methods and the trend analysis against a claims CSV
//! and prints the result bundle as JSON for the reporting layer.

use anyhow::Context;
use clap::Parser;
use reserve_engine::claims::loader;
use reserve_engine::trends::TrendMetric;
use reserve_engine::{BfInputs, BucketingPolicy, EngineConfig, EstimationEngine, LossTriangle};
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "reserve_engine", about = "Claims reserving and trend analysis")]
struct Args {
    /// Path to the cleaned claims CSV
    /// (age,sex,bmi,children,smoker,region,charges,insuranceclaim)
    input: PathBuf,

    /// Confidence level for intervals
    #[arg(long, default_value_t = 0.95)]
    confidence_level: f64,

    /// Number of development periods
    #[arg(long, default_value_t = 12)]
    development_periods: usize,

    /// Tail factor for development beyond the observed window
    #[arg(long, default_value_t = 1.05)]
    tail_factor: f64,

    /// Expected loss ratio applied to every accident period
    #[arg(long, default_value_t = 0.75)]
    expected_loss_ratio: f64,

    /// Dataset snapshot version (used in cache keys downstream)
    #[arg(long, default_value_t = 1)]
    dataset_version: u64,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let dataset = loader::load_claims(&args.input, args.dataset_version)
        .map_err(|e| anyhow::anyhow!("{e}"))
        .with_context(|| format!("failed to load claims from {}", args.input.display()))?;
    log::info!("loaded {} claim records", dataset.len());

    let config = EngineConfig {
        confidence_level: args.confidence_level,
        development_periods: args.development_periods,
        tail_factor: args.tail_factor,
        ..EngineConfig::default()
    };
    let engine = EstimationEngine::new(config);

    // Exposures per accident period derived from record counts; the flat
    // expected loss ratio scales observed charges as the benchmark ultimate.
    // Production deployments supply real exposure and ELR benchmarks.
    let bucketing = BucketingPolicy::age_banded(args.development_periods);
    let triangle = LossTriangle::build(&dataset, &bucketing, args.development_periods)?;
    let mut exposures = BTreeMap::new();
    let mut loss_ratios = BTreeMap::new();
    for accident in triangle.accident_periods() {
        let latest = triangle.latest_observed(accident).map(|(_, v)| v).unwrap_or(0.0);
        // 20% premium loading over reported charges as the exposure proxy
        exposures.insert(accident, latest * 1.2);
        loss_ratios.insert(accident, args.expected_loss_ratio);
    }
    let bf_inputs = BfInputs {
        expected_loss_ratios: loss_ratios,
        exposures,
    };
    let fs_exposures = BTreeMap::from([(0, dataset.len() as f64)]);

    let bundle = engine.estimate_all(&dataset, &bf_inputs, &fs_exposures, &TrendMetric::all())?;

    let json = if args.pretty {
        serde_json::to_string_pretty(&bundle)?
    } else {
        serde_json::to_string(&bundle)?
    };
    println!("{json}");

    Ok(())
}
