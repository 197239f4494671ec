//! Write a synthetic nested snapshot for demos and benchmarks
//!
//! Usage:
//!   cargo run --bin generate_sample_collection -- [OUTPUT] [COUNT] [SEED]
//!
//! OUTPUT defaults to SNAPSHOT_PATH from the environment, COUNT to 8888, SEED to 42.

use anyhow::{Context, Result};
use doopiedex_engine::sample::{generate_records, nested_snapshot, COLLECTION_SIZE};
use doopiedex_engine::{CollectionStats, EngineConfig};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_SEED: u64 = 42;

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "doopiedex_engine=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = EngineConfig::from_env();
    let mut args = std::env::args().skip(1);

    let output = args.next().map(PathBuf::from).unwrap_or(config.snapshot_path.clone());
    let count = match args.next() {
        Some(count) => count.parse().with_context(|| format!("Invalid record count '{}'", count))?,
        None => COLLECTION_SIZE,
    };
    let seed = match args.next() {
        Some(seed) => seed.parse().with_context(|| format!("Invalid seed '{}'", seed))?,
        None => DEFAULT_SEED,
    };

    println!("{}", "=".repeat(80));
    println!("SAMPLE COLLECTION: {} records, seed {}", count, seed);
    println!("{}", "=".repeat(80));

    let records = generate_records(count, seed);
    let json = nested_snapshot(&records).context("Failed to serialize snapshot")?;

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {:?}", parent))?;
    }
    std::fs::write(&output, json).with_context(|| format!("Failed to write {:?}", output))?;
    tracing::info!("Wrote {} records to {:?}", records.len(), output);

    println!();
    CollectionStats::compute(&records, config.top_species).print_summary();
    println!();
    println!("Snapshot: {}", output.display());

    Ok(())
}
