//! Build the rarity table and the organized collection from a snapshot
//!
//! Usage:
//!   cargo run --release --bin build_rarity -- [SNAPSHOT] [RARITY_OUT] [ORGANIZED_OUT]
//!
//! Paths default to the `EngineConfig` environment (DATA_DIR, SNAPSHOT_PATH, ...).

use anyhow::{Context, Result};
use doopiedex_engine::{build_artifacts, CollectionData, CollectionStats, EngineConfig};
use std::time::Instant;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "doopiedex_engine=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = EngineConfig::from_env().with_args(std::env::args().skip(1));
    config.log_summary();

    println!("{}", "=".repeat(80));
    println!("DOOPIEDEX RARITY BUILD");
    println!("{}", "=".repeat(80));
    println!();

    let total_start = Instant::now();

    // Load + validate
    let data = CollectionData::load(&config.snapshot_path)
        .with_context(|| format!("Failed to load snapshot {:?}", config.snapshot_path))?;

    let stats = CollectionStats::compute(data.records(), config.top_species);
    stats.print_summary();
    println!();

    // Build
    let build_start = Instant::now();
    let output = build_artifacts(&data).context("Rarity build failed")?;
    let build_time = build_start.elapsed();

    // Persist
    output
        .rarity
        .save(&config.rarity_output)
        .with_context(|| format!("Failed to write {:?}", config.rarity_output))?;
    output
        .organized
        .save(&config.organized_output)
        .with_context(|| format!("Failed to write {:?}", config.organized_output))?;

    let table = &output.rarity;
    println!("Rarity:");
    println!("  Distinct combinations: {}", table.total_combinations());
    println!();

    println!("Top 10 rarest combinations (by average rarity):");
    for (key, _) in table.ranked_combinations().into_iter().take(10) {
        if let Ok(result) = table.resolve_key(key) {
            println!(
                "  #{:<4} ({:>6.2}%) [{}] {}: {} records, avg {:.2}%",
                result.rank, result.percentile, result.category, key, result.count, result.average_rarity
            );
        }
    }
    println!();

    println!("Distribution by category:");
    let combinations = table.category_counts();
    for (category, records) in table.category_record_counts() {
        println!(
            "  {:<10} {:>6} records ({:>6.2}%), {:>6} combinations",
            category.as_str(),
            records,
            100.0 * records as f64 / table.total_records as f64,
            combinations.get(&category).copied().unwrap_or(0)
        );
    }
    println!();

    println!("{}", "=".repeat(80));
    println!("Build time: {:.3} ms", build_time.as_secs_f64() * 1000.0);
    println!("Total time: {:.3} ms", total_start.elapsed().as_secs_f64() * 1000.0);
    println!("Rarity table:       {}", config.rarity_output.display());
    println!("Organized collection: {}", config.organized_output.display());
    println!("{}", "=".repeat(80));

    Ok(())
}
