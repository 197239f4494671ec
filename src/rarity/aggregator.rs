//! Rarity Aggregator
//!
//! Single pass over the collection, then ranking:
//! 1. Count every Combination Key and every label of the five dimensions
//! 2. Label rarity = 100 x frequency / total records
//! 3. Combination average rarity = mean of its five label rarities
//! 4. Rank combinations ascending by average rarity (rarest = 1),
//!    percentile = 100 x rank / M, category from the percentile
//!
//! Ties in step 4 are broken by ascending Combination Key so a rebuild over
//! the same snapshot always produces the same ranks.

use crate::data::{check_label, Record, TraitDimension};
use crate::error::EngineError;
use crate::rarity::category::RarityCategory;
use crate::rarity::table::{combination_key, RarityTable, TraitTables};
use crate::utils::label_counter::LabelCounter;
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::collections::BTreeMap;
use std::time::Instant;

/// Canonical labels of one combination, in dimension order
type CombinationLabels = SmallVec<[String; 5]>;

/// Build the rarity table from a validated snapshot
///
/// Pure: the caller owns the result and decides where it lives.
pub fn build_rarity_table(records: &[Record]) -> Result<RarityTable, EngineError> {
    if records.is_empty() {
        return Err(EngineError::EmptyCollection);
    }

    let start = Instant::now();
    tracing::info!("Building rarity table over {} records", records.len());

    // STEP 1: one pass, counting labels and combinations
    let mut dimension_counters: [LabelCounter; 5] = Default::default();
    let mut combinations = LabelCounter::new();
    let mut combination_labels: FxHashMap<String, CombinationLabels> = FxHashMap::default();

    for record in records {
        for dimension in TraitDimension::ALL {
            check_label(record.id, dimension, &record.traits.label(dimension))?;
        }
        let labels: CombinationLabels = TraitDimension::ALL
            .iter()
            .zip(dimension_counters.iter_mut())
            .map(|(dimension, counter)| {
                counter.observe(&record.traits.label(*dimension)).to_string()
            })
            .collect();

        let key = combinations.observe(&combination_key(labels.as_slice())).to_string();
        combination_labels.entry(key).or_insert(labels);
    }

    let total = records.len() as u64;
    let [species, background, body, accessories, evolution] = dimension_counters;
    let trait_frequencies = TraitTables {
        species: species.into_map(),
        background: background.into_map(),
        body: body.into_map(),
        accessories: accessories.into_map(),
        evolution: evolution.into_map(),
    };

    // STEP 2: per-label rarity percentages
    let trait_rarities = trait_rarity_tables(&trait_frequencies, total);

    // STEP 3: average rarity of every combination
    // Ranked on the summed label counts: every rarity shares the denominator
    // `total`, so the integer sum orders exactly like the average
    let entries: Vec<(&String, &CombinationLabels)> = combination_labels.iter().collect();
    let count_sums: Vec<(&str, u64)> = entries
        .par_iter()
        .map(|(key, labels)| (key.as_str(), label_count_sum(&trait_frequencies, labels)))
        .collect();

    // STEP 4: ranks, percentiles, categories
    let ranked = rank_ascending(count_sums, |a, b| a.cmp(b));
    let m = ranked.len();

    let mut average_rarity_ranks = BTreeMap::new();
    let mut average_rarity_percentiles = BTreeMap::new();
    let mut average_rarity_categories = BTreeMap::new();
    for (key, rank) in &ranked {
        let percentile = percentile_of(*rank, m);
        average_rarity_ranks.insert(key.to_string(), *rank);
        average_rarity_percentiles.insert(key.to_string(), percentile);
        average_rarity_categories.insert(key.to_string(), RarityCategory::from_percentile(percentile));
    }

    // Frequency ranking of the combinations themselves
    let frequencies: Vec<(&str, u64)> = combinations.iter().collect();
    let frequency_ranked = rank_ascending(frequencies, |a, b| a.cmp(b));

    let mut combination_ranks = BTreeMap::new();
    let mut combination_percentiles = BTreeMap::new();
    for (key, rank) in &frequency_ranked {
        combination_ranks.insert(key.to_string(), *rank);
        combination_percentiles.insert(key.to_string(), percentile_of(*rank, m));
    }

    let table = RarityTable {
        total_records: total,
        combination_frequencies: combinations.into_map(),
        combination_ranks,
        combination_percentiles,
        trait_frequencies,
        trait_rarities,
        average_rarity_ranks,
        average_rarity_percentiles,
        average_rarity_categories,
    };

    tracing::info!(
        "Rarity table built in {:?}: {} combinations",
        start.elapsed(),
        table.total_combinations()
    );
    for dimension in TraitDimension::ALL {
        tracing::debug!(
            "  {}: {} distinct labels",
            dimension,
            table.trait_frequencies.get(dimension).len()
        );
    }

    Ok(table)
}

/// 100 x frequency / total for every label of every dimension
fn trait_rarity_tables(frequencies: &TraitTables<u64>, total: u64) -> TraitTables<f64> {
    let mut rarities = TraitTables::default();
    for dimension in TraitDimension::ALL {
        let table = rarities.get_mut(dimension);
        for (label, count) in frequencies.get(dimension) {
            table.insert(label.clone(), rarity_percent(*count, total));
        }
    }
    rarities
}

/// Share of the collection carrying a label, in percent
pub fn rarity_percent(count: u64, total: u64) -> f64 {
    100.0 * count as f64 / total as f64
}

/// Percentile of a 1-based rank among `m` combinations
pub fn percentile_of(rank: u64, m: usize) -> f64 {
    100.0 * rank as f64 / m as f64
}

/// Unweighted mean of five label rarities, from the sum of their counts
pub fn average_rarity_percent(count_sum: u64, total: u64) -> f64 {
    100.0 * count_sum as f64 / (TraitDimension::ALL.len() as u64 * total) as f64
}

/// Sum of the five label counts of a combination
fn label_count_sum(frequencies: &TraitTables<u64>, labels: &[String]) -> u64 {
    TraitDimension::ALL
        .iter()
        .zip(labels)
        .map(|(dimension, label)| {
            let count = frequencies.get(*dimension).get(label).copied();
            debug_assert!(count.is_some(), "label '{}' missing from {}", label, dimension);
            count.unwrap_or(0)
        })
        .sum()
}

/// Dense 1-based ranks by ascending value, ties by ascending key
fn rank_ascending<'a, V, F>(mut entries: Vec<(&'a str, V)>, compare: F) -> Vec<(&'a str, u64)>
where
    F: Fn(&V, &V) -> std::cmp::Ordering,
{
    entries.sort_by(|a, b| compare(&a.1, &b.1).then_with(|| a.0.cmp(b.0)));
    entries
        .into_iter()
        .enumerate()
        .map(|(idx, (key, _))| (key, idx as u64 + 1))
        .collect()
}
