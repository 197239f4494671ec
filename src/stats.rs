//! Collection statistics
//!
//! Summary figures printed by the build: sizes, the stage distribution, the
//! most populous species, and a few integrity counters over image and mint
//! references.

use crate::data::{Record, MAX_EVOLUTION};
use crate::utils::label_counter::count_labels;
use ahash::AHashSet;
use serde::Serialize;
use std::collections::BTreeMap;

/// Record count of one species
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeciesCount {
    pub species: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionStats {
    pub total_records: usize,
    pub species_count: usize,
    /// Stage -> number of records (every stage 1..=4 present, possibly 0)
    pub evolution_distribution: BTreeMap<u8, usize>,
    /// Most populous species, count descending then name ascending
    pub top_species: Vec<SpeciesCount>,
    pub unique_image_urls: usize,
    pub unique_mint_addresses: usize,
    /// Mint addresses carried by more than one record
    pub duplicate_mint_addresses: Vec<String>,
    /// Image references that are neither https nor data URIs
    pub insecure_image_urls: usize,
}

impl CollectionStats {
    pub fn compute(records: &[Record], top_n: usize) -> Self {
        let species = count_labels(records.iter().map(|r| r.traits.species.as_str()));

        let mut top_species: Vec<SpeciesCount> = species
            .iter()
            .map(|(name, count)| SpeciesCount {
                species: name.to_string(),
                count,
            })
            .collect();
        top_species.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.species.cmp(&b.species)));
        top_species.truncate(top_n);

        let mut evolution_distribution: BTreeMap<u8, usize> =
            (1..=MAX_EVOLUTION).map(|stage| (stage, 0)).collect();
        for record in records {
            *evolution_distribution.entry(record.traits.evolution).or_insert(0) += 1;
        }

        let mut image_urls = AHashSet::new();
        let mut insecure_image_urls = 0;
        for url in records.iter().map(|r| r.image_url.as_str()).filter(|u| !u.is_empty()) {
            if !url.starts_with("https://") && !url.starts_with("data:") {
                insecure_image_urls += 1;
            }
            image_urls.insert(url);
        }

        let mut mint_addresses = AHashSet::new();
        let mut duplicates = AHashSet::new();
        for mint in records.iter().filter_map(|r| r.mint_address.as_deref()) {
            if !mint_addresses.insert(mint) {
                duplicates.insert(mint);
            }
        }
        let mut duplicate_mint_addresses: Vec<String> =
            duplicates.into_iter().map(str::to_string).collect();
        duplicate_mint_addresses.sort();

        for mint in &duplicate_mint_addresses {
            tracing::warn!("Duplicate mint address: {}", mint);
        }
        if insecure_image_urls > 0 {
            tracing::warn!("{} image references are not https", insecure_image_urls);
        }

        Self {
            total_records: records.len(),
            species_count: species.len(),
            evolution_distribution,
            top_species,
            unique_image_urls: image_urls.len(),
            unique_mint_addresses: mint_addresses.len(),
            duplicate_mint_addresses,
            insecure_image_urls,
        }
    }

    /// Human-readable report for the build binaries
    pub fn print_summary(&self) {
        println!("Collection:");
        println!("  Total records:      {}", self.total_records);
        println!("  Species:            {}", self.species_count);
        println!("  Unique image URLs:  {}", self.unique_image_urls);
        println!("  Unique mints:       {}", self.unique_mint_addresses);
        println!();
        println!("By evolution:");
        for (stage, count) in &self.evolution_distribution {
            println!("  Evolution {}: {:>6}", stage, count);
        }
        println!();
        println!("Top {} species:", self.top_species.len());
        for (idx, entry) in self.top_species.iter().enumerate() {
            println!("  {:>2}. {:<20} {:>6}", idx + 1, entry.species, entry.count);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::TraitTuple;

    fn record(id: u32, species: &str, evolution: u8, image: &str, mint: Option<&str>) -> Record {
        Record {
            id,
            image_url: image.to_string(),
            traits: TraitTuple::new(species, "Yellow", "Blue", "None", evolution),
            mint_address: mint.map(|m| m.to_string()),
        }
    }

    fn sample() -> Vec<Record> {
        vec![
            record(1, "Quack", 1, "https://img/1.png", Some("MintA")),
            record(2, "Quack", 2, "https://img/2.png", Some("MintB")),
            record(3, "Bork", 1, "http://img/3.png", Some("MintA")),
            record(4, "Alpha", 4, "https://img/1.png", None),
            record(5, "Bork", 1, "", None),
        ]
    }

    #[test]
    fn test_counts() {
        let stats = CollectionStats::compute(&sample(), 10);
        assert_eq!(stats.total_records, 5);
        assert_eq!(stats.species_count, 3);
        assert_eq!(stats.unique_image_urls, 3);
        assert_eq!(stats.unique_mint_addresses, 2);
        assert_eq!(stats.duplicate_mint_addresses, vec!["MintA".to_string()]);
        assert_eq!(stats.insecure_image_urls, 1);
    }

    #[test]
    fn test_evolution_distribution_lists_every_stage() {
        let stats = CollectionStats::compute(&sample(), 10);
        let expected: BTreeMap<u8, usize> = [(1, 3), (2, 1), (3, 0), (4, 1)].into_iter().collect();
        assert_eq!(stats.evolution_distribution, expected);
    }

    #[test]
    fn test_top_species_ordering_and_limit() {
        let stats = CollectionStats::compute(&sample(), 2);
        let names: Vec<&str> = stats.top_species.iter().map(|s| s.species.as_str()).collect();
        // Bork and Quack tie at 2; name breaks the tie
        assert_eq!(names, vec!["Bork", "Quack"]);
    }
}
