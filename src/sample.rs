//! Synthetic collections
//!
//! Seeded generator for demo snapshots, benchmarks and tests. Trait labels
//! come from the collection's real vocabularies; weights give a skewed
//! distribution so that rare and common combinations both appear.

use crate::data::{Record, TraitTuple, MAX_EVOLUTION};
use crate::error::EngineError;
use rand::distributions::WeightedIndex;
use rand::prelude::*;
use std::collections::BTreeMap;

/// Size of the real collection
pub const COLLECTION_SIZE: usize = 8888;

/// (label, weight)
const SPECIES: &[(&str, u32)] = &[
    ("ELK", 10), ("ZEBO", 10), ("NANNA", 10), ("KING FLAT", 10), ("FLUBERT", 9),
    ("LINT", 148), ("SALLY", 297), ("PEKO", 185), ("PYON", 181), ("HANKY", 173),
    ("WARREN", 172), ("ONG", 171), ("KIRK", 157), ("YUYO", 198), ("BEAK", 178),
    ("BETH", 255), ("WHEELIE", 190), ("MEEP", 208), ("CORY", 382), ("GHIDDO", 344),
    ("FRAE", 369), ("KRYSTAL", 236), ("PAM", 253), ("QB", 771),
];

const BACKGROUNDS: &[(&str, u32)] = &[
    ("Deep Space", 13), ("Purple Sky", 15), ("Dead", 40), ("Heaven", 231), ("Holo", 191),
    ("Gold", 179), ("Splat", 428), ("Hell", 242), ("Zebra", 426), ("Sunset", 576),
    ("Iridescent", 396), ("Pink", 867), ("Dusk", 597), ("Purple", 894), ("Neotide", 555),
    ("Blue", 883), ("Lagoon", 601), ("Green", 848), ("Yellow", 903),
];

const BODIES: &[(&str, u32)] = &[
    ("Heaven", 37), ("Hell", 29), ("Dead", 40), ("Gold", 152), ("Holo", 259),
    ("Splats", 497), ("Cheetah", 665), ("Pink", 1272), ("Purple", 1262), ("Blue", 1204),
    ("Yellow", 1156), ("Green", 1209), ("Camo", 520), ("Zebra", 435),
];

const ACCESSORIES: &[(&str, u32)] = &[
    ("None", 6000), ("Crown", 120), ("Daisy", 900), ("Halo", 300), ("Horns", 500), ("Poop", 250),
];

/// Stage weights, stage 1 most common
const EVOLUTIONS: [u32; MAX_EVOLUTION as usize] = [50, 30, 15, 5];

struct Vocabulary<'a> {
    labels: Vec<&'a str>,
    weights: WeightedIndex<u32>,
}

impl<'a> Vocabulary<'a> {
    fn new(entries: &[(&'a str, u32)]) -> Result<Self, rand::distributions::WeightedError> {
        Ok(Self {
            labels: entries.iter().map(|(label, _)| *label).collect(),
            weights: WeightedIndex::new(entries.iter().map(|(_, weight)| *weight))?,
        })
    }

    fn pick<R: Rng>(&self, rng: &mut R) -> &'a str {
        self.labels[self.weights.sample(rng)]
    }
}

/// Generate `count` records with ids 1..=count
///
/// Same seed, same records.
pub fn generate_records(count: usize, seed: u64) -> Vec<Record> {
    let mut rng = StdRng::seed_from_u64(seed);

    // Weight tables are non-empty constants with positive weights
    let (Ok(species), Ok(backgrounds), Ok(bodies), Ok(accessories), Ok(evolutions)) = (
        Vocabulary::new(SPECIES),
        Vocabulary::new(BACKGROUNDS),
        Vocabulary::new(BODIES),
        Vocabulary::new(ACCESSORIES),
        WeightedIndex::new(EVOLUTIONS),
    ) else {
        return Vec::new();
    };

    (1..=count as u32)
        .map(|id| {
            let traits = TraitTuple::new(
                species.pick(&mut rng),
                backgrounds.pick(&mut rng),
                bodies.pick(&mut rng),
                accessories.pick(&mut rng),
                evolutions.sample(&mut rng) as u8 + 1,
            );
            let mint: String = (0..44)
                .map(|_| char::from(rng.sample(rand::distributions::Alphanumeric)))
                .collect();
            Record {
                id,
                image_url: format!("https://cdn.doopies.example/images/{}.png", id),
                traits,
                mint_address: Some(mint),
            }
        })
        .collect()
}

/// Nested `{species: {stage: [record, ...]}}` snapshot document
pub fn nested_snapshot(records: &[Record]) -> Result<String, EngineError> {
    let mut nested: BTreeMap<&str, BTreeMap<String, Vec<&Record>>> = BTreeMap::new();
    for record in records {
        nested
            .entry(record.traits.species.as_str())
            .or_default()
            .entry(record.traits.evolution.to_string())
            .or_default()
            .push(record);
    }
    Ok(serde_json::to_string_pretty(&nested)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::CollectionData;

    #[test]
    fn test_deterministic_for_seed() {
        assert_eq!(generate_records(200, 7), generate_records(200, 7));
        assert_ne!(generate_records(200, 7), generate_records(200, 8));
    }

    #[test]
    fn test_ids_and_stages() {
        let records = generate_records(500, 42);
        assert_eq!(records.len(), 500);
        assert_eq!(records.first().map(|r| r.id), Some(1));
        assert_eq!(records.last().map(|r| r.id), Some(500));
        assert!(records
            .iter()
            .all(|r| (1..=MAX_EVOLUTION).contains(&r.traits.evolution)));
    }

    #[test]
    fn test_snapshot_loads_back() {
        let records = generate_records(300, 1);
        let json = nested_snapshot(&records).unwrap();
        let data = CollectionData::from_nested_json(&json).unwrap();

        assert_eq!(data.len(), 300);
        let mut ids: Vec<u32> = data.records().iter().map(|r| r.id).collect();
        ids.sort_unstable();
        assert_eq!(ids, (1..=300).collect::<Vec<u32>>());
    }
}
