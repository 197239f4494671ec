//! Rarity Table
//!
//! The persisted Aggregate Table. Built once by the aggregator, written as a
//! flat JSON document, and only ever read afterwards by the serving layer.
//!
//! All maps are `BTreeMap` so the written document is reproducible.

use crate::data::TraitDimension;
use crate::error::EngineError;
use crate::rarity::category::RarityCategory;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Separator between the five labels of a Combination Key
pub const COMBINATION_SEPARATOR: &str = "+";

/// Join five labels (species, background, body, accessories, evolution)
pub fn combination_key<S: AsRef<str>>(labels: &[S]) -> String {
    labels
        .iter()
        .map(|label| label.as_ref())
        .collect::<Vec<_>>()
        .join(COMBINATION_SEPARATOR)
}

/// One map per trait dimension
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TraitTables<T> {
    pub species: BTreeMap<String, T>,
    pub background: BTreeMap<String, T>,
    pub body: BTreeMap<String, T>,
    pub accessories: BTreeMap<String, T>,
    pub evolution: BTreeMap<String, T>,
}

impl<T> TraitTables<T> {
    pub fn get(&self, dimension: TraitDimension) -> &BTreeMap<String, T> {
        match dimension {
            TraitDimension::Species => &self.species,
            TraitDimension::Background => &self.background,
            TraitDimension::Body => &self.body,
            TraitDimension::Accessories => &self.accessories,
            TraitDimension::Evolution => &self.evolution,
        }
    }

    pub fn get_mut(&mut self, dimension: TraitDimension) -> &mut BTreeMap<String, T> {
        match dimension {
            TraitDimension::Species => &mut self.species,
            TraitDimension::Background => &mut self.background,
            TraitDimension::Body => &mut self.body,
            TraitDimension::Accessories => &mut self.accessories,
            TraitDimension::Evolution => &mut self.evolution,
        }
    }
}

/// Aggregate rarity artifact
///
/// Keys of every combination map are the same set of canonical Combination
/// Keys. Average-rarity ranks are a permutation of 1..=M, rank 1 = rarest.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RarityTable {
    #[serde(alias = "totalDoopies")]
    pub total_records: u64,

    /// Combination key -> number of records
    pub combination_frequencies: BTreeMap<String, u64>,
    /// Rank by ascending combination frequency
    pub combination_ranks: BTreeMap<String, u64>,
    pub combination_percentiles: BTreeMap<String, f64>,

    /// Dimension -> label -> number of records
    pub trait_frequencies: TraitTables<u64>,
    /// Dimension -> label -> 100 x frequency / total (lower = rarer)
    pub trait_rarities: TraitTables<f64>,

    /// Rank by ascending average-rarity percentage
    pub average_rarity_ranks: BTreeMap<String, u64>,
    pub average_rarity_percentiles: BTreeMap<String, f64>,
    pub average_rarity_categories: BTreeMap<String, RarityCategory>,
}

impl RarityTable {
    /// Number of distinct combinations (M)
    pub fn total_combinations(&self) -> usize {
        self.combination_frequencies.len()
    }

    /// Combination keys ordered by rank, rarest first
    pub fn ranked_combinations(&self) -> Vec<(&str, u64)> {
        let mut ranked: Vec<(&str, u64)> = self
            .average_rarity_ranks
            .iter()
            .map(|(key, rank)| (key.as_str(), *rank))
            .collect();
        ranked.sort_by_key(|(_, rank)| *rank);
        ranked
    }

    /// Number of combinations per category (every category present, possibly 0)
    pub fn category_counts(&self) -> BTreeMap<RarityCategory, usize> {
        let mut counts: BTreeMap<RarityCategory, usize> =
            RarityCategory::ALL.iter().map(|category| (*category, 0)).collect();
        for category in self.average_rarity_categories.values() {
            *counts.entry(*category).or_insert(0) += 1;
        }
        counts
    }

    /// Number of records per category (every category present, possibly 0)
    pub fn category_record_counts(&self) -> BTreeMap<RarityCategory, u64> {
        let mut counts: BTreeMap<RarityCategory, u64> =
            RarityCategory::ALL.iter().map(|category| (*category, 0)).collect();
        for (key, category) in &self.average_rarity_categories {
            let frequency = self.combination_frequencies.get(key).copied().unwrap_or(0);
            *counts.entry(*category).or_insert(0) += frequency;
        }
        counts
    }

    pub fn to_json(&self) -> Result<String, EngineError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Write the artifact, replacing any previous one
    pub fn save(&self, path: &Path) -> Result<(), EngineError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_json()?)?;
        tracing::info!("Saved rarity table to {:?}", path);
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, EngineError> {
        let contents = fs::read_to_string(path)?;
        let table = Self::from_json(&contents)?;
        tracing::info!(
            "Loaded rarity table from {:?} ({} records, {} combinations)",
            path,
            table.total_records,
            table.total_combinations()
        );
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combination_key_order() {
        let key = combination_key(&["Quack", "Yellow", "Blue", "None", "1"]);
        assert_eq!(key, "Quack+Yellow+Blue+None+1");
    }

    #[test]
    fn test_camel_case_document() {
        let mut table = RarityTable {
            total_records: 1,
            ..Default::default()
        };
        table.combination_frequencies.insert("a+b+c+d+1".into(), 1);
        table.trait_frequencies.species.insert("a".into(), 1);

        let value: serde_json::Value = serde_json::from_str(&table.to_json().unwrap()).unwrap();
        for field in [
            "totalRecords",
            "combinationFrequencies",
            "combinationRanks",
            "combinationPercentiles",
            "traitFrequencies",
            "traitRarities",
            "averageRarityRanks",
            "averageRarityPercentiles",
            "averageRarityCategories",
        ] {
            assert!(value.get(field).is_some(), "missing field {}", field);
        }
        assert_eq!(value["traitFrequencies"]["species"]["a"], 1);
    }

    #[test]
    fn test_legacy_total_field_accepted() {
        let table = RarityTable::from_json(r#"{
            "totalDoopies": 8888,
            "combinationFrequencies": {}, "combinationRanks": {}, "combinationPercentiles": {},
            "traitFrequencies": {"species": {}, "background": {}, "body": {}, "accessories": {}, "evolution": {}},
            "traitRarities": {"species": {}, "background": {}, "body": {}, "accessories": {}, "evolution": {}},
            "averageRarityRanks": {}, "averageRarityPercentiles": {}, "averageRarityCategories": {}
        }"#)
        .unwrap();
        assert_eq!(table.total_records, 8888);
    }

    #[test]
    fn test_category_counts() {
        let mut table = RarityTable::default();
        for (key, count, category) in [
            ("a+a+a+a+1", 1, RarityCategory::Mythic),
            ("b+b+b+b+1", 5, RarityCategory::Common),
            ("c+c+c+c+1", 2, RarityCategory::Common),
        ] {
            table.combination_frequencies.insert(key.into(), count);
            table.average_rarity_categories.insert(key.into(), category);
        }

        let combinations = table.category_counts();
        assert_eq!(combinations[&RarityCategory::Common], 2);
        assert_eq!(combinations[&RarityCategory::Mythic], 1);
        assert_eq!(combinations[&RarityCategory::Epic], 0);
        assert_eq!(combinations.len(), RarityCategory::ALL.len());

        let records = table.category_record_counts();
        assert_eq!(records[&RarityCategory::Common], 7);
        assert_eq!(records[&RarityCategory::Mythic], 1);
        assert_eq!(records[&RarityCategory::Epic], 0);
    }

    #[test]
    fn test_trait_tables_dimension_access() {
        let mut tables: TraitTables<u64> = TraitTables::default();
        tables.get_mut(TraitDimension::Body).insert("Blue".into(), 4);
        assert_eq!(tables.body.get("Blue"), Some(&4));
        assert!(tables.get(TraitDimension::Species).is_empty());
    }
}
