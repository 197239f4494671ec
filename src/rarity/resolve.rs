//! Rarity Lookup
//!
//! Answers "how rare is this trait combination" against a built table.
//! Read-only and reentrant: any number of callers can share one table.
//!
//! Each input label is normalized against its dimension table (exact, then
//! case-insensitive). The Combination Key built from the normalized labels
//! is then matched the same way. Absence at either step is a `NotFound`
//! value, never a fault.

use crate::data::{TraitDimension, TraitTuple};
use crate::error::NotFound;
use crate::rarity::aggregator::{average_rarity_percent, rarity_percent};
use crate::rarity::category::RarityCategory;
use crate::rarity::table::{combination_key, RarityTable, COMBINATION_SEPARATOR};
use crate::utils::normalization::{canonical_key, LabelMatch};
use serde::{Deserialize, Serialize};

/// Frequency and rarity of one normalized label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraitRarity {
    #[serde(rename = "trait")]
    pub label: String,
    pub frequency: u64,
    pub rarity_percent: f64,
}

/// Label rarities of all five dimensions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraitRarities {
    pub species: TraitRarity,
    pub background: TraitRarity,
    pub body: TraitRarity,
    pub accessories: TraitRarity,
    pub evolution: TraitRarity,
}

impl TraitRarities {
    pub fn get(&self, dimension: TraitDimension) -> &TraitRarity {
        match dimension {
            TraitDimension::Species => &self.species,
            TraitDimension::Background => &self.background,
            TraitDimension::Body => &self.body,
            TraitDimension::Accessories => &self.accessories,
            TraitDimension::Evolution => &self.evolution,
        }
    }
}

/// Everything known about one combination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RarityResult {
    /// Canonical Combination Key
    pub combination: String,
    /// Records carrying exactly this combination
    pub count: u64,
    /// 100 x count / total records
    pub percentage: f64,
    pub rank: u64,
    pub percentile: f64,
    pub category: RarityCategory,
    /// Mean of the five label rarities (lower = rarer)
    pub average_rarity: f64,
    /// Rank by combination frequency
    pub frequency_rank: u64,
    pub frequency_percentile: f64,
    pub total_combinations: usize,
    pub trait_rarities: TraitRarities,
}

impl RarityTable {
    /// Canonical spelling of a label in one dimension
    pub fn canonical_trait(&self, dimension: TraitDimension, value: &str) -> LabelMatch<'_> {
        canonical_key(self.trait_frequencies.get(dimension), value.trim())
    }

    /// Canonical spelling of a Combination Key
    pub fn canonical_combination(&self, key: &str) -> LabelMatch<'_> {
        canonical_key(&self.combination_frequencies, key)
    }

    /// Look up the rarity of a five-trait combination
    pub fn resolve(
        &self,
        species: &str,
        background: &str,
        body: &str,
        accessories: &str,
        evolution: u8,
    ) -> Result<RarityResult, NotFound> {
        let evolution = evolution.to_string();
        let inputs = [species, background, body, accessories, evolution.as_str()];

        let mut labels: [&str; 5] = [""; 5];
        for ((dimension, input), slot) in TraitDimension::ALL.iter().zip(inputs).zip(labels.iter_mut()) {
            *slot = match self.canonical_trait(*dimension, input) {
                LabelMatch::Found(label) => label,
                LabelMatch::NotFound => {
                    return Err(NotFound::UnknownTrait {
                        dimension: *dimension,
                        value: input.to_string(),
                    })
                }
            };
        }

        let key = combination_key(&labels);
        let canonical = match self.canonical_combination(&key) {
            LabelMatch::Found(canonical) => canonical,
            LabelMatch::NotFound => return Err(NotFound::UnknownCombination { key }),
        };

        self.combination_result(canonical, &labels)
            .ok_or(NotFound::UnknownCombination { key })
    }

    /// Look up the rarity of a record's trait tuple
    pub fn resolve_traits(&self, traits: &TraitTuple) -> Result<RarityResult, NotFound> {
        self.resolve(
            &traits.species,
            &traits.background,
            &traits.body,
            &traits.accessories,
            traits.evolution,
        )
    }

    /// Look up a combination by its key, e.g. `Quack+Yellow+Blue+None+1`
    pub fn resolve_key(&self, key: &str) -> Result<RarityResult, NotFound> {
        let unknown = || NotFound::UnknownCombination { key: key.to_string() };

        let canonical = self.canonical_combination(key.trim()).found().ok_or_else(unknown)?;
        let parts: Vec<&str> = canonical.split(COMBINATION_SEPARATOR).collect();
        let labels: [&str; 5] = parts.try_into().map_err(|_| unknown())?;

        self.combination_result(canonical, &labels).ok_or_else(unknown)
    }

    /// Assemble the result for a canonical key; None if the table is inconsistent
    fn combination_result(&self, key: &str, labels: &[&str; 5]) -> Option<RarityResult> {
        let count = *self.combination_frequencies.get(key)?;
        let rank = *self.average_rarity_ranks.get(key)?;
        let percentile = *self.average_rarity_percentiles.get(key)?;
        let category = *self.average_rarity_categories.get(key)?;
        let frequency_rank = *self.combination_ranks.get(key)?;
        let frequency_percentile = *self.combination_percentiles.get(key)?;

        let trait_rarity = |dimension: TraitDimension, label: &str| -> Option<TraitRarity> {
            Some(TraitRarity {
                label: label.to_string(),
                frequency: *self.trait_frequencies.get(dimension).get(label)?,
                rarity_percent: *self.trait_rarities.get(dimension).get(label)?,
            })
        };

        let trait_rarities = TraitRarities {
            species: trait_rarity(TraitDimension::Species, labels[0])?,
            background: trait_rarity(TraitDimension::Background, labels[1])?,
            body: trait_rarity(TraitDimension::Body, labels[2])?,
            accessories: trait_rarity(TraitDimension::Accessories, labels[3])?,
            evolution: trait_rarity(TraitDimension::Evolution, labels[4])?,
        };

        let count_sum: u64 = TraitDimension::ALL
            .iter()
            .map(|dimension| trait_rarities.get(*dimension).frequency)
            .sum();
        let average_rarity = average_rarity_percent(count_sum, self.total_records);

        Some(RarityResult {
            combination: key.to_string(),
            count,
            percentage: rarity_percent(count, self.total_records),
            rank,
            percentile,
            category,
            average_rarity,
            frequency_rank,
            frequency_percentile,
            total_combinations: self.total_combinations(),
            trait_rarities,
        })
    }
}
