//! Organized Collection
//!
//! Records grouped by species, then evolution stage. Each group is put into
//! display order by the Harmony Sorter once, at build time.
//!
//! Written as `{ species: { "metadata": {...}, "1": [...], "2": [...] } }`,
//! the same nesting the snapshot arrives in.

use crate::data::Record;
use crate::error::EngineError;
use crate::harmony;
use crate::utils::label_counter::LabelCounter;
use crate::utils::normalization::{canonical_key, LabelMatch};
use rayon::prelude::*;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::Instant;

/// Per-species summary attached to each group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeciesMetadata {
    pub name: String,
    pub total_count: usize,
    /// Highest stage present for this species
    pub max_evolution: u8,
}

/// All records of one species, keyed by stage
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "SpeciesDocument")]
pub struct SpeciesGroup {
    pub metadata: SpeciesMetadata,
    pub stages: BTreeMap<u8, Vec<Record>>,
}

/// On-disk shape of a species group
#[derive(Deserialize)]
struct SpeciesDocument {
    metadata: SpeciesMetadata,
    #[serde(flatten)]
    stages: BTreeMap<String, Vec<Record>>,
}

impl TryFrom<SpeciesDocument> for SpeciesGroup {
    type Error = String;

    fn try_from(doc: SpeciesDocument) -> Result<Self, Self::Error> {
        let stages = doc
            .stages
            .into_iter()
            .map(|(stage, records)| {
                stage
                    .parse::<u8>()
                    .map(|stage| (stage, records))
                    .map_err(|_| format!("invalid stage key '{}' for {}", stage, doc.metadata.name))
            })
            .collect::<Result<_, _>>()?;
        Ok(Self { metadata: doc.metadata, stages })
    }
}

impl Serialize for SpeciesGroup {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.stages.len() + 1))?;
        map.serialize_entry("metadata", &self.metadata)?;
        for (stage, records) in &self.stages {
            map.serialize_entry(&stage.to_string(), records)?;
        }
        map.end()
    }
}

impl SpeciesGroup {
    /// Records of one stage in display order
    pub fn stage(&self, evolution: u8) -> Option<&[Record]> {
        self.stages.get(&evolution).map(Vec::as_slice)
    }

    /// Default representative of a stage
    pub fn representative(&self, evolution: u8) -> Option<&Record> {
        self.stage(evolution).and_then(|records| records.first())
    }

    pub fn len(&self) -> usize {
        self.stages.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.values().all(Vec::is_empty)
    }
}

/// Species -> stage -> ordered records
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrganizedCollection {
    species: BTreeMap<String, SpeciesGroup>,
}

impl OrganizedCollection {
    /// Group and harmony-sort a snapshot
    ///
    /// Species labels differing only by case share one group under the
    /// first-seen spelling.
    pub fn organize(records: &[Record]) -> Self {
        let start = Instant::now();
        tracing::info!("Organizing {} records by species and stage", records.len());

        let mut names = LabelCounter::new();
        let mut grouped: BTreeMap<String, BTreeMap<u8, Vec<Record>>> = BTreeMap::new();
        for record in records {
            let species = names.observe(&record.traits.species).to_string();
            grouped
                .entry(species)
                .or_default()
                .entry(record.traits.evolution)
                .or_default()
                .push(record.clone());
        }

        // Groups are independent; sort them on the pool
        let mut groups: Vec<&mut Vec<Record>> = grouped
            .values_mut()
            .flat_map(|stages| stages.values_mut())
            .collect();
        groups.par_iter_mut().for_each(|group| harmony::sort_group(group));

        let species: BTreeMap<String, SpeciesGroup> = grouped
            .into_iter()
            .map(|(name, stages)| {
                let metadata = SpeciesMetadata {
                    total_count: names.count(&name) as usize,
                    max_evolution: stages.keys().next_back().copied().unwrap_or(1),
                    name: name.clone(),
                };
                (name, SpeciesGroup { metadata, stages })
            })
            .collect();

        for group in species.values() {
            for (stage, records) in &group.stages {
                tracing::debug!(
                    "  {} - Evolution {}: {} records",
                    group.metadata.name,
                    stage,
                    records.len()
                );
            }
        }
        tracing::info!(
            "Organized {} species in {:?}",
            species.len(),
            start.elapsed()
        );

        Self { species }
    }

    /// Look up a species, case-insensitively
    pub fn species(&self, name: &str) -> Option<&SpeciesGroup> {
        match canonical_key(&self.species, name.trim()) {
            LabelMatch::Found(key) => self.species.get(key),
            LabelMatch::NotFound => None,
        }
    }

    /// Ordered records of one species/stage group
    pub fn group(&self, species: &str, evolution: u8) -> Option<&[Record]> {
        self.species(species)?.stage(evolution)
    }

    pub fn species_names(&self) -> impl Iterator<Item = &str> {
        self.species.keys().map(String::as_str)
    }

    pub fn metadata(&self) -> impl Iterator<Item = &SpeciesMetadata> {
        self.species.values().map(|group| &group.metadata)
    }

    pub fn groups(&self) -> impl Iterator<Item = &SpeciesGroup> {
        self.species.values()
    }

    /// Every record, species by species, stage by stage, in display order
    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.species
            .values()
            .flat_map(|group| group.stages.values())
            .flatten()
    }

    pub fn species_count(&self) -> usize {
        self.species.len()
    }

    pub fn len(&self) -> usize {
        self.species.values().map(SpeciesGroup::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
    }

    pub fn to_json(&self) -> Result<String, EngineError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), EngineError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_json()?)?;
        tracing::info!("Saved organized collection to {:?}", path);
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, EngineError> {
        let contents = fs::read_to_string(path)?;
        let collection = Self::from_json(&contents)?;
        tracing::info!(
            "Loaded organized collection from {:?} ({} species, {} records)",
            path,
            collection.species_count(),
            collection.len()
        );
        Ok(collection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{CollectionData, TraitTuple};

    fn record(id: u32, species: &str, background: &str, body: &str, evolution: u8) -> Record {
        Record {
            id,
            image_url: format!("https://img/{}.png", id),
            traits: TraitTuple::new(species, background, body, "None", evolution),
            mint_address: None,
        }
    }

    fn sample() -> Vec<Record> {
        vec![
            record(1, "Quack", "Green", "Green", 1),
            record(2, "Quack", "Yellow", "Blue", 1),
            record(3, "Quack", "Blue", "Pink", 3),
            record(4, "Bork", "Red", "Red", 2),
            record(5, "quack", "Blue", "Pink", 1),
        ]
    }

    #[test]
    fn test_grouping_and_metadata() {
        let organized = OrganizedCollection::organize(&sample());

        assert_eq!(organized.species_count(), 2);
        assert_eq!(organized.len(), 5);

        let quack = organized.species("Quack").unwrap();
        assert_eq!(quack.metadata.name, "Quack");
        assert_eq!(quack.metadata.total_count, 4);
        assert_eq!(quack.metadata.max_evolution, 3);
        assert_eq!(quack.stages.keys().copied().collect::<Vec<_>>(), vec![1, 3]);

        let bork = organized.species("bork").unwrap();
        assert_eq!(bork.metadata.max_evolution, 2);
    }

    #[test]
    fn test_groups_in_harmony_order() {
        let organized = OrganizedCollection::organize(&sample());
        let ids: Vec<u32> = organized
            .group("Quack", 1)
            .unwrap()
            .iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec![2, 5, 1]);
        assert_eq!(organized.species("QUACK").unwrap().representative(1).map(|r| r.id), Some(2));
    }

    #[test]
    fn test_missing_group() {
        let organized = OrganizedCollection::organize(&sample());
        assert!(organized.group("Quack", 4).is_none());
        assert!(organized.group("NoSuchSpecies", 1).is_none());
    }

    #[test]
    fn test_document_shape() {
        let organized = OrganizedCollection::organize(&sample());
        let value: serde_json::Value = serde_json::from_str(&organized.to_json().unwrap()).unwrap();

        assert_eq!(value["Quack"]["metadata"]["totalCount"], 4);
        assert_eq!(value["Quack"]["metadata"]["maxEvolution"], 3);
        assert_eq!(value["Quack"]["1"][0]["id"], 2);
        assert_eq!(value["Bork"]["2"][0]["imageUrl"], "https://img/4.png");

        let reloaded = OrganizedCollection::from_json(&value.to_string()).unwrap();
        assert_eq!(reloaded, organized);
    }

    #[test]
    fn test_document_is_a_valid_snapshot() {
        // The organized artifact can be fed back in as a nested snapshot
        let organized = OrganizedCollection::organize(&sample());
        let data = CollectionData::from_nested_json(&organized.to_json().unwrap()).unwrap();
        assert_eq!(data.len(), 5);
    }

    #[test]
    fn test_independent_of_input_order() {
        let mut reversed = sample();
        reversed.reverse();
        let forward = OrganizedCollection::organize(&sample());
        let backward = OrganizedCollection::organize(&reversed);
        assert_eq!(
            forward.group("Quack", 1).unwrap(),
            backward.group("Quack", 1).unwrap()
        );
    }
}
