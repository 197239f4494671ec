//! Record Search Index
//!
//! In-memory lookup over the organized collection:
//! - by id, written as `42` or `#42`
//! - by species name, case-insensitive; prefix matches come before
//!   matches further inside the name
//!
//! Plus `TraitFilter` for narrowing a species' records by trait without
//! disturbing display order.
//!
//! Built once at startup from the organized artifact; read-only afterwards.

use crate::data::Record;
use crate::organizer::OrganizedCollection;
use crate::utils::normalization::fold_case;
use ahash::AHashMap;
use serde::Deserialize;
use std::time::Instant;

/// Records in display order with an id index
pub struct SearchIndex {
    /// Every record, species by species, stage by stage
    records: Vec<Record>,
    /// Record id -> position in `records`
    by_id: AHashMap<u32, usize>,
    /// (case-folded species, first position, one past last position)
    species_spans: Vec<(String, usize, usize)>,
}

/// Parse `42` or `#42` as a record id
pub fn parse_record_id(query: &str) -> Option<u32> {
    let trimmed = query.trim();
    let digits = trimmed.strip_prefix('#').unwrap_or(trimmed).trim();
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

impl SearchIndex {
    pub fn build(collection: &OrganizedCollection) -> Self {
        let start = Instant::now();

        let mut records = Vec::with_capacity(collection.len());
        let mut species_spans = Vec::with_capacity(collection.species_count());
        for group in collection.groups() {
            let first = records.len();
            records.extend(group.stages.values().flatten().cloned());
            species_spans.push((fold_case(&group.metadata.name), first, records.len()));
        }

        let by_id = records
            .iter()
            .enumerate()
            .map(|(idx, record)| (record.id, idx))
            .collect();

        tracing::info!(
            "Search index built in {:?}: {} records, {} species",
            start.elapsed(),
            records.len(),
            species_spans.len()
        );

        Self {
            records,
            by_id,
            species_spans,
        }
    }

    pub fn get(&self, id: u32) -> Option<&Record> {
        self.by_id.get(&id).map(|&idx| &self.records[idx])
    }

    /// Id lookup when the query reads as an id, species search otherwise
    pub fn search(&self, query: &str, limit: usize) -> Vec<&Record> {
        if let Some(id) = parse_record_id(query) {
            return self.get(id).into_iter().take(limit).collect();
        }

        let folded = fold_case(query.trim());
        if folded.is_empty() || limit == 0 {
            return Vec::new();
        }

        let prefix = self
            .species_spans
            .iter()
            .filter(|(name, _, _)| name.starts_with(&folded));
        let inner = self
            .species_spans
            .iter()
            .filter(|(name, _, _)| !name.starts_with(&folded) && name.contains(&folded));

        prefix
            .chain(inner)
            .flat_map(|(_, first, end)| &self.records[*first..*end])
            .take(limit)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Optional per-trait filter; every given trait must match (case-insensitive)
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TraitFilter {
    pub background: Option<String>,
    pub body: Option<String>,
    pub accessories: Option<String>,
    pub evolution: Option<u8>,
}

impl TraitFilter {
    pub fn is_empty(&self) -> bool {
        self.background.is_none()
            && self.body.is_none()
            && self.accessories.is_none()
            && self.evolution.is_none()
    }

    pub fn matches(&self, record: &Record) -> bool {
        let label_matches = |wanted: &Option<String>, actual: &str| {
            wanted
                .as_deref()
                .map(str::trim)
                .filter(|w| !w.is_empty())
                .map_or(true, |w| fold_case(w) == fold_case(actual))
        };

        label_matches(&self.background, &record.traits.background)
            && label_matches(&self.body, &record.traits.body)
            && label_matches(&self.accessories, &record.traits.accessories)
            && self.evolution.map_or(true, |e| e == record.traits.evolution)
    }

    /// Keep matching records, preserving their order
    pub fn apply<'a, I>(&self, records: I) -> Vec<&'a Record>
    where
        I: IntoIterator<Item = &'a Record>,
    {
        records.into_iter().filter(|r| self.matches(r)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::TraitTuple;

    fn record(id: u32, species: &str, background: &str, body: &str, evolution: u8) -> Record {
        Record {
            id,
            image_url: String::new(),
            traits: TraitTuple::new(species, background, body, "None", evolution),
            mint_address: None,
        }
    }

    fn index() -> SearchIndex {
        let organized = OrganizedCollection::organize(&[
            record(1, "Quack", "Green", "Green", 1),
            record(2, "Quack", "Yellow", "Blue", 1),
            record(3, "Quack", "Blue", "Pink", 2),
            record(4, "Bork", "Red", "Red", 1),
            record(5, "Snorkquack", "Blue", "Pink", 1),
        ]);
        SearchIndex::build(&organized)
    }

    #[test]
    fn test_parse_record_id() {
        assert_eq!(parse_record_id("42"), Some(42));
        assert_eq!(parse_record_id("#42"), Some(42));
        assert_eq!(parse_record_id(" # 7 "), Some(7));
        assert_eq!(parse_record_id("Quack"), None);
        assert_eq!(parse_record_id("#"), None);
        assert_eq!(parse_record_id("-3"), None);
    }

    #[test]
    fn test_search_by_id() {
        let index = index();
        assert_eq!(index.search("#4", 10).iter().map(|r| r.id).collect::<Vec<_>>(), vec![4]);
        assert!(index.search("999", 10).is_empty());
        assert_eq!(index.get(3).map(|r| r.traits.evolution), Some(2));
    }

    #[test]
    fn test_species_prefix_before_inner_match() {
        let index = index();
        let ids: Vec<u32> = index.search("qua", 10).iter().map(|r| r.id).collect();
        // Quack (display order within stages) then Snorkquack
        assert_eq!(ids, vec![2, 1, 3, 5]);
    }

    #[test]
    fn test_search_limit_and_blank_query() {
        let index = index();
        assert_eq!(index.search("QUACK", 2).len(), 2);
        assert!(index.search("   ", 10).is_empty());
        assert!(index.search("zzz", 10).is_empty());
    }

    #[test]
    fn test_trait_filter_keeps_order() {
        let organized = OrganizedCollection::organize(&[
            record(1, "Quack", "Blue", "Pink", 1),
            record(2, "Quack", "Yellow", "Blue", 1),
            record(3, "Quack", "Blue", "Green", 1),
            record(4, "Quack", "Blue", "Pink", 1),
        ]);
        let group = organized.group("Quack", 1).unwrap();

        let filter = TraitFilter {
            background: Some("blue".into()),
            ..Default::default()
        };
        let ids: Vec<u32> = filter.apply(group).iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 4, 3]);

        let filter = TraitFilter {
            background: Some("BLUE".into()),
            body: Some("pink".into()),
            evolution: Some(1),
            ..Default::default()
        };
        assert_eq!(filter.apply(group).len(), 2);
        assert!(TraitFilter::default().is_empty());
        assert_eq!(TraitFilter::default().apply(group).len(), 4);
    }
}
