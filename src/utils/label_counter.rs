//! Label Frequency Counter
//!
//! Counts how many records carry each label. Labels differing only by case
//! are counted together under the first-seen spelling, which becomes the
//! canonical key written to the rarity artifact.

use crate::utils::normalization::fold_case;
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;

/// Frequency table with first-seen canonical casing
#[derive(Debug, Clone, Default)]
pub struct LabelCounter {
    /// Case-folded label -> position in `entries`
    index: FxHashMap<String, usize>,
    /// (canonical label, count) in first-seen order
    entries: Vec<(String, u64)>,
}

impl LabelCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one occurrence and return the canonical spelling
    pub fn observe(&mut self, label: &str) -> &str {
        let folded = fold_case(label);
        let existing = self.index.get(&folded).copied();
        let idx = match existing {
            Some(idx) => idx,
            None => {
                let idx = self.entries.len();
                self.entries.push((label.to_string(), 0));
                self.index.insert(folded, idx);
                idx
            }
        };

        let entry = &mut self.entries[idx];
        entry.1 += 1;
        &entry.0
    }

    /// Canonical spelling of an already-observed label
    pub fn canonical(&self, label: &str) -> Option<&str> {
        self.index
            .get(&fold_case(label))
            .map(|&idx| self.entries[idx].0.as_str())
    }

    pub fn count(&self, label: &str) -> u64 {
        self.index
            .get(&fold_case(label))
            .map_or(0, |&idx| self.entries[idx].1)
    }

    /// Number of distinct labels
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all counts
    pub fn total(&self) -> u64 {
        self.entries.iter().map(|(_, count)| count).sum()
    }

    /// (canonical label, count) in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.entries.iter().map(|(label, count)| (label.as_str(), *count))
    }

    pub fn into_map(self) -> BTreeMap<String, u64> {
        self.entries.into_iter().collect()
    }
}

/// Count a stream of labels
pub fn count_labels<'a, I>(labels: I) -> LabelCounter
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counter = LabelCounter::new();
    for label in labels {
        counter.observe(label);
    }
    counter
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_labels() {
        let counter = count_labels(["Blue", "Pink", "Blue", "Yellow", "Blue"]);

        assert_eq!(counter.len(), 3);
        assert_eq!(counter.count("Blue"), 3);
        assert_eq!(counter.count("Pink"), 1);
        assert_eq!(counter.count("Green"), 0);
        assert_eq!(counter.total(), 5);
    }

    #[test]
    fn test_first_seen_casing_is_canonical() {
        let mut counter = LabelCounter::new();
        assert_eq!(counter.observe("Yellow"), "Yellow");
        assert_eq!(counter.observe("YELLOW"), "Yellow");
        assert_eq!(counter.observe("yellow"), "Yellow");

        assert_eq!(counter.len(), 1);
        assert_eq!(counter.canonical("yElLoW"), Some("Yellow"));

        let map = counter.into_map();
        assert_eq!(map.get("Yellow"), Some(&3));
        assert!(!map.contains_key("yellow"));
    }

    #[test]
    fn test_iteration_in_first_seen_order() {
        let counter = count_labels(["b", "a", "c", "a"]);
        let order: Vec<&str> = counter.iter().map(|(label, _)| label).collect();
        assert_eq!(order, vec!["b", "a", "c"]);
    }
}
