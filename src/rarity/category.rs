//! Rarity Categories
//!
//! Named bands over the combination percentile (100 x rank / M).
//! Thresholds are inclusive upper bounds, checked rarest first.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Rarity band of a combination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RarityCategory {
    Mythic,
    Legendary,
    Epic,
    Rare,
    Uncommon,
    Common,
}

/// (inclusive percentile upper bound, category)
const THRESHOLDS: [(f64, RarityCategory); 5] = [
    (1.0, RarityCategory::Mythic),
    (5.0, RarityCategory::Legendary),
    (15.0, RarityCategory::Epic),
    (35.0, RarityCategory::Rare),
    (60.0, RarityCategory::Uncommon),
];

impl RarityCategory {
    /// All categories, rarest first
    pub const ALL: [RarityCategory; 6] = [
        RarityCategory::Mythic,
        RarityCategory::Legendary,
        RarityCategory::Epic,
        RarityCategory::Rare,
        RarityCategory::Uncommon,
        RarityCategory::Common,
    ];

    /// Category for a percentile in (0, 100]
    pub fn from_percentile(percentile: f64) -> Self {
        THRESHOLDS
            .iter()
            .find(|(upper, _)| percentile <= *upper)
            .map_or(RarityCategory::Common, |(_, category)| *category)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RarityCategory::Mythic => "Mythic",
            RarityCategory::Legendary => "Legendary",
            RarityCategory::Epic => "Epic",
            RarityCategory::Rare => "Rare",
            RarityCategory::Uncommon => "Uncommon",
            RarityCategory::Common => "Common",
        }
    }
}

impl fmt::Display for RarityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_boundaries_inclusive() {
        assert_eq!(RarityCategory::from_percentile(0.5), RarityCategory::Mythic);
        assert_eq!(RarityCategory::from_percentile(1.0), RarityCategory::Mythic);
        assert_eq!(RarityCategory::from_percentile(1.0001), RarityCategory::Legendary);
        assert_eq!(RarityCategory::from_percentile(5.0), RarityCategory::Legendary);
        assert_eq!(RarityCategory::from_percentile(15.0), RarityCategory::Epic);
        assert_eq!(RarityCategory::from_percentile(35.0), RarityCategory::Rare);
        assert_eq!(RarityCategory::from_percentile(60.0), RarityCategory::Uncommon);
        assert_eq!(RarityCategory::from_percentile(60.5), RarityCategory::Common);
        assert_eq!(RarityCategory::from_percentile(100.0), RarityCategory::Common);
    }

    #[test]
    fn test_monotonic_in_percentile() {
        // Higher percentile never yields a rarer category
        let mut previous = RarityCategory::Mythic;
        for step in 1..=1000 {
            let category = RarityCategory::from_percentile(step as f64 / 10.0);
            assert!(category >= previous, "{} -> {}", step, category);
            previous = category;
        }
    }

    #[test]
    fn test_serialized_names() {
        let json = serde_json::to_string(&RarityCategory::Legendary).unwrap();
        assert_eq!(json, "\"Legendary\"");
        assert_eq!(RarityCategory::Epic.to_string(), "Epic");
    }
}
