//! Harmony Sorter
//!
//! Orders the records of one species/evolution group for display. The first
//! record after sorting is the group's default representative.
//!
//! Scoring (labels compared case-insensitively):
//! - Yellow background + Blue body: 1000
//! - Blue background + Pink body:    900
//! - anything else: 800 x complementarity(background, body), so in [0, 800]
//!
//! Equal scores are ordered by ascending record id, which makes the result
//! independent of input order.

use crate::color::{color_of, complementarity};
use crate::data::Record;
use std::cmp::Ordering;

/// Score of the Yellow/Blue pairing
pub const YELLOW_BLUE_SCORE: f64 = 1000.0;
/// Score of the Blue/Pink pairing
pub const BLUE_PINK_SCORE: f64 = 900.0;
/// Upper bound of the generic complementarity tier
pub const COMPLEMENTARITY_SCALE: f64 = 800.0;

/// Harmony score of a background/body pairing
pub fn harmony_score(background: &str, body: &str) -> f64 {
    let background = background.trim();
    let body = body.trim();

    if background.eq_ignore_ascii_case("yellow") && body.eq_ignore_ascii_case("blue") {
        return YELLOW_BLUE_SCORE;
    }
    if background.eq_ignore_ascii_case("blue") && body.eq_ignore_ascii_case("pink") {
        return BLUE_PINK_SCORE;
    }

    COMPLEMENTARITY_SCALE * complementarity(color_of(background), color_of(body))
}

/// Harmony score of a record
pub fn record_score(record: &Record) -> f64 {
    harmony_score(&record.traits.background, &record.traits.body)
}

/// Display order: descending score, then ascending id
fn display_order(a: &(f64, &Record), b: &(f64, &Record)) -> Ordering {
    b.0.total_cmp(&a.0).then_with(|| a.1.id.cmp(&b.1.id))
}

/// Sort a group in place into display order
pub fn sort_group(records: &mut Vec<Record>) {
    let mut scored: Vec<(f64, Record)> = records
        .drain(..)
        .map(|record| (record_score(&record), record))
        .collect();

    scored.sort_by(|a, b| display_order(&(a.0, &a.1), &(b.0, &b.1)));
    records.extend(scored.into_iter().map(|(_, record)| record));
}

/// Records of a group paired with their score, in display order
pub fn scored_group(records: &[Record]) -> Vec<(f64, &Record)> {
    let mut scored: Vec<(f64, &Record)> = records
        .iter()
        .map(|record| (record_score(record), record))
        .collect();
    scored.sort_by(display_order);
    scored
}

/// The group's default representative (highest harmony)
pub fn representative(records: &[Record]) -> Option<&Record> {
    scored_group(records).first().map(|(_, record)| *record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::TraitTuple;
    use approx::assert_relative_eq;

    fn record(id: u32, background: &str, body: &str) -> Record {
        Record {
            id,
            image_url: String::new(),
            traits: TraitTuple::new("Quack", background, body, "None", 1),
            mint_address: None,
        }
    }

    #[test]
    fn test_priority_tiers() {
        assert_relative_eq!(harmony_score("Yellow", "Blue"), 1000.0);
        assert_relative_eq!(harmony_score("yellow", "BLUE"), 1000.0);
        assert_relative_eq!(harmony_score("Blue", "Pink"), 900.0);
        assert_relative_eq!(harmony_score("blue", "pink"), 900.0);
    }

    #[test]
    fn test_generic_tier_below_priorities() {
        for (bg, body) in [("Hell", "Neotide"), ("Pink", "Blue"), ("Dead", "Zebra"), ("Plaid", "Tweed")] {
            let score = harmony_score(bg, body);
            assert!((0.0..=COMPLEMENTARITY_SCALE).contains(&score), "{}/{} -> {}", bg, body, score);
            assert!(score < BLUE_PINK_SCORE);
        }
    }

    #[test]
    fn test_yellow_blue_sorts_first() {
        // Hell/Neotide is a strong complement, still below both fixed tiers
        let mut group = vec![
            record(1, "Hell", "Neotide"),
            record(2, "Blue", "Pink"),
            record(3, "Yellow", "Blue"),
            record(4, "Green", "Green"),
        ];
        sort_group(&mut group);

        let ids: Vec<u32> = group.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3, 2, 1, 4]);
    }

    #[test]
    fn test_ties_broken_by_id() {
        let mut group = vec![
            record(9, "Yellow", "Blue"),
            record(2, "Yellow", "Blue"),
            record(5, "yellow", "blue"),
        ];
        sort_group(&mut group);

        let ids: Vec<u32> = group.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2, 5, 9]);
    }

    #[test]
    fn test_order_independent_of_input_order() {
        let records = vec![
            record(1, "Pink", "Green"),
            record(2, "Purple", "Yellow"),
            record(3, "Black", "Black"),
            record(4, "Blue", "Pink"),
        ];
        let mut forward = records.clone();
        let mut backward: Vec<Record> = records.into_iter().rev().collect();
        sort_group(&mut forward);
        sort_group(&mut backward);
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_representative() {
        let group = vec![record(1, "Black", "Black"), record(2, "Blue", "Pink")];
        assert_eq!(representative(&group).map(|r| r.id), Some(2));
        assert!(representative(&[]).is_none());
    }
}
