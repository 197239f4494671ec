//! Label Normalization
//!
//! The one place where a user-supplied label is matched against a table of
//! canonical labels: exact match first, then a case-insensitive scan that
//! adopts the table's spelling.
//!
//! Used by the colour palette, the per-dimension trait tables, and the
//! combination-key lookup.

use std::collections::BTreeMap;

/// Outcome of matching a label against canonical keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelMatch<'a> {
    /// Canonical spelling of the matched key
    Found(&'a str),
    NotFound,
}

impl<'a> LabelMatch<'a> {
    pub fn found(self) -> Option<&'a str> {
        match self {
            LabelMatch::Found(key) => Some(key),
            LabelMatch::NotFound => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, LabelMatch::Found(_))
    }
}

/// Case-folded form used for every case-insensitive comparison
pub fn fold_case(label: &str) -> String {
    label.to_lowercase()
}

/// Match `query` against candidate keys
///
/// An exact match always wins; otherwise the first case-insensitive match in
/// iteration order is returned.
pub fn canonical_label<'a, I>(candidates: I, query: &str) -> LabelMatch<'a>
where
    I: IntoIterator<Item = &'a str>,
{
    let folded_query = fold_case(query);
    let mut fallback = LabelMatch::NotFound;

    for candidate in candidates {
        if candidate == query {
            return LabelMatch::Found(candidate);
        }
        if !fallback.is_found() && fold_case(candidate) == folded_query {
            fallback = LabelMatch::Found(candidate);
        }
    }

    fallback
}

/// Match `query` against the keys of a canonical-casing table
///
/// Exact hits are O(log n); only misses pay for the scan.
pub fn canonical_key<'a, V>(table: &'a BTreeMap<String, V>, query: &str) -> LabelMatch<'a> {
    if let Some((key, _)) = table.get_key_value(query) {
        return LabelMatch::Found(key.as_str());
    }
    canonical_label(table.keys().map(String::as_str), query)
}
