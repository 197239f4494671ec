//! Utility modules shared by the rarity and harmony engines
//!
//! - Normalization: canonical-casing label lookup
//! - Label counting: first-seen-casing frequency tables

pub mod normalization;
pub mod label_counter;

// Re-export commonly used types
pub use normalization::{LabelMatch, canonical_key, canonical_label, fold_case};
pub use label_counter::{LabelCounter, count_labels};
