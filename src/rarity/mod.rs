//! Rarity engine
//!
//! - `category`: percentile bands
//! - `table`: the persisted aggregate artifact
//! - `aggregator`: one-pass build over a snapshot
//! - `resolve`: read-only lookup of a trait combination

pub mod category;
pub mod table;
pub mod aggregator;
pub mod resolve;

// Re-export commonly used types
pub use category::RarityCategory;
pub use table::{combination_key, RarityTable, TraitTables, COMBINATION_SEPARATOR};
pub use aggregator::{average_rarity_percent, build_rarity_table, percentile_of, rarity_percent};
pub use resolve::{RarityResult, TraitRarities, TraitRarity};
