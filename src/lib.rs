//! Doopiedex Rarity & Visual-Ordering Engine
//!
//! Offline batch engine over a fixed collectible snapshot:
//! - `rarity/`: frequency, rank, percentile and category tables plus lookup
//! - `harmony`, `color`: deterministic display order of species/stage groups
//! - `organizer`: the species -> stage -> records artifact
//! - `data`: snapshot loading (nested JSON, or CSV / Parquet via Polars)
//! - `utils/`: label normalization and counting
//!
//! The build is a pure `records -> artifact` function; the optional `api`
//! feature serves the persisted artifacts read-only.

pub mod error;
pub mod config;
pub mod data;
pub mod utils;
pub mod color;
pub mod harmony;
pub mod organizer;
pub mod rarity;
pub mod stats;
pub mod search_index;
pub mod sample;

#[cfg(feature = "api")]
pub mod api_server;

// Re-export commonly used types
pub use error::{EngineError, NotFound};
pub use config::EngineConfig;
pub use data::{CollectionData, Record, TraitDimension, TraitTuple};
pub use organizer::{OrganizedCollection, SpeciesGroup, SpeciesMetadata};
pub use rarity::{build_rarity_table, RarityCategory, RarityResult, RarityTable};
pub use stats::CollectionStats;
pub use search_index::{SearchIndex, TraitFilter};
pub use utils::LabelMatch;

#[cfg(feature = "api")]
pub use api_server::{create_router, AppState};

/// Artifacts of one build
#[derive(Debug, Clone)]
pub struct BuildOutput {
    pub rarity: RarityTable,
    pub organized: OrganizedCollection,
}

/// Build both artifacts from a validated snapshot
pub fn build_artifacts(data: &CollectionData) -> Result<BuildOutput, EngineError> {
    let rarity = build_rarity_table(data.records())?;
    let organized = OrganizedCollection::organize(data.records());
    Ok(BuildOutput { rarity, organized })
}
