//! Error types
//!
//! Two separate families:
//! - `EngineError`: build-time and IO faults. The whole build aborts.
//! - `NotFound`: a rarity lookup that has no answer. This is an ordinary
//!   outcome for callers ("no such variant"), never a fault.

use crate::data::TraitDimension;
use thiserror::Error;

/// Fatal error raised while loading a snapshot or building artifacts
#[derive(Debug, Error)]
pub enum EngineError {
    /// A record lacks one of the five trait fields
    #[error("record {id} is missing required trait '{dimension}'")]
    MissingTrait { id: u32, dimension: TraitDimension },

    /// Evolution stage not in 1..=4 (or not parseable)
    #[error("record {id} has invalid evolution stage '{value}'")]
    InvalidEvolution { id: u32, value: String },

    /// A label contains the Combination Key separator
    #[error("record {id} has {dimension} label '{value}' containing the key separator")]
    InvalidLabel {
        id: u32,
        dimension: TraitDimension,
        value: String,
    },

    #[error("duplicate record id {0}")]
    DuplicateId(u32),

    #[error("snapshot contains no records")]
    EmptyCollection,

    /// Flat snapshot lacks a required column
    #[error("column '{0}' not found in snapshot")]
    MissingColumn(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),
}

/// Why a rarity lookup found nothing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotFound {
    /// The label was never observed in that dimension
    #[error("unknown {dimension} '{value}'")]
    UnknownTrait {
        dimension: TraitDimension,
        value: String,
    },

    /// Every label is known but the joint combination was never observed
    #[error("combination '{key}' does not exist in the collection")]
    UnknownCombination { key: String },
}
