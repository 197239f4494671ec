//! Collection Data Loading
//!
//! Loads the collectible snapshot produced by the ingestion step and turns it
//! into validated, immutable `Record`s.
//!
//! Two snapshot shapes are accepted:
//! - Nested JSON keyed by species, then evolution stage (`doopies_metadata.json`)
//! - Flat CSV / Parquet tables, one row per record (read with Polars)
//!
//! Validation is all-or-nothing: one record with a missing trait aborts the load.

use crate::error::EngineError;
use crate::rarity::table::COMBINATION_SEPARATOR;
use polars::prelude::*;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

/// Highest evolution stage in the collection
pub const MAX_EVOLUTION: u8 = 4;

/// One of the five trait slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraitDimension {
    Species,
    Background,
    Body,
    Accessories,
    Evolution,
}

impl TraitDimension {
    /// All dimensions in Combination Key order
    pub const ALL: [TraitDimension; 5] = [
        TraitDimension::Species,
        TraitDimension::Background,
        TraitDimension::Body,
        TraitDimension::Accessories,
        TraitDimension::Evolution,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TraitDimension::Species => "species",
            TraitDimension::Background => "background",
            TraitDimension::Body => "body",
            TraitDimension::Accessories => "accessories",
            TraitDimension::Evolution => "evolution",
        }
    }
}

impl fmt::Display for TraitDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Five-slot descriptor of a collectible's visual variant
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TraitTuple {
    pub species: String,
    pub background: String,
    pub body: String,
    pub accessories: String,
    pub evolution: u8,
}

impl TraitTuple {
    pub fn new(
        species: impl Into<String>,
        background: impl Into<String>,
        body: impl Into<String>,
        accessories: impl Into<String>,
        evolution: u8,
    ) -> Self {
        Self {
            species: species.into(),
            background: background.into(),
            body: body.into(),
            accessories: accessories.into(),
            evolution,
        }
    }

    /// Label of one dimension (evolution rendered as its stage number)
    pub fn label(&self, dimension: TraitDimension) -> Cow<'_, str> {
        match dimension {
            TraitDimension::Species => Cow::Borrowed(&self.species),
            TraitDimension::Background => Cow::Borrowed(&self.background),
            TraitDimension::Body => Cow::Borrowed(&self.body),
            TraitDimension::Accessories => Cow::Borrowed(&self.accessories),
            TraitDimension::Evolution => Cow::Owned(self.evolution.to_string()),
        }
    }
}

/// One collectible unit. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: u32,
    pub image_url: String,
    pub traits: TraitTuple,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mint_address: Option<String>,
}

/// Record as it arrives from the ingestion step, before validation
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRecord {
    pub id: u32,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub traits: RawTraits,
    #[serde(default)]
    pub mint_address: Option<String>,
}

/// Trait fields as delivered; any of them may be absent
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTraits {
    pub species: Option<String>,
    pub background: Option<String>,
    pub body: Option<String>,
    pub accessories: Option<String>,
    /// Either a number or a label like "Evolution 2"
    pub evolution: Option<serde_json::Value>,
}

impl RawRecord {
    /// Validate into an immutable `Record`
    pub fn validate(self) -> Result<Record, EngineError> {
        let id = self.id;
        let required = |value: Option<String>, dimension: TraitDimension| {
            let label = value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or(EngineError::MissingTrait { id, dimension })?;
            check_label(id, dimension, &label)?;
            Ok::<_, EngineError>(label)
        };

        let species = required(self.traits.species, TraitDimension::Species)?;
        let background = required(self.traits.background, TraitDimension::Background)?;
        let body = required(self.traits.body, TraitDimension::Body)?;
        let accessories = required(self.traits.accessories, TraitDimension::Accessories)?;

        let raw_evolution = self.traits.evolution.ok_or(EngineError::MissingTrait {
            id,
            dimension: TraitDimension::Evolution,
        })?;
        let evolution = parse_evolution(&raw_evolution).ok_or_else(|| {
            EngineError::InvalidEvolution {
                id,
                value: raw_evolution.to_string(),
            }
        })?;

        Ok(Record {
            id,
            image_url: self.image_url,
            traits: TraitTuple {
                species,
                background,
                body,
                accessories,
                evolution,
            },
            mint_address: self.mint_address.filter(|m| !m.is_empty()),
        })
    }
}

/// Reject labels that would split a Combination Key
pub fn check_label(id: u32, dimension: TraitDimension, label: &str) -> Result<(), EngineError> {
    if label.contains(COMBINATION_SEPARATOR) {
        return Err(EngineError::InvalidLabel {
            id,
            dimension,
            value: label.to_string(),
        });
    }
    Ok(())
}

/// Parse an evolution stage from a number or a label like "Evolution 3"
///
/// Returns None when no stage in 1..=MAX_EVOLUTION can be read.
pub fn parse_evolution(value: &serde_json::Value) -> Option<u8> {
    let stage = match value {
        serde_json::Value::Number(n) => n.as_u64()?,
        serde_json::Value::String(s) => parse_evolution_label(s)?,
        _ => return None,
    };

    u8::try_from(stage)
        .ok()
        .filter(|stage| (1..=MAX_EVOLUTION).contains(stage))
}

/// First run of digits in the label
fn parse_evolution_label(label: &str) -> Option<u64> {
    let digits: String = label
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

/// Per-species entry of the nested snapshot
///
/// Stage keys ("1".."4") are collected by `flatten`; an optional `metadata`
/// block written by earlier builds is ignored on input.
#[derive(Debug, Default, Deserialize)]
pub struct RawSpeciesEntry {
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
    #[serde(flatten)]
    pub stages: BTreeMap<String, Vec<RawRecord>>,
}

/// Validated record snapshot
#[derive(Debug, Clone, Default)]
pub struct CollectionData {
    records: Vec<Record>,
}

impl CollectionData {
    /// Load a snapshot, choosing the reader by file extension
    ///
    /// `.csv` and `.parquet` use the flat Polars readers, anything else is
    /// parsed as nested JSON.
    pub fn load(path: &Path) -> Result<Self, EngineError> {
        tracing::info!("Loading snapshot {:?}", path);

        let data = match path.extension().and_then(|e| e.to_str()) {
            Some("csv") => Self::from_frame(&Self::read_csv(path)?)?,
            Some("parquet") => Self::from_frame(&Self::read_parquet(path)?)?,
            _ => {
                let contents = fs::read_to_string(path)?;
                Self::from_nested_json(&contents)?
            }
        };

        tracing::info!("  Records: {}", data.len());
        Ok(data)
    }

    /// Parse the nested `{species: {stage: [record, ...]}}` document
    pub fn from_nested_json(json: &str) -> Result<Self, EngineError> {
        let nested: BTreeMap<String, RawSpeciesEntry> = serde_json::from_str(json)?;

        let raw = nested
            .into_values()
            .flat_map(|entry| entry.stages.into_values())
            .flatten();

        Self::from_raw_records(raw)
    }

    /// Validate raw records; fails on the first invalid record or duplicate id
    pub fn from_raw_records<I>(raw: I) -> Result<Self, EngineError>
    where
        I: IntoIterator<Item = RawRecord>,
    {
        let mut seen: FxHashSet<u32> = FxHashSet::default();
        let mut records = Vec::new();

        for raw_record in raw {
            let record = raw_record.validate()?;
            if !seen.insert(record.id) {
                return Err(EngineError::DuplicateId(record.id));
            }
            records.push(record);
        }

        Ok(Self { records })
    }

    /// Wrap already-validated records (still checks id uniqueness)
    pub fn from_records(records: Vec<Record>) -> Result<Self, EngineError> {
        let mut seen: FxHashSet<u32> = FxHashSet::default();
        for record in &records {
            if !seen.insert(record.id) {
                return Err(EngineError::DuplicateId(record.id));
            }
        }
        Ok(Self { records })
    }

    fn read_csv(path: &Path) -> Result<DataFrame, EngineError> {
        let df = CsvReadOptions::default()
            .with_has_header(true)
            .try_into_reader_with_file_path(Some(path.to_path_buf()))?
            .finish()?;
        Ok(df)
    }

    fn read_parquet(path: &Path) -> Result<DataFrame, EngineError> {
        let df = LazyFrame::scan_parquet(path, Default::default())?.collect()?;
        Ok(df)
    }

    /// Build records from a flat table
    ///
    /// Required columns: species, background, body, accessories, evolution.
    /// Optional: id (falls back to row position + 1), image_url, mint_address.
    pub fn from_frame(df: &DataFrame) -> Result<Self, EngineError> {
        let height = df.height();

        let species = required_strings(df, "species")?;
        let backgrounds = required_strings(df, "background")?;
        let bodies = required_strings(df, "body")?;
        let accessories = required_strings(df, "accessories")?;
        let evolutions = required_strings(df, "evolution")?;
        let image_urls = optional_strings(df, "image_url")?;
        let mint_addresses = optional_strings(df, "mint_address")?;
        let ids = optional_ids(df)?;

        let raw = (0..height).map(|idx| RawRecord {
            id: ids[idx].unwrap_or(idx as u32 + 1),
            image_url: image_urls[idx].clone().unwrap_or_default(),
            traits: RawTraits {
                species: species[idx].clone(),
                background: backgrounds[idx].clone(),
                body: bodies[idx].clone(),
                accessories: accessories[idx].clone(),
                evolution: evolutions[idx].clone().map(serde_json::Value::String),
            },
            mint_address: mint_addresses[idx].clone(),
        });

        Self::from_raw_records(raw)
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// String values of a column, cast to String dtype
fn required_strings(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>, EngineError> {
    let column = df
        .column(name)
        .map_err(|_| EngineError::MissingColumn(name.to_string()))?
        .cast(&DataType::String)?;

    let values = column
        .str()?
        .into_iter()
        .map(|v| v.map(|s| s.to_string()))
        .collect();
    Ok(values)
}

fn optional_strings(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>, EngineError> {
    match required_strings(df, name) {
        Err(EngineError::MissingColumn(_)) => Ok(vec![None; df.height()]),
        other => other,
    }
}

fn optional_ids(df: &DataFrame) -> Result<Vec<Option<u32>>, EngineError> {
    let Ok(column) = df.column("id") else {
        return Ok(vec![None; df.height()]);
    };
    let column = column.cast(&DataType::Int64)?;

    let ids = column
        .i64()?
        .into_iter()
        .map(|v| v.and_then(|id| u32::try_from(id).ok()))
        .collect();
    Ok(ids)
}
