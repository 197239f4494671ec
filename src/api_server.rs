// Axum API Server Module
//
// Purpose: read-only REST API over the two persisted build artifacts
// (rarity table + organized collection). Nothing is recomputed at serve time.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use moka::future::Cache;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::config::EngineConfig;
use crate::data::parse_evolution;
use crate::error::NotFound;
use crate::organizer::OrganizedCollection;
use crate::rarity::RarityTable;
use crate::search_index::{parse_record_id, SearchIndex, TraitFilter};
use crate::utils::normalization::fold_case;

const DEFAULT_SEARCH_LIMIT: usize = 20;
const MAX_SEARCH_LIMIT: usize = 100;
const SUMMARY_RAREST: usize = 10;

// ============================================================================
// Application State
// ============================================================================

#[derive(Clone)]
pub struct AppState {
    pub rarity: Arc<RarityTable>,
    pub collection: Arc<OrganizedCollection>,
    pub search_index: Arc<SearchIndex>,
    /// Rarity lookups keyed by case-folded query
    pub cache: Cache<String, serde_json::Value>,
}

impl AppState {
    /// Load both artifacts from the configured paths
    pub fn load(config: &EngineConfig) -> anyhow::Result<Self> {
        use anyhow::Context;

        tracing::info!("Loading rarity table...");
        let rarity = RarityTable::load(&config.rarity_output)
            .with_context(|| format!("Failed to load rarity table {:?}", config.rarity_output))?;

        tracing::info!("Loading organized collection...");
        let collection = OrganizedCollection::load(&config.organized_output).with_context(|| {
            format!("Failed to load organized collection {:?}", config.organized_output)
        })?;

        Ok(Self::from_parts(rarity, collection))
    }

    pub fn from_parts(rarity: RarityTable, collection: OrganizedCollection) -> Self {
        tracing::info!("Building search index...");
        let search_index = Arc::new(SearchIndex::build(&collection));

        tracing::info!("Initializing Moka cache...");
        let cache = Cache::builder()
            .max_capacity(10_000)
            .time_to_live(Duration::from_secs(300))
            .build();

        Self {
            rarity: Arc::new(rarity),
            collection: Arc::new(collection),
            search_index,
            cache,
        }
    }
}

// ============================================================================
// Router
// ============================================================================

pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))

        // Rarity lookup
        .route("/api/rarity", get(get_rarity))
        .route("/api/rarity/summary", get(rarity_summary))

        // Browsing
        .route("/api/species", get(list_species))
        .route("/api/species/:species/:evolution", get(get_species_stage))
        .route("/api/doopies/search", get(search_doopies))
        .route("/api/doopies/:id", get(get_doopie))

        // Middleware (applied in reverse order)
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ============================================================================
// Endpoint Handlers
// ============================================================================

async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "records": state.rarity.total_records,
        "combinations": state.rarity.total_combinations(),
    }))
}

/// Five traits of a rarity lookup; all required
#[derive(Debug, Deserialize)]
struct RarityQuery {
    species: Option<String>,
    background: Option<String>,
    body: Option<String>,
    accessories: Option<String>,
    /// `2` or `Evolution 2`
    evolution: Option<String>,
}

async fn get_rarity(
    State(state): State<AppState>,
    Query(query): Query<RarityQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let required = |value: &Option<String>, name: &str| {
        value
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .ok_or_else(|| AppError::BadRequest(format!("missing query parameter '{}'", name)))
    };

    let species = required(&query.species, "species")?;
    let background = required(&query.background, "background")?;
    let body = required(&query.body, "body")?;
    let accessories = required(&query.accessories, "accessories")?;
    let raw_evolution = required(&query.evolution, "evolution")?;
    let evolution = parse_evolution(&serde_json::Value::String(raw_evolution.clone()))
        .ok_or_else(|| AppError::BadRequest(format!("invalid evolution '{}'", raw_evolution)))?;

    let cache_key = fold_case(&format!(
        "rarity:{}+{}+{}+{}+{}",
        species, background, body, accessories, evolution
    ));

    if let Some(cached) = state.cache.get(&cache_key).await {
        tracing::debug!("Cache hit for {}", cache_key);
        return Ok(Json(cached));
    }

    let result = state
        .rarity
        .resolve(&species, &background, &body, &accessories, evolution)?;
    let value = serde_json::to_value(&result).map_err(|e| AppError::Internal(e.to_string()))?;

    state.cache.insert(cache_key, value.clone()).await;

    Ok(Json(value))
}

async fn rarity_summary(State(state): State<AppState>) -> Json<serde_json::Value> {
    let table = &state.rarity;

    let rarest: Vec<_> = table
        .ranked_combinations()
        .into_iter()
        .take(SUMMARY_RAREST)
        .filter_map(|(key, _)| table.resolve_key(key).ok())
        .collect();

    let combinations: serde_json::Map<String, serde_json::Value> = table
        .category_counts()
        .into_iter()
        .map(|(category, count)| (category.to_string(), count.into()))
        .collect();
    let records: serde_json::Map<String, serde_json::Value> = table
        .category_record_counts()
        .into_iter()
        .map(|(category, count)| (category.to_string(), count.into()))
        .collect();

    Json(serde_json::json!({
        "totalRecords": table.total_records,
        "totalCombinations": table.total_combinations(),
        "categoryCounts": combinations,
        "categoryRecordCounts": records,
        "rarest": rarest,
    }))
}

async fn list_species(State(state): State<AppState>) -> Json<serde_json::Value> {
    let species: Vec<_> = state.collection.metadata().collect();
    Json(serde_json::json!({
        "rows": species.len(),
        "data": species,
    }))
}

async fn get_species_stage(
    State(state): State<AppState>,
    Path((species, evolution)): Path<(String, String)>,
    Query(filter): Query<TraitFilter>,
) -> Result<Json<serde_json::Value>, AppError> {
    let stage = parse_evolution(&serde_json::Value::String(evolution.clone()))
        .ok_or_else(|| AppError::BadRequest(format!("invalid evolution '{}'", evolution)))?;

    let group = state
        .collection
        .species(&species)
        .ok_or_else(|| AppError::NotFound(format!("Species {} not found", species)))?;
    let records = group.stage(stage).ok_or_else(|| {
        AppError::NotFound(format!("{} has no evolution {}", group.metadata.name, stage))
    })?;

    let data = filter.apply(records);
    tracing::debug!(
        "{} evolution {}: {} of {} records after filter",
        group.metadata.name,
        stage,
        data.len(),
        records.len()
    );

    Ok(Json(serde_json::json!({
        "species": group.metadata.name,
        "evolution": stage,
        "total": records.len(),
        "representative": records.first(),
        "rows": data.len(),
        "data": data,
    })))
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    q: Option<String>,
    limit: Option<usize>,
}

async fn search_doopies(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Json<serde_json::Value> {
    let limit = params.limit.unwrap_or(DEFAULT_SEARCH_LIMIT).min(MAX_SEARCH_LIMIT);
    let query = params.q.as_deref().unwrap_or("");

    let start = std::time::Instant::now();
    let results = state.search_index.search(query, limit);
    let elapsed = start.elapsed();
    tracing::debug!("Search '{}' returned {} results in {:?}", query, results.len(), elapsed);

    Json(serde_json::json!({
        "rows": results.len(),
        "data": results,
        "query_time_us": elapsed.as_micros(),
    }))
}

async fn get_doopie(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let record = parse_record_id(&id)
        .and_then(|id| state.search_index.get(id))
        .ok_or_else(|| AppError::NotFound(format!("Doopie {} not found", id)))?;

    let rarity = match state.rarity.resolve_traits(&record.traits) {
        Ok(result) => Some(result),
        Err(e) => {
            tracing::warn!("Record {} has no rarity entry: {}", record.id, e);
            None
        }
    };

    Ok(Json(serde_json::json!({
        "doopie": record,
        "rarity": rarity,
    })))
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug)]
enum AppError {
    NotFound(String),
    BadRequest(String),
    Internal(String),
}

impl From<NotFound> for AppError {
    fn from(err: NotFound) -> Self {
        AppError::NotFound(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(serde_json::json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
