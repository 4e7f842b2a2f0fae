// Creature catalog listing, collection toggling, and progress stats.

use axum::extract::{Json, Query, State};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashSet;

use crate::api::{resolve_island, AppState};
use crate::auth::AuthUser;
use crate::catalog::{self, Category, CollectionStats, CreatureFilter, Hemisphere};
use crate::error::ApiError;
use crate::metrics;

#[derive(Deserialize)]
pub struct CreatureListParams {
    pub island_id: Option<i64>,
    pub category: Option<String>,
    pub month: Option<u8>,
    pub collected: Option<bool>,
    pub search: Option<String>,
}

#[derive(Deserialize)]
pub struct ToggleRequest {
    pub creature_id: Option<i64>,
    pub collected: Option<bool>,
    pub island_id: Option<i64>,
}

#[derive(Deserialize)]
pub struct StatsParams {
    pub island_id: Option<i64>,
}

/// `GET /api/creatures`: the whole catalog for one island, filtered
/// in memory, plus the island's global collection stats.
///
/// The stats block always covers the full catalog, whatever filters the
/// request carries, so per-category sums stay consistent with the overall
/// counts on every response.
pub async fn get_creatures(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Query(params): Query<CreatureListParams>,
) -> Result<Json<Value>, ApiError> {
    let island = resolve_island(&state.db, claims.sub, params.island_id).await?;

    if let Some(month) = params.month {
        if !(1..=12).contains(&month) {
            return Err(ApiError::validation("month must be between 1 and 12"));
        }
    }

    // An unknown category string disables the filter rather than erroring.
    let filter = CreatureFilter {
        category: params.category.as_deref().and_then(Category::from_str_name),
        month: params.month,
        collected: params.collected,
        search: params.search,
    };

    let hemisphere = Hemisphere::from_str_name(&island.hemisphere).unwrap_or_default();
    let all_creatures = state.db.list_creatures().await?;
    let collected_ids: HashSet<i64> = state
        .db
        .collected_ids(island.id)
        .await?
        .into_iter()
        .collect();

    let entries = catalog::filter_creatures(&all_creatures, &collected_ids, hemisphere, &filter);
    let stats = catalog::collection_stats(&all_creatures, &collected_ids);

    Ok(Json(json!({ "creatures": entries, "stats": stats })))
}

/// `POST /api/creopedia/toggle`: set one creature's collected flag on an
/// island. Defaults to marking collected when the body omits the flag.
pub async fn toggle_creature(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Json(req): Json<ToggleRequest>,
) -> Result<Json<Value>, ApiError> {
    let creature_id = req
        .creature_id
        .ok_or_else(|| ApiError::validation("creature_id is required"))?;
    let collected = req.collected.unwrap_or(true);

    let island = resolve_island(&state.db, claims.sub, req.island_id).await?;
    let creature = state
        .db
        .get_creature(creature_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Creature not found"))?;

    let progress = state
        .db
        .set_collected(island.id, creature.id, collected)
        .await?;

    let label = if progress.collected { "collected" } else { "uncollected" };
    metrics::CREATURE_TOGGLES_TOTAL
        .with_label_values(&[label])
        .inc();

    Ok(Json(json!({
        "success": true,
        "creature_id": creature.id,
        "collected": progress.collected,
        "collected_date": progress.collected_at,
    })))
}

/// `GET /api/creopedia/stats`: the island's collection progress across
/// the full catalog.
pub async fn creopedia_stats(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Query(params): Query<StatsParams>,
) -> Result<Json<CollectionStats>, ApiError> {
    let island = resolve_island(&state.db, claims.sub, params.island_id).await?;

    let all_creatures = state.db.list_creatures().await?;
    let collected_ids: HashSet<i64> = state
        .db
        .collected_ids(island.id)
        .await?
        .into_iter()
        .collect();

    Ok(Json(catalog::collection_stats(&all_creatures, &collected_ids)))
}
