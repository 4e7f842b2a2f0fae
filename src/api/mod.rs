// HTTP API routes (island CRUD, creature catalog, collection progress).

pub mod creatures;

use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    routing::get,
    Router,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::auth::AuthUser;
use crate::catalog::Hemisphere;
use crate::db::{Database, Island};
use crate::error::ApiError;

// ── Request types ─────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateIslandRequest {
    pub name: Option<String>,
    pub hemisphere: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateIslandRequest {
    pub name: Option<String>,
    pub hemisphere: Option<String>,
}

// ── Shared application state ─────────────────────────────────────────

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
}

// ── Island resolution ─────────────────────────────────────────────────

/// Resolve which island a request operates on: an explicit `island_id`
/// must belong to the caller; with no selector the caller's first island
/// is used. Both misses surface as NotFound, so another user's island id
/// is indistinguishable from a nonexistent one.
pub(crate) async fn resolve_island(
    db: &Database,
    user_id: i64,
    island_id: Option<i64>,
) -> Result<Island, ApiError> {
    match island_id {
        Some(id) => db
            .get_island(id, user_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Island not found")),
        None => db
            .first_island(user_id)
            .await?
            .ok_or_else(|| ApiError::not_found("No island found. Create an island first.")),
    }
}

fn parse_hemisphere(raw: &str) -> Result<Hemisphere, ApiError> {
    Hemisphere::from_str_name(&raw.to_lowercase())
        .ok_or_else(|| ApiError::validation("hemisphere must be 'north' or 'south'"))
}

// ── Router ────────────────────────────────────────────────────────────

pub fn router(db: Arc<Database>) -> Router {
    let state = AppState { db };

    Router::new()
        // Islands
        .route("/api/islands", get(list_islands).post(create_island))
        .route(
            "/api/islands/{id}",
            get(get_island).put(update_island).delete(delete_island),
        )
        // Creature catalog with per-island progress
        .route("/api/creatures", get(creatures::get_creatures))
        // Collection toggling and aggregate stats
        .route(
            "/api/creopedia/toggle",
            axum::routing::post(creatures::toggle_creature),
        )
        .route("/api/creopedia/stats", get(creatures::creopedia_stats))
        .with_state(state)
}

// ── Island handlers ───────────────────────────────────────────────────

async fn create_island(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Json(req): Json<CreateIslandRequest>,
) -> Result<(StatusCode, Json<Island>), ApiError> {
    let name = req.name.as_deref().unwrap_or_default().trim();
    if name.is_empty() {
        return Err(ApiError::validation("name is required"));
    }

    let hemisphere = match req.hemisphere.as_deref() {
        Some(raw) => parse_hemisphere(raw)?,
        None => Hemisphere::default(),
    };

    let island = state
        .db
        .create_island(claims.sub, name, hemisphere.as_str())
        .await?;
    Ok((StatusCode::CREATED, Json(island)))
}

async fn list_islands(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<Json<Vec<Island>>, ApiError> {
    let islands = state.db.list_islands(claims.sub).await?;
    Ok(Json(islands))
}

async fn get_island(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<Island>, ApiError> {
    let island = state
        .db
        .get_island(id, claims.sub)
        .await?
        .ok_or_else(|| ApiError::not_found("Island not found"))?;
    Ok(Json(island))
}

async fn update_island(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<i64>,
    Json(req): Json<UpdateIslandRequest>,
) -> Result<Json<Island>, ApiError> {
    let island = state
        .db
        .get_island(id, claims.sub)
        .await?
        .ok_or_else(|| ApiError::not_found("Island not found"))?;

    // Absent fields keep their current values; present fields are validated.
    let name = match req.name.as_deref() {
        Some(raw) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return Err(ApiError::validation("name cannot be empty"));
            }
            trimmed.to_string()
        }
        None => island.name,
    };

    let hemisphere = match req.hemisphere.as_deref() {
        Some(raw) => parse_hemisphere(raw)?.as_str().to_string(),
        None => island.hemisphere,
    };

    let updated = state
        .db
        .update_island(id, claims.sub, &name, &hemisphere)
        .await?
        .ok_or_else(|| ApiError::not_found("Island not found"))?;
    Ok(Json(updated))
}

async fn delete_island(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if !state.db.delete_island(id, claims.sub).await? {
        return Err(ApiError::not_found("Island not found"));
    }
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_db() -> Database {
        Database::new("sqlite::memory:").await.unwrap()
    }

    #[tokio::test]
    async fn test_resolve_island_explicit_id() {
        let db = test_db().await;
        let user = db.create_user("u@example.com", "h").await.unwrap();
        let island = db.create_island(user.id, "Isle", "north").await.unwrap();

        let resolved = resolve_island(&db, user.id, Some(island.id)).await.unwrap();
        assert_eq!(resolved.id, island.id);
    }

    #[tokio::test]
    async fn test_resolve_island_rejects_foreign_island() {
        let db = test_db().await;
        let owner = db.create_user("owner@example.com", "h").await.unwrap();
        let other = db.create_user("other@example.com", "h").await.unwrap();
        let island = db.create_island(owner.id, "Isle", "north").await.unwrap();

        let err = resolve_island(&db, other.id, Some(island.id))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Island not found");
    }

    #[tokio::test]
    async fn test_resolve_island_defaults_to_first() {
        let db = test_db().await;
        let user = db.create_user("u@example.com", "h").await.unwrap();
        let first = db.create_island(user.id, "First", "north").await.unwrap();
        db.create_island(user.id, "Second", "south").await.unwrap();

        let resolved = resolve_island(&db, user.id, None).await.unwrap();
        assert_eq!(resolved.id, first.id);
    }

    #[tokio::test]
    async fn test_resolve_island_without_any_island() {
        let db = test_db().await;
        let user = db.create_user("u@example.com", "h").await.unwrap();

        let err = resolve_island(&db, user.id, None).await.unwrap_err();
        assert_eq!(err.to_string(), "No island found. Create an island first.");
    }

    #[test]
    fn test_parse_hemisphere() {
        assert_eq!(parse_hemisphere("north").unwrap(), Hemisphere::North);
        assert_eq!(parse_hemisphere("SOUTH").unwrap(), Hemisphere::South);
        assert!(parse_hemisphere("equator").is_err());
    }
}
