// Creopedia backend: island-scoped creature collection tracking.

pub mod api;
pub mod auth;
pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod metrics;
pub mod seed;

use axum::{
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use db::Database;

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok", "service": "creopedia-backend" }))
}

/// Assemble the full application router around a shared database handle.
pub fn app(db: Arc<Database>) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .route("/metrics", get(metrics::metrics_handler))
        // Auth routes (no auth required)
        .route("/api/auth/signup", post(auth::signup))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/me", get(auth::me))
        .with_state(db.clone())
        .merge(api::router(db))
        .layer(CorsLayer::permissive())
        .layer(axum::middleware::from_fn(metrics::track_requests))
}
