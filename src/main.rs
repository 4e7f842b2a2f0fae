use std::sync::Arc;

use tower_http::services::ServeDir;

use creopedia_backend::{app, config::Config, db::Database, metrics, seed};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let config = Config::load();
    metrics::register_metrics();

    let db = Database::new(&config.database_url)
        .await
        .expect("Failed to initialize database");
    let db = Arc::new(db);

    // Seed the creature catalog on first boot.
    let seed_raw = match &config.seed_file {
        Some(path) => std::fs::read_to_string(path).expect("Failed to read seed file"),
        None => seed::DEFAULT_SEED.to_string(),
    };
    let seeded = seed::seed_if_empty(&db, &seed_raw)
        .await
        .expect("Failed to seed creature catalog");
    if seeded > 0 {
        tracing::info!("Seeded {seeded} creatures");
    }

    let mut app = app(db);

    if let Some(static_dir) = &config.static_dir {
        app = app.fallback_service(ServeDir::new(static_dir));
    }

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port))
        .await
        .expect("Failed to bind to port");

    tracing::info!("Creopedia backend listening on port {}", config.port);
    axum::serve(listener, app)
        .await
        .expect("Failed to start server");
}
