//! sdoc-server - SmartDocs pipeline tracker API
//!
//! HTTP surface over the pipeline state store: project lifecycle
//! (create/list/fetch/delete), health probe, and read-only static serving of
//! the storage tree under `/storage`. The pipeline workers mutate the same
//! store out of process; everything here is either a single atomic write or
//! a consistent-as-of-read-time snapshot.

use axum::extract::DefaultBodyLimit;
use axum::Router;
use sqlx::SqlitePool;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use sdoc_common::paths::StorageLayout;

pub mod api;
pub mod db;
pub mod error;

/// Upload size cap: 500 MiB.
pub const MAX_UPLOAD_BYTES: usize = 500 * 1024 * 1024;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Storage path layout (the lifecycle service is the only writer here)
    pub storage: StorageLayout,
}

impl AppState {
    pub fn new(db: SqlitePool, storage: StorageLayout) -> Self {
        Self { db, storage }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    let storage_root = state.storage.root().to_path_buf();

    Router::new()
        .route(
            "/projects",
            get(api::list_projects).post(api::create_project),
        )
        .route(
            "/projects/:id",
            get(api::get_project).delete(api::delete_project),
        )
        .merge(api::health_routes())
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .nest_service("/storage", ServeDir::new(storage_root))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
