//! Route definitions for the API.

use axum::{
    extract::DefaultBodyLimit,
    http::Method,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers;
use super::SharedState;

/// Source uploads can be sizable; cap them well above axum's 2 MB default.
const UPLOAD_BODY_LIMIT: usize = 512 * 1024 * 1024;

/// Create the main API router
pub fn create_router(state: SharedState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health::health_check))
        .nest("/api", api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// API routes consumed by the dashboard
fn api_routes() -> Router<SharedState> {
    Router::new()
        .route("/auth", post(handlers::auth::authenticate))
        .route(
            "/build/source",
            post(handlers::builds::start_source_build)
                .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route("/build/remote", post(handlers::builds::start_remote_build))
        .route("/jobs", get(handlers::builds::list_jobs))
        .route("/jobs/:id", get(handlers::builds::get_job))
        .route("/jobs/:id/files", get(handlers::builds::list_job_files))
        .route("/files/:id/download", get(handlers::files::download))
        .route("/alerts", get(handlers::alerts::list_alerts))
}
