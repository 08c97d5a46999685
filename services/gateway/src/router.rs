use crate::handlers::{bid, health, job};
use crate::state::AppState;
use axum::{extract::DefaultBodyLimit, routing::get, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Request bodies above this are rejected before reaching a handler
const MAX_BODY_BYTES: usize = 1024 * 1024;

pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health::health))
        .route("/jobs", get(job::list_jobs).post(job::create_job))
        .route("/jobs/active", get(job::list_active_jobs))
        .route("/jobs/{id}", get(job::get_job))
        .route("/jobs/{id}/bids", get(bid::list_bids).post(bid::place_bid));

    Router::new()
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
