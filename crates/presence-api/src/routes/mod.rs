//! Route definitions
//!
//! Presence routes are mounted under /api/v1/presence; health stays at the root.

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::handlers::{events, health, presence};
use crate::state::AppState;

/// Create the main API router
pub fn create_router() -> Router<AppState> {
    Router::new()
        .merge(health_routes())
        .nest("/api/v1", api_v1_routes())
}

/// Health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health::health_check))
}

/// API v1 routes
fn api_v1_routes() -> Router<AppState> {
    Router::new().nest("/presence", presence_routes())
}

/// Presence routes
fn presence_routes() -> Router<AppState> {
    Router::new()
        // Users
        .route(
            "/users",
            post(presence::register_user).get(presence::list_users),
        )
        .route(
            "/users/:user_id",
            get(presence::get_presence).delete(presence::remove_user),
        )
        .route("/users/:user_id/status", put(presence::update_status))
        .route("/users/:user_id/activity", post(presence::record_activity))
        .route("/users/:user_id/events", get(events::stream_presence))
        // Bulk and aggregate
        .route("/batch", post(presence::batch_update))
        .route("/online/count", get(presence::online_count))
        .route("/recent", get(presence::recently_active))
        .route("/summary", get(presence::summary))
        .route("/sweep", post(presence::sweep))
}
