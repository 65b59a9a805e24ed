//! Health check handler

use axum::{extract::State, Json};

use crate::dto::HealthResponse;
use crate::state::AppState;

/// Basic health check (liveness)
///
/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let tracked_users = state.tracker().lock().len();
    Json(HealthResponse::healthy(tracked_users))
}
