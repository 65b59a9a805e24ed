//! Presence handlers
//!
//! Thin wrappers over the shared `PresenceTracker`. The tracker lock is
//! never held across an await point.

use axum::{extract::State, http::StatusCode, Json};
use chrono::TimeDelta;
use presence_core::{PresenceSummary, SweepReport, UserPresence, UserStatus};
use tracing::info;

use crate::dto::{
    BatchUpdateRequest, BatchUpdateResponse, CountResponse, ListUsersQuery, RecentQuery,
    RegisterRequest, UpdateStatusRequest, UserListResponse, MAX_RECENT_WINDOW_SECS,
};
use crate::extractors::{ApiQuery, UserIdPath, ValidatedJson};
use crate::response::{ApiError, ApiResult, NoContent};
use crate::state::AppState;

/// Register a user
///
/// POST /presence/users
///
/// Returns 201 for a new record and 200 if the user was already tracked
/// (the existing record is left unchanged).
pub async fn register_user(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<UserPresence>)> {
    let initial = request.status.unwrap_or(UserStatus::Online);

    let (existed, presence) = {
        let mut tracker = state.tracker().lock();
        let existed = tracker.get_status(&request.user_id).is_some();
        let presence = tracker.register_user_with_status(request.user_id, initial);
        (existed, presence)
    };

    if existed {
        Ok((StatusCode::OK, Json(presence)))
    } else {
        info!(user_id = %presence.user_id, status = %presence.status, "User registered");
        Ok((StatusCode::CREATED, Json(presence)))
    }
}

/// List tracked users, optionally filtered by status
///
/// GET /presence/users?status={status}
pub async fn list_users(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListUsersQuery>,
) -> ApiResult<Json<UserListResponse>> {
    let status = query.status()?;

    let tracker = state.tracker().lock();
    let user_ids = match status {
        Some(status) => tracker.list_by_status(status),
        None => tracker.user_ids(),
    };

    Ok(Json(user_ids.into()))
}

/// Get a user's presence
///
/// GET /presence/users/{user_id}
pub async fn get_presence(
    State(state): State<AppState>,
    UserIdPath(user_id): UserIdPath,
) -> ApiResult<Json<UserPresence>> {
    let presence = state.tracker().lock().get_status(user_id.as_str()).cloned();
    presence
        .map(Json)
        .ok_or_else(|| ApiError::presence_not_found(user_id))
}

/// Set a user's status (creates the user if unknown)
///
/// PUT /presence/users/{user_id}/status
pub async fn update_status(
    State(state): State<AppState>,
    UserIdPath(user_id): UserIdPath,
    ValidatedJson(request): ValidatedJson<UpdateStatusRequest>,
) -> ApiResult<Json<UserPresence>> {
    let presence = state.tracker().lock().update_status(user_id, request.status);
    Ok(Json(presence))
}

/// Record activity for a tracked user
///
/// POST /presence/users/{user_id}/activity
pub async fn record_activity(
    State(state): State<AppState>,
    UserIdPath(user_id): UserIdPath,
) -> ApiResult<NoContent> {
    if state.tracker().lock().record_activity(user_id.as_str()) {
        Ok(NoContent)
    } else {
        Err(ApiError::presence_not_found(user_id))
    }
}

/// Stop tracking a user
///
/// DELETE /presence/users/{user_id}
pub async fn remove_user(
    State(state): State<AppState>,
    UserIdPath(user_id): UserIdPath,
) -> ApiResult<NoContent> {
    let removed = state.tracker().lock().remove_user(user_id.as_str());
    match removed {
        Some(_) => {
            info!(user_id = %user_id, "User removed from presence tracking");
            Ok(NoContent)
        }
        None => Err(ApiError::presence_not_found(user_id)),
    }
}

/// Set the same status for several users
///
/// POST /presence/batch
pub async fn batch_update(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<BatchUpdateRequest>,
) -> ApiResult<Json<BatchUpdateResponse>> {
    let updated = state
        .tracker()
        .lock()
        .batch_update_status(request.user_ids, request.status);

    Ok(Json(BatchUpdateResponse { updated }))
}

/// Number of online users
///
/// GET /presence/online/count
pub async fn online_count(State(state): State<AppState>) -> Json<CountResponse> {
    let count = state.tracker().lock().online_count();
    Json(CountResponse { count })
}

/// Users active within a time window
///
/// GET /presence/recent?window_secs={seconds}
pub async fn recently_active(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<RecentQuery>,
) -> ApiResult<Json<UserListResponse>> {
    let window = match query.window_secs {
        Some(secs) if secs > MAX_RECENT_WINDOW_SECS => {
            return Err(ApiError::invalid_query(format!(
                "window_secs must not exceed {MAX_RECENT_WINDOW_SECS}"
            )));
        }
        Some(secs) => TimeDelta::seconds(secs as i64),
        None => state.recent_window(),
    };

    let user_ids = state.tracker().lock().recently_active(window);
    Ok(Json(user_ids.into()))
}

/// Per-status counts
///
/// GET /presence/summary
pub async fn summary(State(state): State<AppState>) -> Json<PresenceSummary> {
    let summary = state.tracker().lock().summary();
    Json(summary)
}

/// Run an inactivity sweep immediately
///
/// POST /presence/sweep
pub async fn sweep(State(state): State<AppState>) -> Json<SweepReport> {
    let report = state.tracker().lock().sweep_inactive();
    info!(
        to_away = report.to_away,
        to_offline = report.to_offline,
        "Manual presence sweep"
    );
    Json(report)
}
