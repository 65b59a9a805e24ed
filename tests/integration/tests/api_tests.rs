//! API Integration Tests
//!
//! Each test starts an in-process server whose tracker reads a manual clock,
//! so decay is driven deterministically through `TestServer::advance` and the
//! sweep endpoint.
//!
//! Run with: cargo test -p integration-tests --test api_tests

use chrono::TimeDelta;
use integration_tests::{
    assert_json, assert_status, fixtures::*, TestServer,
};
use presence_api::dto::{BatchUpdateResponse, CountResponse, HealthResponse, UserListResponse};
use presence_core::{PresenceSummary, SweepReport, UserId, UserPresence, UserStatus};
use reqwest::StatusCode;
use serde_json::{json, Value};

// ============================================================================
// Health Check Tests
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    let server = TestServer::start().await.expect("Failed to start server");
    server.post("/users", &RegisterBody::unique()).await.unwrap();

    let response = server.get("/health").await.expect("Request failed");
    let health: HealthResponse = assert_json(response, StatusCode::OK).await.unwrap();

    assert_eq!(health.status, "healthy");
    assert_eq!(health.tracked_users, 1);
}

#[tokio::test]
async fn test_request_id_is_returned() {
    let server = TestServer::start().await.expect("Failed to start server");

    let response = server.get("/health").await.unwrap();
    assert!(response.headers().contains_key("x-request-id"));
}

// ============================================================================
// Registration Tests
// ============================================================================

#[tokio::test]
async fn test_register_user() {
    let server = TestServer::start().await.expect("Failed to start server");
    let request = RegisterBody::unique();

    let response = server.post("/users", &request).await.unwrap();
    let presence: UserPresence = assert_json(response, StatusCode::CREATED).await.unwrap();

    assert_eq!(presence.user_id.as_str(), request.user_id);
    assert_eq!(presence.status, UserStatus::Online);
    assert_eq!(presence.last_seen, presence.last_activity);
}

#[tokio::test]
async fn test_register_with_initial_status() {
    let server = TestServer::start().await.expect("Failed to start server");
    let request = RegisterBody::with_status(unique_user_id(), "away");

    let response = server.post("/users", &request).await.unwrap();
    let presence: UserPresence = assert_json(response, StatusCode::CREATED).await.unwrap();

    assert_eq!(presence.status, UserStatus::Away);
}

#[tokio::test]
async fn test_register_existing_user_keeps_record() {
    let server = TestServer::start().await.expect("Failed to start server");
    let user_id = unique_user_id();

    let response = server
        .post("/users", &RegisterBody::with_status(user_id.clone(), "away"))
        .await
        .unwrap();
    let first: UserPresence = assert_json(response, StatusCode::CREATED).await.unwrap();

    server.advance(TimeDelta::minutes(1));

    let response = server
        .post("/users", &RegisterBody::with_status(user_id, "online"))
        .await
        .unwrap();
    let second: UserPresence = assert_json(response, StatusCode::OK).await.unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn test_register_empty_user_id() {
    let server = TestServer::start().await.expect("Failed to start server");

    let response = server.post("/users", &json!({ "user_id": "" })).await.unwrap();
    let body: Value = assert_json(response, StatusCode::BAD_REQUEST).await.unwrap();

    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_register_unknown_status() {
    let server = TestServer::start().await.expect("Failed to start server");

    let response = server
        .post("/users", &json!({ "user_id": "u1", "status": "busy" }))
        .await
        .unwrap();
    let body: Value = assert_json(response, StatusCode::BAD_REQUEST).await.unwrap();

    assert_eq!(body["error"]["code"], "INVALID_BODY");
}

// ============================================================================
// Status Tests
// ============================================================================

#[tokio::test]
async fn test_get_unknown_user() {
    let server = TestServer::start().await.expect("Failed to start server");

    let response = server.get_presence("/users/nobody").await.unwrap();
    let body: Value = assert_json(response, StatusCode::NOT_FOUND).await.unwrap();

    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_overlong_path_user_id() {
    let server = TestServer::start().await.expect("Failed to start server");
    let user_id = "x".repeat(129);

    let response = server
        .put(&format!("/users/{user_id}/status"), &StatusBody::new("online"))
        .await
        .unwrap();
    let body: Value = assert_json(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(body["error"]["code"], "INVALID_PATH_PARAMETER");
}

#[tokio::test]
async fn test_update_status_creates_unknown_user() {
    let server = TestServer::start().await.expect("Failed to start server");
    let user_id = unique_user_id();

    let response = server
        .put(&format!("/users/{user_id}/status"), &StatusBody::new("away"))
        .await
        .unwrap();
    let presence: UserPresence = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(presence.status, UserStatus::Away);

    let response = server.get_presence(&format!("/users/{user_id}")).await.unwrap();
    let fetched: UserPresence = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(fetched, presence);
}

#[tokio::test]
async fn test_update_to_online_refreshes_last_seen() {
    let server = TestServer::start().await.expect("Failed to start server");
    let user_id = unique_user_id();

    let response = server
        .post("/users", &RegisterBody::with_status(user_id.clone(), "offline"))
        .await
        .unwrap();
    let registered: UserPresence = assert_json(response, StatusCode::CREATED).await.unwrap();

    server.advance(TimeDelta::minutes(3));

    let response = server
        .put(&format!("/users/{user_id}/status"), &StatusBody::new("online"))
        .await
        .unwrap();
    let updated: UserPresence = assert_json(response, StatusCode::OK).await.unwrap();

    assert_eq!(updated.last_seen - registered.last_seen, TimeDelta::minutes(3));
    assert_eq!(updated.last_activity, updated.last_seen);
}

#[tokio::test]
async fn test_record_activity() {
    let server = TestServer::start().await.expect("Failed to start server");
    let user_id = unique_user_id();

    server
        .post("/users", &RegisterBody::with_status(user_id.clone(), "away"))
        .await
        .unwrap();
    server.advance(TimeDelta::seconds(30));

    let response = server
        .post_empty(&format!("/users/{user_id}/activity"))
        .await
        .unwrap();
    assert_status(response, StatusCode::NO_CONTENT).await.unwrap();

    let response = server.get_presence(&format!("/users/{user_id}")).await.unwrap();
    let presence: UserPresence = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(presence.status, UserStatus::Online);
}

#[tokio::test]
async fn test_record_activity_unknown_user() {
    let server = TestServer::start().await.expect("Failed to start server");

    let response = server.post_empty("/users/ghost/activity").await.unwrap();
    assert_status(response, StatusCode::NOT_FOUND).await.unwrap();

    let response = server.get_presence("/users/ghost").await.unwrap();
    assert_status(response, StatusCode::NOT_FOUND).await.unwrap();
}

#[tokio::test]
async fn test_remove_user() {
    let server = TestServer::start().await.expect("Failed to start server");
    let request = RegisterBody::unique();
    server.post("/users", &request).await.unwrap();

    let path = format!("/users/{}", request.user_id);
    let response = server.delete(&path).await.unwrap();
    assert_status(response, StatusCode::NO_CONTENT).await.unwrap();

    let response = server.get_presence(&path).await.unwrap();
    assert_status(response, StatusCode::NOT_FOUND).await.unwrap();

    let response = server.delete(&path).await.unwrap();
    assert_status(response, StatusCode::NOT_FOUND).await.unwrap();
}

// ============================================================================
// Query Tests
// ============================================================================

#[tokio::test]
async fn test_list_users_by_status() {
    let server = TestServer::start().await.expect("Failed to start server");
    server.post("/users", &RegisterBody::with_status("a", "online")).await.unwrap();
    server.post("/users", &RegisterBody::with_status("b", "away")).await.unwrap();
    server.post("/users", &RegisterBody::with_status("c", "online")).await.unwrap();

    let response = server.get_presence("/users?status=online").await.unwrap();
    let online: UserListResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(online.user_ids, vec![UserId::from("a"), UserId::from("c")]);
    assert_eq!(online.count, 2);

    let response = server.get_presence("/users").await.unwrap();
    let all: UserListResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(all.count, 3);

    let response = server.get_presence("/users?status=offline").await.unwrap();
    let offline: UserListResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(offline.user_ids.is_empty());
}

#[tokio::test]
async fn test_list_users_invalid_status() {
    let server = TestServer::start().await.expect("Failed to start server");

    let response = server.get_presence("/users?status=busy").await.unwrap();
    assert_status(response, StatusCode::BAD_REQUEST).await.unwrap();
}

#[tokio::test]
async fn test_online_count() {
    let server = TestServer::start().await.expect("Failed to start server");
    server.post("/users", &RegisterBody::unique()).await.unwrap();
    server.post("/users", &RegisterBody::unique()).await.unwrap();
    server
        .post("/users", &RegisterBody::with_status(unique_user_id(), "offline"))
        .await
        .unwrap();

    let response = server.get_presence("/online/count").await.unwrap();
    let count: CountResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(count.count, 2);
}

#[tokio::test]
async fn test_recently_active_window() {
    let server = TestServer::start().await.expect("Failed to start server");
    server.post("/users", &RegisterBody::with_status("early", "online")).await.unwrap();
    server.advance(TimeDelta::hours(2));
    server.post("/users", &RegisterBody::with_status("late", "online")).await.unwrap();

    // Default window is one hour
    let response = server.get_presence("/recent").await.unwrap();
    let recent: UserListResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(recent.user_ids, vec![UserId::from("late")]);

    let response = server.get_presence("/recent?window_secs=10800").await.unwrap();
    let recent: UserListResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(recent.count, 2);
}

#[tokio::test]
async fn test_recently_active_rejects_bad_window() {
    let server = TestServer::start().await.expect("Failed to start server");

    let response = server.get_presence("/recent?window_secs=abc").await.unwrap();
    let body: Value = assert_json(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(body["error"]["code"], "INVALID_QUERY_PARAMETER");

    let response = server.get_presence("/recent?window_secs=999999999").await.unwrap();
    assert_status(response, StatusCode::BAD_REQUEST).await.unwrap();
}

#[tokio::test]
async fn test_summary() {
    let server = TestServer::start().await.expect("Failed to start server");
    server.post("/users", &RegisterBody::with_status("a", "online")).await.unwrap();
    server.post("/users", &RegisterBody::with_status("b", "away")).await.unwrap();
    server.post("/users", &RegisterBody::with_status("c", "offline")).await.unwrap();
    server.post("/users", &RegisterBody::with_status("d", "offline")).await.unwrap();

    let response = server.get_presence("/summary").await.unwrap();
    let summary: PresenceSummary = assert_json(response, StatusCode::OK).await.unwrap();

    assert_eq!(summary.online, 1);
    assert_eq!(summary.away, 1);
    assert_eq!(summary.offline, 2);
    assert_eq!(summary.total, 4);
}

// ============================================================================
// Batch Tests
// ============================================================================

#[tokio::test]
async fn test_batch_update() {
    let server = TestServer::start().await.expect("Failed to start server");
    server.post("/users", &RegisterBody::with_status("a", "online")).await.unwrap();

    let response = server
        .post("/batch", &BatchBody::new(&["a", "b"], "away"))
        .await
        .unwrap();
    let batch: BatchUpdateResponse = assert_json(response, StatusCode::OK).await.unwrap();

    assert_eq!(batch.updated.len(), 2);
    assert!(batch
        .updated
        .iter()
        .all(|presence| presence.status == UserStatus::Away));

    let response = server.get_presence("/users?status=away").await.unwrap();
    let away: UserListResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(away.count, 2);
}

#[tokio::test]
async fn test_batch_update_empty_list() {
    let server = TestServer::start().await.expect("Failed to start server");

    let response = server.post("/batch", &BatchBody::new(&[], "away")).await.unwrap();
    let body: Value = assert_json(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

// ============================================================================
// Sweep Tests
// ============================================================================

#[tokio::test]
async fn test_sweep_moves_idle_user_to_away() {
    let server = TestServer::start().await.expect("Failed to start server");
    let request = RegisterBody::unique();
    server.post("/users", &request).await.unwrap();

    server.advance(TimeDelta::minutes(6));

    let response = server.post_empty("/sweep").await.unwrap();
    let report: SweepReport = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(report.to_away, 1);
    assert_eq!(report.to_offline, 0);

    let response = server
        .get_presence(&format!("/users/{}", request.user_id))
        .await
        .unwrap();
    let presence: UserPresence = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(presence.status, UserStatus::Away);
}

#[tokio::test]
async fn test_sweep_applies_both_steps() {
    let server = TestServer::start().await.expect("Failed to start server");
    let request = RegisterBody::unique();
    server.post("/users", &request).await.unwrap();

    server.advance(TimeDelta::minutes(16));

    let response = server.post_empty("/sweep").await.unwrap();
    let report: SweepReport = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(report.to_away, 1);
    assert_eq!(report.to_offline, 1);

    let response = server
        .get_presence(&format!("/users/{}", request.user_id))
        .await
        .unwrap();
    let presence: UserPresence = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(presence.status, UserStatus::Offline);
}

#[tokio::test]
async fn test_activity_prevents_decay() {
    let server = TestServer::start().await.expect("Failed to start server");
    let request = RegisterBody::unique();
    server.post("/users", &request).await.unwrap();

    server.advance(TimeDelta::minutes(4));
    server
        .post_empty(&format!("/users/{}/activity", request.user_id))
        .await
        .unwrap();
    server.advance(TimeDelta::minutes(4));

    let response = server.post_empty("/sweep").await.unwrap();
    let report: SweepReport = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(report.is_empty());
}
