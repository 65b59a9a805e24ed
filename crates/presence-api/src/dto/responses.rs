//! Response DTOs for API endpoints
//!
//! Presence records, summaries and sweep reports are serialized as-is from
//! `presence-core`; the wrappers here cover listings and counters.

use presence_core::{UserId, UserPresence};
use serde::{Deserialize, Serialize};

/// List of user ids
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserListResponse {
    pub user_ids: Vec<UserId>,
    pub count: usize,
}

impl From<Vec<UserId>> for UserListResponse {
    fn from(mut user_ids: Vec<UserId>) -> Self {
        user_ids.sort();
        Self {
            count: user_ids.len(),
            user_ids,
        }
    }
}

/// Single counter
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CountResponse {
    pub count: usize,
}

/// Records touched by a batch update, in request order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchUpdateResponse {
    pub updated: Vec<UserPresence>,
}

/// Liveness response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub tracked_users: usize,
}

impl HealthResponse {
    /// Healthy response for a tracker holding `tracked_users` records
    #[must_use]
    pub fn healthy(tracked_users: usize) -> Self {
        Self {
            status: "healthy".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            tracked_users,
        }
    }
}
