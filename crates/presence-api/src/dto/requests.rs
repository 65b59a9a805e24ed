//! Request DTOs for API endpoints
//!
//! Body DTOs implement `Deserialize` and `Validate` for input validation.

use presence_core::UserStatus;
use serde::Deserialize;
use validator::{Validate, ValidationError};

/// Longest accepted user id, in characters
pub const MAX_USER_ID_LEN: usize = 128;

/// Largest accepted "recently active" window (30 days)
pub const MAX_RECENT_WINDOW_SECS: u64 = 30 * 24 * 3600;

/// Register a user for presence tracking
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 128, message = "User id must be 1-128 characters"))]
    pub user_id: String,

    /// Initial status (online when omitted)
    #[serde(default)]
    pub status: Option<UserStatus>,
}

/// Set a user's status
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateStatusRequest {
    pub status: UserStatus,
}

/// Set the same status for several users
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct BatchUpdateRequest {
    #[validate(
        length(min = 1, max = 1000, message = "Batch must contain 1-1000 user ids"),
        custom(function = "validate_user_ids")
    )]
    pub user_ids: Vec<String>,

    pub status: UserStatus,
}

fn validate_user_ids(user_ids: &[String]) -> Result<(), ValidationError> {
    if user_ids.iter().any(String::is_empty) {
        return Err(ValidationError::new("empty_user_id"));
    }
    if user_ids.iter().any(|id| id.chars().count() > MAX_USER_ID_LEN) {
        return Err(ValidationError::new("user_id_too_long"));
    }
    Ok(())
}

/// Filter for the user listing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListUsersQuery {
    pub status: Option<String>,
}

impl ListUsersQuery {
    /// Parsed status filter
    pub fn status(&self) -> Result<Option<UserStatus>, presence_core::StatusParseError> {
        self.status.as_deref().map(str::parse).transpose()
    }
}

/// Window for the recently-active listing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecentQuery {
    pub window_secs: Option<u64>,
}
