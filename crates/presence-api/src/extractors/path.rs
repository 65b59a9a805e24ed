//! Path parameter extractors

use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use presence_core::UserId;

use crate::dto::MAX_USER_ID_LEN;
use crate::response::ApiError;

/// Extract the `:user_id` path segment as a `UserId`
#[derive(Debug, Clone)]
pub struct UserIdPath(pub UserId);

#[async_trait]
impl<S> FromRequestParts<S> for UserIdPath
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(user_id) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::invalid_path(e.to_string()))?;

        if user_id.is_empty() || user_id.chars().count() > MAX_USER_ID_LEN {
            return Err(ApiError::invalid_path(format!(
                "user_id must be 1 to {MAX_USER_ID_LEN} characters"
            )));
        }

        Ok(UserIdPath(UserId::new(user_id)))
    }
}
