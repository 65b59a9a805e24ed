//! Data Transfer Objects for presence endpoints

mod requests;
mod responses;

pub use requests::{
    BatchUpdateRequest, ListUsersQuery, RecentQuery, RegisterRequest, UpdateStatusRequest,
    MAX_RECENT_WINDOW_SECS, MAX_USER_ID_LEN,
};
pub use responses::{BatchUpdateResponse, CountResponse, HealthResponse, UserListResponse};
