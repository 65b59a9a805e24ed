//! Value objects - immutable types that represent domain concepts

mod user_id;
mod user_status;

pub use user_id::UserId;
pub use user_status::{StatusParseError, UserStatus};
