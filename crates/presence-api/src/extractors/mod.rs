//! Axum extractors for request handling
//!
//! Custom extractors that turn rejections into `ApiError` responses.

mod path;
mod query;
mod validated;

pub use path::UserIdPath;
pub use query::ApiQuery;
pub use validated::ValidatedJson;
