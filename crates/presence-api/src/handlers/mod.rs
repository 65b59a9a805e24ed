//! Route handlers
//!
//! All HTTP request handlers organized by concern.

pub mod events;
pub mod health;
pub mod presence;
