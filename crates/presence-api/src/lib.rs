//! # presence-api
//!
//! REST API server built with Axum framework, exposing one shared presence
//! tracker plus a Server-Sent-Events stream of per-user status notifications.

pub mod dto;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod server;
pub mod state;

pub use server::{create_app, create_app_state, create_app_state_with_clock, run, run_server};
pub use state::AppState;
