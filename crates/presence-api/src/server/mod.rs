//! Server setup and initialization
//!
//! Provides the application builder and server runner.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use presence_common::{AppConfig, AppError, ConfigError};
use presence_core::{Clock, SystemClock};
use presence_tracker::{shared, spawn_sweeper, PresenceTracker};
use tokio::net::TcpListener;
use tracing::info;

use crate::middleware::apply_middleware;
use crate::routes::create_router;
use crate::state::AppState;

/// Build the complete Axum application with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    let is_production = state.config().app.env.is_production();
    let router = apply_middleware(create_router(), &state.config().cors, is_production);
    router.with_state(state)
}

/// Create AppState around a tracker reading the system clock
pub fn create_app_state(config: AppConfig) -> AppState {
    create_app_state_with_clock(config, Arc::new(SystemClock))
}

/// Create AppState around a tracker reading `clock`
pub fn create_app_state_with_clock(config: AppConfig, clock: Arc<dyn Clock>) -> AppState {
    let policy = config.presence.decay_policy();
    info!(
        away_after_secs = policy.away_after().num_seconds(),
        offline_after_secs = policy.offline_after().num_seconds(),
        "Presence tracker created"
    );

    let tracker = shared(PresenceTracker::with_clock(policy, clock));
    AppState::new(tracker, config)
}

/// Run the HTTP server until ctrl-c
pub async fn run_server(app: Router, addr: SocketAddr) -> Result<(), AppError> {
    info!("Starting HTTP server on {}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Server(format!("Failed to bind to {}: {}", addr, e)))?;

    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::Server(format!("Server error: {}", e)))?;

    Ok(())
}

/// Run the complete server with configuration
///
/// Starts the background sweeper, serves until shutdown, then stops the
/// sweeper.
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let address = config.server.address();
    let addr: SocketAddr = address
        .parse()
        .map_err(|e| ConfigError::InvalidValue("server.host", format!("{address}: {e}")))?;
    let sweep_interval = config.presence.sweep_interval();

    let state = create_app_state(config);
    let sweeper = spawn_sweeper(Arc::clone(state.tracker()), sweep_interval);

    let app = create_app(state);
    let result = run_server(app, addr).await;

    sweeper.abort();
    info!("Presence sweeper stopped");

    result
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        // Without a signal handler the server keeps running until killed
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
