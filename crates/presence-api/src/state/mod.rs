//! Application state
//!
//! Holds the shared state for the Axum application: the presence tracker
//! and configuration.

use std::sync::Arc;

use chrono::TimeDelta;
use presence_common::AppConfig;
use presence_tracker::SharedTracker;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Presence tracker, also driven by the background sweeper
    tracker: SharedTracker,
    /// Application configuration
    config: Arc<AppConfig>,
}

impl AppState {
    /// Create a new AppState
    pub fn new(tracker: SharedTracker, config: AppConfig) -> Self {
        Self {
            tracker,
            config: Arc::new(config),
        }
    }

    /// Get the shared tracker
    pub fn tracker(&self) -> &SharedTracker {
        &self.tracker
    }

    /// Get the application configuration
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Default window for recently-active queries
    pub fn recent_window(&self) -> TimeDelta {
        self.config.presence.recent_window()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut out = f.debug_struct("AppState");
        // The tracker mutex is not reentrant; never block here.
        match self.tracker.try_lock() {
            Some(tracker) => out.field("tracker", &*tracker),
            None => out.field("tracker", &format_args!("<locked>")),
        };
        out.field("config", &self.config).finish()
    }
}
