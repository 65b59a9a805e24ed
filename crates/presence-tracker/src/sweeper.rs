//! Periodic sweep driver
//!
//! The tracker never decays presence on its own; this task calls
//! `sweep_inactive` on a fixed period for trackers shared across tasks.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

use crate::tracker::PresenceTracker;

/// Tracker shared between request handlers and the sweeper
pub type SharedTracker = Arc<Mutex<PresenceTracker>>;

/// Wrap a tracker for sharing
#[must_use]
pub fn shared(tracker: PresenceTracker) -> SharedTracker {
    Arc::new(Mutex::new(tracker))
}

/// Spawn a task sweeping `tracker` every `period`
///
/// The first sweep happens one full period after spawning. Abort the
/// returned handle to stop sweeping.
pub fn spawn_sweeper(tracker: SharedTracker, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        // The first tick completes immediately
        ticker.tick().await;

        tracing::info!(period_ms = period.as_millis() as u64, "Presence sweeper started");

        loop {
            ticker.tick().await;

            let report = tracker.lock().sweep_inactive();

            tracing::trace!(
                to_away = report.to_away,
                to_offline = report.to_offline,
                "Presence sweep finished"
            );
        }
    })
}
