//! Presence event stream
//!
//! Bridges tracker notifications for one user onto a Server-Sent-Events
//! response. Each connection registers its own sink; the sink forwards into a
//! broadcast channel so that the synchronous tracker never waits on a client.

use std::sync::Arc;

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use futures_util::stream::{self, Stream, StreamExt};
use presence_core::UserPresence;
use presence_tracker::{SharedTracker, StatusSink, Subscription};
use tokio::sync::broadcast::{self, error::RecvError};

use crate::extractors::UserIdPath;
use crate::state::AppState;

/// SSE event name carrying a presence record
pub const PRESENCE_EVENT: &str = "presence";
/// Notifications buffered per connection before a slow client starts lagging
const EVENT_BUFFER: usize = 64;

/// Releases the tracker subscription when the client goes away
struct SubscriptionGuard {
    tracker: SharedTracker,
    subscription: Subscription,
}

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        self.tracker.lock().unsubscribe(&self.subscription);
        tracing::debug!(
            user_id = %self.subscription.user_id(),
            subscription = %self.subscription.id(),
            "Presence stream closed"
        );
    }
}

/// Stream status notifications for a user
///
/// GET /presence/users/{user_id}/events
///
/// The current record (if any) is sent first. The stream ends when the user
/// is removed from the tracker.
pub async fn stream_presence(
    State(state): State<AppState>,
    UserIdPath(user_id): UserIdPath,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let (tx, rx) = broadcast::channel::<UserPresence>(EVENT_BUFFER);
    let sink: Arc<dyn StatusSink> = Arc::new(move |presence: &UserPresence| {
        // No receivers only means the client is already gone
        let _ = tx.send(presence.clone());
    });

    let (subscription, current) = {
        let mut tracker = state.tracker().lock();
        let subscription = tracker.subscribe(user_id.clone(), sink);
        (subscription, tracker.get_status(user_id.as_str()).cloned())
    };

    tracing::debug!(
        user_id = %user_id,
        subscription = %subscription.id(),
        "Presence stream opened"
    );

    let guard = SubscriptionGuard {
        tracker: Arc::clone(state.tracker()),
        subscription,
    };

    let initial = stream::iter(current.map(|presence| presence_event(&presence)));
    let updates = stream::unfold((rx, guard), |(mut rx, guard)| async move {
        loop {
            match rx.recv().await {
                Ok(presence) => return Some((presence_event(&presence), (rx, guard))),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(
                        user_id = %guard.subscription.user_id(),
                        skipped,
                        "Presence stream lagged, notifications dropped"
                    );
                }
                Err(RecvError::Closed) => return None,
            }
        }
    });

    Sse::new(initial.chain(updates)).keep_alive(KeepAlive::default())
}

fn presence_event(presence: &UserPresence) -> Result<Event, axum::Error> {
    Event::default()
        .event(PRESENCE_EVENT)
        .json_data(presence)
}
