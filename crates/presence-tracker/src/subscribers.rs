//! Subscriber registry
//!
//! Maps each user id to the sinks interested in its status notifications.
//! Entries are identified by a monotonically increasing `SubscriptionId`, so a
//! stale handle can never remove a sink registered later.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use presence_core::{UserId, UserPresence};

/// Receiver of status notifications
///
/// Any `Fn(&UserPresence) + Send + Sync` closure is a sink. Sinks run
/// synchronously inside the tracker operation that produced the
/// notification, so they must not block.
pub trait StatusSink: Send + Sync {
    /// Deliver one notification
    fn notify(&self, presence: &UserPresence);
}

impl<F> StatusSink for F
where
    F: Fn(&UserPresence) + Send + Sync,
{
    fn notify(&self, presence: &UserPresence) {
        self(presence);
    }
}

/// Identity of one registered sink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Deregistration handle returned by `subscribe`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Subscription {
    user_id: UserId,
    id: SubscriptionId,
}

impl Subscription {
    /// User the subscription listens to
    #[must_use]
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Handle identity
    #[must_use]
    pub fn id(&self) -> SubscriptionId {
        self.id
    }
}

struct Entry {
    id: SubscriptionId,
    sink: Arc<dyn StatusSink>,
}

/// Per-user sink sets
#[derive(Default)]
pub struct SubscriberRegistry {
    sinks: HashMap<UserId, Vec<Entry>>,
    next_id: u64,
}

impl SubscriberRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `sink` for `user_id`
    ///
    /// Registering the same sink (same `Arc` allocation) twice for one user
    /// returns the handle of the existing entry.
    pub fn subscribe(&mut self, user_id: UserId, sink: Arc<dyn StatusSink>) -> Subscription {
        let entries = self.sinks.entry(user_id.clone()).or_default();

        if let Some(existing) = entries.iter().find(|entry| same_sink(&entry.sink, &sink)) {
            return Subscription {
                user_id,
                id: existing.id,
            };
        }

        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        entries.push(Entry { id, sink });

        Subscription { user_id, id }
    }

    /// Remove the entry behind `subscription`
    ///
    /// The user's sink set is released once it becomes empty.
    pub fn unsubscribe(&mut self, subscription: &Subscription) -> bool {
        let Some(entries) = self.sinks.get_mut(&subscription.user_id) else {
            return false;
        };

        let before = entries.len();
        entries.retain(|entry| entry.id != subscription.id);
        let removed = entries.len() != before;

        if entries.is_empty() {
            self.sinks.remove(&subscription.user_id);
        }

        removed
    }

    /// Drop every sink of `user_id`, returning how many were registered
    pub fn remove_user(&mut self, user_id: &str) -> usize {
        self.sinks.remove(user_id).map_or(0, |entries| entries.len())
    }

    /// Copy of the sinks currently registered for `user_id`
    #[must_use]
    pub fn snapshot(&self, user_id: &str) -> Vec<Arc<dyn StatusSink>> {
        self.sinks
            .get(user_id)
            .map(|entries| entries.iter().map(|entry| Arc::clone(&entry.sink)).collect())
            .unwrap_or_default()
    }

    /// Number of sinks registered for `user_id`
    #[must_use]
    pub fn count(&self, user_id: &str) -> usize {
        self.sinks.get(user_id).map_or(0, Vec::len)
    }

    /// Number of users with at least one sink
    #[must_use]
    pub fn user_count(&self) -> usize {
        self.sinks.len()
    }
}

impl fmt::Debug for SubscriberRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriberRegistry")
            .field("users", &self.user_count())
            .field("next_id", &self.next_id)
            .finish()
    }
}

// Compares allocations only; vtable pointers of the same type may differ
// between codegen units.
fn same_sink(a: &Arc<dyn StatusSink>, b: &Arc<dyn StatusSink>) -> bool {
    std::ptr::eq(Arc::as_ptr(a).cast::<()>(), Arc::as_ptr(b).cast::<()>())
}
