//! Presence tracker
//!
//! Owns every `UserPresence` record and the subscriber registry. All
//! operations are total: unknown ids are either ignored or created, never
//! reported as errors. Notifications are delivered synchronously before the
//! mutating call returns.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chrono::TimeDelta;
use presence_core::{
    Clock, DecayPolicy, PresenceSummary, SweepReport, SystemClock, UserId, UserPresence,
    UserStatus,
};
use tracing::{debug, trace};

use crate::subscribers::{StatusSink, SubscriberRegistry, Subscription};

/// Window used by "recently active" queries when the caller has no preference (1 hour)
#[must_use]
pub fn default_recent_window() -> TimeDelta {
    TimeDelta::hours(1)
}

/// Authoritative presence state for a population of users
pub struct PresenceTracker {
    records: HashMap<UserId, UserPresence>,
    subscribers: SubscriberRegistry,
    policy: DecayPolicy,
    clock: Arc<dyn Clock>,
}

impl PresenceTracker {
    /// Create a tracker driven by the wall clock
    #[must_use]
    pub fn new(policy: DecayPolicy) -> Self {
        Self::with_clock(policy, Arc::new(SystemClock))
    }

    /// Create a tracker driven by an injected clock
    #[must_use]
    pub fn with_clock(policy: DecayPolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            records: HashMap::new(),
            subscribers: SubscriberRegistry::new(),
            policy,
            clock,
        }
    }

    /// Decay thresholds in use
    #[must_use]
    pub fn policy(&self) -> DecayPolicy {
        self.policy
    }

    /// Number of tracked users
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no user is tracked
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Register a user as online
    pub fn register_user(&mut self, user_id: impl Into<UserId>) -> UserPresence {
        self.register_user_with_status(user_id, UserStatus::Online)
    }

    /// Register a user with an explicit initial status
    ///
    /// Existing records are left untouched. Subscribers are notified of the
    /// current record either way.
    pub fn register_user_with_status(
        &mut self,
        user_id: impl Into<UserId>,
        initial: UserStatus,
    ) -> UserPresence {
        let now = self.clock.now();
        let presence = self
            .records
            .entry(user_id.into())
            .or_insert_with_key(|id| {
                debug!(user_id = %id, status = %initial, "Registered user presence");
                UserPresence::new(id.clone(), initial, now)
            })
            .clone();

        self.notify(&presence);
        presence
    }

    /// Set a user's status, creating an offline record first if needed
    ///
    /// Moving to `online` refreshes `last_seen` and `last_activity`; other
    /// statuses leave the timestamps alone. Subscribers are always notified,
    /// even when the status is unchanged.
    pub fn update_status(&mut self, user_id: impl Into<UserId>, status: UserStatus) -> UserPresence {
        let now = self.clock.now();
        let presence = self
            .records
            .entry(user_id.into())
            .or_insert_with_key(|id| UserPresence::new(id.clone(), UserStatus::Offline, now));

        let previous = presence.status;
        presence.status = status;
        if status == UserStatus::Online {
            presence.touch_seen(now);
        }
        let presence = presence.clone();

        trace!(
            user_id = %presence.user_id,
            from = %previous,
            to = %status,
            "Updated user status"
        );

        self.notify(&presence);
        presence
    }

    /// Current record of a user
    #[must_use]
    pub fn get_status(&self, user_id: &str) -> Option<&UserPresence> {
        self.records.get(user_id)
    }

    /// Record an activity signal (heartbeat, interaction) for a known user
    ///
    /// Away and offline users are promoted back to online. Returns `false`,
    /// without creating anything, if the user is not tracked.
    pub fn record_activity(&mut self, user_id: &str) -> bool {
        let now = self.clock.now();
        let Some(presence) = self.records.get_mut(user_id) else {
            return false;
        };

        presence.touch_activity(now);
        if presence.status != UserStatus::Online {
            let user_id = presence.user_id.clone();
            self.update_status(user_id, UserStatus::Online);
        }

        true
    }

    /// Register `sink` for every later notification of `user_id`
    ///
    /// The user does not need to be tracked yet.
    pub fn subscribe(
        &mut self,
        user_id: impl Into<UserId>,
        sink: Arc<dyn StatusSink>,
    ) -> Subscription {
        self.subscribers.subscribe(user_id.into(), sink)
    }

    /// Deregister a sink; returns whether it was still registered
    pub fn unsubscribe(&mut self, subscription: &Subscription) -> bool {
        self.subscribers.unsubscribe(subscription)
    }

    /// Number of sinks registered for `user_id`
    #[must_use]
    pub fn subscriber_count(&self, user_id: &str) -> usize {
        self.subscribers.count(user_id)
    }

    /// Forget a user and all of its subscribers
    pub fn remove_user(&mut self, user_id: &str) -> Option<UserPresence> {
        let removed = self.records.remove(user_id);
        let dropped = self.subscribers.remove_user(user_id);

        if removed.is_some() || dropped > 0 {
            debug!(user_id = %user_id, subscribers = dropped, "Removed user presence");
        }

        removed
    }

    /// Ids of every tracked user
    #[must_use]
    pub fn user_ids(&self) -> Vec<UserId> {
        self.records.keys().cloned().collect()
    }

    /// Ids of users currently at `status`
    #[must_use]
    pub fn list_by_status(&self, status: UserStatus) -> Vec<UserId> {
        self.records
            .values()
            .filter(|presence| presence.status == status)
            .map(|presence| presence.user_id.clone())
            .collect()
    }

    /// Number of users currently online
    #[must_use]
    pub fn online_count(&self) -> usize {
        self.records
            .values()
            .filter(|presence| presence.status == UserStatus::Online)
            .count()
    }

    /// Ids of users whose last activity falls within `window` of now
    #[must_use]
    pub fn recently_active(&self, window: TimeDelta) -> Vec<UserId> {
        let now = self.clock.now();
        self.records
            .values()
            .filter(|presence| presence.is_active_within(now, window))
            .map(|presence| presence.user_id.clone())
            .collect()
    }

    /// Per-status counts over all tracked users
    #[must_use]
    pub fn summary(&self) -> PresenceSummary {
        self.records.values().map(|presence| presence.status).collect()
    }

    /// Apply `update_status` to each id independently
    pub fn batch_update_status<I, U>(&mut self, user_ids: I, status: UserStatus) -> Vec<UserPresence>
    where
        I: IntoIterator<Item = U>,
        U: Into<UserId>,
    {
        user_ids
            .into_iter()
            .map(|user_id| self.update_status(user_id, status))
            .collect()
    }

    /// Demote idle users according to the decay policy
    ///
    /// Every due step is applied, so a user idle past both thresholds moves
    /// online -> away -> offline in one sweep, with a notification per step.
    /// Sweeps never promote.
    pub fn sweep_inactive(&mut self) -> SweepReport {
        let now = self.clock.now();

        let mut demotions = Vec::new();
        for presence in self.records.values() {
            for next in self
                .policy
                .due_steps(now, presence.last_activity, presence.status)
            {
                demotions.push((presence.user_id.clone(), next));
            }
        }

        let mut report = SweepReport::default();
        for (user_id, status) in demotions {
            match status {
                UserStatus::Away => report.to_away += 1,
                UserStatus::Offline => report.to_offline += 1,
                UserStatus::Online => {}
            }
            self.update_status(user_id, status);
        }

        if !report.is_empty() {
            debug!(
                to_away = report.to_away,
                to_offline = report.to_offline,
                "Inactivity sweep demoted users"
            );
        }

        report
    }

    fn notify(&self, presence: &UserPresence) {
        // Snapshot first so sinks never observe the registry mid-iteration.
        for sink in self.subscribers.snapshot(presence.user_id.as_str()) {
            sink.notify(presence);
        }
    }
}

impl Default for PresenceTracker {
    fn default() -> Self {
        Self::new(DecayPolicy::default())
    }
}

impl fmt::Debug for PresenceTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PresenceTracker")
            .field("users", &self.records.len())
            .field("subscribers", &self.subscribers)
            .field("policy", &self.policy)
            .finish()
    }
}
