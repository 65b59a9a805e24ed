//! Presence record entity

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{UserId, UserStatus};

/// Presence record of a single user
///
/// Both timestamps only ever move forward: updates keep the later of the
/// stored and the supplied instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPresence {
    /// User ID
    pub user_id: UserId,
    /// Current status
    pub status: UserStatus,
    /// Most recent transition into `online`
    pub last_seen: DateTime<Utc>,
    /// Most recent explicit activity signal
    pub last_activity: DateTime<Utc>,
}

impl UserPresence {
    /// Create a new record with both timestamps set to `now`
    #[must_use]
    pub fn new(user_id: UserId, status: UserStatus, now: DateTime<Utc>) -> Self {
        Self {
            user_id,
            status,
            last_seen: now,
            last_activity: now,
        }
    }

    /// Record an activity signal
    pub fn touch_activity(&mut self, now: DateTime<Utc>) {
        self.last_activity = self.last_activity.max(now);
    }

    /// Refresh both timestamps, as done on every transition into `online`
    pub fn touch_seen(&mut self, now: DateTime<Utc>) {
        self.last_seen = self.last_seen.max(now);
        self.touch_activity(now);
    }

    /// Time elapsed since the last activity signal (zero if `now` lags behind)
    #[must_use]
    pub fn idle_for(&self, now: DateTime<Utc>) -> TimeDelta {
        (now - self.last_activity).max(TimeDelta::zero())
    }

    /// Whether the last activity falls within `window` of `now`
    #[must_use]
    pub fn is_active_within(&self, now: DateTime<Utc>, window: TimeDelta) -> bool {
        self.idle_for(now) <= window
    }
}

/// Per-status counts over all tracked users
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceSummary {
    pub online: usize,
    pub away: usize,
    pub offline: usize,
    pub total: usize,
}

impl PresenceSummary {
    /// Count one user at `status`
    pub fn record(&mut self, status: UserStatus) {
        match status {
            UserStatus::Online => self.online += 1,
            UserStatus::Away => self.away += 1,
            UserStatus::Offline => self.offline += 1,
        }
        self.total += 1;
    }

    /// Count for a single status
    #[must_use]
    pub fn count(&self, status: UserStatus) -> usize {
        match status {
            UserStatus::Online => self.online,
            UserStatus::Away => self.away,
            UserStatus::Offline => self.offline,
        }
    }
}

impl FromIterator<UserStatus> for PresenceSummary {
    fn from_iter<I: IntoIterator<Item = UserStatus>>(iter: I) -> Self {
        let mut summary = Self::default();
        for status in iter {
            summary.record(status);
        }
        summary
    }
}

/// Outcome of one inactivity sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepReport {
    /// Users demoted from online to away
    pub to_away: usize,
    /// Users demoted from away to offline
    pub to_offline: usize,
}

impl SweepReport {
    /// Total number of demotions
    #[must_use]
    pub fn total(&self) -> usize {
        self.to_away + self.to_offline
    }

    /// Whether the sweep changed nothing
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}
