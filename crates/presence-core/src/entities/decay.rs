//! Idle decay policy
//!
//! Presence decays one step at a time: `online` becomes `away` once the user
//! has been idle longer than `away_after`, and `away` becomes `offline` once
//! idle longer than `offline_after`. Both thresholds are measured from the
//! same `last_activity` instant. Decay never promotes.

use chrono::{DateTime, TimeDelta, Utc};

use crate::value_objects::UserStatus;

/// Default idle time before an online user is shown as away (5 minutes)
const DEFAULT_AWAY_AFTER_SECS: i64 = 300;
/// Default idle time before an away user is shown as offline (15 minutes)
const DEFAULT_OFFLINE_AFTER_SECS: i64 = 900;

/// Thresholds driving the online -> away -> offline decay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecayPolicy {
    away_after: TimeDelta,
    offline_after: TimeDelta,
}

impl Default for DecayPolicy {
    fn default() -> Self {
        Self {
            away_after: TimeDelta::seconds(DEFAULT_AWAY_AFTER_SECS),
            offline_after: TimeDelta::seconds(DEFAULT_OFFLINE_AFTER_SECS),
        }
    }
}

impl DecayPolicy {
    /// Create a policy from explicit thresholds
    #[must_use]
    pub fn new(away_after: TimeDelta, offline_after: TimeDelta) -> Self {
        Self {
            away_after,
            offline_after,
        }
    }

    /// Create a policy from thresholds in seconds
    ///
    /// Values beyond the range of `TimeDelta` saturate to `TimeDelta::MAX`.
    #[must_use]
    pub fn from_secs(away_after_secs: u64, offline_after_secs: u64) -> Self {
        Self::new(
            saturating_seconds(away_after_secs),
            saturating_seconds(offline_after_secs),
        )
    }

    /// Idle time before online decays to away
    #[must_use]
    pub fn away_after(&self) -> TimeDelta {
        self.away_after
    }

    /// Idle time before away decays to offline
    #[must_use]
    pub fn offline_after(&self) -> TimeDelta {
        self.offline_after
    }

    /// One decay step for a user idle since `last_activity`
    ///
    /// Returns `None` when the status should stay as it is.
    #[must_use]
    pub fn next_status(
        &self,
        now: DateTime<Utc>,
        last_activity: DateTime<Utc>,
        current: UserStatus,
    ) -> Option<UserStatus> {
        let idle = now - last_activity;
        match current {
            UserStatus::Online if idle > self.away_after => Some(UserStatus::Away),
            UserStatus::Away if idle > self.offline_after => Some(UserStatus::Offline),
            _ => None,
        }
    }

    /// Every decay step due at `now`, in order
    ///
    /// A user idle past both thresholds yields `Away` then `Offline`.
    pub fn due_steps(
        &self,
        now: DateTime<Utc>,
        last_activity: DateTime<Utc>,
        current: UserStatus,
    ) -> impl Iterator<Item = UserStatus> + '_ {
        std::iter::successors(self.next_status(now, last_activity, current), move |&status| {
            self.next_status(now, last_activity, status)
        })
    }
}

/// Whole seconds as a `TimeDelta`, saturating instead of overflowing
#[must_use]
pub fn saturating_seconds(secs: u64) -> TimeDelta {
    i64::try_from(secs)
        .ok()
        .and_then(TimeDelta::try_seconds)
        .unwrap_or(TimeDelta::MAX)
}
