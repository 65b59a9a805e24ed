//! # presence-tracker
//!
//! Authoritative in-process presence state for a population of users.
//!
//! ## Features
//!
//! - **Tracker**: per-user status records with online/away/offline transitions
//! - **Decay**: `sweep_inactive` demotes idle users through away to offline
//! - **Subscribers**: synchronous per-user notification fan-out
//! - **Sweeper**: tokio task driving periodic sweeps on a shared tracker
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use presence_core::{DecayPolicy, UserPresence, UserStatus};
//! use presence_tracker::PresenceTracker;
//!
//! let mut tracker = PresenceTracker::new(DecayPolicy::default());
//! tracker.register_user("u1");
//!
//! let subscription = tracker.subscribe("u1", Arc::new(|presence: &UserPresence| {
//!     println!("{} is now {}", presence.user_id, presence.status);
//! }));
//!
//! tracker.update_status("u1", UserStatus::Away);
//! assert_eq!(tracker.get_status("u1").map(|p| p.status), Some(UserStatus::Away));
//!
//! tracker.unsubscribe(&subscription);
//! ```

pub mod subscribers;
pub mod sweeper;
pub mod tracker;

pub use subscribers::{StatusSink, SubscriberRegistry, Subscription, SubscriptionId};
pub use sweeper::{shared, spawn_sweeper, SharedTracker};
pub use tracker::{default_recent_window, PresenceTracker};
