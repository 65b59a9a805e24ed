//! # presence-core
//!
//! Domain layer for presence tracking: user identifiers, statuses, presence
//! records, the idle decay policy, and the clock abstraction.
//! This crate has zero dependencies on infrastructure (web framework, runtime, etc.).

pub mod entities;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{saturating_seconds, DecayPolicy, PresenceSummary, SweepReport, UserPresence};
pub use traits::{Clock, ManualClock, SystemClock};
pub use value_objects::{StatusParseError, UserId, UserStatus};
