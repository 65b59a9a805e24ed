//! Domain entities - presence records and the rules that age them

mod decay;
mod presence;

pub use decay::{saturating_seconds, DecayPolicy};
pub use presence::{PresenceSummary, SweepReport, UserPresence};
