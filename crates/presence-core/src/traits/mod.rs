//! Traits - seams between the domain and its environment

mod clock;

pub use clock::{Clock, ManualClock, SystemClock};
