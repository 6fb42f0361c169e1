//! Thread scheduling.

pub mod rr;
pub mod trait_def;

pub use rr::{PriorityMask, PriorityRoundRobin};
pub use trait_def::{Scheduler, Slot};
