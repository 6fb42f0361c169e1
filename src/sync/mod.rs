//! Synchronization primitives.
//!
//! The critical section is the only mutual-exclusion mechanism in the
//! kernel; semaphores are built on it.

pub mod critical;
pub mod semaphore;

pub use critical::{enter, exit, with, CriticalToken};
pub use semaphore::Semaphore;
