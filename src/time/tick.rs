//! Millisecond tick counting.

use portable_atomic::{AtomicU32, Ordering};

/// Millisecond counter advanced by the scheduler tick.
///
/// Readable from any context without entering a critical section.
pub struct TickCounter {
    /// Ticks since start or since the last clear
    ticks: AtomicU32,
    /// Tick frequency in Hz
    frequency: u32,
}

impl TickCounter {
    /// Create a new tick counter with the given frequency.
    ///
    /// # Arguments
    ///
    /// * `frequency` - Timer frequency in Hz
    pub const fn new(frequency: u32) -> Self {
        Self {
            ticks: AtomicU32::new(0),
            frequency,
        }
    }

    /// Increment the tick counter (called from the tick interrupt).
    pub fn increment(&self) -> u32 {
        self.ticks.fetch_add(1, Ordering::AcqRel).wrapping_add(1)
    }

    /// Get the current tick count.
    pub fn ticks(&self) -> u32 {
        self.ticks.load(Ordering::Acquire)
    }

    /// Reset the count to zero.
    pub fn clear(&self) {
        self.ticks.store(0, Ordering::Release);
    }

    /// Get the tick frequency in Hz.
    pub fn frequency(&self) -> u32 {
        self.frequency
    }

    /// Convert ticks to milliseconds.
    pub fn ticks_to_millis(&self, ticks: u32) -> u32 {
        ((ticks as u64 * 1000) / self.frequency as u64) as u32
    }
}
