//! Timekeeping: the 1 ms scheduler tick and the free-running cycle clock.

pub mod tick;

pub use tick::TickCounter;

/// Elapsed cycles between two [`Kernel::time`](crate::Kernel::time)
/// readings, correct across one counter wrap.
#[inline]
pub fn time_difference(start: u32, stop: u32) -> u32 {
    stop.wrapping_sub(start)
}

/// Convert a cycle count at `core_clock_hz` into microseconds.
pub fn cycles_to_micros(cycles: u32, core_clock_hz: u32) -> u32 {
    ((cycles as u64 * 1_000_000) / core_clock_hz as u64) as u32
}
