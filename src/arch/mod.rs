//! Architecture abstraction layer for context switching and interrupt handling.
//!
//! Everything platform-specific sits behind [`Arch`]: pending a context
//! switch, starting the tick, launching the first thread, and the board
//! hooks used by periodic and button tasks. The save/restore of registers
//! itself lives in the port's PendSV handler, which hands the saved stack
//! pointer to [`Kernel::switch_context`](crate::Kernel::switch_context) and
//! restores whatever comes back.

use crate::tasks::{ButtonLine, PeriodicTimer};

pub mod frame;

/// Architecture abstraction trait.
///
/// All methods are associated functions; a port is a zero-sized type.
///
/// # Safety
///
/// Implementations of this trait involve direct hardware manipulation and
/// inline assembly. Methods marked as unsafe have preconditions that must be
/// upheld by the caller.
pub trait Arch: 'static {
    /// Ask for a context switch once interrupts allow it.
    ///
    /// On Cortex-M this pends PendSV, which runs after every other active
    /// handler has returned.
    fn request_context_switch();

    /// Start the periodic scheduler tick.
    fn start_tick(tick_hz: u32, core_clock_hz: u32);

    /// Restore the first thread's frame and jump into it.
    ///
    /// # Safety
    ///
    /// - `sp` must point at an initial frame built by
    ///   [`frame::build_initial_frame`] inside a stack that outlives the thread
    /// - Must be called exactly once, from the startup context
    unsafe fn start_first_thread(sp: *mut u32) -> !;

    /// Mask interrupts. The first thread's launch unmasks them again.
    fn disable_interrupts();

    /// Sleep the core until the next interrupt.
    fn wait_for_interrupt();

    /// Whether the CPU is currently executing an exception handler.
    fn in_interrupt() -> bool;

    /// Free-running cycle counter.
    fn cycle_count() -> u32 {
        0
    }

    /// Program `timer` to interrupt every `period_us` microseconds.
    fn arm_periodic_timer(_timer: PeriodicTimer, _period_us: u32, _irq_priority: u8) {}

    /// Route a button line's edge interrupt at `irq_priority`.
    fn configure_button(_line: ButtonLine, _irq_priority: u8) {}

    /// Enable or mask edge interrupts on a button line.
    fn set_button_armed(_line: ButtonLine, _armed: bool) {}

    /// Sampled level of a button line; `true` is released (pull-up high).
    fn button_level(_line: ButtonLine) -> bool {
        true
    }
}

/// A no-op architecture implementation for host builds and tests.
///
/// Switch requests are only recorded by the kernel; tests drive
/// [`Kernel::switch_context`](crate::Kernel::switch_context) by hand.
pub struct HostArch;

impl Arch for HostArch {
    fn request_context_switch() {
        // No-op for testing
    }

    fn start_tick(_tick_hz: u32, _core_clock_hz: u32) {
        // No-op for testing
    }

    unsafe fn start_first_thread(_sp: *mut u32) -> ! {
        panic!("HostArch cannot run threads")
    }

    fn disable_interrupts() {
        // No-op for testing
    }

    fn wait_for_interrupt() {
        core::hint::spin_loop();
    }

    fn in_interrupt() -> bool {
        false
    }
}

#[cfg(all(target_arch = "arm", target_os = "none"))]
pub mod armv7m;

#[cfg(all(target_arch = "arm", target_os = "none"))]
pub use self::armv7m::CortexM as DefaultArch;

// Host builds (tests, std-shim) never run threads for real
#[cfg(not(all(target_arch = "arm", target_os = "none")))]
pub use HostArch as DefaultArch;
