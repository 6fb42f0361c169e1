//! Build-time constants and run-time kernel configuration.

/// Maximum number of live user threads.
pub const MAX_THREADS: usize = 20;

/// Stack capacity of every thread slot, in 32-bit words.
pub const STACK_WORDS: usize = 100;

/// Number of user priority levels (0 = highest, 5 = lowest).
pub const NUM_PRIORITIES: usize = 6;

/// Scheduler tick frequency. One tick is one millisecond.
pub const TICK_HZ: u32 = 1000;

/// Default time slice, in ticks.
pub const DEFAULT_TIME_SLICE_MS: u32 = 2;

/// Settle interval a debounce thread sleeps before re-arming its line.
pub const DEBOUNCE_MS: u32 = 10;

/// Stack requested for debounce threads, in bytes.
pub const DEBOUNCE_STACK_BYTES: usize = 128;

/// Scheduler priority of debounce threads.
pub const DEBOUNCE_PRIORITY: u8 = 2;

/// Number of hardware timers available for periodic tasks.
pub const MAX_PERIODIC_TASKS: usize = 2;

/// Number of GPIO lines available for button tasks.
pub const MAX_BUTTON_TASKS: usize = 2;

/// Core clock assumed when none is configured (80 MHz PLL).
pub const DEFAULT_CORE_CLOCK_HZ: u32 = 80_000_000;

/// Run-time knobs of a [`Kernel`](crate::Kernel).
///
/// Every setter is `const` so a fully configured kernel can be placed in a
/// `static`:
///
/// ```ignore
/// static KERNEL: Kernel<DefaultArch> =
///     Kernel::with_config(KernelConfig::new().with_time_slice_ms(1));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KernelConfig {
    /// Ticks a thread may run before a preemptive switch is requested.
    pub time_slice_ms: u32,
    /// Ticks a debounce thread sleeps before re-arming its line.
    pub debounce_ms: u32,
    /// Scheduler priority of debounce threads.
    pub debounce_priority: u8,
    /// Stack size of debounce threads in bytes.
    pub debounce_stack_bytes: usize,
    /// Core clock feeding the tick timer.
    pub core_clock_hz: u32,
}

impl KernelConfig {
    pub const fn new() -> Self {
        Self {
            time_slice_ms: DEFAULT_TIME_SLICE_MS,
            debounce_ms: DEBOUNCE_MS,
            debounce_priority: DEBOUNCE_PRIORITY,
            debounce_stack_bytes: DEBOUNCE_STACK_BYTES,
            core_clock_hz: DEFAULT_CORE_CLOCK_HZ,
        }
    }

    /// Set the time slice. A zero slice is clamped to one tick.
    pub const fn with_time_slice_ms(mut self, ms: u32) -> Self {
        self.time_slice_ms = if ms == 0 { 1 } else { ms };
        self
    }

    pub const fn with_debounce_ms(mut self, ms: u32) -> Self {
        self.debounce_ms = ms;
        self
    }

    pub const fn with_debounce_thread(mut self, stack_bytes: usize, priority: u8) -> Self {
        self.debounce_stack_bytes = stack_bytes;
        self.debounce_priority = priority;
        self
    }

    /// Set the core clock. Clocks slower than the tick are clamped to
    /// [`TICK_HZ`] so the tick reload stays at least one cycle.
    pub const fn with_core_clock_hz(mut self, hz: u32) -> Self {
        self.core_clock_hz = if hz < TICK_HZ { TICK_HZ } else { hz };
        self
    }
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self::new()
    }
}
