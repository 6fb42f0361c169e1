#![no_std]
#![deny(unsafe_op_in_unsafe_fn)]
#![forbid(unreachable_pub)]

//! Preemptive, priority-aware real-time kernel for single-core Cortex-M
//! microcontrollers.
//!
//! Threads live in a fixed pool, each with its own statically allocated
//! stack. The scheduler always runs the most urgent READY thread (priority 0
//! is highest, 5 lowest) and rotates round robin among threads of equal
//! priority on every time slice. Threads synchronize with counting and binary
//! semaphores, sleep in 1 ms ticks and leave by killing themselves.
//! Interrupt-driven background work comes in two flavors: periodic timer
//! tasks and debounced button tasks.
//!
//! # Features
//!
//! - `std-shim`: Enable the host critical-section implementation for builds
//!   outside `cargo test`
//! - `defmt`: Derive `defmt::Format` for ids, states and errors
//!
//! # Quick Start
//!
//! ```ignore
//! use preemptive_rtos::{Kernel, KernelConfig, DefaultArch, Semaphore};
//!
//! static KERNEL: Kernel<DefaultArch> = Kernel::with_config(KernelConfig::new());
//! static DATA_READY: Semaphore = Semaphore::new(0);
//!
//! fn producer() {
//!     loop {
//!         preemptive_rtos::sleep(10);
//!         preemptive_rtos::signal(&DATA_READY);
//!     }
//! }
//!
//! fn consumer() {
//!     loop {
//!         preemptive_rtos::wait(&DATA_READY);
//!         // handle data
//!     }
//! }
//!
//! #[cortex_m_rt::entry]
//! fn main() -> ! {
//!     KERNEL.add_thread(producer, 128, 1).ok();
//!     KERNEL.add_thread(consumer, 128, 2).ok();
//!     KERNEL.launch()
//! }
//! ```
//!
//! # Architecture
//!
//! - [`Kernel`] owns every piece of scheduler state behind a critical section
//! - [`Arch`] isolates the platform trap: pending a switch, the tick, and the
//!   first-thread launch; the Cortex-M port adds the PendSV and SysTick handlers
//! - [`Scheduler`] orders TCB slots; [`PriorityRoundRobin`] is the default
//! - [`tasks`] binds periodic timers and button lines to non-blocking actions

pub mod arch;
pub mod config;
pub mod errors;
pub mod fifo;
pub mod kernel;
pub mod mem;
pub mod sched;
pub mod sync;
pub mod tasks;
pub mod thread;
pub mod time;

#[cfg(test)]
extern crate std;

#[cfg(test)]
mod tests;

// ============================================================================
// Public API
// ============================================================================

// Architecture abstraction
pub use arch::{Arch, DefaultArch, HostArch};

// Kernel
pub use config::KernelConfig;
pub use kernel::{get_global_kernel, Kernel};

// Scheduler
pub use sched::{PriorityRoundRobin, Scheduler};

// Threads
pub use thread::{Priority, ThreadId, ThreadInfo, ThreadState};

// Synchronization
pub use fifo::SemaphoreFifo;
pub use sync::{enter as enter_critical, exit as exit_critical, CriticalToken, Semaphore};

// Background tasks
pub use tasks::{Action, ButtonLine, PeriodicTimer, ThreadSpec};

// Time
pub use time::time_difference;

// Errors
pub use errors::{KernelError, KernelResult, SpawnError, TaskError};

// ============================================================================
// Convenience Functions
// ============================================================================
//
// These operate on the kernel registered by `Kernel::launch` (or
// `Kernel::register_global`), whatever its architecture and scheduler.
// Called before registration they do nothing and log a warning.

#[inline]
fn registered(op: &str) -> Option<&'static kernel::Registration> {
    let registration = kernel::registration();
    if registration.is_none() {
        log::warn!("{} called before a kernel was registered", op);
    }
    registration
}

/// Add a thread to the registered kernel.
pub fn add_thread(entry: fn(), stack_bytes: usize, priority: u8) -> Result<ThreadId, SpawnError> {
    let registration = registered("add_thread").ok_or(SpawnError::NotInitialized)?;
    (registration.add_thread)(entry, stack_bytes, priority)
}

/// Give up the rest of the current time slice.
#[inline]
pub fn suspend() {
    if let Some(registration) = registered("suspend") {
        (registration.suspend)();
    }
}

/// Sleep the current thread for `ms` milliseconds.
#[inline]
pub fn sleep(ms: u32) {
    if let Some(registration) = registered("sleep") {
        (registration.sleep)(ms);
    }
}

/// Terminate the current thread.
pub fn kill() -> ! {
    match registered("kill") {
        Some(registration) => {
            (registration.kill)();
            loop {
                (registration.wait_for_interrupt)();
            }
        }
        None => loop {
            DefaultArch::wait_for_interrupt();
        },
    }
}

/// Wait on a counting semaphore.
#[inline]
pub fn wait(sem: &Semaphore) {
    if let Some(registration) = registered("wait") {
        (registration.wait)(sem);
    }
}

/// Signal a counting semaphore.
#[inline]
pub fn signal(sem: &Semaphore) {
    if let Some(registration) = registered("signal") {
        (registration.signal)(sem);
    }
}

/// Wait on a binary semaphore.
#[inline]
pub fn bwait(sem: &Semaphore) {
    if let Some(registration) = registered("bwait") {
        (registration.bwait)(sem);
    }
}

/// Signal a binary semaphore.
#[inline]
pub fn bsignal(sem: &Semaphore) {
    if let Some(registration) = registered("bsignal") {
        (registration.bsignal)(sem);
    }
}

/// Id of the running thread.
pub fn current_thread_id() -> Option<ThreadId> {
    kernel::registration().and_then(|registration| (registration.current_thread_id)())
}

/// Milliseconds counted by the scheduler tick.
pub fn ms_time() -> u32 {
    kernel::registration().map_or(0, |registration| (registration.ms_time)())
}

/// Reset the millisecond counter.
pub fn clear_ms_time() {
    if let Some(registration) = registered("clear_ms_time") {
        (registration.clear_ms_time)();
    }
}

/// Free-running cycle count.
pub fn time() -> u32 {
    kernel::registration().map_or_else(DefaultArch::cycle_count, |registration| (registration.time)())
}

/// Bind a periodic task on the registered kernel.
pub fn add_periodic_task(action: Action, period_us: u32, irq_priority: u8) -> KernelResult<PeriodicTimer> {
    let registration = registered("add_periodic_task").ok_or(TaskError::NotInitialized)?;
    Ok((registration.add_periodic_task)(action, period_us, irq_priority)?)
}

/// Bind a button task on the registered kernel.
pub fn add_button_task(line: ButtonLine, action: Action, irq_priority: u8) -> KernelResult<()> {
    let registration = registered("add_button_task").ok_or(TaskError::NotInitialized)?;
    Ok((registration.add_button_task)(line, action, irq_priority)?)
}
