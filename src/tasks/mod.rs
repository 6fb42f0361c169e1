//! Background tasks run from interrupt context.
//!
//! Periodic timers and button lines are bound once at setup to an
//! [`Action`]. Actions run to completion inside the interrupt handler, so
//! none of them may block: they can call a function, signal a semaphore or
//! spawn a foreground thread.

use crate::arch::Arch;
use crate::kernel::Kernel;
use crate::sched::Scheduler;
use crate::sync::Semaphore;

pub mod button;
pub mod periodic;

pub(crate) use button::ButtonBinding;
pub(crate) use periodic::PeriodicBinding;

/// Thread to create when an action fires.
#[derive(Debug, Clone, Copy)]
pub struct ThreadSpec {
    pub entry: fn(),
    pub stack_bytes: usize,
    pub priority: u8,
}

/// What a periodic timer or button edge does.
#[derive(Debug, Clone, Copy)]
pub enum Action {
    /// Call a function in interrupt context.
    ///
    /// The function must not sleep, wait or kill; debug builds panic if it
    /// does.
    Call(fn()),
    /// Signal a semaphore, waking one waiting thread.
    Signal(&'static Semaphore),
    /// Add a thread.
    Spawn(ThreadSpec),
}

/// Hardware timers available to periodic tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PeriodicTimer {
    Timer0 = 0,
    Timer1 = 1,
}

impl PeriodicTimer {
    pub const ALL: [PeriodicTimer; 2] = [PeriodicTimer::Timer0, PeriodicTimer::Timer1];

    pub fn index(self) -> usize {
        self as usize
    }
}

/// GPIO lines available to button tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonLine {
    Sw1 = 0,
    Sw2 = 1,
}

impl ButtonLine {
    pub const ALL: [ButtonLine; 2] = [ButtonLine::Sw1, ButtonLine::Sw2];

    pub fn index(self) -> usize {
        self as usize
    }
}

impl<A: Arch, S: Scheduler> Kernel<A, S> {
    /// Run an action with the dispatch guard raised.
    pub(crate) fn dispatch(&self, action: Action) {
        let _guard = self.enter_dispatch();
        match action {
            Action::Call(f) => f(),
            Action::Signal(sem) => self.signal(sem),
            Action::Spawn(spec) => {
                if let Err(e) = self.add_thread(spec.entry, spec.stack_bytes, spec.priority) {
                    log::warn!("background spawn failed: {}", e);
                }
            }
        }
    }
}
