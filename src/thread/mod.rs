//! Thread control blocks and their public identifiers.

use core::fmt;
use core::num::NonZeroU32;

use crate::config::{MAX_THREADS, NUM_PRIORITIES};

/// TCB slots, including the one reserved for the idle thread.
pub(crate) const SLOT_COUNT: usize = MAX_THREADS + 1;

/// Slot of the idle thread; never handed out by `add_thread`.
pub(crate) const IDLE_SLOT: usize = MAX_THREADS;

/// Unique identifier of a live thread.
///
/// Ids are handed out in creation order starting at 1 and are never reused
/// while the slot they name is alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ThreadId(NonZeroU32);

impl ThreadId {
    /// Id of the kernel's idle thread.
    pub const IDLE: ThreadId = ThreadId(NonZeroU32::MAX);

    pub(crate) const fn new(id: u32) -> Option<Self> {
        match NonZeroU32::new(id) {
            Some(id) => Some(Self(id)),
            None => None,
        }
    }

    /// Get the raw id value.
    pub fn get(self) -> u32 {
        self.0.get()
    }

    pub fn is_idle(self) -> bool {
        self == Self::IDLE
    }
}

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_idle() {
            f.write_str("idle")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// Scheduling priority. Lower values are more urgent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Priority(u8);

impl Priority {
    pub const HIGHEST: Priority = Priority(0);
    pub const LOWEST: Priority = Priority(NUM_PRIORITIES as u8 - 1);

    /// Level reserved for the idle thread, below every user level.
    pub(crate) const IDLE: Priority = Priority(NUM_PRIORITIES as u8);

    /// Validate a user priority (0..=5).
    pub const fn new(level: u8) -> Option<Self> {
        if (level as usize) < NUM_PRIORITIES {
            Some(Self(level))
        } else {
            None
        }
    }

    pub fn level(self) -> u8 {
        self.0
    }

    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// Lifecycle state of a thread slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum ThreadState {
    /// Slot is unused and may be handed to `add_thread`
    Free = 0,
    /// On the run queue, waiting for the CPU
    Ready = 1,
    /// Currently executing
    Running = 2,
    /// Off the run queue until its sleep counter reaches zero
    Sleeping = 3,
    /// Off the run queue until a semaphore signal wakes it
    Blocked = 4,
}

/// Thread control block.
#[derive(Clone, Copy)]
pub(crate) struct Tcb {
    pub(crate) id: Option<ThreadId>,
    pub(crate) priority: Priority,
    pub(crate) state: ThreadState,
    /// Saved stack pointer; the only register persisted while not running.
    pub(crate) sp: usize,
    /// Milliseconds left before a sleeping thread becomes ready.
    pub(crate) sleep_ms: u32,
    pub(crate) entry: Option<fn()>,
    pub(crate) stack_words: usize,
}

impl Tcb {
    pub(crate) const FREE: Tcb = Tcb {
        id: None,
        priority: Priority::LOWEST,
        state: ThreadState::Free,
        sp: 0,
        sleep_ms: 0,
        entry: None,
        stack_words: 0,
    };

    pub(crate) fn is_free(&self) -> bool {
        self.state == ThreadState::Free
    }

    pub(crate) fn info(&self) -> Option<ThreadInfo> {
        Some(ThreadInfo {
            id: self.id?,
            priority: self.priority,
            state: self.state,
            sleep_ms: self.sleep_ms,
            entry: self.entry?,
            stack_words: self.stack_words,
        })
    }
}

/// Snapshot of a live thread, for introspection.
#[derive(Debug, Clone, Copy)]
pub struct ThreadInfo {
    pub id: ThreadId,
    pub priority: Priority,
    pub state: ThreadState,
    pub sleep_ms: u32,
    pub entry: fn(),
    pub stack_words: usize,
}

impl ThreadInfo {
    /// Address of the entry function.
    pub fn entry_address(&self) -> usize {
        self.entry as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_bounds() {
        assert_eq!(Priority::new(0), Some(Priority::HIGHEST));
        assert_eq!(Priority::new(5), Some(Priority::LOWEST));
        assert_eq!(Priority::new(6), None);
        assert!(Priority::HIGHEST < Priority::LOWEST);
        assert!(Priority::LOWEST < Priority::IDLE);
    }

    #[test]
    fn test_thread_id_display() {
        use std::string::ToString;

        let id = ThreadId::new(3).unwrap();
        assert_eq!(id.get(), 3);
        assert_eq!(id.to_string(), "3");
        assert_eq!(ThreadId::IDLE.to_string(), "idle");
        assert!(ThreadId::new(0).is_none());
    }

    #[test]
    fn test_free_tcb_has_no_info() {
        assert!(Tcb::FREE.is_free());
        assert!(Tcb::FREE.info().is_none());
    }
}
