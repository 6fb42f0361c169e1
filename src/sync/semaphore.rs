//! Counting and binary semaphores.
//!
//! A semaphore is a signed counter plus the FIFO of threads parked on it.
//! A negative value is the number of parked waiters. Blocking and waking go
//! through the kernel ([`Kernel::wait`](crate::Kernel::wait) and
//! [`Kernel::signal`](crate::Kernel::signal)) because they move threads on
//! and off the run queue; the semaphore itself only holds the state.

use crate::config::MAX_THREADS;
use core::cell::{RefCell, RefMut};
use critical_section::{CriticalSection, Mutex};
use heapless::Deque;

pub(crate) struct SemaphoreState {
    pub(crate) value: i32,
    /// Thread slots blocked on this semaphore, oldest first.
    pub(crate) waiters: Deque<u8, MAX_THREADS>,
}

/// Counter guarded by the critical section.
///
/// Semaphores are created once, usually as `static`s, and never destroyed.
///
/// ```ignore
/// static DATA_READY: Semaphore = Semaphore::new(0);
///
/// fn consumer() {
///     loop {
///         preemptive_rtos::wait(&DATA_READY);
///         // ...
///     }
/// }
/// ```
pub struct Semaphore {
    inner: Mutex<RefCell<SemaphoreState>>,
}

impl Semaphore {
    /// Create a semaphore with the given initial count.
    pub const fn new(value: i32) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(SemaphoreState {
                value,
                waiters: Deque::new(),
            })),
        }
    }

    /// Reset the counter.
    ///
    /// Must not be called while threads are blocked on the semaphore.
    pub fn init(&self, value: i32) {
        critical_section::with(|cs| {
            let mut state = self.state(cs);
            debug_assert!(state.waiters.is_empty(), "init on a semaphore with waiters");
            state.value = value;
        });
    }

    /// Decrement the counter only if it is positive.
    ///
    /// Never blocks, so it is usable from interrupt handlers.
    pub fn try_wait(&self) -> bool {
        critical_section::with(|cs| {
            let mut state = self.state(cs);
            if state.value > 0 {
                state.value -= 1;
                true
            } else {
                false
            }
        })
    }

    /// Current counter value. Negative values count blocked waiters.
    pub fn value(&self) -> i32 {
        critical_section::with(|cs| self.state(cs).value)
    }

    /// Number of threads currently blocked on this semaphore.
    pub fn waiter_count(&self) -> usize {
        critical_section::with(|cs| self.state(cs).waiters.len())
    }

    pub(crate) fn state<'cs>(&'cs self, cs: CriticalSection<'cs>) -> RefMut<'cs, SemaphoreState> {
        self.inner.borrow_ref_mut(cs)
    }
}

// Semaphores are compared by identity.
impl PartialEq for Semaphore {
    fn eq(&self, other: &Self) -> bool {
        core::ptr::eq(self, other)
    }
}

impl core::fmt::Debug for Semaphore {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Semaphore")
            .field("value", &self.value())
            .finish_non_exhaustive()
    }
}
