//! Bounded FIFO for drivers, synchronized by two semaphores.
//!
//! `available` counts queued items and `room` counts free slots, the shape
//! used by interrupt-driven receive and transmit queues: the receive ISR
//! [`try_put`](SemaphoreFifo::try_put)s and a thread blocks in
//! [`get`](SemaphoreFifo::get); a thread blocks in
//! [`put`](SemaphoreFifo::put) and the transmit ISR
//! [`try_get`](SemaphoreFifo::try_get)s.

use core::cell::RefCell;

use critical_section::Mutex;
use heapless::Deque;

use crate::arch::Arch;
use crate::kernel::Kernel;
use crate::sched::Scheduler;
use crate::sync::Semaphore;

pub struct SemaphoreFifo<T, const N: usize> {
    items: Mutex<RefCell<Deque<T, N>>>,
    available: Semaphore,
    room: Semaphore,
}

impl<T, const N: usize> SemaphoreFifo<T, N> {
    /// Create a new empty FIFO.
    pub const fn new() -> Self {
        Self {
            items: Mutex::new(RefCell::new(Deque::new())),
            available: Semaphore::new(0),
            room: Semaphore::new(N as i32),
        }
    }

    /// Append `item`, blocking while the FIFO is full. Thread context only.
    ///
    /// Hands the item back only if the FIFO is still full after the wait,
    /// which cannot happen when every producer goes through this type.
    pub fn put<A: Arch, S: Scheduler>(&self, kernel: &Kernel<A, S>, item: T) -> Result<(), T> {
        kernel.wait(&self.room);
        self.finish_put(kernel, item)
    }

    /// Second half of [`put`](Self::put), run once a `room` unit is held.
    pub(crate) fn finish_put<A: Arch, S: Scheduler>(&self, kernel: &Kernel<A, S>, item: T) -> Result<(), T> {
        match self.push(item) {
            Ok(()) => {
                kernel.signal(&self.available);
                Ok(())
            }
            Err(item) => {
                kernel.signal(&self.room);
                Err(item)
            }
        }
    }

    /// Append `item` without blocking; usable from interrupt handlers.
    pub fn try_put<A: Arch, S: Scheduler>(&self, kernel: &Kernel<A, S>, item: T) -> Result<(), T> {
        if !self.room.try_wait() {
            return Err(item);
        }
        self.push(item)?;
        kernel.signal(&self.available);
        Ok(())
    }

    /// Remove the oldest item, blocking while the FIFO is empty. Thread
    /// context only.
    pub fn get<A: Arch, S: Scheduler>(&self, kernel: &Kernel<A, S>) -> Option<T> {
        kernel.wait(&self.available);
        self.finish_get(kernel)
    }

    /// Second half of [`get`](Self::get), run once an `available` unit is
    /// held.
    pub(crate) fn finish_get<A: Arch, S: Scheduler>(&self, kernel: &Kernel<A, S>) -> Option<T> {
        let item = self.pop();
        if item.is_some() {
            kernel.signal(&self.room);
        }
        item
    }

    /// Remove the oldest item without blocking; usable from interrupt
    /// handlers.
    pub fn try_get<A: Arch, S: Scheduler>(&self, kernel: &Kernel<A, S>) -> Option<T> {
        if !self.available.try_wait() {
            return None;
        }
        let item = self.pop();
        kernel.signal(&self.room);
        item
    }

    /// Get the number of queued items.
    pub fn len(&self) -> usize {
        critical_section::with(|cs| self.items.borrow_ref(cs).len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the maximum capacity of the FIFO.
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Counts of the `available` and `room` semaphores.
    #[cfg(test)]
    pub(crate) fn counts(&self) -> (i32, i32) {
        (self.available.value(), self.room.value())
    }

    #[cfg(test)]
    pub(crate) fn available(&self) -> &Semaphore {
        &self.available
    }

    #[cfg(test)]
    pub(crate) fn room(&self) -> &Semaphore {
        &self.room
    }

    fn push(&self, item: T) -> Result<(), T> {
        critical_section::with(|cs| self.items.borrow_ref_mut(cs).push_back(item))
    }

    fn pop(&self) -> Option<T> {
        critical_section::with(|cs| self.items.borrow_ref_mut(cs).pop_front())
    }
}

impl<T, const N: usize> Default for SemaphoreFifo<T, N> {
    fn default() -> Self {
        Self::new()
    }
}
