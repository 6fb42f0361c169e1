//! Scheduler trait definition.

use crate::thread::Priority;

/// Index of a TCB slot.
pub type Slot = usize;

/// Run-queue policy.
///
/// The kernel owns the TCBs; a scheduler only orders slot indices. Every
/// method is called with the kernel's critical section held, so
/// implementations need no internal locking.
pub trait Scheduler: Send + 'static {
    /// Add a READY thread to the run queue.
    ///
    /// # Arguments
    ///
    /// * `slot` - TCB slot of the thread
    /// * `priority` - Scheduling level of the thread
    fn enqueue(&mut self, slot: Slot, priority: Priority);

    /// Take a thread off the run queue (sleep, block or kill).
    ///
    /// Removing a slot that is not queued is a no-op.
    fn remove(&mut self, slot: Slot);

    /// Select the thread to run next.
    ///
    /// # Arguments
    ///
    /// * `current` - Slot that was running, if it is still alive
    ///
    /// # Returns
    ///
    /// The slot to run, or `None` if the run queue is empty.
    fn pick_next(&mut self, current: Option<Slot>) -> Option<Slot>;

    /// Whether `slot` is on the run queue.
    fn is_queued(&self, slot: Slot) -> bool;

    /// Number of queued threads.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
