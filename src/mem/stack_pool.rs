//! Fixed pool of thread stacks.
//!
//! Every thread slot owns one statically sized stack for the lifetime of the
//! thread in it. A thread may ask for less than the full capacity; the pool
//! carves the requested amount from the top of the slot and plants a canary
//! word just below it for overflow detection.

use core::cell::UnsafeCell;

use crate::arch::frame::{build_initial_frame, INITIAL_FRAME_WORDS};
use crate::config::STACK_WORDS;
use crate::errors::SpawnError;
use crate::thread::SLOT_COUNT;

/// Value written below the carved region of every stack.
pub const STACK_CANARY: u32 = 0xDEAD_BEEF;

/// Smallest stack that holds an initial frame plus the canary.
pub const MIN_STACK_BYTES: usize = (INITIAL_FRAME_WORDS + 1) * 4;

/// One slot's worth of stack memory.
#[repr(C, align(8))]
pub struct Stack {
    words: [u32; STACK_WORDS],
}

impl Stack {
    const EMPTY: Stack = Stack {
        words: [0; STACK_WORDS],
    };

    /// Capacity in bytes.
    pub const fn size() -> usize {
        STACK_WORDS * 4
    }
}

/// Stacks for every thread slot, indexed like the TCB array.
pub struct StackPool {
    stacks: UnsafeCell<[Stack; SLOT_COUNT]>,
}

// SAFETY: a slot's stack is only written while the slot is being set up
// inside a critical section, and afterwards only by the thread owning it.
unsafe impl Sync for StackPool {}

impl StackPool {
    pub const fn new() -> Self {
        Self {
            stacks: UnsafeCell::new([Stack::EMPTY; SLOT_COUNT]),
        }
    }

    /// Convert a requested stack size in bytes into whole words.
    ///
    /// Sizes beyond the per-slot capacity are rejected rather than
    /// truncated.
    pub fn words_for(bytes: usize) -> Result<usize, SpawnError> {
        if bytes > Stack::size() {
            Err(SpawnError::StackTooLarge(bytes))
        } else if bytes < MIN_STACK_BYTES {
            Err(SpawnError::StackTooSmall(bytes))
        } else {
            Ok(bytes / 4)
        }
    }

    /// Prepare the top `words` of `slot`'s stack for a new thread and return
    /// its initial saved stack pointer.
    ///
    /// # Safety
    ///
    /// - `slot` must be free: no thread may be running on or about to
    ///   resume from this stack
    /// - `words` must come from [`StackPool::words_for`]
    /// - Must be called inside a critical section
    pub(crate) unsafe fn carve(&self, slot: usize, words: usize, entry: usize, exit: usize) -> *mut u32 {
        debug_assert!(slot < SLOT_COUNT);
        debug_assert!(words <= STACK_WORDS && words > INITIAL_FRAME_WORDS);

        // SAFETY: only this slot is borrowed, and the caller guarantees no
        // one else is using it.
        let stack = unsafe { &mut (*self.stacks.get())[slot].words };
        let base = STACK_WORDS - words;

        stack[base] = STACK_CANARY;
        let sp = base + build_initial_frame(&mut stack[base..], entry, exit);
        stack[base..sp].iter_mut().skip(1).for_each(|w| *w = 0);

        // SAFETY: `sp < STACK_WORDS`, so the pointer stays inside the slot.
        unsafe { stack.as_mut_ptr().add(sp) }
    }

    /// Check the canary of a thread that was carved with `words` words.
    pub(crate) fn canary_intact(&self, slot: usize, words: usize) -> bool {
        if words == 0 || words > STACK_WORDS {
            return true;
        }
        let base = STACK_WORDS - words;
        // SAFETY: the slot index is bounded by the array and the read does
        // not create a reference that could alias the owning thread's
        // writes.
        let word = unsafe {
            let stacks = self.stacks.get() as *const Stack;
            core::ptr::read_volatile((*stacks.add(slot)).words.as_ptr().add(base))
        };
        word == STACK_CANARY
    }

    /// Address range `[low, high)` of a slot's stack memory.
    pub fn bounds(&self, slot: usize) -> (usize, usize) {
        let stacks = self.stacks.get() as *const Stack;
        // SAFETY: pointer arithmetic only; nothing is dereferenced.
        let low = unsafe { stacks.add(slot) } as usize;
        (low, low + Stack::size())
    }

    #[cfg(test)]
    pub(crate) fn smash(&self, slot: usize, words: usize) {
        // SAFETY: test-only; nothing runs on host stacks.
        let stack = unsafe { &mut (*self.stacks.get())[slot].words };
        stack[STACK_WORDS - words] = 0;
    }
}

impl Default for StackPool {
    fn default() -> Self {
        Self::new()
    }
}
