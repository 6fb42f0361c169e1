//! Preemptive priority scheduler with round robin inside each level.
//!
//! Each priority level keeps its READY threads in a circular ring threaded
//! through fixed `next`/`prev` arrays indexed by TCB slot. A bitmask of
//! non-empty levels finds the most urgent level in constant time.

use super::trait_def::{Scheduler, Slot};
use crate::config::NUM_PRIORITIES;
use crate::thread::{Priority, SLOT_COUNT};

/// User levels plus the idle level.
const LEVELS: usize = NUM_PRIORITIES + 1;

const NIL: u8 = u8::MAX;

/// Set of non-empty priority levels. Bit `n` is level `n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PriorityMask(u8);

impl PriorityMask {
    pub const EMPTY: Self = Self(0);

    pub fn set(&mut self, level: usize) {
        self.0 |= 1 << level;
    }

    pub fn clear(&mut self, level: usize) {
        self.0 &= !(1 << level);
    }

    pub const fn is_set(&self, level: usize) -> bool {
        self.0 & (1 << level) != 0
    }

    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Most urgent (numerically lowest) level in the mask.
    pub fn highest(&self) -> Option<usize> {
        if self.is_empty() {
            None
        } else {
            Some(self.0.trailing_zeros() as usize)
        }
    }
}

/// Index-ring run queue: strict priority across levels, round robin in
/// creation order within a level.
pub struct PriorityRoundRobin {
    next: [u8; SLOT_COUNT],
    prev: [u8; SLOT_COUNT],
    level: [u8; SLOT_COUNT],
    queued: [bool; SLOT_COUNT],
    /// Thread at the front of each level's ring, or `NIL`.
    heads: [u8; LEVELS],
    ready: PriorityMask,
    len: usize,
}

impl PriorityRoundRobin {
    pub const fn new() -> Self {
        Self {
            next: [NIL; SLOT_COUNT],
            prev: [NIL; SLOT_COUNT],
            level: [0; SLOT_COUNT],
            queued: [false; SLOT_COUNT],
            heads: [NIL; LEVELS],
            ready: PriorityMask::EMPTY,
            len: 0,
        }
    }

    /// Slots queued at `level`, starting from its head.
    pub fn level_order(&self, level: usize) -> impl Iterator<Item = Slot> + '_ {
        let head = self.heads[level];
        let mut cursor = head;
        let mut started = false;
        core::iter::from_fn(move || {
            if cursor == NIL || (started && cursor == head) {
                return None;
            }
            started = true;
            let slot = cursor;
            cursor = self.next[slot as usize];
            Some(slot as usize)
        })
    }

    /// Levels that currently have at least one READY thread.
    pub fn ready_mask(&self) -> PriorityMask {
        self.ready
    }
}

impl Default for PriorityRoundRobin {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for PriorityRoundRobin {
    fn enqueue(&mut self, slot: Slot, priority: Priority) {
        if self.queued[slot] {
            return;
        }
        let level = priority.index();
        let s = slot as u8;
        self.level[slot] = level as u8;
        self.queued[slot] = true;
        self.len += 1;

        let head = self.heads[level];
        if head == NIL {
            self.next[slot] = s;
            self.prev[slot] = s;
            self.heads[level] = s;
            self.ready.set(level);
        } else {
            // Tail of the ring is just before the head.
            let tail = self.prev[head as usize];
            self.next[tail as usize] = s;
            self.prev[slot] = tail;
            self.next[slot] = head;
            self.prev[head as usize] = s;
        }
    }

    fn remove(&mut self, slot: Slot) {
        if !self.queued[slot] {
            return;
        }
        let level = self.level[slot] as usize;
        let next = self.next[slot];
        let prev = self.prev[slot];

        if next == slot as u8 {
            self.heads[level] = NIL;
            self.ready.clear(level);
        } else {
            self.next[prev as usize] = next;
            self.prev[next as usize] = prev;
            if self.heads[level] == slot as u8 {
                self.heads[level] = next;
            }
        }

        self.next[slot] = NIL;
        self.prev[slot] = NIL;
        self.queued[slot] = false;
        self.len -= 1;
    }

    fn pick_next(&mut self, current: Option<Slot>) -> Option<Slot> {
        // A thread still on the queue has used its turn; its peers go next.
        if let Some(cur) = current.filter(|&cur| self.queued[cur]) {
            let level = self.level[cur] as usize;
            if self.heads[level] == cur as u8 {
                self.heads[level] = self.next[cur];
            }
        }

        let level = self.ready.highest()?;
        Some(self.heads[level] as usize)
    }

    fn is_queued(&self, slot: Slot) -> bool {
        self.queued[slot]
    }

    fn len(&self) -> usize {
        self.len
    }
}
