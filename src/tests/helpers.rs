//! Host-side driver standing in for SysTick and PendSV.
//!
//! Thread bodies cannot run on the host, so tests play them by hand: they
//! call kernel operations "as" whichever thread is current, then let the
//! simulator take the switch the kernel asked for.

use std::boxed::Box;

use crate::arch::HostArch;
use crate::config::KernelConfig;
use crate::kernel::Kernel;
use crate::thread::{ThreadId, ThreadState};

pub(crate) struct Sim {
    pub(crate) kernel: &'static Kernel<HostArch>,
}

impl Sim {
    pub(crate) fn new() -> Self {
        Self::with_config(KernelConfig::new())
    }

    /// Leaked so callbacks running inside dispatch can reach the kernel.
    pub(crate) fn with_config(config: KernelConfig) -> Self {
        Self {
            kernel: Box::leak(Box::new(Kernel::with_config(config))),
        }
    }

    /// Add a thread the way board code does before launch.
    pub(crate) fn spawn(&self, entry: fn(), priority: u8) -> ThreadId {
        self.kernel
            .add_thread(entry, 128, priority)
            .expect("thread pool has room")
    }

    /// Pick the first thread; everything after this runs "inside" threads.
    pub(crate) fn start(&self) -> ThreadId {
        self.kernel.start();
        self.current()
    }

    pub(crate) fn current(&self) -> ThreadId {
        self.kernel.current_thread_id().expect("a thread is running")
    }

    /// Take the pending switch like PendSV would. Returns whether one was
    /// pending.
    pub(crate) fn reschedule(&self) -> bool {
        if !self.kernel.switch_pending() {
            return false;
        }
        let sp = self.kernel.running_sp();
        self.kernel.switch_context(sp);
        true
    }

    /// One SysTick, followed by the PendSV it may have pended.
    pub(crate) fn tick(&self) {
        self.kernel.tick();
        self.reschedule();
    }

    pub(crate) fn ticks(&self, n: u32) {
        for _ in 0..n {
            self.tick();
        }
    }

    /// Tick until `id` runs, giving up after `limit` ticks.
    pub(crate) fn tick_until_running(&self, id: ThreadId, limit: u32) -> Option<u32> {
        for elapsed in 0..=limit {
            if self.current() == id {
                return Some(elapsed);
            }
            self.tick();
        }
        None
    }

    /// State of `id`, `Free` once it is gone.
    pub(crate) fn state(&self, id: ThreadId) -> ThreadState {
        self.kernel
            .thread_info(id)
            .map_or(ThreadState::Free, |info| info.state)
    }
}

pub(crate) fn worker() {}

pub(crate) fn other_worker() {}
