//! Kernel context coordinating threads, semaphores and the tick.
//!
//! All mutable scheduler state lives in one `KernelState` behind a
//! `critical_section::Mutex`, so every operation is a short critical section
//! followed, where needed, by a context-switch request to the [`Arch`] port.
//! The port's PendSV handler later calls [`Kernel::switch_context`] to do
//! the actual selection.

use core::any::TypeId;
use core::cell::RefCell;
use core::marker::PhantomData;

use critical_section::Mutex;
use portable_atomic::{AtomicU8, Ordering};

use crate::arch::Arch;
use crate::config::{KernelConfig, MAX_BUTTON_TASKS, MAX_PERIODIC_TASKS, MAX_THREADS, STACK_WORDS, TICK_HZ};
use crate::errors::{SpawnError, TaskError};
use crate::mem::StackPool;
use crate::sched::{PriorityRoundRobin, Scheduler, Slot};
use crate::sync::Semaphore;
use crate::tasks::{Action, ButtonBinding, ButtonLine, PeriodicBinding, PeriodicTimer};
use crate::thread::{Priority, Tcb, ThreadId, ThreadInfo, ThreadState, IDLE_SLOT, SLOT_COUNT};
use crate::time::TickCounter;

/// Scheduler state guarded by the critical section.
pub(crate) struct KernelState<S> {
    pub(crate) tcbs: [Tcb; SLOT_COUNT],
    pub(crate) scheduler: S,
    /// Slot currently executing; `None` right after a self-kill.
    pub(crate) running: Option<Slot>,
    /// Slot freed by a kill whose stack is still in use until the switch.
    dying: Option<Slot>,
    next_id: u32,
    live: usize,
    slice_elapsed: u32,
    switch_pending: bool,
    started: bool,
    pub(crate) periodic: [Option<PeriodicBinding>; MAX_PERIODIC_TASKS],
    pub(crate) buttons: [ButtonBinding; MAX_BUTTON_TASKS],
}

impl<S: Scheduler> KernelState<S> {
    fn allocate_id(&mut self) -> ThreadId {
        loop {
            let raw = self.next_id;
            self.next_id = self.next_id.wrapping_add(1);
            if let Some(id) = ThreadId::new(raw).filter(|id| !id.is_idle()) {
                return id;
            }
        }
    }

    fn free_slot(&self) -> Option<Slot> {
        (0..MAX_THREADS).find(|&slot| self.tcbs[slot].is_free() && self.dying != Some(slot))
    }

    /// The running user thread, if any. The idle thread never sleeps,
    /// blocks or dies.
    fn running_user(&self) -> Option<Slot> {
        self.running.filter(|&slot| slot != IDLE_SLOT)
    }

    pub(crate) fn make_ready(&mut self, slot: Slot) {
        let tcb = &mut self.tcbs[slot];
        tcb.state = ThreadState::Ready;
        tcb.sleep_ms = 0;
        self.scheduler.enqueue(slot, tcb.priority);
    }
}

/// Main kernel handle.
///
/// One instance per system, normally a `static` registered with
/// [`Kernel::launch`]. Tests create as many as they like.
///
/// # Type Parameters
///
/// * `A` - Architecture implementation
/// * `S` - Scheduler implementation
pub struct Kernel<A: Arch, S: Scheduler = PriorityRoundRobin> {
    state: Mutex<RefCell<KernelState<S>>>,
    /// Stacks for every slot, indexed like the TCBs
    stacks: StackPool,
    /// Milliseconds since launch or the last clear
    ms_clock: TickCounter,
    /// Nesting depth of background-task dispatch
    dispatch_depth: AtomicU8,
    config: KernelConfig,
    _arch: PhantomData<fn() -> A>,
}

impl<A: Arch> Kernel<A, PriorityRoundRobin> {
    /// Kernel with the default priority round-robin scheduler.
    pub const fn with_config(config: KernelConfig) -> Self {
        Self::new(PriorityRoundRobin::new(), config)
    }
}

impl<A: Arch, S: Scheduler> Kernel<A, S> {
    /// Create a new kernel instance.
    ///
    /// # Arguments
    ///
    /// * `scheduler` - Scheduler implementation to use
    /// * `config` - Time slice and debounce settings
    pub const fn new(scheduler: S, config: KernelConfig) -> Self {
        Self {
            state: Mutex::new(RefCell::new(KernelState {
                tcbs: [Tcb::FREE; SLOT_COUNT],
                scheduler,
                running: None,
                dying: None,
                next_id: 1,
                live: 0,
                slice_elapsed: 0,
                switch_pending: false,
                started: false,
                periodic: [None; MAX_PERIODIC_TASKS],
                buttons: [ButtonBinding::UNBOUND; MAX_BUTTON_TASKS],
            })),
            stacks: StackPool::new(),
            ms_clock: TickCounter::new(TICK_HZ),
            dispatch_depth: AtomicU8::new(0),
            config,
            _arch: PhantomData,
        }
    }

    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    pub(crate) fn with_state<R>(&self, f: impl FnOnce(&mut KernelState<S>) -> R) -> R {
        critical_section::with(|cs| f(&mut self.state.borrow_ref_mut(cs)))
    }

    fn pend_switch(&self, state: &mut KernelState<S>) {
        state.switch_pending = true;
        A::request_context_switch();
    }

    /// Add a thread to the pool.
    ///
    /// Callable from thread context and from interrupt handlers. The new
    /// thread is READY but no switch is requested; it runs when the
    /// scheduler next selects it.
    ///
    /// # Arguments
    ///
    /// * `entry` - Function the thread starts in; returning from it kills the thread
    /// * `stack_bytes` - Stack to reserve, at most the per-slot capacity
    /// * `priority` - 0 (highest) to 5 (lowest)
    ///
    /// # Returns
    ///
    /// The new thread's id. On error nothing has changed.
    pub fn add_thread(&self, entry: fn(), stack_bytes: usize, priority: u8) -> Result<ThreadId, SpawnError> {
        let priority = Priority::new(priority).ok_or(SpawnError::InvalidPriority(priority))?;
        let words = StackPool::words_for(stack_bytes)?;

        let id = self.with_state(|state| {
            let slot = state.free_slot().ok_or(SpawnError::PoolExhausted)?;
            let id = state.allocate_id();
            // SAFETY: the slot is free and not the stack of a dying thread,
            // and we are inside the critical section.
            let sp = unsafe {
                self.stacks
                    .carve(slot, words, entry as usize, thread_exit::<A, S> as usize)
            };
            state.tcbs[slot] = Tcb {
                id: Some(id),
                priority,
                state: ThreadState::Ready,
                sp: sp as usize,
                sleep_ms: 0,
                entry: Some(entry),
                stack_words: words,
            };
            state.scheduler.enqueue(slot, priority);
            state.live += 1;
            Ok(id)
        })?;

        log::debug!("thread {} added at priority {}", id, priority.level());
        Ok(id)
    }

    /// Give up the rest of the time slice. The caller stays READY.
    ///
    /// Thread context only.
    pub fn suspend(&self) {
        self.assert_thread_context("suspend");
        self.with_state(|state| self.pend_switch(state));
    }

    /// Block the caller for `ms` ticks. `sleep(0)` is [`Kernel::suspend`].
    ///
    /// Thread context only.
    pub fn sleep(&self, ms: u32) {
        self.assert_thread_context("sleep");
        if ms == 0 {
            self.with_state(|state| self.pend_switch(state));
            return;
        }
        self.with_state(|state| {
            let Some(slot) = state.running_user() else {
                return;
            };
            state.scheduler.remove(slot);
            let tcb = &mut state.tcbs[slot];
            tcb.state = ThreadState::Sleeping;
            tcb.sleep_ms = ms;
            self.pend_switch(state);
        });
    }

    /// Terminate the calling thread and free its slot.
    ///
    /// Returns to the caller only until the requested switch is taken; use
    /// the crate-level [`kill`](crate::kill), which never returns, from
    /// thread code. Thread context only.
    pub fn kill(&self) {
        self.assert_thread_context("kill");
        if let Some(id) = self.current_thread_id().filter(|id| !id.is_idle()) {
            log::debug!("thread {} exiting", id);
        }
        self.with_state(|state| {
            let Some(slot) = state.running_user() else {
                return;
            };
            state.scheduler.remove(slot);
            state.tcbs[slot] = Tcb::FREE;
            state.running = None;
            state.dying = Some(slot);
            state.live -= 1;
            self.pend_switch(state);
        });
    }

    /// Decrement `sem`, blocking the caller while the count is negative.
    ///
    /// Thread context only.
    pub fn wait(&self, sem: &Semaphore) {
        self.assert_thread_context("wait");
        critical_section::with(|cs| {
            let mut state = self.state.borrow_ref_mut(cs);
            let mut sem = sem.state(cs);
            sem.value -= 1;
            if sem.value >= 0 {
                return;
            }
            if let Some(slot) = state.running_user() {
                state.scheduler.remove(slot);
                state.tcbs[slot].state = ThreadState::Blocked;
                // At most MAX_THREADS threads can be blocked at once.
                let _ = sem.waiters.push_back(slot as u8);
                self.pend_switch(&mut state);
            }
        });
    }

    /// Increment `sem`, waking its oldest waiter if there is one.
    ///
    /// Safe to call from interrupt handlers.
    pub fn signal(&self, sem: &Semaphore) {
        critical_section::with(|cs| {
            let mut state = self.state.borrow_ref_mut(cs);
            let mut sem = sem.state(cs);
            sem.value += 1;
            if sem.value <= 0 {
                if let Some(slot) = sem.waiters.pop_front() {
                    state.make_ready(slot as usize);
                }
            }
        });
    }

    /// Binary wait; identical to [`Kernel::wait`].
    pub fn bwait(&self, sem: &Semaphore) {
        self.wait(sem);
    }

    /// Binary signal: a count of 1 stays 1.
    pub fn bsignal(&self, sem: &Semaphore) {
        critical_section::with(|cs| {
            let mut state = self.state.borrow_ref_mut(cs);
            let mut sem = sem.state(cs);
            if sem.value >= 1 {
                sem.value = 1;
                return;
            }
            sem.value += 1;
            if sem.value <= 0 {
                if let Some(slot) = sem.waiters.pop_front() {
                    state.make_ready(slot as usize);
                }
            }
        });
    }

    /// Handle one 1 ms tick.
    ///
    /// Advances the millisecond clock, counts down sleeping threads and
    /// re-admits those reaching zero, then requests a switch if the running
    /// thread's time slice is used up.
    ///
    /// # Returns
    ///
    /// Whether a context switch was requested.
    pub fn tick(&self) -> bool {
        self.ms_clock.increment();
        self.with_state(|state| {
            for slot in 0..MAX_THREADS {
                let tcb = &mut state.tcbs[slot];
                if tcb.state == ThreadState::Sleeping && tcb.sleep_ms > 0 {
                    tcb.sleep_ms -= 1;
                    if tcb.sleep_ms == 0 {
                        state.make_ready(slot);
                    }
                }
            }

            if !state.started {
                return false;
            }
            state.slice_elapsed += 1;
            if state.slice_elapsed >= self.config.time_slice_ms {
                state.slice_elapsed = 0;
                self.pend_switch(state);
                true
            } else {
                false
            }
        })
    }

    /// Pick the next thread; the portable half of the context switch.
    ///
    /// The port saves the outgoing registers onto the outgoing stack, passes
    /// the resulting stack pointer in `saved_sp`, and restores from the
    /// returned one.
    pub fn switch_context(&self, saved_sp: *mut u32) -> *mut u32 {
        let (from, to, next_sp, overflowed) = self.with_state(|state| {
            state.switch_pending = false;
            state.slice_elapsed = 0;
            state.dying = None;

            let current = state.running.take();
            let mut overflowed = None;
            if let Some(slot) = current {
                let tcb = &mut state.tcbs[slot];
                tcb.sp = saved_sp as usize;
                if tcb.state == ThreadState::Running {
                    tcb.state = ThreadState::Ready;
                }
                if !self.stacks.canary_intact(slot, tcb.stack_words) {
                    overflowed = tcb.id;
                }
            }

            let next = state.scheduler.pick_next(current).unwrap_or(IDLE_SLOT);
            let tcb = &mut state.tcbs[next];
            tcb.state = ThreadState::Running;
            state.running = Some(next);
            (
                current.and_then(|slot| state.tcbs[slot].id),
                state.tcbs[next].id,
                state.tcbs[next].sp as *mut u32,
                overflowed,
            )
        });

        if let Some(id) = overflowed {
            log::error!("stack overflow detected on thread {}", id);
        }
        if from != to {
            log::trace!("switch {:?} -> {:?}", from, to);
        }
        next_sp
    }

    /// Set up the idle thread, select the first thread and return the stack
    /// pointer to restore.
    pub fn start(&self) -> *mut u32 {
        self.with_state(|state| {
            if !state.started {
                // SAFETY: the idle slot is never handed out by add_thread.
                let sp = unsafe {
                    self.stacks.carve(
                        IDLE_SLOT,
                        STACK_WORDS,
                        idle_thread::<A> as usize,
                        idle_thread::<A> as usize,
                    )
                };
                state.tcbs[IDLE_SLOT] = Tcb {
                    id: Some(ThreadId::IDLE),
                    priority: Priority::IDLE,
                    state: ThreadState::Ready,
                    sp: sp as usize,
                    sleep_ms: 0,
                    entry: Some(idle_thread::<A>),
                    stack_words: STACK_WORDS,
                };
                state.scheduler.enqueue(IDLE_SLOT, Priority::IDLE);
                state.started = true;
            }

            let first = state.scheduler.pick_next(None).unwrap_or(IDLE_SLOT);
            state.tcbs[first].state = ThreadState::Running;
            state.running = Some(first);
            state.slice_elapsed = 0;
            state.tcbs[first].sp as *mut u32
        })
    }

    /// Start scheduling. Never returns.
    ///
    /// Registers this kernel for the interrupt handlers, starts the tick
    /// and jumps into the most urgent thread.
    pub fn launch(&'static self) -> ! {
        self.register_global();
        let sp = self.boot();
        // SAFETY: `sp` is the saved frame of a thread selected by `start`.
        unsafe { A::start_first_thread(sp) }
    }

    /// Everything `launch` does before jumping into the first thread.
    /// Interrupts stay masked until that thread's frame is restored.
    pub(crate) fn boot(&self) -> *mut u32 {
        A::disable_interrupts();
        let sp = self.start();
        log::debug!("launching with {} threads", self.live_threads());
        A::start_tick(TICK_HZ, self.config.core_clock_hz);
        sp
    }

    /// Id of the running thread, [`ThreadId::IDLE`] when idling.
    pub fn current_thread_id(&self) -> Option<ThreadId> {
        self.with_state(|state| state.running.and_then(|slot| state.tcbs[slot].id))
    }

    /// Snapshot of a live thread.
    pub fn thread_info(&self, id: ThreadId) -> Option<ThreadInfo> {
        self.with_state(|state| {
            state
                .tcbs
                .iter()
                .find(|tcb| tcb.id == Some(id))
                .and_then(Tcb::info)
        })
    }

    /// Number of live user threads.
    pub fn live_threads(&self) -> usize {
        self.with_state(|state| state.live)
    }

    /// Whether a switch has been requested and not yet taken.
    pub fn switch_pending(&self) -> bool {
        self.with_state(|state| state.switch_pending)
    }

    /// Milliseconds counted by the tick.
    pub fn ms_time(&self) -> u32 {
        self.ms_clock.ticks()
    }

    pub fn clear_ms_time(&self) {
        self.ms_clock.clear();
    }

    /// Free-running cycle count; see [`time_difference`](crate::time::time_difference).
    pub fn time(&self) -> u32 {
        A::cycle_count()
    }

    pub(crate) fn enter_dispatch(&self) -> DispatchGuard<'_> {
        self.dispatch_depth.fetch_add(1, Ordering::AcqRel);
        DispatchGuard {
            depth: &self.dispatch_depth,
        }
    }

    fn assert_thread_context(&self, op: &str) {
        debug_assert!(
            self.dispatch_depth.load(Ordering::Acquire) == 0 && !A::in_interrupt(),
            "{} called from interrupt context",
            op
        );
    }

    /// Saved stack pointer of the running thread.
    #[cfg(test)]
    pub(crate) fn running_sp(&self) -> *mut u32 {
        self.with_state(|state| match state.running {
            Some(slot) => state.tcbs[slot].sp as *mut u32,
            None => core::ptr::null_mut(),
        })
    }

    #[cfg(test)]
    pub(crate) fn with_scheduler<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        self.with_state(|state| f(&state.scheduler))
    }

    #[cfg(test)]
    pub(crate) fn stacks(&self) -> &StackPool {
        &self.stacks
    }

    #[cfg(test)]
    pub(crate) fn slot_of(&self, id: ThreadId) -> Option<Slot> {
        self.with_state(|state| state.tcbs.iter().position(|tcb| tcb.id == Some(id)))
    }
}

/// Marks the kernel as running background-task code until dropped.
pub(crate) struct DispatchGuard<'a> {
    depth: &'a AtomicU8,
}

impl Drop for DispatchGuard<'_> {
    fn drop(&mut self) {
        self.depth.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Where a thread lands when its entry function returns.
fn thread_exit<A: Arch, S: Scheduler>() {
    if let Some(kernel) = get_global_kernel::<A, S>() {
        kernel.kill();
    }
    loop {
        A::wait_for_interrupt();
    }
}

fn idle_thread<A: Arch>() {
    loop {
        A::wait_for_interrupt();
    }
}

// ============================================================================
// Global registration
// ============================================================================

/// The kernel the interrupt handlers and crate-level functions talk to,
/// with its operations monomorphized for the registered `Kernel<A, S>`.
pub(crate) struct Registration {
    kernel: *const (),
    kind: TypeId,
    pub(crate) switch_context: fn(*mut u32) -> *mut u32,
    pub(crate) tick: fn() -> bool,
    pub(crate) add_thread: fn(fn(), usize, u8) -> Result<ThreadId, SpawnError>,
    pub(crate) suspend: fn(),
    pub(crate) sleep: fn(u32),
    pub(crate) kill: fn(),
    pub(crate) wait: fn(&Semaphore),
    pub(crate) signal: fn(&Semaphore),
    pub(crate) bwait: fn(&Semaphore),
    pub(crate) bsignal: fn(&Semaphore),
    pub(crate) current_thread_id: fn() -> Option<ThreadId>,
    pub(crate) ms_time: fn() -> u32,
    pub(crate) clear_ms_time: fn(),
    pub(crate) time: fn() -> u32,
    pub(crate) wait_for_interrupt: fn(),
    pub(crate) add_periodic_task: fn(Action, u32, u8) -> Result<PeriodicTimer, TaskError>,
    pub(crate) add_button_task: fn(ButtonLine, Action, u8) -> Result<(), TaskError>,
}

// SAFETY: `kernel` points at a `'static` kernel, which is `Sync`.
unsafe impl Send for Registration {}
unsafe impl Sync for Registration {}

static GLOBAL_KERNEL: spin::Once<Registration> = spin::Once::new();

impl<A: Arch, S: Scheduler> Kernel<A, S> {
    /// Make this kernel the one the interrupt handlers and the crate-level
    /// functions operate on. Only the first registration takes effect.
    pub fn register_global(&'static self) {
        let registration = GLOBAL_KERNEL.call_once(|| Registration {
            kernel: self as *const Self as *const (),
            kind: TypeId::of::<Self>(),
            switch_context: |sp| registered::<A, S>().map_or(sp, |k| k.switch_context(sp)),
            tick: || registered::<A, S>().is_some_and(|k| k.tick()),
            add_thread: |entry, stack_bytes, priority| {
                registered::<A, S>()
                    .ok_or(SpawnError::NotInitialized)?
                    .add_thread(entry, stack_bytes, priority)
            },
            suspend: || with_registered::<A, S>(|k| k.suspend()),
            sleep: |ms| with_registered::<A, S>(|k| k.sleep(ms)),
            kill: || with_registered::<A, S>(|k| k.kill()),
            wait: |sem| with_registered::<A, S>(|k| k.wait(sem)),
            signal: |sem| with_registered::<A, S>(|k| k.signal(sem)),
            bwait: |sem| with_registered::<A, S>(|k| k.bwait(sem)),
            bsignal: |sem| with_registered::<A, S>(|k| k.bsignal(sem)),
            current_thread_id: || registered::<A, S>().and_then(|k| k.current_thread_id()),
            ms_time: || registered::<A, S>().map_or(0, |k| k.ms_time()),
            clear_ms_time: || with_registered::<A, S>(|k| k.clear_ms_time()),
            time: A::cycle_count,
            wait_for_interrupt: A::wait_for_interrupt,
            add_periodic_task: |action, period_us, irq_priority| {
                registered::<A, S>()
                    .ok_or(TaskError::NotInitialized)?
                    .add_periodic_task(action, period_us, irq_priority)
            },
            add_button_task: |line, action, irq_priority| {
                registered::<A, S>()
                    .ok_or(TaskError::NotInitialized)?
                    .add_button_task(line, action, irq_priority)
            },
        });
        if !core::ptr::eq(registration.kernel, self as *const Self as *const ()) {
            log::warn!("a different kernel is already registered");
        }
    }
}

/// The registered kernel, whatever its architecture and scheduler.
pub(crate) fn registration() -> Option<&'static Registration> {
    GLOBAL_KERNEL.get()
}

/// Get the globally registered kernel, if it has this type.
pub fn get_global_kernel<A: Arch, S: Scheduler>() -> Option<&'static Kernel<A, S>> {
    let registration = GLOBAL_KERNEL.get()?;
    if registration.kind != TypeId::of::<Kernel<A, S>>() {
        return None;
    }
    // SAFETY: the pointer came from a `&'static Kernel<A, S>` of the
    // matching type.
    Some(unsafe { &*(registration.kernel as *const Kernel<A, S>) })
}

// Hooks are only installed by a `Kernel<A, S>`, so these lookups succeed
// whenever a hook runs.
fn registered<A: Arch, S: Scheduler>() -> Option<&'static Kernel<A, S>> {
    get_global_kernel::<A, S>()
}

fn with_registered<A: Arch, S: Scheduler>(f: impl FnOnce(&'static Kernel<A, S>)) {
    if let Some(kernel) = registered::<A, S>() {
        f(kernel);
    }
}

/// Context-switch entry for the port's PendSV handler.
///
/// Returns `saved_sp` unchanged if no kernel is registered.
pub extern "C" fn dispatch_context_switch(saved_sp: *mut u32) -> *mut u32 {
    match registration() {
        Some(registration) => (registration.switch_context)(saved_sp),
        None => saved_sp,
    }
}

/// Tick entry for the port's SysTick handler.
pub fn dispatch_tick() {
    if let Some(registration) = registration() {
        (registration.tick)();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arch::HostArch;
    use std::boxed::Box;

    fn worker() {}

    fn kernel() -> Box<Kernel<HostArch>> {
        Box::new(Kernel::with_config(KernelConfig::new()))
    }

    #[test]
    fn test_add_thread_validates_arguments() {
        let k = kernel();
        assert_eq!(k.add_thread(worker, 128, 6), Err(SpawnError::InvalidPriority(6)));
        assert_eq!(
            k.add_thread(worker, STACK_WORDS * 4 + 4, 1),
            Err(SpawnError::StackTooLarge(STACK_WORDS * 4 + 4))
        );
        assert_eq!(k.live_threads(), 0);
    }

    #[test]
    fn test_ids_are_sequential() {
        let k = kernel();
        let a = k.add_thread(worker, 128, 1).unwrap();
        let b = k.add_thread(worker, 128, 1).unwrap();
        assert_eq!(a.get(), 1);
        assert_eq!(b.get(), 2);
    }

    #[test]
    fn test_start_runs_most_urgent_thread() {
        let k = kernel();
        k.add_thread(worker, 128, 3).unwrap();
        let urgent = k.add_thread(worker, 128, 0).unwrap();

        let sp = k.start();
        assert_eq!(k.current_thread_id(), Some(urgent));
        assert_eq!(sp, k.running_sp());
        assert_eq!(k.thread_info(urgent).unwrap().state, ThreadState::Running);
    }

    #[test]
    fn test_start_without_threads_idles() {
        let k = kernel();
        k.start();
        assert_eq!(k.current_thread_id(), Some(ThreadId::IDLE));
    }

    #[test]
    fn test_ms_time() {
        let k = kernel();
        for _ in 0..5 {
            k.tick();
        }
        assert_eq!(k.ms_time(), 5);
        k.clear_ms_time();
        assert_eq!(k.ms_time(), 0);
    }

    #[test]
    fn test_tick_before_start_never_switches() {
        let k = kernel();
        k.add_thread(worker, 128, 1).unwrap();
        assert!(!k.tick());
        assert!(!k.tick());
        assert!(!k.switch_pending());
    }
}
