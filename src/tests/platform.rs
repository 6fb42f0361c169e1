//! Kernels built on board-specific `Arch` types.
//!
//! The global registration is process-wide, so only
//! `test_crate_functions_reach_board_kernel` may register a kernel.

use core::cell::RefCell;
use std::boxed::Box;
use std::vec::Vec;

use super::helpers::{other_worker, worker};
use crate::arch::{Arch, HostArch};
use crate::config::KernelConfig;
use crate::kernel::Kernel;
use crate::sync::Semaphore;
use crate::tasks::{Action, ButtonLine, PeriodicTimer};
use crate::thread::ThreadState;

/// Board wrapper forwarding the core methods, as board crates do.
struct Board;

impl Arch for Board {
    fn request_context_switch() {
        HostArch::request_context_switch();
    }

    fn start_tick(tick_hz: u32, core_clock_hz: u32) {
        HostArch::start_tick(tick_hz, core_clock_hz);
    }

    unsafe fn start_first_thread(sp: *mut u32) -> ! {
        unsafe { HostArch::start_first_thread(sp) }
    }

    fn disable_interrupts() {
        HostArch::disable_interrupts();
    }

    fn wait_for_interrupt() {
        HostArch::wait_for_interrupt();
    }

    fn in_interrupt() -> bool {
        HostArch::in_interrupt()
    }

    fn cycle_count() -> u32 {
        4242
    }
}

#[test]
fn test_crate_functions_reach_board_kernel() {
    let kernel: &'static Kernel<Board> = Box::leak(Box::new(Kernel::with_config(KernelConfig::new())));
    kernel.register_global();

    let waiter = crate::add_thread(worker, 128, 1).unwrap();
    let other = crate::add_thread(other_worker, 128, 2).unwrap();
    assert_eq!(kernel.live_threads(), 2);
    kernel.start();
    assert_eq!(crate::current_thread_id(), Some(waiter));

    let sem = Semaphore::new(0);
    crate::wait(&sem);
    assert_eq!(kernel.thread_info(waiter).unwrap().state, ThreadState::Blocked);
    assert_eq!(sem.value(), -1);
    assert!(kernel.switch_pending());
    kernel.switch_context(kernel.running_sp());
    assert_eq!(crate::current_thread_id(), Some(other));

    crate::signal(&sem);
    assert_eq!(kernel.thread_info(waiter).unwrap().state, ThreadState::Ready);

    let lock = Semaphore::new(1);
    crate::bwait(&lock);
    assert_eq!(lock.value(), 0);
    crate::bsignal(&lock);
    crate::bsignal(&lock);
    assert_eq!(lock.value(), 1);

    crate::sleep(2);
    assert_eq!(kernel.thread_info(other).unwrap().state, ThreadState::Sleeping);
    kernel.switch_context(kernel.running_sp());
    assert_eq!(crate::current_thread_id(), Some(waiter));

    crate::suspend();
    assert!(kernel.switch_pending());
    kernel.switch_context(kernel.running_sp());

    kernel.tick();
    assert_eq!(crate::ms_time(), 1);
    crate::clear_ms_time();
    assert_eq!(crate::ms_time(), 0);
    assert_eq!(crate::time(), 4242);

    assert_eq!(
        crate::add_periodic_task(Action::Call(worker), 1_000, 1),
        Ok(PeriodicTimer::Timer0)
    );
    assert_eq!(kernel.periodic_binding(PeriodicTimer::Timer0), Some((1_000, 1)));
    assert_eq!(crate::add_button_task(ButtonLine::Sw1, Action::Call(worker), 2), Ok(()));
    assert!(kernel.button_armed(ButtonLine::Sw1));
}

std::thread_local! {
    static CALLS: RefCell<Vec<&'static str>> = const { RefCell::new(Vec::new()) };
}

fn record(call: &'static str) {
    CALLS.with(|calls| calls.borrow_mut().push(call));
}

/// Records the order of the launch steps.
struct Recorder;

impl Arch for Recorder {
    fn request_context_switch() {}

    fn start_tick(_tick_hz: u32, _core_clock_hz: u32) {
        record("start_tick");
    }

    unsafe fn start_first_thread(_sp: *mut u32) -> ! {
        panic!("Recorder cannot run threads")
    }

    fn disable_interrupts() {
        record("disable_interrupts");
    }

    fn wait_for_interrupt() {}

    fn in_interrupt() -> bool {
        false
    }
}

#[test]
fn test_boot_masks_interrupts_before_tick() {
    let kernel: Box<Kernel<Recorder>> = Box::new(Kernel::with_config(KernelConfig::new()));
    let first = kernel.add_thread(worker, 128, 0).unwrap();

    let sp = kernel.boot();
    assert_eq!(sp, kernel.running_sp());
    assert_eq!(kernel.current_thread_id(), Some(first));
    CALLS.with(|calls| assert_eq!(*calls.borrow(), ["disable_interrupts", "start_tick"]));
}
