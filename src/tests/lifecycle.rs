//! Thread creation, sleeping and termination.

use super::helpers::{other_worker, worker, Sim};
use crate::config::{KernelConfig, MAX_THREADS};
use crate::errors::SpawnError;
use crate::thread::{ThreadId, ThreadState};

#[test]
fn test_pool_capacity() {
    let sim = Sim::new();
    let mut ids = std::vec::Vec::new();
    for i in 0..MAX_THREADS {
        let id = sim.kernel.add_thread(worker, 128, (i % 6) as u8).unwrap();
        ids.push(id);
    }
    assert_eq!(sim.kernel.add_thread(other_worker, 128, 0), Err(SpawnError::PoolExhausted));
    assert_eq!(sim.kernel.live_threads(), MAX_THREADS);

    for (i, id) in ids.iter().enumerate() {
        let info = sim.kernel.thread_info(*id).unwrap();
        assert_eq!(info.state, ThreadState::Ready);
        assert_eq!(info.priority.level(), (i % 6) as u8);
        assert_eq!(info.entry_address(), worker as usize);
    }
}

#[test]
fn test_sleep_wakes_after_exact_ticks() {
    let sim = Sim::new();
    let sleeper = sim.spawn(worker, 1);
    let background = sim.spawn(other_worker, 2);
    assert_eq!(sim.start(), sleeper);

    sim.kernel.sleep(5);
    sim.reschedule();
    assert_eq!(sim.current(), background);

    for _ in 0..4 {
        sim.tick();
        assert_eq!(sim.state(sleeper), ThreadState::Sleeping);
        assert_ne!(sim.current(), sleeper);
    }

    sim.kernel.tick();
    assert_eq!(sim.state(sleeper), ThreadState::Ready);
    sim.reschedule();

    let slice = sim.kernel.config().time_slice_ms;
    assert!(sim.tick_until_running(sleeper, slice).is_some());
}

#[test]
fn test_sleep_zero_yields() {
    let sim = Sim::new();
    let a = sim.spawn(worker, 1);
    let b = sim.spawn(worker, 1);
    sim.start();

    sim.kernel.sleep(0);
    assert!(sim.reschedule());
    assert_eq!(sim.current(), b);
    assert_eq!(sim.state(a), ThreadState::Ready);
}

#[test]
fn test_suspend_alone_keeps_running() {
    let sim = Sim::new();
    let only = sim.spawn(worker, 3);
    sim.start();

    sim.kernel.suspend();
    assert!(sim.reschedule());
    assert_eq!(sim.current(), only);
}

#[test]
fn test_kill_frees_slot_after_switch() {
    let sim = Sim::new();
    let victim = sim.spawn(worker, 1);
    let survivor = sim.spawn(worker, 1);
    assert_eq!(sim.start(), victim);
    let slot = sim.kernel.slot_of(victim).unwrap();

    sim.kernel.kill();
    assert!(sim.kernel.thread_info(victim).is_none());
    assert!(!sim.kernel.with_scheduler(|s| crate::sched::Scheduler::is_queued(s, slot)));
    assert_eq!(sim.kernel.live_threads(), 1);

    // Still executing on the dead thread's stack until the switch.
    let early = sim.spawn(other_worker, 2);
    assert_ne!(sim.kernel.slot_of(early), Some(slot));

    sim.reschedule();
    assert_eq!(sim.current(), survivor);

    let reused = sim.spawn(other_worker, 2);
    assert_eq!(sim.kernel.slot_of(reused), Some(slot));
    assert_ne!(reused, victim);
}

#[test]
fn test_killing_last_thread_idles() {
    let sim = Sim::with_config(KernelConfig::new().with_time_slice_ms(1));
    sim.spawn(worker, 0);
    sim.start();

    sim.kernel.kill();
    sim.reschedule();
    assert_eq!(sim.current(), ThreadId::IDLE);
    assert_eq!(sim.kernel.live_threads(), 0);

    // Idle keeps ticking until new work shows up.
    sim.ticks(3);
    assert_eq!(sim.current(), ThreadId::IDLE);

    let late = sim.spawn(worker, 5);
    sim.tick();
    assert_eq!(sim.current(), late);
}

#[test]
fn test_idle_never_sleeps_or_dies() {
    let sim = Sim::new();
    sim.start();
    assert_eq!(sim.current(), ThreadId::IDLE);

    sim.kernel.sleep(10);
    sim.kernel.kill();
    sim.reschedule();
    assert_eq!(sim.current(), ThreadId::IDLE);
}

#[test]
fn test_overflow_is_reported_not_fatal() {
    let sim = Sim::new();
    let a = sim.spawn(worker, 1);
    let b = sim.spawn(worker, 1);
    sim.start();

    let slot = sim.kernel.slot_of(a).unwrap();
    let words = sim.kernel.thread_info(a).unwrap().stack_words;
    sim.kernel.stacks().smash(slot, words);

    sim.kernel.suspend();
    sim.reschedule();
    assert_eq!(sim.current(), b);
    assert!(!sim.kernel.stacks().canary_intact(slot, words));
}
