//! Priority selection, round robin and time slicing.

use std::collections::HashMap;

use super::helpers::{worker, Sim};
use crate::config::KernelConfig;
use crate::thread::ThreadState;

#[test]
fn test_equal_priority_fairness() {
    let sim = Sim::with_config(KernelConfig::new().with_time_slice_ms(1));
    let a = sim.spawn(worker, 2);
    let b = sim.spawn(worker, 2);
    sim.start();

    let mut runs: HashMap<_, u32> = HashMap::new();
    for _ in 0..101 {
        *runs.entry(sim.current()).or_default() += 1;
        sim.tick();
    }

    let (ra, rb) = (runs[&a], runs[&b]);
    assert_eq!(ra + rb, 101);
    assert!(ra.abs_diff(rb) <= 1, "a ran {} slices, b ran {}", ra, rb);
}

#[test]
fn test_slice_length_is_respected() {
    let sim = Sim::with_config(KernelConfig::new().with_time_slice_ms(4));
    let a = sim.spawn(worker, 1);
    let b = sim.spawn(worker, 1);
    assert_eq!(sim.start(), a);

    sim.ticks(3);
    assert_eq!(sim.current(), a);
    sim.tick();
    assert_eq!(sim.current(), b);
    sim.ticks(4);
    assert_eq!(sim.current(), a);
}

#[test]
fn test_higher_priority_preempts_within_one_slice() {
    let sim = Sim::new();
    let low = sim.spawn(worker, 4);
    assert_eq!(sim.start(), low);

    // Added from an interrupt while `low` is running.
    let high = sim.spawn(worker, 1);
    assert_eq!(sim.current(), low);
    assert_eq!(sim.state(high), ThreadState::Ready);

    let slice = sim.kernel.config().time_slice_ms;
    let waited = sim.tick_until_running(high, slice).unwrap();
    assert!(waited <= slice);
    assert_eq!(sim.state(low), ThreadState::Ready);
}

#[test]
fn test_lower_priority_starves_while_higher_ready() {
    let sim = Sim::with_config(KernelConfig::new().with_time_slice_ms(1));
    let high = sim.spawn(worker, 0);
    let low = sim.spawn(worker, 5);
    sim.start();

    for _ in 0..50 {
        assert_eq!(sim.current(), high);
        sim.tick();
    }
    assert_eq!(sim.state(low), ThreadState::Ready);

    // Once the urgent thread sleeps the low one finally runs.
    sim.kernel.sleep(3);
    sim.reschedule();
    assert_eq!(sim.current(), low);
}

#[test]
fn test_three_threads_share_suspend_rounds() {
    let sim = Sim::new();
    let ids = [sim.spawn(worker, 1), sim.spawn(worker, 1), sim.spawn(worker, 1)];
    sim.start();

    let mut runs: HashMap<_, u32> = HashMap::new();
    for _ in 0..300 {
        *runs.entry(sim.current()).or_default() += 1;
        sim.kernel.suspend();
        sim.reschedule();
    }

    for id in ids {
        let count = runs[&id];
        assert!((99..=101).contains(&count), "thread {} ran {} times", id, count);
    }
}

#[test]
fn test_woken_thread_joins_tail_of_its_level() {
    let sim = Sim::with_config(KernelConfig::new().with_time_slice_ms(1));
    let a = sim.spawn(worker, 2);
    let b = sim.spawn(worker, 2);
    let c = sim.spawn(worker, 2);
    assert_eq!(sim.start(), a);

    sim.kernel.sleep(1);
    sim.reschedule();
    assert_eq!(sim.current(), b);

    // `a` wakes on this tick and queues behind `c`.
    sim.tick();
    assert_eq!(sim.current(), c);
    sim.tick();
    assert_eq!(sim.current(), a);
    sim.tick();
    assert_eq!(sim.current(), b);
}
