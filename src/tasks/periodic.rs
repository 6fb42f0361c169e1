//! Periodic tasks bound to hardware timers.

use super::{Action, PeriodicTimer};
use crate::arch::Arch;
use crate::errors::TaskError;
use crate::kernel::Kernel;
use crate::sched::Scheduler;

#[derive(Debug, Clone, Copy)]
pub(crate) struct PeriodicBinding {
    pub(crate) action: Action,
    pub(crate) period_us: u32,
    pub(crate) irq_priority: u8,
    /// Interrupts handled so far.
    pub(crate) fired: u32,
}

impl<A: Arch, S: Scheduler> Kernel<A, S> {
    /// Bind `action` to the next free hardware timer.
    ///
    /// # Arguments
    ///
    /// * `action` - What to run on every period
    /// * `period_us` - Timer period in microseconds
    /// * `irq_priority` - NVIC priority of the timer interrupt, unrelated to thread priority
    ///
    /// # Returns
    ///
    /// The timer now owned by the task.
    pub fn add_periodic_task(&self, action: Action, period_us: u32, irq_priority: u8) -> Result<PeriodicTimer, TaskError> {
        if period_us == 0 {
            return Err(TaskError::InvalidPeriod(period_us));
        }

        let timer = self.with_state(|state| {
            let index = state
                .periodic
                .iter()
                .position(Option::is_none)
                .ok_or(TaskError::TableFull)?;
            state.periodic[index] = Some(PeriodicBinding {
                action,
                period_us,
                irq_priority,
                fired: 0,
            });
            Ok(PeriodicTimer::ALL[index])
        })?;

        A::arm_periodic_timer(timer, period_us, irq_priority);
        log::debug!("periodic task on {:?} every {} us", timer, period_us);
        Ok(timer)
    }

    /// Timer interrupt entry; the board's handler for `timer` calls this.
    pub fn on_periodic_interrupt(&self, timer: PeriodicTimer) {
        let action = self.with_state(|state| {
            state.periodic[timer.index()].as_mut().map(|binding| {
                binding.fired = binding.fired.wrapping_add(1);
                binding.action
            })
        });
        if let Some(action) = action {
            self.dispatch(action);
        }
    }

    /// Number of interrupts handled on `timer`.
    pub fn periodic_count(&self, timer: PeriodicTimer) -> u32 {
        self.with_state(|state| state.periodic[timer.index()].map_or(0, |binding| binding.fired))
    }

    /// Period and interrupt priority bound to `timer`.
    pub fn periodic_binding(&self, timer: PeriodicTimer) -> Option<(u32, u8)> {
        self.with_state(|state| {
            state.periodic[timer.index()].map(|binding| (binding.period_us, binding.irq_priority))
        })
    }
}
