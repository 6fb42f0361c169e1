//! Button tasks with thread-based debouncing.
//!
//! An edge disarms its line, runs the bound action if the line was last
//! seen released, and spawns a debounce thread. The debounce thread sleeps
//! through the contact bounce, samples the settled level and re-arms the
//! line. Edges arriving while the line is disarmed are dropped, so a burst
//! of bounces produces a single action.

use super::{Action, ButtonLine};
use crate::arch::Arch;
use crate::errors::TaskError;
use crate::kernel::{get_global_kernel, Kernel};
use crate::sched::Scheduler;

#[derive(Debug, Clone, Copy)]
pub(crate) struct ButtonBinding {
    pub(crate) action: Option<Action>,
    pub(crate) armed: bool,
    /// Level sampled after the last debounce; `true` is released.
    pub(crate) released: bool,
}

impl ButtonBinding {
    pub(crate) const UNBOUND: ButtonBinding = ButtonBinding {
        action: None,
        armed: false,
        released: true,
    };
}

impl<A: Arch, S: Scheduler> Kernel<A, S> {
    /// Bind `action` to presses on `line` and arm its edge interrupt.
    pub fn add_button_task(&self, line: ButtonLine, action: Action, irq_priority: u8) -> Result<(), TaskError> {
        let released = A::button_level(line);
        self.with_state(|state| {
            let binding = &mut state.buttons[line.index()];
            if binding.action.is_some() {
                return Err(TaskError::LineInUse(line));
            }
            *binding = ButtonBinding {
                action: Some(action),
                armed: true,
                released,
            };
            Ok(())
        })?;

        A::configure_button(line, irq_priority);
        A::set_button_armed(line, true);
        log::debug!("button task on {:?}", line);
        Ok(())
    }

    /// Edge interrupt entry; the board's GPIO handler calls this.
    pub fn on_button_edge(&self, line: ButtonLine) {
        let fired = self.with_state(|state| {
            let binding = &mut state.buttons[line.index()];
            match binding.action {
                Some(action) if binding.armed => {
                    binding.armed = false;
                    Some((action, binding.released))
                }
                _ => None,
            }
        });
        let Some((action, was_released)) = fired else {
            return;
        };
        A::set_button_armed(line, false);

        if was_released {
            self.dispatch(action);
        }

        let entry: fn() = match line {
            ButtonLine::Sw1 => debounce_thread::<A, S, 0>,
            ButtonLine::Sw2 => debounce_thread::<A, S, 1>,
        };
        let _guard = self.enter_dispatch();
        if let Err(e) = self.add_thread(entry, self.config().debounce_stack_bytes, self.config().debounce_priority) {
            // Without a debounce thread the line would stay dead.
            log::warn!("debounce spawn for {:?} failed: {}", line, e);
            self.finish_debounce(line);
        }
    }

    /// Sample `line` and re-arm it. Called by the debounce thread once the
    /// settle interval has passed.
    pub fn finish_debounce(&self, line: ButtonLine) {
        let released = A::button_level(line);
        self.with_state(|state| {
            let binding = &mut state.buttons[line.index()];
            binding.released = released;
            binding.armed = true;
        });
        A::set_button_armed(line, true);
        log::trace!("{:?} re-armed", line);
    }

    /// Whether `line` currently accepts edges.
    pub fn button_armed(&self, line: ButtonLine) -> bool {
        self.with_state(|state| state.buttons[line.index()].armed)
    }
}

fn debounce_thread<A: Arch, S: Scheduler, const LINE: usize>() {
    if let Some(kernel) = get_global_kernel::<A, S>() {
        kernel.sleep(kernel.config().debounce_ms);
        kernel.finish_debounce(ButtonLine::ALL[LINE]);
    }
}
