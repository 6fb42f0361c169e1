//! Interrupt-masking critical sections.
//!
//! Built on the `critical-section` crate: on Cortex-M the implementation is
//! provided by `cortex-m` (PRIMASK save/restore), on the host by the crate's
//! `std` implementation.

use core::marker::PhantomData;
use critical_section::{CriticalSection, RestoreState};

/// Proof that interrupts are masked, returned by [`enter`].
///
/// Carries the interrupt-enable state captured on entry. It must be handed
/// back to [`exit`] exactly once.
#[must_use = "a critical section stays open until the token is passed to `exit`"]
pub struct CriticalToken {
    state: RestoreState,
    // Tokens are tied to the context that opened them.
    _not_send: PhantomData<*mut ()>,
}

impl CriticalToken {
    /// Borrow the open section so `critical_section::Mutex` data can be
    /// accessed while the token is held.
    pub fn cs(&self) -> CriticalSection<'_> {
        // SAFETY: interrupts stay masked for as long as `self` is alive.
        unsafe { CriticalSection::new() }
    }
}

/// Capture the current interrupt-enable state and mask interrupts.
#[inline]
pub fn enter() -> CriticalToken {
    // SAFETY: the returned token must be released through `exit`, whose
    // contract enforces the nesting order.
    let state = unsafe { critical_section::acquire() };
    CriticalToken {
        state,
        _not_send: PhantomData,
    }
}

/// Restore the interrupt-enable state captured by the matching [`enter`].
///
/// # Safety
///
/// Tokens must be released in the reverse order they were acquired. A
/// token released while a later one is still open would unmask interrupts
/// underneath the inner section.
#[inline]
pub unsafe fn exit(token: CriticalToken) {
    // SAFETY: forwarded to the caller.
    unsafe { critical_section::release(token.state) }
}

/// Run `f` with interrupts masked.
#[inline]
pub fn with<R>(f: impl FnOnce(CriticalSection<'_>) -> R) -> R {
    critical_section::with(f)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;
    use critical_section::Mutex;

    #[test]
    fn test_nested_sections_compose() {
        let counter = Mutex::new(Cell::new(0u32));

        let outer = enter();
        counter.borrow(outer.cs()).set(1);

        let inner = enter();
        counter.borrow(inner.cs()).set(2);
        unsafe { exit(inner) };

        // Still inside the outer section.
        assert_eq!(counter.borrow(outer.cs()).get(), 2);
        unsafe { exit(outer) };

        with(|cs| assert_eq!(counter.borrow(cs).get(), 2));
    }

    #[test]
    fn test_with_inside_token() {
        let token = enter();
        let value = with(|_| 7);
        unsafe { exit(token) };
        assert_eq!(value, 7);
    }
}
