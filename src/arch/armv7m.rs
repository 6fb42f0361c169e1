//! ARMv7-M (Cortex-M3/M4/M7) port.
//!
//! Threads run in Thread mode on PSP; the kernel and interrupt handlers use
//! MSP. On exception entry the hardware stacks R0-R3, R12, LR, PC and xPSR
//! onto the thread's stack. PendSV pushes R4-R11 below that, hands the
//! resulting PSP to the kernel and unstacks whatever thread comes back.
//!
//! PendSV and SysTick both run at the lowest priority, so a switch never
//! preempts a device interrupt handler.
//!
//! Boards with peripherals behind periodic or button tasks wrap this port in
//! their own [`Arch`] type and forward the core methods to [`CortexM`].
//! The FPU's lazy stacking is not handled: threads must not use
//! floating-point registers.

use core::arch::{asm, naked_asm};

use cortex_m::peripheral::scb::{SystemHandler, VectActive};
use cortex_m::peripheral::syst::SystClkSource;
use cortex_m::peripheral::{DWT, SCB};

use super::Arch;

/// Lowest priority on every Cortex-M implementation.
const LOWEST_PRIORITY: u8 = 0xFF;

pub struct CortexM;

impl Arch for CortexM {
    #[inline]
    fn request_context_switch() {
        SCB::set_pendsv();
    }

    fn start_tick(tick_hz: u32, core_clock_hz: u32) {
        // SAFETY: runs once during launch before any thread can touch the
        // core peripherals.
        let mut p = unsafe { cortex_m::Peripherals::steal() };
        unsafe {
            p.SCB.set_priority(SystemHandler::PendSV, LOWEST_PRIORITY);
            p.SCB.set_priority(SystemHandler::SysTick, LOWEST_PRIORITY);
        }

        p.DCB.enable_trace();
        p.DWT.enable_cycle_counter();

        p.SYST.set_clock_source(SystClkSource::Core);
        p.SYST.set_reload((core_clock_hz / tick_hz).saturating_sub(1));
        p.SYST.clear_current();
        p.SYST.enable_interrupt();
        p.SYST.enable_counter();
    }

    unsafe fn start_first_thread(sp: *mut u32) -> ! {
        // SAFETY: `sp` points at an initial frame (caller contract). The
        // hardware half of the frame is popped by hand because this is not
        // a real exception return.
        unsafe {
            asm!(
                "ldmia r0!, {{r4-r11}}",
                "msr psp, r0",
                "movs r0, #2",          // CONTROL.SPSEL = PSP
                "msr control, r0",
                "isb",
                "pop {{r0-r3, r12}}",
                "pop {{r4}}",           // LR: thread exit trampoline
                "mov lr, r4",
                "pop {{r5}}",           // PC: entry point
                "pop {{r6}}",           // xPSR
                "orr r5, r5, #1",       // stay in Thumb state
                "cpsie i",
                "bx r5",
                in("r0") sp,
                options(noreturn)
            )
        }
    }

    #[inline]
    fn disable_interrupts() {
        cortex_m::interrupt::disable();
    }

    #[inline]
    fn wait_for_interrupt() {
        cortex_m::asm::wfi();
    }

    fn in_interrupt() -> bool {
        !matches!(SCB::vect_active(), VectActive::ThreadMode)
    }

    fn cycle_count() -> u32 {
        DWT::cycle_count()
    }
}

/// Context switch.
///
/// It is a naked function because the compiler must not touch the stack
/// between exception entry and the register save.
#[allow(non_snake_case)]
#[unsafe(no_mangle)]
#[unsafe(naked)]
unsafe extern "C" fn PendSV() {
    naked_asm!(
        "cpsid i",
        "mrs r0, psp",
        "stmdb r0!, {{r4-r11}}",
        "push {{r3, lr}}",          // keep EXC_RETURN, MSP stays 8-byte aligned
        "bl {switch}",              // r0 = next thread's saved sp
        "pop {{r3, lr}}",
        "ldmia r0!, {{r4-r11}}",
        "msr psp, r0",
        "cpsie i",
        "bx lr",
        switch = sym crate::kernel::dispatch_context_switch,
    );
}

/// Scheduler tick.
#[allow(non_snake_case)]
#[unsafe(no_mangle)]
extern "C" fn SysTick() {
    crate::kernel::dispatch_tick();
}
