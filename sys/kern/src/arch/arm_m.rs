//! Cortex-M `Platform` implementation. Tick source is `SysTick`-derived
//! (a free-running millisecond/tick counter updated by the board's SysTick
//! handler); critical sections use `cortex_m::interrupt::free`-style
//! primitive-mask toggling (`PRIMASK`), matching this workspace's existing
//! `cortex-m` dependency.

use crate::arch::{CriticalGuard, Platform};
use abi::Timestamp;
use core::sync::atomic::{AtomicU32, Ordering};

/// Incremented by the board's SysTick interrupt handler. Board glue
/// (out of scope) is responsible for calling [`tick`] once per tick.
static TICKS: AtomicU32 = AtomicU32::new(0);

pub fn tick() {
    TICKS.fetch_add(1, Ordering::Relaxed);
}

pub struct ArmMPlatform;

impl ArmMPlatform {
    pub const fn new() -> Self {
        ArmMPlatform
    }
}

impl Default for ArmMPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl Platform for ArmMPlatform {
    fn timestamp_now(&self) -> Timestamp {
        TICKS.load(Ordering::Relaxed) as Timestamp
    }

    fn timestamp_init(&self) {
        TICKS.store(0, Ordering::Relaxed);
    }

    fn rtimer_now(&self) -> Timestamp {
        self.timestamp_now()
    }

    fn rtimer_hw_arm(&self, stop: Timestamp) {
        // Real comparator wiring (a second SysTick reload or a TIM
        // peripheral) is board-specific and out of scope.
        let _ = stop;
    }

    unsafe fn interrupt_disable(&self) -> CriticalGuard {
        let primask = cortex_m::register::primask::read();
        cortex_m::interrupt::disable();
        CriticalGuard(primask.is_active() as u32)
    }

    unsafe fn interrupt_restore(&self, guard: CriticalGuard) {
        if guard.0 != 0 {
            cortex_m::interrupt::enable();
        }
    }
}
