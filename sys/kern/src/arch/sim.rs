//! Host-side `Platform` implementation for tests. No real interrupts: a
//! `Cell<bool>` masquerades as the interrupt-enable flag, and the clock is
//! advanced explicitly by test code rather than by a real tick source.

use crate::arch::{CriticalGuard, Platform};
use abi::Timestamp;
use core::cell::Cell;

pub struct SimPlatform {
    now: Cell<Timestamp>,
    rtimer_now: Cell<Timestamp>,
    armed_stop: Cell<Option<Timestamp>>,
    interrupts_masked: Cell<bool>,
}

impl SimPlatform {
    pub fn new() -> Self {
        SimPlatform {
            now: Cell::new(0),
            rtimer_now: Cell::new(0),
            armed_stop: Cell::new(None),
            interrupts_masked: Cell::new(false),
        }
    }

    /// Test-only clock advance. Stands in for the source's
    /// `timestamp_block_for`-style busy-wait idiom, reimplemented as a
    /// direct clock-set since host tests should never actually block.
    pub fn advance(&self, ticks: Timestamp) {
        self.now.set(self.now.get().wrapping_add(ticks));
        self.rtimer_now.set(self.rtimer_now.get().wrapping_add(ticks));
    }

    pub fn set_now(&self, now: Timestamp) {
        self.now.set(now);
    }

    pub fn armed_stop(&self) -> Option<Timestamp> {
        self.armed_stop.get()
    }
}

impl Default for SimPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl Platform for SimPlatform {
    fn timestamp_now(&self) -> Timestamp {
        self.now.get()
    }

    fn timestamp_init(&self) {
        self.now.set(0);
    }

    fn rtimer_now(&self) -> Timestamp {
        self.rtimer_now.get()
    }

    fn rtimer_hw_arm(&self, stop: Timestamp) {
        self.armed_stop.set(Some(stop));
    }

    unsafe fn interrupt_disable(&self) -> CriticalGuard {
        let was_masked = self.interrupts_masked.replace(true);
        CriticalGuard(was_masked as u32)
    }

    unsafe fn interrupt_restore(&self, guard: CriticalGuard) {
        self.interrupts_masked.set(guard.0 != 0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_moves_both_clocks() {
        let p = SimPlatform::new();
        p.advance(10);
        assert_eq!(p.timestamp_now(), 10);
        assert_eq!(p.rtimer_now(), 10);
    }

    #[test]
    fn hw_arm_records_requested_stop() {
        let p = SimPlatform::new();
        p.rtimer_hw_arm(42);
        assert_eq!(p.armed_stop(), Some(42));
    }
}
