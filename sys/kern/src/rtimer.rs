//! Real-time one-shot hardware-alarm timer (rtimer). Mirrors `rtimer.c`:
//! exactly one alarm may be armed at a time, guarded by a single boolean
//! lock rather than a per-instance one, because the hardware comparator
//! itself is a single global resource.

use crate::arch::Platform;
use abi::{Timespan, Timestamp};

/// The single-owner lock. A plain bool guarded by a critical section,
/// exactly like the source's `mutex_t` (`bool` + `CRITICAL_SECTION_BEGIN/
/// END`). Not a blocking primitive: `lock()` returns immediately with
/// success/failure, matching `mutex_lock`.
pub struct RtimerLock {
    held: bool,
}

impl RtimerLock {
    pub const fn new() -> Self {
        RtimerLock { held: false }
    }

    /// Mirrors `mutex_lock`: non-blocking, returns whether the lock was
    /// acquired.
    pub fn lock<P: Platform>(&mut self, platform: &P) -> bool {
        unsafe {
            let guard = platform.interrupt_disable();
            let acquired = if self.held {
                false
            } else {
                self.held = true;
                true
            };
            platform.interrupt_restore(guard);
            acquired
        }
    }

    /// Mirrors `mutex_release`: unconditional, no ownership check (the
    /// source has none either — callers are trusted to only release a
    /// lock they hold).
    pub fn release<P: Platform>(&mut self, platform: &P) {
        unsafe {
            let guard = platform.interrupt_disable();
            self.held = false;
            platform.interrupt_restore(guard);
        }
    }

    pub fn is_locked<P: Platform>(&self, platform: &P) -> bool {
        unsafe {
            let guard = platform.interrupt_disable();
            let locked = self.held;
            platform.interrupt_restore(guard);
            locked
        }
    }
}

impl Default for RtimerLock {
    fn default() -> Self {
        Self::new()
    }
}

pub type RtimerCallback<D> = fn(&mut Rtimer<D>, &mut D);

/// A one-shot hardware-alarm-backed timer. At most one is armed at a time
/// within a given [`RtimerLock`]/`Platform` pair — arming a second one
/// while the first is still armed should go through
/// `PROCESS_RTIMER_ACQUIRE`-style cooperative retry at the call site
/// (`userlib`'s `rtimer_acquire_loop!`), not through this type.
pub struct Rtimer<D> {
    pub start: Timestamp,
    pub span: Timespan,
    pub callback: RtimerCallback<D>,
}

impl<D> Rtimer<D> {
    /// Mirrors `rtimer_start`: captures `start = now`, computes `stop`,
    /// programs the hardware comparator, and stores the callback.
    pub fn start<P: Platform>(platform: &P, span: Timespan, callback: RtimerCallback<D>) -> Self {
        let start = platform.rtimer_now();
        let stop = crate::timestamp::stop_of(start, span);
        platform.rtimer_hw_arm(stop);
        Rtimer { start, span, callback }
    }

    /// Mirrors `rtimer_restart`: move `start` to now, keep `span`,
    /// reprogram the comparator.
    pub fn restart<P: Platform>(&mut self, platform: &P) {
        self.start = platform.rtimer_now();
        platform.rtimer_hw_arm(crate::timestamp::stop_of(self.start, self.span));
    }

    /// Mirrors `rtimer_reset`: advance `start` by `span` (periodic use,
    /// e.g. self-rearming from inside the callback), reprogram.
    pub fn reset<P: Platform>(&mut self, platform: &P) {
        self.start = crate::timestamp::stop_of(self.start, self.span);
        platform.rtimer_hw_arm(crate::timestamp::stop_of(self.start, self.span));
    }

    pub fn stop_at(&self) -> Timestamp {
        crate::timestamp::stop_of(self.start, self.span)
    }

    /// Mirrors `rtimer_left`: remaining span, or 0 if already past.
    pub fn left(&self, now: Timestamp) -> Timespan {
        let d = crate::timestamp::diff(self.stop_at(), now);
        if d <= 0 {
            0
        } else {
            d as Timespan
        }
    }

    pub fn expired(&self, now: Timestamp) -> bool {
        self.left(now) == 0
    }

    /// The ISR trampoline. Mirrors `rtimer_scheduler`: release the lock
    /// *before* invoking the callback, so the callback is free to
    /// immediately re-arm (`reset`/`restart`) without deadlocking on its
    /// own lock.
    pub fn fire<P: Platform>(&mut self, platform: &P, lock: &mut RtimerLock, data: &mut D) {
        lock.release(platform);
        (self.callback)(self, data);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arch::sim::SimPlatform;

    #[test]
    fn lock_is_exclusive_until_released() {
        let platform = SimPlatform::new();
        let mut lock = RtimerLock::new();
        assert!(lock.lock(&platform));
        assert!(!lock.lock(&platform));
        lock.release(&platform);
        assert!(lock.lock(&platform));
    }

    fn noop_cb(_rt: &mut Rtimer<u32>, _data: &mut u32) {}

    #[test]
    fn left_reaches_zero_exactly_at_expiry() {
        let platform = SimPlatform::new();
        let rt = Rtimer::start(&platform, 100, noop_cb);
        assert_eq!(rt.left(50), 50);
        assert_eq!(rt.left(100), 0);
        assert_eq!(rt.left(200), 0);
        assert!(rt.expired(100));
    }

    #[test]
    fn fire_releases_lock_before_invoking_callback() {
        let platform = SimPlatform::new();
        let mut lock = RtimerLock::new();
        assert!(lock.lock(&platform));
        let mut rt = Rtimer::start(&platform, 10, |rt, data: &mut u32| {
            // re-arm from within the callback, the way S4 expects.
            *data += 1;
            rt.span = 10;
        });
        let mut data = 0u32;
        rt.fire(&platform, &mut lock, &mut data);
        assert!(!lock.is_locked(&platform));
        assert_eq!(data, 1);
    }
}
