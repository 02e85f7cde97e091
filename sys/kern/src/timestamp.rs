//! Monotonic wrap-safe wall-clock counter. Mirrors `timestamp.c`/`timestamp.h`:
//! all comparisons go through a single signed-difference primitive so that
//! ordering stays correct across exactly one wraparound of the counter.

use crate::arch::Platform;
use abi::{Timespan, Timestamp};

/// `diff(a, b) = signed(a - b)`. Correct as long as the true temporal
/// distance between `a` and `b` is less than half the counter's range.
pub fn diff(a: Timestamp, b: Timestamp) -> i64 {
    // Widen into i128 before subtracting so the wraparound-modular
    // subtraction can be reinterpreted as a signed value regardless of
    // `Timestamp`'s width — including `timestamp64`, where `1 << 64`
    // would itself overflow a 64-bit shift.
    let bits = core::mem::size_of::<Timestamp>() * 8;
    let wrapped = (a as u64 as i128) - (b as u64 as i128);
    let half = 1i128 << (bits - 1);
    let full = 1i128 << bits;
    let mut d = wrapped % full;
    if d >= half {
        d -= full;
    } else if d < -half {
        d += full;
    }
    d as i64
}

pub fn less_than(a: Timestamp, b: Timestamp) -> bool {
    diff(a, b) < 0
}

pub fn lessequal_than(a: Timestamp, b: Timestamp) -> bool {
    diff(a, b) <= 0
}

/// `passed(t) := diff(t, now) <= 0`, i.e. `t` is at or before `now`.
pub fn passed(t: Timestamp, now: Timestamp) -> bool {
    lessequal_than(t, now)
}

pub fn stop_of(start: Timestamp, span: Timespan) -> Timestamp {
    start.wrapping_add(span)
}

/// Spin until `passed(t, now)`. The only sanctioned busy-wait in the
/// kernel; everything else goes through the scheduler's event-driven
/// wakeups instead.
pub fn block_until(platform: &impl Platform, t: Timestamp) {
    while !passed(t, platform.timestamp_now()) {}
}

/// `block_until(now() + span)`.
pub fn block_for(platform: &impl Platform, span: Timespan) {
    let stop = stop_of(platform.timestamp_now(), span);
    block_until(platform, stop);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diff_is_signed_and_symmetric() {
        assert_eq!(diff(10, 5), 5);
        assert_eq!(diff(5, 10), -5);
    }

    #[test]
    fn wraps_correctly_near_the_top_of_the_range() {
        // u32 wraps at 2^32; 5 ticks after wraparound should read as "5 after" 0.
        let near_top = u32::MAX - 2;
        let after_wrap = 2u32;
        assert!(diff(after_wrap, near_top) > 0);
        assert!(less_than(near_top, after_wrap));
    }

    #[test]
    fn passed_is_inclusive() {
        assert!(passed(100, 100));
        assert!(passed(99, 100));
        assert!(!passed(101, 100));
    }

    #[test]
    fn block_until_returns_once_the_clock_has_caught_up() {
        let p = crate::arch::sim::SimPlatform::new();
        let stop = 105;
        // advance the clock up front so the spin loop doesn't hang the test:
        // there is nothing else driving this simulated clock forward.
        p.set_now(stop);
        block_until(&p, stop);
        assert!(passed(stop, p.timestamp_now()));
    }

    #[test]
    fn block_for_of_zero_span_returns_immediately() {
        let p = crate::arch::sim::SimPlatform::new();
        p.set_now(50);
        block_for(&p, 0);
        assert_eq!(p.timestamp_now(), 50);
    }
}
