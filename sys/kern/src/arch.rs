// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Architecture port trait.
//!
//! Everything the kernel needs from real hardware — the tick source, the
//! high-resolution rtimer comparator, and critical sections — is expressed
//! as one trait ([`Platform`]) so board/driver code supplies exactly one
//! `impl Platform for ...` and nothing else. This generalizes the same
//! "one nested module per architecture, `pub use`-d into one surface"
//! convention this module already used, from "one built-in target" to
//! "any type implementing this trait".

use abi::Timestamp;

/// Opaque token returned by `interrupt_disable` and consumed by
/// `interrupt_restore`. On real hardware this carries the previous
/// interrupt-enable state; the `sim` backend ignores it.
pub struct CriticalGuard(pub u32);

/// Everything out-of-scope board/driver glue must provide. Board/driver
/// wiring behind a concrete `Platform` impl remains out of scope per the
/// spec; this trait is the seam between them and the kernel core.
pub trait Platform {
    /// Monotonic wall-clock tick. `TICKS_PER_SEC` is a property of the
    /// concrete implementor (an associated const), not of this trait.
    fn timestamp_now(&self) -> Timestamp;

    /// One-time setup, e.g. programming a tick source. May be a no-op.
    fn timestamp_init(&self);

    /// A second, higher-resolution counter backing the rtimer comparator.
    fn rtimer_now(&self) -> Timestamp;

    /// Program the hardware comparator to fire at `stop`. When reached,
    /// the platform must invoke the ISR trampoline that calls
    /// [`crate::rtimer::Rtimer::fire`].
    fn rtimer_hw_arm(&self, stop: Timestamp);

    /// Disable interrupts, returning a token to restore the previous
    /// state. `unsafe`: touches real CPU state on hardware targets, and
    /// must never be called from within another already-open critical
    /// section (no nesting support, matching the source).
    unsafe fn interrupt_disable(&self) -> CriticalGuard;

    /// Restore interrupt state captured by `interrupt_disable`.
    unsafe fn interrupt_restore(&self, guard: CriticalGuard);
}

pub mod sim;

cfg_if::cfg_if! {
    if #[cfg(target_arch = "arm")] {
        pub mod arm_m;
        pub use arm_m::ArmMPlatform as NativePlatform;
    } else if #[cfg(any(target_arch = "riscv32", target_arch = "riscv64"))] {
        pub mod riscv;
        pub use riscv::RiscvPlatform as NativePlatform;
    } else {
        pub use sim::SimPlatform as NativePlatform;
    }
}
