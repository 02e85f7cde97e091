//! Saturating 16-bit fixed-point numeric engine (Q-format arithmetic,
//! sqrt/cbrt, CORDIC circular and hyperbolic functions, log/exp).
//!
//! Grounded on `myos-zephyr-app/src/fxp16.c`/`fxp16.h`: a signed 16-bit
//! value (`fxp16_t`/[`Fxp16`]) interpreted as `value / 2^n` for a
//! caller-supplied fractional-bit count `n`, with a 32-bit intermediate
//! type (`fxp32_t`/[`Fxp32`]) used throughout for overflow headroom.
//!
//! Every operation saturates to `[i16::MIN, i16::MAX]` rather than
//! wrapping; domain errors (`log(x<=0)`, `tan(±π/2)`, `ilogb(0)`) set the
//! per-call [`dom_error`] indicator and return the documented sentinel.
//! The indicator is a single `Cell<bool>`, acceptable per this crate's
//! single-threaded-caller contract (see `SPEC_FULL.md` §9); callers that
//! want a tagged result instead of the implicit flag can use the
//! `try_*`-suffixed entry points offered alongside every domain-sensitive
//! operation in [`log`], [`cordic`], [`sqrt`], and [`fixed`].
#![cfg_attr(not(test), no_std)]

pub mod cordic;
pub mod fixed;
pub mod hyp;
pub mod log;
pub mod sqrt;

pub use crate::fixed::{Fxp16, Fxp32};

use core::cell::Cell;

/// A domain error occurred in the most recent call from this context.
/// Mirrors the source's `errno == EDOM` convention: never read by any
/// other part of this crate, purely a caller-visible side channel.
struct DomFlag(Cell<bool>);

// Safety: this crate's single-threaded-cooperative-caller contract
// (SPEC_FULL.md §9, decision 2) means there is never concurrent access
// from more than one logical context at a time.
unsafe impl Sync for DomFlag {}

static DOM: DomFlag = DomFlag(Cell::new(false));

pub(crate) fn set_dom() {
    DOM.0.set(true);
}

/// Was a domain error latched since the last [`clear_dom`]? Callers that
/// care about domain errors should clear the flag before the call they
/// want to observe and check it immediately after.
pub fn dom_error() -> bool {
    DOM.0.get()
}

pub fn clear_dom() {
    DOM.0.set(false);
}

/// A value tagged with whether computing it hit a domain error, for
/// callers who would rather not share the implicit [`dom_error`] flag.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DomainError;

pub type FxpResult<T> = Result<T, DomainError>;
