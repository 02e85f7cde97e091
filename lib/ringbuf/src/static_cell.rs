// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! A `'static` cell with a single, non-reentrant mutable borrow, for the
//! one thing this kernel's tracing needs: a ring buffer declared once as
//! a `static` and written to from ordinary task/ISR context.
//!
//! The kernel this sits under never preempts and never runs SMP (see
//! SPEC_FULL.md's non-goals), so a borrow can only ever be re-entered by
//! the same logical thread of control re-entering its own write — a bug,
//! not a race — which is why `borrow_mut` panics rather than spinning.

use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicBool, Ordering};
use core::ops::{Deref, DerefMut};
use unwrap_lite::UnwrapLite;

pub struct StaticCell<T> {
    borrowed: AtomicBool,
    cell: UnsafeCell<T>,
}

// SAFETY: `borrowed` enforces single-writer access; this kernel has no
// SMP, so there is no concurrent hardware thread to race `borrowed` itself.
unsafe impl<T> Sync for StaticCell<T> {}

impl<T> StaticCell<T> {
    pub const fn new(value: T) -> Self {
        StaticCell { borrowed: AtomicBool::new(false), cell: UnsafeCell::new(value) }
    }

    /// Takes the single mutable borrow. Panics if already borrowed
    /// (dropping the guard releases it for the next caller).
    pub fn borrow_mut(&self) -> StaticRefMut<'_, T> {
        self.try_borrow_mut().expect_lite("StaticCell borrowed twice")
    }

    pub fn try_borrow_mut(&self) -> Option<StaticRefMut<'_, T>> {
        if self.borrowed.swap(true, Ordering::Acquire) {
            return None;
        }
        Some(StaticRefMut { cell: self })
    }
}

pub struct StaticRefMut<'a, T> {
    cell: &'a StaticCell<T>,
}

impl<'a, T> Deref for StaticRefMut<'a, T> {
    type Target = T;
    fn deref(&self) -> &T {
        // SAFETY: `borrowed` was claimed by `StaticCell::borrow_mut` and is
        // only released when this guard drops.
        unsafe { &*self.cell.cell.get() }
    }
}

impl<'a, T> DerefMut for StaticRefMut<'a, T> {
    fn deref_mut(&mut self) -> &mut T {
        // SAFETY: see `Deref`.
        unsafe { &mut *self.cell.cell.get() }
    }
}

impl<'a, T> Drop for StaticRefMut<'a, T> {
    fn drop(&mut self) {
        self.cell.borrowed.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn borrow_then_drop_allows_a_second_borrow() {
        let cell = StaticCell::new(0u32);
        {
            let mut guard = cell.borrow_mut();
            *guard += 1;
        }
        let guard = cell.borrow_mut();
        assert_eq!(*guard, 1);
    }

    #[test]
    fn double_borrow_is_rejected_without_panicking() {
        let cell = StaticCell::new(0u32);
        let _first = cell.borrow_mut();
        assert!(cell.try_borrow_mut().is_none());
    }
}
