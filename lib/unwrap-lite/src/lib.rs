//! A trimmed-down `unwrap`/`expect` for code that must never require its
//! `Option`/`Result` payload to implement `Debug` just to panic on it.
//!
//! `kern` uses this for invariant violations it must never actually hit
//! (a bug, not a documented error path) rather than pulling in
//! `core::fmt::Debug` bounds — and the formatting machinery that comes
//! with them — for every caller.
#![no_std]

/// Unwraps a value, panicking without requiring the contained
/// error/value to implement `Debug`.
pub trait UnwrapLite {
    type Item;

    fn unwrap_lite(self) -> Self::Item;
}

impl<T> UnwrapLite for Option<T> {
    type Item = T;

    #[track_caller]
    fn unwrap_lite(self) -> T {
        match self {
            Some(v) => v,
            None => unwrap_failed("unwrap_lite on a None value"),
        }
    }
}

impl<T, E> UnwrapLite for Result<T, E> {
    type Item = T;

    #[track_caller]
    fn unwrap_lite(self) -> T {
        match self {
            Ok(v) => v,
            Err(_) => unwrap_failed("unwrap_lite on an Err value"),
        }
    }
}

/// `Result`-specific helper that discards the error type entirely,
/// matching the `Debug`-free contract above for the `Err` side too.
pub trait ResultExt {
    type Item;

    fn expect_lite(self, msg: &'static str) -> Self::Item;
}

impl<T, E> ResultExt for Result<T, E> {
    type Item = T;

    #[track_caller]
    fn expect_lite(self, msg: &'static str) -> T {
        match self {
            Ok(v) => v,
            Err(_) => unwrap_failed(msg),
        }
    }
}

#[track_caller]
fn unwrap_failed(msg: &'static str) -> ! {
    panic!("{}", msg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unwrap_lite_passes_through_some_and_ok() {
        assert_eq!(Some(3).unwrap_lite(), 3);
        assert_eq!(Result::<i32, ()>::Ok(4).unwrap_lite(), 4);
    }

    #[test]
    #[should_panic]
    fn unwrap_lite_panics_on_none() {
        let _: i32 = None.unwrap_lite();
    }

    #[test]
    fn expect_lite_passes_through_ok() {
        assert_eq!(Result::<i32, &str>::Ok(5).expect_lite("unreachable"), 5);
    }
}
