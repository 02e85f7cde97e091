//! Wire types shared between `kern` and `userlib`.
//!
//! Nothing in this crate allocates, and nothing in it is specific to one
//! target architecture. It exists so that the kernel and application code
//! agree on the byte layout of events and timestamps without either one
//! depending on the other.
#![cfg_attr(not(test), no_std)]

use cfg_if::cfg_if;
use zerocopy::{AsBytes, FromBytes};

cfg_if! {
    if #[cfg(feature = "timestamp8")] {
        /// Monotonic tick counter, platform tick width.
        pub type Timestamp = u8;
        pub type Timespan = u8;
    } else if #[cfg(feature = "timestamp16")] {
        pub type Timestamp = u16;
        pub type Timespan = u16;
    } else if #[cfg(feature = "timestamp64")] {
        pub type Timestamp = u64;
        pub type Timespan = u64;
    } else {
        pub type Timestamp = u32;
        pub type Timespan = u32;
    }
}

/// Reserved event identifiers. Application event ids must be `>= FIRST_APP_EVENT`.
pub mod event_id {
    pub const START: u8 = 0;
    pub const POLL: u8 = 1;
    pub const CONTINUE: u8 = 2;
    pub const TIMEOUT: u8 = 3;
    pub const EXIT: u8 = 4;
    pub const FIRST_APP_EVENT: u8 = 5;
}

/// Opaque per-event payload. The source's events carry a `void*`; this
/// workspace has no allocator and no type erasure cheaper than a tagged
/// word, so the payload is a plain `u32` that callers are free to
/// reinterpret (as an index, a small integer, or a bit-packed value).
pub type EventData = u32;

/// Index into a task table. `NONE` stands in for a null task pointer
/// (the source's `from == NULL` for ISR-originated or anonymous posts).
#[derive(Clone, Copy, PartialEq, Eq, Debug, AsBytes, FromBytes)]
#[repr(transparent)]
pub struct TaskId(pub u16);

impl TaskId {
    pub const NONE: TaskId = TaskId(u16::MAX);

    pub fn is_none(self) -> bool {
        self == Self::NONE
    }
}

/// One queued or synchronously-delivered event.
#[derive(Clone, Copy, Debug, AsBytes, FromBytes)]
#[repr(C)]
pub struct Event {
    pub id: u8,
    pub _pad: [u8; 3],
    pub data: EventData,
    pub from: TaskId,
    pub to: TaskId,
}

impl Event {
    pub const fn new(id: u8, data: EventData, from: TaskId, to: TaskId) -> Self {
        Event {
            id,
            _pad: [0; 3],
            data,
            from,
            to,
        }
    }
}

bitflags::bitflags! {
    /// Latched statistics/error flags. Mirrors the source's `errflags`
    /// and `MYOSCONF_STATISTICS` counters; every bit here is optional
    /// bookkeeping, never required for correctness.
    #[repr(transparent)]
    pub struct ErrFlags: u8 {
        /// `post` dropped an event because the queue was full.
        const EVENTQUEUE_OVERFLOW = 0b0000_0001;
        /// `rtimer_lock` was denied because another owner held it.
        const RTIMER_CONTENTION   = 0b0000_0010;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_roundtrips_through_bytes() {
        let e = Event::new(event_id::TIMEOUT, 0xdead_beef, TaskId(3), TaskId(7));
        let bytes = e.as_bytes();
        let e2 = Event::read_from(bytes).unwrap();
        assert_eq!(e2.id, event_id::TIMEOUT);
        assert_eq!(e2.data, 0xdead_beef);
        assert_eq!(e2.from, TaskId(3));
        assert_eq!(e2.to, TaskId(7));
    }

    #[test]
    fn task_id_none_is_distinguished() {
        assert!(TaskId::NONE.is_none());
        assert!(!TaskId(0).is_none());
    }
}
