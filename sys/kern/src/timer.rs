//! Generic, architecture-independent wall-clock timer. Mirrors `timer.h`'s
//! `timer_t`: a pure value built on [`timestamp`], with no callback and no
//! list membership of its own (that's [`crate::rtimer`] and `multitimer`'s
//! job, both built on top of this).

use crate::timestamp;
use abi::{Timespan, Timestamp};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Timer {
    pub start: Timestamp,
    pub span: Timespan,
}

impl Timer {
    /// Mirrors `timer_start`.
    pub fn start(span: Timespan, now: Timestamp) -> Self {
        Timer { start: now, span }
    }

    /// Mirrors `timer_restart`: keep the span, move the start to now.
    pub fn restart(&mut self, now: Timestamp) {
        self.start = now;
    }

    /// Mirrors `timer_reset`: advance start by span, for periodic timers.
    pub fn reset(&mut self) {
        self.start = timestamp::stop_of(self.start, self.span);
    }

    pub fn stop_at(&self) -> Timestamp {
        timestamp::stop_of(self.start, self.span)
    }

    pub fn expired(&self, now: Timestamp) -> bool {
        timestamp::passed(self.stop_at(), now)
    }
}
