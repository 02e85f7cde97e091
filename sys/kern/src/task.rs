//! The stackless task primitive (protothread). A task body is realized as
//! a hand-written resume-point state machine: no stack is captured across
//! a yield, only a small `u16` counter that records where to re-enter.
//!
//! The source drives this with a Duff's-device `switch` keyed on
//! `__LINE__`. The distilled spec's own design notes rule that out for a
//! target language and ask for "a generator / iterator / hand-written
//! state machine that stores a small state tag per task" instead — that
//! is exactly what [`PtState`] plus the `resume_point` field below are,
//! and `userlib::task!` generates the match-on-resume_point body that
//! plays the role of the source's `switch`.

use abi::{event_id, Event, EventData};

/// Distinguished resume-point values. `INITIAL` is the value a task has
/// before its first `start`; `TERMINATED` is set once its body returns
/// `PtState::Terminated` and never runs again without an explicit restart.
pub const RESUME_INITIAL: u16 = 0;
pub const RESUME_TERMINATED: u16 = u16::MAX;

/// What a task body returns from one invocation. Mirrors `PT_STATE_WAITING`
/// / `PT_STATE_TERMINATED`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PtState {
    Waiting,
    Terminated,
}

/// A task body function. Receives the task's own state (so it can read/
/// write `resume_point` and its typed `data`) and the event that caused
/// this invocation.
pub type TaskThread<D> = fn(&mut Task<D>, Event) -> PtState;

/// One cooperative task. `D` is the task's private `user_data`, the only
/// storage that survives a yield (mirrors the source's note that "no local
/// variables survive a yield unless stored in the task's user_data").
pub struct Task<D> {
    pub resume_point: u16,
    pub thread: TaskThread<D>,
    pub data: D,
    pub poll_requested: bool,
    pub maxslicetime: Option<abi::Timespan>,
}

impl<D> Task<D> {
    pub fn new(thread: TaskThread<D>) -> Self
    where
        D: Default,
    {
        Task {
            resume_point: RESUME_INITIAL,
            thread,
            data: D::default(),
            poll_requested: false,
            maxslicetime: None,
        }
    }

    pub fn with_data(thread: TaskThread<D>, data: D) -> Self {
        Task {
            resume_point: RESUME_INITIAL,
            thread,
            data,
            poll_requested: false,
            maxslicetime: None,
        }
    }

    /// `T ∈ running_list ⇔ resume_point ∉ {initial, terminal}` (invariant 1
    /// of the distilled spec's testable-properties section).
    pub fn is_running(&self) -> bool {
        self.resume_point != RESUME_INITIAL && self.resume_point != RESUME_TERMINATED
    }

    pub fn mark_terminated(&mut self) {
        self.resume_point = RESUME_TERMINATED;
    }

    pub fn mark_restarted(&mut self) {
        self.resume_point = RESUME_INITIAL;
    }

    /// Dispatch one event into this task's body, honoring the `begin()`
    /// contract: an incoming EXIT always terminates, regardless of where
    /// the body was waiting.
    pub fn dispatch(&mut self, event: Event) -> PtState {
        if event.id == event_id::EXIT {
            self.mark_terminated();
            return PtState::Terminated;
        }
        let state = (self.thread)(self, event);
        if state == PtState::Terminated {
            self.mark_terminated();
        }
        state
    }
}

/// Stand-in for the source's `void*` event payload read back as a plain
/// integer; tasks that need a richer payload encode/decode it themselves.
pub fn payload_u32(event: &Event) -> EventData {
    event.data
}
