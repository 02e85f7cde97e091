//! `task!`/`wait_event!`/`yield_task!`/`pt_spawn!`/`sleep!` — declarative
//! macros an application task body is written against.
//!
//! A task body is one hand-written `match task.resume_point { ... }`, one
//! arm per suspension point, each arm ending in a call to one of the
//! macros below. Every macro here takes the *next* resume-point value as
//! an explicit argument rather than deriving it from `line!()`: callers
//! own their own numbering, same as the source's `LC_INIT`/`LC_RESUME`
//! would if ported literally, but without the line-dependent fragility a
//! `line!()`-keyed state tag would reintroduce under refactoring.

/// Mirrors `PROCESS_THREAD`: declares a task body function with the
/// signature [`crate::TaskThread`] expects. Purely a naming convention —
/// the expansion is the function itself, unwrapped. `Task`, `Event` and
/// `PtState` must already be in scope at the call site (as they are
/// wherever this crate's prelude is imported).
#[macro_export]
macro_rules! task {
    ($(#[$meta:meta])* $vis:vis fn $name:ident($task:ident : &mut Task<$data:ty>, $event:ident : Event) -> PtState $body:block) => {
        $(#[$meta])*
        $vis fn $name($task: &mut Task<$data>, $event: Event) -> PtState {
            $body
        }
    };
}

/// Mirrors `PROCESS_WAIT_EVENT_UNTIL`: re-checks `cond` on every call while
/// this arm is current. Suspends (recording `$next` as where to resume)
/// while `cond` is false; once `cond` holds, falls through to whatever
/// code follows in the same arm, in the same invocation — exactly like
/// the source's line-resumed `switch`, except the resume point is the
/// caller-supplied `$next` rather than `__LINE__`.
#[macro_export]
macro_rules! wait_event {
    ($task:expr, $next:expr, $cond:expr) => {
        if !($cond) {
            $task.resume_point = $next;
            return $crate::PtState::Waiting;
        }
    };
}

/// `wait_event!` specialized to "any event with this id", the common case
/// (mirrors `PROCESS_WAIT_EVENT` gated on a single event number rather
/// than an arbitrary predicate).
#[macro_export]
macro_rules! wait_event_id {
    ($task:expr, $next:expr, $event:expr, $id:expr) => {
        $crate::wait_event!($task, $next, $event.id == $id)
    };
}

/// Mirrors `PROCESS_YIELD`: suspends unconditionally, to be re-entered on
/// the *next* dispatch regardless of which event caused it.
#[macro_export]
macro_rules! yield_task {
    ($task:expr, $next:expr) => {{
        $task.resume_point = $next;
        return $crate::PtState::Waiting;
    }};
}

/// Mirrors `PROCESS_PT_SPAWN`: drives `child` with `child_fn` once per
/// invocation of the enclosing arm, re-suspending the parent at `$next`
/// (its own arm) until the child reports [`crate::PtState::Terminated`].
/// The child's resume point is caller-owned — reset it (e.g. via
/// [`crate::Task::mark_restarted`], or by constructing it fresh) before
/// control first reaches this macro, the same way the source's
/// `PT_SPAWN` expects `PT_INIT` to already have run on the child.
#[macro_export]
macro_rules! pt_spawn {
    ($task:expr, $next:expr, $child:expr, $child_fn:expr, $event:expr) => {
        if $child_fn($child, $event) != $crate::PtState::Terminated {
            $task.resume_point = $next;
            return $crate::PtState::Waiting;
        }
    };
}

/// Ends the task for good: mirrors `PROCESS_END`. Always resolves to
/// [`crate::PtState::Terminated`]; `resume_point` is set by
/// [`crate::Task::dispatch`] on the way out, not here.
#[macro_export]
macro_rules! exit_task {
    () => {
        return $crate::PtState::Terminated
    };
}

/// Mirrors `process_start`'s "already running" guard used the other way
/// around: re-arms the task at its initial resume point so the *next*
/// START re-enters the body from the top, without unlinking it from the
/// scheduler's running list in between.
#[macro_export]
macro_rules! restart_task {
    ($task:expr) => {{
        $task.mark_restarted();
        return $crate::PtState::Waiting;
    }};
}

/// Mirrors `PROCESS_SLEEP`/`etimer_set` + `PROCESS_WAIT_EVENT_UNTIL(etimer_expired(...))`:
/// arms a one-shot etimer through `$start` (an expression with side
/// effects — typically `etimers.start(handle, span, now, tag)`) the first
/// time this arm runs, then waits for the `PROCESS_EVENT_TIMER` /
/// `event_id::CONTINUE` delivery [`multitimer::etimer`] posts on expiry.
/// `$start` only runs once per sleep — on re-entries while still waiting
/// (`task.resume_point` already `$next`), it is skipped so an unrelated
/// event arriving mid-sleep can't restart the timer out from under it.
#[macro_export]
macro_rules! sleep {
    ($task:expr, $next:expr, $event:expr, start = $start:expr) => {{
        if $task.resume_point != $next {
            $start;
        }
        $crate::wait_event_id!($task, $next, $event, $crate::event_id::CONTINUE)
    }};
}
