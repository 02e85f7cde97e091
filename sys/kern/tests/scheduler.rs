//! End-to-end scheduler scenarios (S2, plus the poll-cascade and
//! FIFO-ordering properties from the testable-properties list). S1
//! (sleep) is exercised in `userlib`'s own test suite, through the actual
//! `sleep!` macro, since it depends on both the timer layer built on top
//! of this scheduler and the task-body macros built on top of that; S3
//! (ptimer ordering) lives in `multitimer::ptimer`'s unit tests; S4
//! (rtimer self-rearm) lives in `kern::rtimer`'s unit tests; S5/S6
//! (fxp16) live in the `fxp16` crate.

use abi::event_id;
use kern::{Event, PtState, Scheduler, Task, TaskId};

#[derive(Default)]
struct Recorder {
    seen: [u8; 8],
    count: usize,
}

fn recording_thread(task: &mut Task<Recorder>, event: Event) -> PtState {
    if task.data.count < task.data.seen.len() {
        task.data.seen[task.data.count] = event.id;
        task.data.count += 1;
    }
    task.resume_point = 1;
    PtState::Waiting
}

/// S2: fill the queue to capacity N before calling run(); the (N+1)-th
/// post fails and sets the overflow flag; after N runs, B has observed
/// all N events in insertion order, and the (N+1)-th event never arrives.
#[test]
fn s2_queue_overflow_drops_only_the_excess_event() {
    const N: usize = 3;
    let mut sched: Scheduler<Recorder, 4, N> = Scheduler::new();
    let b = sched.start(Task::new(recording_thread)).unwrap();

    for _ in 0..N {
        assert!(sched.post(b, event_id::FIRST_APP_EVENT, 0));
    }
    assert!(!sched.post(b, event_id::FIRST_APP_EVENT + 1, 0));
    assert!(sched.errflags.contains(abi::ErrFlags::EVENTQUEUE_OVERFLOW));

    for _ in 0..N {
        sched.run(|_| {});
    }

    // index 0 is the START delivery from `start()`.
    let seen = &sched.task(b).unwrap().data.seen;
    let count = sched.task(b).unwrap().data.count;
    assert_eq!(count, 1 + N);
    assert_eq!(seen[0], event_id::START);
    for i in 0..N {
        assert_eq!(seen[1 + i], event_id::FIRST_APP_EVENT);
    }
}

fn poll_thread(task: &mut Task<u32>, event: Event) -> PtState {
    if event.id == event_id::POLL {
        task.data += 1;
    }
    task.resume_point = 1;
    PtState::Waiting
}

#[test]
fn poll_drain_precedes_event_drain_within_one_run() {
    let mut sched: Scheduler<u32, 4, 4> = Scheduler::new();
    let a = sched.start(Task::new(poll_thread)).unwrap();
    sched.poll(a);
    sched.post(a, event_id::FIRST_APP_EVENT, 0);
    sched.run(|_| {});
    assert_eq!(sched.task(a).unwrap().data, 1);
}

#[test]
fn unknown_task_id_is_not_running() {
    let sched: Scheduler<Recorder, 4, 4> = Scheduler::new();
    assert!(!sched.is_running(TaskId(0)));
    assert!(!sched.is_running(TaskId::NONE));
}
