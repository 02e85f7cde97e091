//! Event timers: ptimers whose expiration posts a task event instead of
//! invoking an arbitrary callback. Mirrors `etimer.c`/`etimer.h`:
//! `etimer_start` captures the destination task, event id and payload up
//! front, and `etimer_timeout_handler` delivers them when the underlying
//! ptimer fires.

use crate::ptimer::{PtimerId, PtimerSet};
use abi::{EventData, TaskId, Timespan, Timestamp};
use kern::sched::Scheduler;

/// Whether an expired etimer's event reaches its destination task
/// synchronously from inside [`EtimerSet::service`], or is only enqueued
/// for the scheduler's own run loop to deliver on a later iteration. The
/// source defaults to deferred delivery (`CONFIG_MYOS_ETIMER_DEFER_EVENTS`
/// is *not* set by default); the `etimer-synchronous` feature switches to
/// the immediate `process_deliver_event` path instead.
#[derive(Clone, Copy)]
struct Payload {
    from: TaskId,
    to: TaskId,
    event: u8,
    data: EventData,
}

/// A fixed-capacity set of `N` event timers.
pub struct EtimerSet<const N: usize> {
    ptimers: PtimerSet<Payload, N>,
}

impl<const N: usize> EtimerSet<N> {
    pub fn new() -> Self {
        EtimerSet { ptimers: PtimerSet::new() }
    }

    /// Claims a permanent slot for a new etimer.
    pub fn alloc(&mut self) -> Option<PtimerId> {
        self.ptimers.alloc()
    }

    /// Mirrors `etimer_start`. `from` is whatever task is current at the
    /// call site (`PROCESS_THIS()` in the source); the caller is expected
    /// to pass `Scheduler::current()`.
    pub fn start(
        &mut self,
        id: PtimerId,
        span: Timespan,
        now: Timestamp,
        from: TaskId,
        to: TaskId,
        event: u8,
        data: EventData,
    ) {
        self.ptimers.start(id, span, now, Payload { from, to, event, data });
    }

    /// Mirrors `etimer_restart`.
    pub fn restart(&mut self, id: PtimerId, now: Timestamp) {
        self.ptimers.restart(id, now);
    }

    /// Mirrors `etimer_reset`.
    pub fn reset(&mut self, id: PtimerId) {
        self.ptimers.reset(id);
    }

    /// Mirrors `etimer_stop`.
    pub fn stop(&mut self, id: PtimerId) {
        self.ptimers.stop(id);
    }

    /// Mirrors `etimer_expired`.
    pub fn expired(&self, id: PtimerId, now: Timestamp) -> bool {
        self.ptimers.expired(id, now)
    }

    /// Sweeps expired etimers, delivering each one's event through
    /// `sched` with the original caller restored as the current task for
    /// the duration of delivery (so the delivered `Event::from` matches
    /// what `start` captured, not whatever happens to be current when
    /// `service` itself runs).
    pub fn service<D, const TASKS: usize, const QUEUE: usize>(
        &mut self,
        now: Timestamp,
        sched: &mut Scheduler<D, TASKS, QUEUE>,
    ) {
        self.ptimers.service(now, |_id, payload| {
            sched.run_as(payload.from, |s| {
                #[cfg(feature = "etimer-synchronous")]
                {
                    s.post_sync(payload.to, payload.event, payload.data);
                }
                #[cfg(not(feature = "etimer-synchronous"))]
                {
                    s.post(payload.to, payload.event, payload.data);
                }
            });
        });
    }
}

impl<const N: usize> Default for EtimerSet<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use abi::event_id;
    use kern::task::{PtState, Task};

    #[derive(Default)]
    struct Counter {
        continues: u32,
    }

    fn counter_thread(task: &mut Task<Counter>, event: abi::Event) -> PtState {
        if event.id == event_id::CONTINUE {
            task.data.continues += 1;
        }
        PtState::Waiting
    }

    #[test]
    fn expired_etimer_posts_continue_event_to_its_target_task() {
        let mut sched: Scheduler<Counter, 4, 4> = Scheduler::new();
        let target = sched.start(Task::new(counter_thread)).unwrap();

        let mut etimers: EtimerSet<4> = EtimerSet::new();
        let id = etimers.alloc().unwrap();
        etimers.start(id, 1000, 0, sched.current(), target, event_id::CONTINUE, 0);

        etimers.service(500, &mut sched);
        assert_eq!(sched.task(target).unwrap().data.continues, 0);

        etimers.service(1000, &mut sched);
        sched.run(|_| {});
        assert_eq!(sched.task(target).unwrap().data.continues, 1);
        assert!(!etimers.ptimers.is_running(id));
    }
}
