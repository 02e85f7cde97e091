//! Scheduler / event dispatch core. Mirrors `process.c`: a running-tasks
//! list, a bounded event queue, a current-task pointer, and a global poll
//! flag, all bundled behind one handle so tests can instantiate an
//! isolated kernel per scenario (the distilled spec's own design notes ask
//! for exactly this).

use crate::list::{DList, NodeId, SList, NIL};
use crate::queue::EventQueue;
use crate::task::{PtState, Task};
use abi::{event_id, ErrFlags, Event, TaskId};
use ringbuf::stringbuf::Write as _;
use unwrap_lite::UnwrapLite;

ringbuf::stringbuf!(SCHED_STRINGBUF, 64, 0);

/// Selects the running-tasks list backend. Default doubly-linked (O(1)
/// removal on task exit); `task-list-slist` trades removal cost for a
/// smaller per-slot footprint, exactly the tradeoff the source documents
/// between `slist.h`/`dlist.h`.
#[cfg(not(feature = "task-list-slist"))]
type TaskList<D, const N: usize> = DList<Task<D>, N>;
#[cfg(feature = "task-list-slist")]
type TaskList<D, const N: usize> = SList<Task<D>, N>;

/// A self-contained kernel instance. `D` is the per-task private data type
/// shared by every task in this scheduler; `TASKS` bounds how many tasks
/// may be simultaneously running; `QUEUE` bounds the event queue depth.
pub struct Scheduler<D, const TASKS: usize, const QUEUE: usize> {
    running: TaskList<D, TASKS>,
    queue: EventQueue<QUEUE>,
    current: TaskId,
    global_pollreq: bool,
    pub errflags: ErrFlags,
    #[cfg(feature = "stats")]
    pub max_queue_count: usize,
}

impl<D, const TASKS: usize, const QUEUE: usize> Scheduler<D, TASKS, QUEUE> {
    pub fn new() -> Self {
        Scheduler {
            running: TaskList::new(),
            queue: EventQueue::new(),
            current: TaskId::NONE,
            global_pollreq: false,
            errflags: ErrFlags::empty(),
            #[cfg(feature = "stats")]
            max_queue_count: 0,
        }
    }

    pub fn current(&self) -> TaskId {
        self.current
    }

    fn node_of(id: TaskId) -> NodeId {
        id.0
    }

    fn id_of(n: NodeId) -> TaskId {
        TaskId(n)
    }

    pub fn is_running(&self, id: TaskId) -> bool {
        self.task(id).map_or(false, |t| t.is_running())
    }

    pub fn task(&self, id: TaskId) -> Option<&Task<D>> {
        self.running.try_get(Self::node_of(id))
    }

    pub fn task_mut(&mut self, id: TaskId) -> Option<&mut Task<D>> {
        self.running.try_get_mut(Self::node_of(id))
    }

    /// Mirrors `process_start`: guards against double-start, pushes the
    /// task to the front of the running list, and synchronously delivers
    /// START — with the *caller's current task* as `from` (an explicit,
    /// tested behavior; see SPEC_FULL.md open question 6).
    pub fn start(&mut self, task: Task<D>) -> Option<TaskId> {
        let already_running = task.is_running();
        let node = self.running.push_front(task)?;
        let id = Self::id_of(node);
        if !already_running {
            self.task_mut(id).unwrap_lite().resume_point = crate::task::RESUME_INITIAL;
            self.deliver(Event::new(event_id::START, 0, self.current, id));
        }
        Some(id)
    }

    /// Mirrors `process_exit`: synchronously deliver EXIT, which a task's
    /// `begin()` observes unconditionally (see [`Task::dispatch`]).
    pub fn exit(&mut self, id: TaskId) {
        if self.task(id).is_some() {
            self.deliver(Event::new(event_id::EXIT, 0, self.current, id));
        }
    }

    /// Mirrors `process_post`: enqueue for later delivery. Returns `false`
    /// (and latches `ErrFlags::EVENTQUEUE_OVERFLOW`) if the queue is full.
    pub fn post(&mut self, to: TaskId, id: u8, data: abi::EventData) -> bool {
        let event = Event::new(id, data, self.current, to);
        let ok = self.queue.push(event);
        if !ok {
            self.errflags.insert(ErrFlags::EVENTQUEUE_OVERFLOW);
            ringbuf::stringbuf_entry!(
                SCHED_STRINGBUF,
                format_args!("queue full: dropped event {} to {:?}", id, to)
            );
        }
        #[cfg(feature = "stats")]
        {
            if self.queue.count() > self.max_queue_count {
                self.max_queue_count = self.queue.count();
            }
        }
        ok
    }

    /// Mirrors `process_post_sync`: deliver immediately, bypassing the
    /// queue entirely.
    pub fn post_sync(&mut self, to: TaskId, id: u8, data: abi::EventData) {
        self.deliver(Event::new(id, data, self.current, to));
    }

    /// Mirrors `process_poll`: ISR-safe (no suspension, no allocation).
    pub fn poll(&mut self, id: TaskId) {
        if let Some(task) = self.task_mut(id) {
            task.poll_requested = true;
            self.global_pollreq = true;
        }
    }

    /// Runs `f` with `id` as the current task, then restores whatever was
    /// current before. Lets layers built on top of this crate (the ptimer
    /// sweep, in particular) call `post`/`post_sync` with the right `from`
    /// without this module exposing `current` as writable directly.
    pub fn run_as<R>(&mut self, id: TaskId, f: impl FnOnce(&mut Self) -> R) -> R {
        let previous = self.current;
        self.current = id;
        let result = f(self);
        self.current = previous;
        result
    }

    /// Delivers `event` right now: swaps the current-task pointer to the
    /// destination, runs its body, restores the previous current-task,
    /// and unlinks the task from the running list if it terminated.
    /// Mirrors `process_deliver_event`.
    fn deliver(&mut self, event: Event) {
        let to = event.to;
        if self.task(to).is_none() {
            return;
        }
        let previous = self.current;
        self.current = to;
        let node = Self::node_of(to);
        let state = self.running.get_mut(node).dispatch(event);
        self.current = previous;
        if state == PtState::Terminated {
            self.running.erase(node);
        }
    }

    /// One iteration of the main loop. Mirrors `process_run`:
    ///   a. drain all pending poll requests (polling can cascade, so this
    ///      loops until no task's poll flag remains set);
    ///   b. run the ptimer service routine (supplied by the caller, since
    ///      ptimer lives in a crate layered on top of this one — see
    ///      `multitimer::ptimer::service`);
    ///   c. deliver exactly one queued event, if any;
    ///   d. return outstanding-work count (`queue.count() + global_pollreq`).
    pub fn run<F: FnMut(&mut Self)>(&mut self, mut ptimer_service: F) -> usize {
        while self.global_pollreq {
            self.global_pollreq = false;
            let mut pending = [NIL; TASKS];
            let mut n = 0;
            let mut cur = self.running.begin();
            while cur != NIL {
                if self.running.get(cur).poll_requested {
                    pending[n] = cur;
                    n += 1;
                }
                cur = self.running.next(cur);
            }
            for &slot in &pending[..n] {
                // Re-check: the task may have been unlinked by an earlier
                // poll delivery in this same drain.
                if self.running.get(slot).poll_requested {
                    self.running.get_mut(slot).poll_requested = false;
                    self.deliver(Event::new(event_id::POLL, 0, self.current, Self::id_of(slot)));
                }
            }
        }

        ptimer_service(self);

        if let Some(event) = self.queue.pop() {
            self.deliver(event);
        }

        self.queue.count() + self.global_pollreq as usize
    }
}

impl<D, const TASKS: usize, const QUEUE: usize> Default for Scheduler<D, TASKS, QUEUE> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use abi::event_id;

    #[derive(Default)]
    struct Counter {
        started: u32,
        continues: u32,
        exited: bool,
    }

    fn counter_thread(task: &mut Task<Counter>, event: Event) -> PtState {
        match event.id {
            id if id == event_id::START => {
                task.data.started += 1;
                task.resume_point = 1;
                PtState::Waiting
            }
            id if id == event_id::CONTINUE => {
                task.data.continues += 1;
                PtState::Waiting
            }
            _ => PtState::Waiting,
        }
    }

    #[test]
    fn start_delivers_synchronously_and_links_task() {
        let mut sched: Scheduler<Counter, 4, 4> = Scheduler::new();
        let id = sched.start(Task::new(counter_thread)).unwrap();
        assert_eq!(sched.task(id).unwrap().data.started, 1);
        assert!(sched.task(id).unwrap().is_running());
    }

    #[test]
    fn post_then_run_delivers_one_event_per_iteration() {
        let mut sched: Scheduler<Counter, 4, 4> = Scheduler::new();
        let id = sched.start(Task::new(counter_thread)).unwrap();
        sched.post(id, event_id::CONTINUE, 0);
        sched.post(id, event_id::CONTINUE, 0);
        assert_eq!(sched.task(id).unwrap().data.continues, 0);
        sched.run(|_| {});
        assert_eq!(sched.task(id).unwrap().data.continues, 1);
        sched.run(|_| {});
        assert_eq!(sched.task(id).unwrap().data.continues, 2);
    }

    #[test]
    fn queue_overflow_latches_errflag_and_drops_event() {
        let mut sched: Scheduler<Counter, 4, 1> = Scheduler::new();
        let id = sched.start(Task::new(counter_thread)).unwrap();
        assert!(sched.post(id, event_id::CONTINUE, 0));
        assert!(!sched.post(id, event_id::CONTINUE, 0));
        assert!(sched.errflags.contains(ErrFlags::EVENTQUEUE_OVERFLOW));
    }

    fn exiting_thread(task: &mut Task<Counter>, event: Event) -> PtState {
        if event.id == event_id::START {
            task.resume_point = 1;
            return PtState::Waiting;
        }
        PtState::Waiting
    }

    #[test]
    fn exit_terminates_and_unlinks_task() {
        let mut sched: Scheduler<Counter, 4, 4> = Scheduler::new();
        let id = sched.start(Task::new(exiting_thread)).unwrap();
        assert!(sched.task(id).unwrap().is_running());
        sched.exit(id);
        // Task is unlinked; looking it up by the stale id now aliases
        // whatever (if anything) occupies that arena slot afterward. The
        // documented contract is only that `is_running` no longer holds
        // before unlinking re-use; check via a fresh task occupying it.
        let id2 = sched.start(Task::new(exiting_thread)).unwrap();
        assert_eq!(id2, id);
    }
}
