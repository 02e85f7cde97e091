//! Process-timer bookkeeping shared by `etimer`/`ctimer`: a "running"
//! sublist of currently armed timers, swept whenever the earliest one's
//! deadline has passed. Mirrors `ptimer.c`: `ptimer_add_to_list`,
//! `ptimer_remove_from_list`, `ptimer_next_stop_update` and the
//! `ptimer_process` sweep loop, folded into [`PtimerSet::service`] and
//! driven as a closure from `kern::sched::Scheduler::run`, the same way
//! the source's own scheduler calls `ptimer_processing()` once per
//! iteration (see `DESIGN.md` for why this crate keeps that a closure
//! rather than a second registered task).
//!
//! The source embeds the list node as the first member of `ptimer_t` and
//! links timers with raw pointers. That has no sound translation once
//! values can move, so here a timer's "node" is just its own fixed slot
//! index: membership is a `running` flag plus `prev`/`next` arrays keyed
//! by that same index, rather than a separate arena the way
//! [`kern::list`] works for ephemeral values. A stopped timer keeps its
//! slot, its `Timer`, and its payload; only its list linkage is undone,
//! so `expired()` stays meaningful whether or not the timer is running,
//! matching the source's `ptimer_expired` macro.

use abi::{Timespan, Timestamp};
use kern::timer::Timer;
use kern::timestamp;

pub type PtimerId = u16;
pub const NIL: PtimerId = u16::MAX;

struct Slot<P> {
    timer: Timer,
    allocated: bool,
    running: bool,
    payload: Option<P>,
    next: PtimerId,
    #[cfg(not(feature = "ptimer-list-slist"))]
    prev: PtimerId,
}

/// A fixed-capacity set of `N` process timers sharing one payload type
/// `P`, copied out to the caller's `on_fire` closure on expiration.
pub struct PtimerSet<P, const N: usize> {
    slots: [Slot<P>; N],
    head: PtimerId,
    /// Tracks the running list's tail so a newly (re-)armed timer can be
    /// linked in insertion order. The source's `ptimer_add_to_list` calls
    /// `list_add`, which appends — list order is insertion order, and
    /// `ptimer_process`'s single sweep therefore fires co-expired timers
    /// oldest-first (see the distilled spec's tie-break rule and scenario
    /// S3). A plain push-front/head-first walk would fire the opposite
    /// (most-recently-armed-first), so this set appends at `tail` instead.
    tail: PtimerId,
    pending: bool,
    next_stop: Timestamp,
    #[cfg(feature = "stats")]
    pub max_running: usize,
}

impl<P: Copy, const N: usize> PtimerSet<P, N> {
    pub fn new() -> Self {
        PtimerSet {
            slots: core::array::from_fn(|_| Slot {
                timer: Timer::default(),
                allocated: false,
                running: false,
                payload: None,
                next: NIL,
                #[cfg(not(feature = "ptimer-list-slist"))]
                prev: NIL,
            }),
            head: NIL,
            tail: NIL,
            pending: false,
            next_stop: 0,
            #[cfg(feature = "stats")]
            max_running: 0,
        }
    }

    /// Claims a permanent slot for a new etimer/ctimer. There is no
    /// matching `free`: a ptimer's id is meant to be held and reused for
    /// as long as the `PtimerSet` itself exists, unlike a `Task`'s id,
    /// which is reclaimed on exit.
    pub fn alloc(&mut self) -> Option<PtimerId> {
        let idx = self.slots.iter().position(|s| !s.allocated)?;
        self.slots[idx].allocated = true;
        Some(idx as PtimerId)
    }

    pub fn is_running(&self, id: PtimerId) -> bool {
        self.slots[id as usize].running
    }

    /// Independent of list membership, matching `ptimer_expired`.
    pub fn expired(&self, id: PtimerId, now: Timestamp) -> bool {
        self.slots[id as usize].timer.expired(now)
    }

    /// Mirrors `ptimer_start`.
    pub fn start(&mut self, id: PtimerId, span: Timespan, now: Timestamp, payload: P) {
        self.slots[id as usize].payload = Some(payload);
        self.slots[id as usize].timer = Timer::start(span, now);
        self.add_to_list(id);
    }

    /// Mirrors `ptimer_restart`.
    pub fn restart(&mut self, id: PtimerId, now: Timestamp) {
        self.slots[id as usize].timer.restart(now);
        self.add_to_list(id);
    }

    /// Mirrors `ptimer_reset`.
    pub fn reset(&mut self, id: PtimerId) {
        self.slots[id as usize].timer.reset();
        self.add_to_list(id);
    }

    /// Mirrors `ptimer_stop` (the source's thin wrapper over
    /// `ptimer_remove_from_list`).
    pub fn stop(&mut self, id: PtimerId) {
        self.remove_from_list(id);
    }

    fn add_to_list(&mut self, id: PtimerId) {
        if !self.slots[id as usize].running {
            self.push_back(id);
            self.slots[id as usize].running = true;
            #[cfg(feature = "stats")]
            {
                let running = self.slots.iter().filter(|s| s.running).count();
                if running > self.max_running {
                    self.max_running = running;
                }
            }
        }
        self.next_stop_update(id);
    }

    fn remove_from_list(&mut self, id: PtimerId) {
        if self.slots[id as usize].running {
            self.slots[id as usize].running = false;
            self.unlink(id);
        }
    }

    fn next_stop_update(&mut self, id: PtimerId) {
        let stop = self.slots[id as usize].timer.stop_at();
        if self.pending {
            if timestamp::less_than(stop, self.next_stop) {
                self.next_stop = stop;
            }
        } else {
            self.next_stop = stop;
            self.pending = true;
        }
    }

    /// O(n): walks to the current tail, matching `slist_push_back`
    /// (the singly-linked flavor has no back pointer to splice onto).
    #[cfg(feature = "ptimer-list-slist")]
    fn push_back(&mut self, id: PtimerId) {
        self.slots[id as usize].next = NIL;
        if self.tail == NIL {
            self.head = id;
        } else {
            self.slots[self.tail as usize].next = id;
        }
        self.tail = id;
    }

    #[cfg(not(feature = "ptimer-list-slist"))]
    fn push_back(&mut self, id: PtimerId) {
        self.slots[id as usize].next = NIL;
        self.slots[id as usize].prev = self.tail;
        if self.tail != NIL {
            self.slots[self.tail as usize].next = id;
        } else {
            self.head = id;
        }
        self.tail = id;
    }

    /// O(n): walks to find the predecessor, matching `slist_erase`.
    #[cfg(feature = "ptimer-list-slist")]
    fn unlink(&mut self, id: PtimerId) {
        if self.head == id {
            self.head = self.slots[id as usize].next;
            if self.tail == id {
                self.tail = NIL;
            }
            self.slots[id as usize].next = NIL;
            return;
        }
        let mut prev = self.head;
        while prev != NIL && self.slots[prev as usize].next != id {
            prev = self.slots[prev as usize].next;
        }
        if prev != NIL {
            self.slots[prev as usize].next = self.slots[id as usize].next;
        }
        if self.tail == id {
            self.tail = prev;
        }
        self.slots[id as usize].next = NIL;
    }

    /// O(1): both neighbors are known directly, matching `dlist_erase`.
    #[cfg(not(feature = "ptimer-list-slist"))]
    fn unlink(&mut self, id: PtimerId) {
        let (prev, next) = (self.slots[id as usize].prev, self.slots[id as usize].next);
        if prev != NIL {
            self.slots[prev as usize].next = next;
        } else {
            self.head = next;
        }
        if next != NIL {
            self.slots[next as usize].prev = prev;
        } else {
            self.tail = prev;
        }
        self.slots[id as usize].next = NIL;
        self.slots[id as usize].prev = NIL;
    }

    /// Mirrors `ptimer_processing`: bails out unless a timer is both
    /// pending and its deadline has passed, then sweeps the whole running
    /// list once, firing every expired timer's payload through `on_fire`
    /// and unlinking it, and re-arming `next_stop` from whatever's left
    /// still running.
    pub fn service(&mut self, now: Timestamp, mut on_fire: impl FnMut(PtimerId, P)) {
        if !(self.pending && timestamp::passed(self.next_stop, now)) {
            return;
        }
        self.pending = false;

        let mut curr = self.head;
        while curr != NIL {
            let next = self.slots[curr as usize].next;
            if self.slots[curr as usize].timer.expired(now) {
                self.remove_from_list(curr);
                if let Some(payload) = self.slots[curr as usize].payload {
                    on_fire(curr, payload);
                }
            } else {
                self.next_stop_update(curr);
            }
            curr = next;
        }
    }
}

impl<P: Copy, const N: usize> Default for PtimerSet<P, N> {
    fn default() -> Self {
        Self::new()
    }
}
