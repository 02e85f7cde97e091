//! Process-timer layer built on top of `kern`'s [`kern::timer::Timer`] and
//! [`kern::sched::Scheduler`]: a shared sweep-on-demand arena ([`ptimer`])
//! plus the two concrete timer flavors built on it, [`etimer`] (posts a
//! task event on expiration) and [`ctimer`] (invokes a callback directly).
//! Mirrors `ptimer.c`/`etimer.c`/`ctimer.h`.
//!
//! Unlike `kern::sched::Task`, whose arena slot is freed the moment a task
//! exits, a ptimer's identity is meant to survive many start/stop/restart
//! cycles across its whole lifetime (an `Etimer` embedded in a long-lived
//! board driver, say), and its expiration status must stay queryable even
//! while stopped. So [`ptimer::PtimerSet`] never frees a slot once
//! allocated; only membership in the running sweep list toggles.
#![cfg_attr(not(test), no_std)]

pub mod ctimer;
pub mod etimer;
pub mod ptimer;

pub use ctimer::CtimerSet;
pub use etimer::EtimerSet;
pub use ptimer::{PtimerId, PtimerSet};
