// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Post-mortem-debuggable tracing: a fixed-size ring of bytes, written
//! through `fmt::Write` so `stringbuf_entry!` call sites can use ordinary
//! `write!`-style formatting without an allocator.
#![cfg_attr(not(test), no_std)]

pub mod stringbuf;
mod static_cell;

pub use static_cell::StaticCell;
