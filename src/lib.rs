/*!
Translation between the raw MIDI wire event stream (stateful: a
data-entry controller's meaning depends on the most recent RPN/NRPN
selection, a program change's meaning depends on the most recent bank
select) and a canonical, context-free event representation where every
event carries its full semantic payload standalone -- plus the
delta-encoded track, cursor, and frame-aware editing operations built on
top of it.

Three pieces compose to do this:

- [`conv`] folds wire events into canonical ones (`pack`) and expands
  canonical events back to wire form (`unpack`), each against a
  [`state::StateList`] that remembers bank/RPN/NRPN context.
- [`track`] and [`seqptr`] give an intrusive, delta-encoded event list and
  a cursor over it with primitive read/insert/skip/delete operations.
- [`frame`] builds cut/blank/insert/copy/quantize/transpose on top of the
  cursor, preserving the invariant that note lifetimes, controller-value
  runs, and pitch-bend arcs stay well-formed across an edit.

An [`env::Environment`] bundles the controller registry and per-device
fine-controller configuration that the converter and frame operations
consult; construct one per independent conversion context (tests
typically want a fresh one each).
!*/

// The clamped newtypes in `numbers` are the validated-argument layer the
// (out-of-scope) command interpreter consumes; the core itself stays in
// raw u8/u16 terms internally, so several of them have no caller yet.
#![allow(dead_code)]

#[macro_use]
mod macros;
#[macro_use]
mod clamp;
#[macro_use]
mod error;

pub mod conv;
pub mod env;
pub mod event;
pub mod evspec;
pub mod frame;
pub mod numbers;
pub mod registry;
pub mod seqptr;
pub mod state;
pub mod timemap;
pub mod track;

pub use error::{Error, Result};

/// Re-exports of the types most consumers need, so `use
/// midi_normalize::prelude::*;` covers the common case without reaching
/// into each submodule.
pub mod prelude {
    pub use crate::conv::{pack, unpack};
    pub use crate::env::Environment;
    pub use crate::event::{Ev, EvKind};
    pub use crate::evspec::{EvSpec, SpecKind};
    pub use crate::frame::{blank, copy, cut, frame_get, frame_put, insert, quantize, transpose};
    pub use crate::registry::ControllerRegistry;
    pub use crate::seqptr::SeqPtr;
    pub use crate::state::StateList;
    pub use crate::timemap::TimeMap;
    pub use crate::track::Track;
    pub use crate::{Error, Result};
}
