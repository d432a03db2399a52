// Copyright 2026 the Marquee Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Deterministic timing primitives for scroll-triggered page animation.
//!
//! `marquee_core` holds the state machines behind a landing page's motion:
//! sections that reveal once they scroll into view, lists that reveal item by
//! item, a cycling typewriter headline, and a one-shot intro behind a loading
//! overlay. It is `no_std` compatible (with `alloc`) and never reads a clock:
//! the host passes `now` into every call, so the same inputs always produce
//! the same states.
//!
//! # Architecture
//!
//! ```text
//!   Host (scroll events, frames, timers)
//!       │
//!       ▼
//!   IntersectionEntry ──► VisibilityDetector::report() ──► has_entered
//!                                                              │
//!                 ┌────────────────────────────────────────────┘
//!                 ▼
//!   RevealScheduler::trigger() ──► TimerQueue ──► advance(now) ──► RevealSet
//!
//!   TypewriterEngine / IntroSequencer ──► TimerQueue ──► advance(now) ──► text + cursor
//!                                                                  │
//!                                               LoadingGate ◄──────┘ completion
//! ```
//!
//! **[`visibility`]**: One-shot viewport-entry detection with a threshold
//! ratio and a root margin.
//!
//! **[`reveal`]**: Sequential and staggered item reveals, plus the
//! [`Reveal`](reveal::Reveal) composite that wires a detector to a scheduler.
//!
//! **[`typewriter`]**: Endless type, hold and delete cycle over a string list.
//!
//! **[`intro`]**: Type-once intro with a completion signal and the
//! [`LoadingGate`](intro::LoadingGate) that waits on it.
//!
//! **[`scroll_cue`]**: Frame-throttled visibility for a scroll hint.
//!
//! **[`timer`]** and **[`host`]**: Owned timer queues and the [`Timed`](host::Timed)
//! contract hosts drive.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types, with
//! a zero-overhead [`Tracer`](trace::Tracer) wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

mod cursor;

pub mod error;
pub mod host;
pub mod intro;
pub mod oneshot;
pub mod reveal;
pub mod scroll_cue;
pub mod time;
pub mod timer;
pub mod trace;
pub mod typewriter;
pub mod visibility;

pub use cursor::DEFAULT_BLINK;
