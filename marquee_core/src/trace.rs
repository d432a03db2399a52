// Copyright 2026 the Marquee Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for timed primitives.
//!
//! This module provides a [`TraceSink`] trait with one method per event that
//! the primitives emit while they advance. All method bodies default to no-ops,
//! so implementing only the events you care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing. When **on**, each
//! method performs a single `Option` branch before dispatching.
//!
//! Each primitive exposes a `*_traced` entry point taking a `&mut Tracer`; the
//! plain entry point forwards with [`Tracer::none`].

use crate::intro::IntroPhase;
use crate::time::HostTime;
use crate::typewriter::Phase;
use crate::visibility::RegionHandle;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Which kind of primitive produced an event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// A [`VisibilityDetector`](crate::visibility::VisibilityDetector).
    Detector,
    /// A [`RevealScheduler`](crate::reveal::RevealScheduler).
    Reveal,
    /// A [`TypewriterEngine`](crate::typewriter::TypewriterEngine).
    Typewriter,
    /// An [`IntroSequencer`](crate::intro::IntroSequencer).
    Intro,
    /// A [`LoadingGate`](crate::intro::LoadingGate).
    LoadingGate,
}

/// Phase names shared by the typewriter and the intro sequencer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PhaseKind {
    /// Characters are being added.
    Typing,
    /// The full text is held on screen.
    Holding,
    /// Characters are being removed.
    Deleting,
    /// Final wait before the intro completes.
    Closing,
    /// The intro has completed.
    Completed,
}

impl From<Phase> for PhaseKind {
    fn from(phase: Phase) -> Self {
        match phase {
            Phase::Typing => Self::Typing,
            Phase::Holding => Self::Holding,
            Phase::Deleting => Self::Deleting,
        }
    }
}

impl From<IntroPhase> for PhaseKind {
    fn from(phase: IntroPhase) -> Self {
        match phase {
            IntroPhase::Typing => Self::Typing,
            IntroPhase::Holding => Self::Holding,
            IntroPhase::Closing => Self::Closing,
            IntroPhase::Completed => Self::Completed,
        }
    }
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted when a detector's one-shot signal fires.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TriggerEvent {
    /// The observed region.
    pub region: RegionHandle,
    /// Host time of the intersection report.
    pub at: HostTime,
    /// Visible fraction of the region that satisfied the threshold.
    pub ratio: f64,
}

/// Emitted when one reveal flag flips to `true`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RevealEvent {
    /// Deadline the reveal callback was scheduled for.
    pub at: HostTime,
    /// Index of the revealed item.
    pub index: usize,
    /// Revealed items after this one, this one included.
    pub revealed: usize,
    /// Size of the reveal set.
    pub total: usize,
}

/// Emitted for each character typed or deleted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StepEvent {
    /// Who stepped.
    pub source: SourceKind,
    /// Deadline of the step.
    pub at: HostTime,
    /// Active string (always 0 for the intro).
    pub string_index: usize,
    /// Visible prefix length after the step, in characters.
    pub prefix_len: usize,
}

/// Emitted when a text engine changes phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PhaseChangeEvent {
    /// Who changed phase.
    pub source: SourceKind,
    /// Instant of the change.
    pub at: HostTime,
    /// Active string after the change.
    pub string_index: usize,
    /// Phase before.
    pub from: PhaseKind,
    /// Phase after.
    pub to: PhaseKind,
}

/// Emitted when a cursor blink toggles.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CursorEvent {
    /// Who owns the cursor.
    pub source: SourceKind,
    /// Deadline of the toggle.
    pub at: HostTime,
    /// Cursor visibility after the toggle.
    pub visible: bool,
}

/// Emitted when a one-shot completion signal fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CompleteEvent {
    /// Who completed.
    pub source: SourceKind,
    /// Instant of completion.
    pub at: HostTime,
}

/// Emitted when an instance is torn down.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TeardownEvent {
    /// Who was torn down.
    pub source: SourceKind,
    /// Pending callbacks that were canceled.
    pub canceled_timers: usize,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from timed primitives.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called when a detector triggers.
    fn on_trigger(&mut self, e: &TriggerEvent) {
        _ = e;
    }

    /// Called when an item is revealed.
    fn on_reveal(&mut self, e: &RevealEvent) {
        _ = e;
    }

    /// Called for every typed or deleted character.
    fn on_step(&mut self, e: &StepEvent) {
        _ = e;
    }

    /// Called when a text engine changes phase.
    fn on_phase_change(&mut self, e: &PhaseChangeEvent) {
        _ = e;
    }

    /// Called when a cursor toggles.
    fn on_cursor(&mut self, e: &CursorEvent) {
        _ = e;
    }

    /// Called when a completion signal fires.
    fn on_complete(&mut self, e: &CompleteEvent) {
        _ = e;
    }

    /// Called when an instance is torn down.
    fn on_teardown(&mut self, e: &TeardownEvent) {
        _ = e;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

macro_rules! dispatch {
    ($(#[$doc:meta] $name:ident => $method:ident($ty:ty);)*) => {
        $(
            #[$doc]
            #[inline]
            pub fn $name(&mut self, e: &$ty) {
                #[cfg(feature = "trace")]
                if let Some(s) = &mut self.sink {
                    s.$method(e);
                }
                #[cfg(not(feature = "trace"))]
                {
                    _ = e;
                }
            }
        )*
    };
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    dispatch! {
        /// Emits a [`TriggerEvent`].
        trigger => on_trigger(TriggerEvent);
        /// Emits a [`RevealEvent`].
        reveal => on_reveal(RevealEvent);
        /// Emits a [`StepEvent`].
        step => on_step(StepEvent);
        /// Emits a [`PhaseChangeEvent`].
        phase_change => on_phase_change(PhaseChangeEvent);
        /// Emits a [`CursorEvent`].
        cursor => on_cursor(CursorEvent);
        /// Emits a [`CompleteEvent`].
        complete => on_complete(CompleteEvent);
        /// Emits a [`TeardownEvent`].
        teardown => on_teardown(TeardownEvent);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
