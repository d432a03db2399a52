// Copyright 2026 the Marquee Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! One-shot intro animation and the loading overlay that waits for it.
//!
//! [`IntroSequencer`] types a single text once, holds it, waits for a closing
//! delay and then fires its completion signal exactly once. Its cursor keeps
//! blinking until teardown, completion included.
//!
//! ```text
//!   Typing ──(all chars)──► Holding ──(post_type_hold)──► Closing ──(pre_complete_delay)──► Completed
//! ```
//!
//! [`LoadingGate`] owns an intro and dismisses the overlay at whichever comes
//! first: the intro's completion or a maximum duration. Dismissal tears the
//! intro down.

use alloc::string::String;

use crate::cursor::{CursorBlink, DEFAULT_BLINK};
use crate::error::ConfigError;
use crate::host::Timed;
use crate::oneshot::OneShot;
use crate::time::{Duration, HostTime};
use crate::timer::{Lifecycle, TimerHandle, TimerQueue};
use crate::trace::{
    CompleteEvent, CursorEvent, PhaseChangeEvent, SourceKind, StepEvent, TeardownEvent, Tracer,
};

/// Default delay per typed character.
pub const DEFAULT_INTRO_TYPE_DELAY: Duration = Duration::from_millis(120);
/// Default hold after the last character.
pub const DEFAULT_POST_TYPE_HOLD: Duration = Duration::from_millis(800);
/// Default wait between the hold and completion.
pub const DEFAULT_PRE_COMPLETE_DELAY: Duration = Duration::from_millis(1200);
/// Default cap on how long the loading overlay stays up.
pub const DEFAULT_MAX_LOADING: Duration = Duration::from_millis(3000);

/// Intro phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IntroPhase {
    /// Adding characters.
    Typing,
    /// Full text shown, waiting `post_type_hold`.
    Holding,
    /// Waiting `pre_complete_delay`.
    Closing,
    /// Completion has fired.
    Completed,
}

/// Text and cadence for an [`IntroSequencer`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct IntroConfig {
    /// The text typed once.
    pub text: String,
    /// Delay per typed character.
    pub type_delay: Duration,
    /// Hold after the last character.
    pub post_type_hold: Duration,
    /// Wait between the hold and completion.
    pub pre_complete_delay: Duration,
    /// Cursor blink interval. Must be non-zero.
    pub cursor_blink: Duration,
}

impl IntroConfig {
    /// Default cadence for `text`.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            type_delay: DEFAULT_INTRO_TYPE_DELAY,
            post_type_hold: DEFAULT_POST_TYPE_HOLD,
            pre_complete_delay: DEFAULT_PRE_COMPLETE_DELAY,
            cursor_blink: DEFAULT_BLINK,
        }
    }

    /// Overrides the typing delay.
    #[must_use]
    pub fn with_type_delay(mut self, delay: Duration) -> Self {
        self.type_delay = delay;
        self
    }

    /// Overrides the post-typing hold.
    #[must_use]
    pub fn with_post_type_hold(mut self, delay: Duration) -> Self {
        self.post_type_hold = delay;
        self
    }

    /// Overrides the closing delay.
    #[must_use]
    pub fn with_pre_complete_delay(mut self, delay: Duration) -> Self {
        self.pre_complete_delay = delay;
        self
    }

    /// Overrides the cursor blink interval.
    #[must_use]
    pub fn with_cursor_blink(mut self, interval: Duration) -> Self {
        self.cursor_blink = interval;
        self
    }
}

/// Snapshot of an intro's progress.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct IntroState {
    /// Number of visible characters.
    pub prefix_len: usize,
    /// Current phase.
    pub phase: IntroPhase,
}

/// What the rendering layer reads from an [`IntroSequencer`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IntroOutput<'a> {
    /// Visible prefix of the text.
    pub text: &'a str,
    /// Cursor visibility.
    pub cursor_visible: bool,
    /// Whether completion has fired.
    pub completed: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Slot {
    Step,
    Cursor,
}

/// Types a text once, then signals completion exactly once.
#[derive(Debug)]
pub struct IntroSequencer {
    config: IntroConfig,
    len: usize,
    state: IntroState,
    completion: OneShot,
    timers: TimerQueue<Slot>,
    cursor: CursorBlink,
    lifecycle: Lifecycle,
}

impl IntroSequencer {
    /// Mounts a sequencer at `now`.
    ///
    /// An empty text skips straight to [`IntroPhase::Holding`].
    pub fn new(config: IntroConfig, now: HostTime) -> Result<Self, ConfigError> {
        if config.cursor_blink.is_zero() {
            return Err(ConfigError::ZeroInterval {
                field: "cursor_blink",
            });
        }
        let len = config.text.chars().count();
        let phase = if len == 0 {
            IntroPhase::Holding
        } else {
            IntroPhase::Typing
        };
        let mut intro = Self {
            len,
            state: IntroState {
                prefix_len: 0,
                phase,
            },
            completion: OneShot::new(),
            timers: TimerQueue::new(),
            cursor: CursorBlink::new(config.cursor_blink),
            lifecycle: Lifecycle::Mounted,
            config,
        };
        intro.arm_step(now);
        intro.cursor.start(&mut intro.timers, now, Slot::Cursor);
        Ok(intro)
    }

    fn arm_step(&mut self, from: HostTime) {
        let delay = match self.state.phase {
            IntroPhase::Typing => self.config.type_delay,
            IntroPhase::Holding => self.config.post_type_hold,
            IntroPhase::Closing => self.config.pre_complete_delay,
            IntroPhase::Completed => return,
        };
        self.timers.schedule(from + delay, Slot::Step);
    }

    /// Processes every step and blink due at or before `now`.
    ///
    /// Returns the completion instant if completion fired during this call.
    pub fn advance(&mut self, now: HostTime) -> Option<HostTime> {
        self.advance_traced(now, &mut Tracer::none())
    }

    /// Like [`advance`](Self::advance), with tracing.
    pub fn advance_traced(&mut self, now: HostTime, tracer: &mut Tracer<'_>) -> Option<HostTime> {
        let mut completed_at = None;
        while self.lifecycle.is_mounted() {
            let Some(expired) = self.timers.pop_expired(now) else {
                break;
            };
            match expired.key {
                Slot::Step => {
                    if let Some(at) = self.on_step(expired.deadline, tracer) {
                        completed_at = Some(at);
                    }
                }
                Slot::Cursor => {
                    let visible =
                        self.cursor
                            .on_expired(&mut self.timers, expired.deadline, Slot::Cursor);
                    tracer.cursor(&CursorEvent {
                        source: SourceKind::Intro,
                        at: expired.deadline,
                        visible,
                    });
                }
            }
        }
        completed_at
    }

    fn on_step(&mut self, at: HostTime, tracer: &mut Tracer<'_>) -> Option<HostTime> {
        let from = self.state.phase;
        let to = match from {
            IntroPhase::Typing => {
                self.state.prefix_len = (self.state.prefix_len + 1).min(self.len);
                tracer.step(&StepEvent {
                    source: SourceKind::Intro,
                    at,
                    string_index: 0,
                    prefix_len: self.state.prefix_len,
                });
                if self.state.prefix_len == self.len {
                    IntroPhase::Holding
                } else {
                    IntroPhase::Typing
                }
            }
            IntroPhase::Holding => IntroPhase::Closing,
            IntroPhase::Closing | IntroPhase::Completed => IntroPhase::Completed,
        };
        if to != from {
            self.state.phase = to;
            tracer.phase_change(&PhaseChangeEvent {
                source: SourceKind::Intro,
                at,
                string_index: 0,
                from: from.into(),
                to: to.into(),
            });
        }
        self.arm_step(at);
        if to == IntroPhase::Completed && self.completion.fire(at) {
            tracer.complete(&CompleteEvent {
                source: SourceKind::Intro,
                at,
            });
            return Some(at);
        }
        None
    }

    /// Cancels every timer. Completion can no longer fire.
    pub fn teardown(&mut self) {
        self.teardown_traced(&mut Tracer::none());
    }

    /// Like [`teardown`](Self::teardown), with tracing.
    pub fn teardown_traced(&mut self, tracer: &mut Tracer<'_>) {
        if !self.lifecycle.is_mounted() {
            return;
        }
        self.lifecycle = Lifecycle::TornDown;
        let canceled_timers = self.timers.clear();
        tracer.teardown(&TeardownEvent {
            source: SourceKind::Intro,
            canceled_timers,
        });
    }

    /// Visible prefix of the text.
    #[must_use]
    pub fn text(&self) -> &str {
        let text = self.config.text.as_str();
        match text.char_indices().nth(self.state.prefix_len) {
            Some((end, _)) => &text[..end],
            None => text,
        }
    }

    /// Returns `true` once every character is shown.
    #[must_use]
    pub const fn is_typed(&self) -> bool {
        self.state.prefix_len == self.len
    }

    /// Returns `true` once completion has fired.
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        self.completion.is_fired()
    }

    /// The instant completion fired, if it has.
    #[must_use]
    pub const fn completed_at(&self) -> Option<HostTime> {
        self.completion.fired_at()
    }

    /// Cursor visibility.
    #[must_use]
    pub const fn cursor_visible(&self) -> bool {
        self.cursor.is_visible()
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> IntroPhase {
        self.state.phase
    }

    /// Current progress.
    #[must_use]
    pub const fn state(&self) -> IntroState {
        self.state
    }

    /// Everything the rendering layer reads.
    #[must_use]
    pub fn output(&self) -> IntroOutput<'_> {
        IntroOutput {
            text: self.text(),
            cursor_visible: self.cursor_visible(),
            completed: self.is_completed(),
        }
    }

    /// Returns `true` until [`teardown`](Self::teardown).
    #[must_use]
    pub const fn is_mounted(&self) -> bool {
        self.lifecycle.is_mounted()
    }

    /// Earliest pending step or blink.
    #[must_use]
    pub fn next_deadline(&self) -> Option<HostTime> {
        if self.lifecycle.is_mounted() {
            self.timers.next_deadline()
        } else {
            None
        }
    }
}

impl Timed for IntroSequencer {
    fn next_deadline(&self) -> Option<HostTime> {
        Self::next_deadline(self)
    }

    fn advance(&mut self, now: HostTime) {
        _ = Self::advance(self, now);
    }
}

/// Limits for a [`LoadingGate`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LoadingGateConfig {
    /// Longest the overlay may stay up, measured from mount.
    pub max_duration: Duration,
}

impl LoadingGateConfig {
    /// The default three-second cap.
    pub const DEFAULT: Self = Self {
        max_duration: DEFAULT_MAX_LOADING,
    };
}

impl Default for LoadingGateConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// A loading overlay held up by an intro.
///
/// The overlay is dismissed at the earlier of the intro's completion and
/// `max_duration` after mount. On dismissal the intro is torn down and the
/// cap timer canceled. Tearing the gate down first means it never dismisses.
#[derive(Debug)]
pub struct LoadingGate {
    intro: IntroSequencer,
    cap: HostTime,
    timers: TimerQueue<()>,
    cap_timer: Option<TimerHandle>,
    dismissed: OneShot,
    lifecycle: Lifecycle,
}

impl LoadingGate {
    /// Mounts a gate and its intro at `now`.
    pub fn new(
        intro: IntroConfig,
        config: LoadingGateConfig,
        now: HostTime,
    ) -> Result<Self, ConfigError> {
        let intro = IntroSequencer::new(intro, now)?;
        let cap = now + config.max_duration;
        let mut timers = TimerQueue::new();
        let cap_timer = Some(timers.schedule(cap, ()));
        Ok(Self {
            intro,
            cap,
            timers,
            cap_timer,
            dismissed: OneShot::new(),
            lifecycle: Lifecycle::Mounted,
        })
    }

    /// Advances the intro and the cap timer to `now`.
    ///
    /// Returns the dismissal instant if dismissal happened during this call.
    pub fn advance(&mut self, now: HostTime) -> Option<HostTime> {
        self.advance_traced(now, &mut Tracer::none())
    }

    /// Like [`advance`](Self::advance), with tracing.
    pub fn advance_traced(&mut self, now: HostTime, tracer: &mut Tracer<'_>) -> Option<HostTime> {
        if self.dismissed.is_fired() || !self.lifecycle.is_mounted() {
            return None;
        }
        // The intro may not run past the cap.
        if let Some(at) = self.intro.advance_traced(now.min(self.cap), tracer) {
            return Some(self.dismiss(at, tracer));
        }
        let expired = self.timers.pop_expired(now)?;
        Some(self.dismiss(expired.deadline, tracer))
    }

    fn dismiss(&mut self, at: HostTime, tracer: &mut Tracer<'_>) -> HostTime {
        if let Some(handle) = self.cap_timer.take() {
            self.timers.cancel(handle);
        }
        self.intro.teardown_traced(tracer);
        if self.dismissed.fire(at) {
            tracer.complete(&CompleteEvent {
                source: SourceKind::LoadingGate,
                at,
            });
        }
        at
    }

    /// Cancels the cap and tears the intro down without dismissing.
    pub fn teardown(&mut self) {
        self.teardown_traced(&mut Tracer::none());
    }

    /// Like [`teardown`](Self::teardown), with tracing.
    pub fn teardown_traced(&mut self, tracer: &mut Tracer<'_>) {
        if !self.lifecycle.is_mounted() {
            return;
        }
        self.lifecycle = Lifecycle::TornDown;
        self.cap_timer = None;
        let canceled_timers = self.timers.clear();
        self.intro.teardown_traced(tracer);
        tracer.teardown(&TeardownEvent {
            source: SourceKind::LoadingGate,
            canceled_timers,
        });
    }

    /// Returns `true` until [`teardown`](Self::teardown).
    #[must_use]
    pub const fn is_mounted(&self) -> bool {
        self.lifecycle.is_mounted()
    }

    /// Returns `true` while the overlay is up.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        !self.dismissed.is_fired()
    }

    /// The instant the overlay was dismissed, if it was.
    #[must_use]
    pub const fn dismissed_at(&self) -> Option<HostTime> {
        self.dismissed.fired_at()
    }

    /// The intro shown on the overlay.
    #[must_use]
    pub const fn intro(&self) -> &IntroSequencer {
        &self.intro
    }

    /// Earliest pending deadline of the intro or the cap.
    #[must_use]
    pub fn next_deadline(&self) -> Option<HostTime> {
        if self.dismissed.is_fired() || !self.lifecycle.is_mounted() {
            return None;
        }
        match (self.intro.next_deadline(), self.timers.next_deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }
}

impl Timed for LoadingGate {
    fn next_deadline(&self) -> Option<HostTime> {
        Self::next_deadline(self)
    }

    fn advance(&mut self, now: HostTime) {
        _ = Self::advance(self, now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hi() -> IntroSequencer {
        IntroSequencer::new(IntroConfig::new("Hi"), HostTime(0)).unwrap()
    }

    #[test]
    fn types_holds_closes_then_completes() {
        let mut intro = hi();
        assert_eq!(intro.advance(HostTime(120)), None);
        assert_eq!(intro.text(), "H");
        intro.advance(HostTime(240));
        assert_eq!(intro.text(), "Hi");
        assert!(intro.is_typed());
        assert_eq!(intro.phase(), IntroPhase::Holding);

        intro.advance(HostTime(1040));
        assert_eq!(intro.phase(), IntroPhase::Closing);
        assert_eq!(intro.advance(HostTime(2239)), None);
        assert_eq!(intro.advance(HostTime(2240)), Some(HostTime(2240)));
        assert!(intro.is_completed());
    }

    #[test]
    fn completion_fires_exactly_once() {
        let mut intro = hi();
        assert_eq!(intro.advance(HostTime(10_000)), Some(HostTime(2240)));
        assert_eq!(intro.advance(HostTime(20_000)), None);
        assert_eq!(intro.completed_at(), Some(HostTime(2240)));
        assert_eq!(intro.phase(), IntroPhase::Completed);
    }

    #[test]
    fn cursor_keeps_blinking_after_completion() {
        let mut intro = hi();
        intro.advance(HostTime(2240));
        let before = intro.cursor_visible();
        intro.advance(HostTime(2500));
        assert_ne!(intro.cursor_visible(), before, "blink at 2500");
        assert_eq!(intro.next_deadline(), Some(HostTime(3000)));
    }

    #[test]
    fn empty_text_starts_holding() {
        let mut intro = IntroSequencer::new(IntroConfig::new(""), HostTime(0)).unwrap();
        assert!(intro.is_typed());
        assert_eq!(intro.phase(), IntroPhase::Holding);
        assert_eq!(intro.advance(HostTime(2000)), Some(HostTime(2000)));
    }

    #[test]
    fn teardown_before_completion_suppresses_it() {
        let mut intro = hi();
        intro.advance(HostTime(1500));
        intro.teardown();
        assert_eq!(intro.advance(HostTime(10_000)), None);
        assert!(!intro.is_completed());
        assert_eq!(intro.next_deadline(), None);
    }

    #[test]
    fn one_step_timer_pending_per_phase() {
        let mut intro = hi();
        for t in [0, 120, 240, 1040] {
            intro.advance(HostTime(t));
            assert_eq!(intro.timers.len(), 2, "t={t}: step and blink");
        }
        intro.advance(HostTime(2240));
        assert_eq!(intro.timers.len(), 1, "only the blink outlives completion");
    }

    #[test]
    fn output_tracks_text_cursor_and_completion() {
        let mut intro = hi();
        intro.advance(HostTime(120));
        assert_eq!(
            intro.output(),
            IntroOutput {
                text: "H",
                cursor_visible: true,
                completed: false,
            }
        );
        intro.advance(HostTime(2240));
        let out = intro.output();
        assert_eq!(out.text, "Hi");
        assert!(out.completed);
        assert_eq!(out.cursor_visible, intro.cursor_visible());
    }

    #[test]
    fn zero_blink_is_rejected() {
        let config = IntroConfig::new("x").with_cursor_blink(Duration::ZERO);
        assert!(IntroSequencer::new(config, HostTime(0)).is_err());
    }

    #[test]
    fn gate_dismisses_on_intro_completion() {
        let mut gate = LoadingGate::new(
            IntroConfig::new("Hi"),
            LoadingGateConfig::DEFAULT,
            HostTime(0),
        )
        .unwrap();
        assert_eq!(gate.advance(HostTime(2000)), None);
        assert!(gate.is_loading());
        assert_eq!(gate.advance(HostTime(5000)), Some(HostTime(2240)));
        assert!(!gate.is_loading());
        assert!(!gate.intro().is_mounted(), "dismissal tears the intro down");
        assert_eq!(gate.next_deadline(), None);
    }

    #[test]
    fn gate_dismisses_at_cap_for_long_intros() {
        // 30 chars × 120 ms alone outlasts the cap.
        let text = "a long headline that types on.";
        let mut gate = LoadingGate::new(
            IntroConfig::new(text),
            LoadingGateConfig::DEFAULT,
            HostTime(0),
        )
        .unwrap();
        assert_eq!(gate.advance(HostTime(2999)), None);
        assert_eq!(gate.advance(HostTime(3000)), Some(HostTime(3000)));
        assert!(!gate.intro().is_completed());
        assert_eq!(gate.intro().text().chars().count(), 25);
        assert_eq!(gate.advance(HostTime(9000)), None);
    }

    #[test]
    fn completion_wins_a_tie_with_the_cap() {
        let config = LoadingGateConfig {
            max_duration: Duration::from_millis(2240),
        };
        let mut gate = LoadingGate::new(IntroConfig::new("Hi"), config, HostTime(0)).unwrap();
        assert_eq!(gate.advance(HostTime(2240)), Some(HostTime(2240)));
        assert_eq!(gate.dismissed_at(), Some(HostTime(2240)));
        assert!(
            gate.intro().is_completed(),
            "the intro completed at the cap"
        );
        assert_eq!(gate.advance(HostTime(2240)), None);
    }

    #[test]
    fn gate_teardown_never_dismisses() {
        let mut gate = LoadingGate::new(
            IntroConfig::new("Hi"),
            LoadingGateConfig::DEFAULT,
            HostTime(0),
        )
        .unwrap();
        gate.advance(HostTime(500));
        gate.teardown();
        assert!(!gate.is_mounted());
        assert!(!gate.intro().is_mounted());
        assert_eq!(gate.next_deadline(), None);
        assert_eq!(gate.advance(HostTime(10_000)), None);
        assert_eq!(gate.dismissed_at(), None);
        assert!(!gate.intro().is_completed());
    }
}
