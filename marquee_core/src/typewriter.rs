// Copyright 2026 the Marquee Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cycling typewriter text.
//!
//! [`TypewriterEngine`] types each string of its list character by character,
//! holds it, deletes it character by character, then moves to the next string,
//! wrapping forever. All phase logic lives in [`TypewriterState`]:
//!
//! - [`on_timer`](TypewriterState::on_timer) applies the rule for an expired
//!   step timer (type one, stop holding, delete one);
//! - [`settle_once`](TypewriterState::settle_once) applies the transitions that
//!   take no time (finished typing → hold, finished deleting → next string).
//!
//! The engine only schedules: after every step it arms one timer for the
//! delay of the phase it landed in. A cursor blinks on its own timer.
//!
//! ```text
//!   Typing ──(prefix = len)──► Holding ──(hold)──► Deleting ──(prefix = 0)──► Typing(next)
//!     ▲ type_delay per char                          ▲ delete_delay per char
//! ```

use alloc::string::String;
use alloc::vec::Vec;

use crate::cursor::{CursorBlink, DEFAULT_BLINK};
use crate::error::ConfigError;
use crate::host::Timed;
use crate::time::{Duration, HostTime};
use crate::timer::{Lifecycle, TimerQueue};
use crate::trace::{CursorEvent, PhaseChangeEvent, SourceKind, StepEvent, TeardownEvent, Tracer};

/// Default delay per typed character.
pub const DEFAULT_TYPE_DELAY: Duration = Duration::from_millis(100);
/// Default hold once a string is fully typed.
pub const DEFAULT_HOLD_DELAY: Duration = Duration::from_millis(1500);
/// Default delay per deleted character.
pub const DEFAULT_DELETE_DELAY: Duration = Duration::from_millis(40);

/// Typewriter phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Adding characters.
    Typing,
    /// Showing the full string.
    Holding,
    /// Removing characters.
    Deleting,
}

/// Position of a typewriter in its cycle.
///
/// `prefix_len` counts characters (Unicode scalar values), never bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TypewriterState {
    /// Index into the string list.
    pub string_index: usize,
    /// Number of visible characters of the active string.
    pub prefix_len: usize,
    /// Current phase.
    pub phase: Phase,
}

impl TypewriterState {
    /// Nothing typed, first string.
    pub const START: Self = Self {
        string_index: 0,
        prefix_len: 0,
        phase: Phase::Typing,
    };

    /// Applies the rule for an expired step timer.
    ///
    /// `lengths` holds the character count of every string.
    #[must_use]
    pub fn on_timer(self, lengths: &[usize]) -> Self {
        match self.phase {
            Phase::Typing => Self {
                prefix_len: (self.prefix_len + 1).min(active_len(&self, lengths)),
                ..self
            },
            Phase::Holding => Self {
                phase: Phase::Deleting,
                ..self
            },
            Phase::Deleting => Self {
                prefix_len: self.prefix_len.saturating_sub(1),
                ..self
            },
        }
    }

    /// Applies one zero-delay transition, if any is due.
    #[must_use]
    pub fn settle_once(self, lengths: &[usize]) -> Option<Self> {
        match self.phase {
            Phase::Typing if self.prefix_len >= active_len(&self, lengths) => Some(Self {
                phase: Phase::Holding,
                ..self
            }),
            Phase::Deleting if self.prefix_len == 0 => Some(Self {
                string_index: (self.string_index + 1) % lengths.len().max(1),
                prefix_len: 0,
                phase: Phase::Typing,
            }),
            _ => None,
        }
    }

    /// [`on_timer`](Self::on_timer) followed by every zero-delay transition.
    #[must_use]
    pub fn advance(self, lengths: &[usize]) -> Self {
        self.on_timer(lengths).settle(lengths)
    }

    /// Applies zero-delay transitions until none is due.
    #[must_use]
    pub fn settle(mut self, lengths: &[usize]) -> Self {
        while let Some(next) = self.settle_once(lengths) {
            self = next;
        }
        self
    }
}

fn active_len(state: &TypewriterState, lengths: &[usize]) -> usize {
    lengths.get(state.string_index).copied().unwrap_or(0)
}

/// Strings and cadence for a [`TypewriterEngine`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypewriterConfig {
    strings: Vec<String>,
    /// Delay per typed character.
    pub type_delay: Duration,
    /// Hold once a string is fully typed. Must be non-zero.
    pub hold_delay: Duration,
    /// Delay per deleted character.
    pub delete_delay: Duration,
    /// Cursor blink interval. Must be non-zero.
    pub cursor_blink: Duration,
}

impl TypewriterConfig {
    /// Default cadence over `strings`.
    ///
    /// Fails with [`ConfigError::EmptyStrings`] for an empty list.
    pub fn new<I, S>(strings: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let strings: Vec<String> = strings.into_iter().map(Into::into).collect();
        if strings.is_empty() {
            return Err(ConfigError::EmptyStrings);
        }
        Ok(Self {
            strings,
            type_delay: DEFAULT_TYPE_DELAY,
            hold_delay: DEFAULT_HOLD_DELAY,
            delete_delay: DEFAULT_DELETE_DELAY,
            cursor_blink: DEFAULT_BLINK,
        })
    }

    /// Overrides the typing delay.
    #[must_use]
    pub fn with_type_delay(mut self, delay: Duration) -> Self {
        self.type_delay = delay;
        self
    }

    /// Overrides the hold delay.
    #[must_use]
    pub fn with_hold_delay(mut self, delay: Duration) -> Self {
        self.hold_delay = delay;
        self
    }

    /// Overrides the deleting delay.
    #[must_use]
    pub fn with_delete_delay(mut self, delay: Duration) -> Self {
        self.delete_delay = delay;
        self
    }

    /// Overrides the cursor blink interval.
    #[must_use]
    pub fn with_cursor_blink(mut self, interval: Duration) -> Self {
        self.cursor_blink = interval;
        self
    }

    /// The strings to cycle through; never empty.
    #[must_use]
    pub fn strings(&self) -> &[String] {
        &self.strings
    }

    fn delay_for(&self, phase: Phase) -> Duration {
        match phase {
            Phase::Typing => self.type_delay,
            Phase::Holding => self.hold_delay,
            Phase::Deleting => self.delete_delay,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Slot {
    Step,
    Cursor,
}

/// What the rendering layer reads from a [`TypewriterEngine`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TypewriterOutput<'a> {
    /// Visible prefix of the active string.
    pub text: &'a str,
    /// Cursor visibility.
    pub cursor_visible: bool,
    /// Index of the active string.
    pub string_index: usize,
}

/// Endless type/hold/delete cycle over a list of strings.
#[derive(Debug)]
pub struct TypewriterEngine {
    config: TypewriterConfig,
    lengths: Vec<usize>,
    state: TypewriterState,
    timers: TimerQueue<Slot>,
    cursor: CursorBlink,
    lifecycle: Lifecycle,
}

impl TypewriterEngine {
    /// Mounts an engine at `now` and arms its first step and blink.
    pub fn new(config: TypewriterConfig, now: HostTime) -> Result<Self, ConfigError> {
        if config.hold_delay.is_zero() {
            return Err(ConfigError::ZeroInterval {
                field: "hold_delay",
            });
        }
        if config.cursor_blink.is_zero() {
            return Err(ConfigError::ZeroInterval {
                field: "cursor_blink",
            });
        }
        let lengths: Vec<usize> = config.strings.iter().map(|s| s.chars().count()).collect();
        let mut engine = Self {
            state: TypewriterState::START.settle(&lengths),
            lengths,
            timers: TimerQueue::new(),
            cursor: CursorBlink::new(config.cursor_blink),
            lifecycle: Lifecycle::Mounted,
            config,
        };
        engine.arm_step(now);
        engine.cursor.start(&mut engine.timers, now, Slot::Cursor);
        Ok(engine)
    }

    fn arm_step(&mut self, from: HostTime) {
        let delay = self.config.delay_for(self.state.phase);
        self.timers.schedule(from + delay, Slot::Step);
    }

    /// Processes every step and blink due at or before `now`.
    pub fn advance(&mut self, now: HostTime) {
        self.advance_traced(now, &mut Tracer::none());
    }

    /// Like [`advance`](Self::advance), with tracing.
    pub fn advance_traced(&mut self, now: HostTime, tracer: &mut Tracer<'_>) {
        while self.lifecycle.is_mounted() {
            let Some(expired) = self.timers.pop_expired(now) else {
                break;
            };
            match expired.key {
                Slot::Step => self.on_step(expired.deadline, tracer),
                Slot::Cursor => {
                    let visible =
                        self.cursor
                            .on_expired(&mut self.timers, expired.deadline, Slot::Cursor);
                    tracer.cursor(&CursorEvent {
                        source: SourceKind::Typewriter,
                        at: expired.deadline,
                        visible,
                    });
                }
            }
        }
    }

    fn on_step(&mut self, at: HostTime, tracer: &mut Tracer<'_>) {
        let before = self.state;
        let mut state = before.on_timer(&self.lengths);
        if state.prefix_len != before.prefix_len {
            tracer.step(&StepEvent {
                source: SourceKind::Typewriter,
                at,
                string_index: state.string_index,
                prefix_len: state.prefix_len,
            });
        }
        let mut from = before.phase;
        loop {
            if state.phase != from {
                tracer.phase_change(&PhaseChangeEvent {
                    source: SourceKind::Typewriter,
                    at,
                    string_index: state.string_index,
                    from: from.into(),
                    to: state.phase.into(),
                });
                from = state.phase;
            }
            match state.settle_once(&self.lengths) {
                Some(next) => state = next,
                None => break,
            }
        }
        self.state = state;
        self.arm_step(at);
    }

    /// Cancels every timer. The last state stays readable.
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
            source: SourceKind::Typewriter,
            canceled_timers,
        });
    }

    /// Visible text: the active string cut to `prefix_len` characters.
    #[must_use]
    pub fn text(&self) -> &str {
        let s = self
            .config
            .strings
            .get(self.state.string_index)
            .map_or("", String::as_str);
        match s.char_indices().nth(self.state.prefix_len) {
            Some((end, _)) => &s[..end],
            None => s,
        }
    }

    /// Cursor visibility.
    #[must_use]
    pub const fn cursor_visible(&self) -> bool {
        self.cursor.is_visible()
    }

    /// Index of the active string.
    #[must_use]
    pub const fn active_string_index(&self) -> usize {
        self.state.string_index
    }

    /// Current cycle position.
    #[must_use]
    pub const fn state(&self) -> TypewriterState {
        self.state
    }

    /// Everything the rendering layer reads.
    #[must_use]
    pub fn output(&self) -> TypewriterOutput<'_> {
        TypewriterOutput {
            text: self.text(),
            cursor_visible: self.cursor_visible(),
            string_index: self.state.string_index,
        }
    }

    /// The engine's configuration.
    #[must_use]
    pub const fn config(&self) -> &TypewriterConfig {
        &self.config
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

impl Timed for TypewriterEngine {
    fn next_deadline(&self) -> Option<HostTime> {
        Self::next_deadline(self)
    }

    fn advance(&mut self, now: HostTime) {
        Self::advance(self, now);
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;

    fn ab_cd() -> TypewriterEngine {
        let config = TypewriterConfig::new(["AB", "CD"]).unwrap();
        TypewriterEngine::new(config, HostTime(0)).unwrap()
    }

    fn at(engine: &mut TypewriterEngine, t: u64) -> (String, usize, Phase) {
        engine.advance(HostTime(t));
        let s = engine.state();
        (engine.text().into(), s.string_index, s.phase)
    }

    #[test]
    fn empty_string_list_is_rejected() {
        let none: [&str; 0] = [];
        assert_eq!(TypewriterConfig::new(none), Err(ConfigError::EmptyStrings));
    }

    #[test]
    fn zero_hold_or_blink_is_rejected() {
        let config = TypewriterConfig::new(["x"]).unwrap();
        let zero_hold = config.clone().with_hold_delay(Duration::ZERO);
        assert_eq!(
            TypewriterEngine::new(zero_hold, HostTime(0)).err(),
            Some(ConfigError::ZeroInterval {
                field: "hold_delay"
            })
        );
        let zero_blink = config.with_cursor_blink(Duration::ZERO);
        assert!(TypewriterEngine::new(zero_blink, HostTime(0)).is_err());
    }

    #[test]
    fn reference_timeline() {
        let mut e = ab_cd();
        assert_eq!(at(&mut e, 0), ("".into(), 0, Phase::Typing));
        assert_eq!(at(&mut e, 100), ("A".into(), 0, Phase::Typing));
        assert_eq!(at(&mut e, 200), ("AB".into(), 0, Phase::Holding));
        assert_eq!(at(&mut e, 1699), ("AB".into(), 0, Phase::Holding));
        assert_eq!(at(&mut e, 1700), ("AB".into(), 0, Phase::Deleting));
        assert_eq!(at(&mut e, 1740), ("A".into(), 0, Phase::Deleting));
        assert_eq!(at(&mut e, 1780), ("".into(), 1, Phase::Typing));
        assert_eq!(at(&mut e, 1880), ("C".into(), 1, Phase::Typing));
        assert_eq!(at(&mut e, 1980), ("CD".into(), 1, Phase::Holding));
    }

    #[test]
    fn string_index_alternates_forever() {
        let mut e = ab_cd();
        // One full cycle per string: 2 × 100 + 1500 + 2 × 40 = 1780 ms.
        let mut seen = vec![];
        for cycle in 0..6_u64 {
            e.advance(HostTime(cycle * 1780 + 1000));
            seen.push(e.active_string_index());
        }
        assert_eq!(seen, [0, 1, 0, 1, 0, 1]);
    }

    #[test]
    fn coarse_advance_lands_on_the_same_state() {
        let mut fine = ab_cd();
        let mut coarse = ab_cd();
        for t in 0..=5000 {
            fine.advance(HostTime(t));
        }
        coarse.advance(HostTime(5000));
        assert_eq!(fine.state(), coarse.state());
        assert_eq!(fine.cursor_visible(), coarse.cursor_visible());
    }

    #[test]
    fn prefix_never_exceeds_active_length() {
        let config = TypewriterConfig::new(["héllo", "", "ok"]).unwrap();
        let lengths: Vec<usize> = config.strings().iter().map(|s| s.chars().count()).collect();
        let mut e = TypewriterEngine::new(config, HostTime(0)).unwrap();
        for t in (0..20_000).step_by(10) {
            e.advance(HostTime(t));
            let s = e.state();
            assert!(s.prefix_len <= lengths[s.string_index], "t={t}: {s:?}");
            assert_eq!(e.text().chars().count(), s.prefix_len);
        }
    }

    #[test]
    fn empty_entry_holds_then_moves_on() {
        let lengths = [0, 2];
        let s = TypewriterState::START.settle(&lengths);
        assert_eq!(s.phase, Phase::Holding, "nothing to type");
        let s = s.advance(&lengths);
        assert_eq!(
            s,
            TypewriterState {
                string_index: 1,
                prefix_len: 0,
                phase: Phase::Typing
            }
        );
    }

    #[test]
    fn single_string_wraps_to_itself() {
        let lengths = [1];
        let s = TypewriterState {
            string_index: 0,
            prefix_len: 1,
            phase: Phase::Deleting,
        };
        assert_eq!(s.advance(&lengths), TypewriterState::START);
    }

    #[test]
    fn cursor_blinks_independently() {
        let mut e = ab_cd();
        assert!(e.cursor_visible(), "starts visible");
        e.advance(HostTime(499));
        assert!(e.cursor_visible());
        e.advance(HostTime(500));
        assert!(!e.cursor_visible());
        e.advance(HostTime(1000));
        assert!(e.cursor_visible());
    }

    #[test]
    fn teardown_stops_every_mutation() {
        let mut e = ab_cd();
        e.advance(HostTime(150));
        e.teardown();
        let frozen = (e.state(), e.cursor_visible());
        e.advance(HostTime(60_000));
        assert_eq!((e.state(), e.cursor_visible()), frozen);
        assert_eq!(e.next_deadline(), None);
        assert_eq!(e.output().text, "A");
    }
}
