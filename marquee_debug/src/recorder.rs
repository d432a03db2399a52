// Copyright 2026 the Marquee Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as fixed-size little-endian records. [`decode`] reads them back
//! as an iterator of [`RecordedEvent`].
//!
//! Counts and indices are widened to `u64`; trigger ratios are stored as
//! their IEEE-754 bits, so they decode exactly.

use marquee_core::time::HostTime;
use marquee_core::trace::{
    CompleteEvent, CursorEvent, PhaseChangeEvent, PhaseKind, RevealEvent, SourceKind, StepEvent,
    TeardownEvent, TraceSink, TriggerEvent,
};
use marquee_core::visibility::RegionHandle;

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_TRIGGER: u8 = 1;
const TAG_REVEAL: u8 = 2;
const TAG_STEP: u8 = 3;
const TAG_PHASE_CHANGE: u8 = 4;
const TAG_CURSOR: u8 = 5;
const TAG_COMPLETE: u8 = 6;
const TAG_TEARDOWN: u8 = 7;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_usize(&mut self, v: usize) {
        self.write_u64(u64::try_from(v).unwrap_or(u64::MAX));
    }

    fn write_source(&mut self, s: SourceKind) {
        self.write_u8(match s {
            SourceKind::Detector => 0,
            SourceKind::Reveal => 1,
            SourceKind::Typewriter => 2,
            SourceKind::Intro => 3,
            SourceKind::LoadingGate => 4,
        });
    }

    fn write_phase(&mut self, p: PhaseKind) {
        self.write_u8(match p {
            PhaseKind::Typing => 0,
            PhaseKind::Holding => 1,
            PhaseKind::Deleting => 2,
            PhaseKind::Closing => 3,
            PhaseKind::Completed => 4,
        });
    }
}

impl TraceSink for RecorderSink {
    fn on_trigger(&mut self, e: &TriggerEvent) {
        self.write_u8(TAG_TRIGGER);
        self.write_u32(e.region.0);
        self.write_u64(e.at.as_millis());
        self.write_u64(e.ratio.to_bits());
    }

    fn on_reveal(&mut self, e: &RevealEvent) {
        self.write_u8(TAG_REVEAL);
        self.write_u64(e.at.as_millis());
        self.write_usize(e.index);
        self.write_usize(e.revealed);
        self.write_usize(e.total);
    }

    fn on_step(&mut self, e: &StepEvent) {
        self.write_u8(TAG_STEP);
        self.write_source(e.source);
        self.write_u64(e.at.as_millis());
        self.write_usize(e.string_index);
        self.write_usize(e.prefix_len);
    }

    fn on_phase_change(&mut self, e: &PhaseChangeEvent) {
        self.write_u8(TAG_PHASE_CHANGE);
        self.write_source(e.source);
        self.write_u64(e.at.as_millis());
        self.write_usize(e.string_index);
        self.write_phase(e.from);
        self.write_phase(e.to);
    }

    fn on_cursor(&mut self, e: &CursorEvent) {
        self.write_u8(TAG_CURSOR);
        self.write_source(e.source);
        self.write_u64(e.at.as_millis());
        self.write_u8(u8::from(e.visible));
    }

    fn on_complete(&mut self, e: &CompleteEvent) {
        self.write_u8(TAG_COMPLETE);
        self.write_source(e.source);
        self.write_u64(e.at.as_millis());
    }

    fn on_teardown(&mut self, e: &TeardownEvent) {
        self.write_u8(TAG_TEARDOWN);
        self.write_source(e.source);
        self.write_usize(e.canceled_timers);
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Debug, PartialEq)]
pub enum RecordedEvent {
    /// A [`TriggerEvent`].
    Trigger(TriggerEvent),
    /// A [`RevealEvent`].
    Reveal(RevealEvent),
    /// A [`StepEvent`].
    Step(StepEvent),
    /// A [`PhaseChangeEvent`].
    PhaseChange(PhaseChangeEvent),
    /// A [`CursorEvent`].
    Cursor(CursorEvent),
    /// A [`CompleteEvent`].
    Complete(CompleteEvent),
    /// A [`TeardownEvent`].
    Teardown(TeardownEvent),
}

impl RecordedEvent {
    /// Host time the event happened at, if it carries one.
    ///
    /// Teardown events are not timestamped.
    #[must_use]
    pub fn at(&self) -> Option<HostTime> {
        match self {
            Self::Trigger(e) => Some(e.at),
            Self::Reveal(e) => Some(e.at),
            Self::Step(e) => Some(e.at),
            Self::PhaseChange(e) => Some(e.at),
            Self::Cursor(e) => Some(e.at),
            Self::Complete(e) => Some(e.at),
            Self::Teardown(_) => None,
        }
    }
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
///
/// Iteration stops at the first unknown tag or truncated record.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn take<const N: usize>(&mut self) -> Option<[u8; N]> {
        let end = self.pos.checked_add(N)?;
        let bytes = self.data.get(self.pos..end)?.try_into().ok()?;
        self.pos = end;
        Some(bytes)
    }

    fn read_u8(&mut self) -> Option<u8> {
        self.take::<1>().map(|[b]| b)
    }

    fn read_u32(&mut self) -> Option<u32> {
        self.take().map(u32::from_le_bytes)
    }

    fn read_u64(&mut self) -> Option<u64> {
        self.take().map(u64::from_le_bytes)
    }

    fn read_usize(&mut self) -> Option<usize> {
        usize::try_from(self.read_u64()?).ok()
    }

    fn read_time(&mut self) -> Option<HostTime> {
        self.read_u64().map(HostTime)
    }

    fn read_source(&mut self) -> Option<SourceKind> {
        Some(match self.read_u8()? {
            0 => SourceKind::Detector,
            1 => SourceKind::Reveal,
            2 => SourceKind::Typewriter,
            3 => SourceKind::Intro,
            4 => SourceKind::LoadingGate,
            _ => return None,
        })
    }

    fn read_phase(&mut self) -> Option<PhaseKind> {
        Some(match self.read_u8()? {
            0 => PhaseKind::Typing,
            1 => PhaseKind::Holding,
            2 => PhaseKind::Deleting,
            3 => PhaseKind::Closing,
            4 => PhaseKind::Completed,
            _ => return None,
        })
    }

    fn decode_trigger(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Trigger(TriggerEvent {
            region: RegionHandle(self.read_u32()?),
            at: self.read_time()?,
            ratio: f64::from_bits(self.read_u64()?),
        }))
    }

    fn decode_reveal(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Reveal(RevealEvent {
            at: self.read_time()?,
            index: self.read_usize()?,
            revealed: self.read_usize()?,
            total: self.read_usize()?,
        }))
    }

    fn decode_step(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Step(StepEvent {
            source: self.read_source()?,
            at: self.read_time()?,
            string_index: self.read_usize()?,
            prefix_len: self.read_usize()?,
        }))
    }

    fn decode_phase_change(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::PhaseChange(PhaseChangeEvent {
            source: self.read_source()?,
            at: self.read_time()?,
            string_index: self.read_usize()?,
            from: self.read_phase()?,
            to: self.read_phase()?,
        }))
    }

    fn decode_cursor(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Cursor(CursorEvent {
            source: self.read_source()?,
            at: self.read_time()?,
            visible: self.read_u8()? != 0,
        }))
    }

    fn decode_complete(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Complete(CompleteEvent {
            source: self.read_source()?,
            at: self.read_time()?,
        }))
    }

    fn decode_teardown(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Teardown(TeardownEvent {
            source: self.read_source()?,
            canceled_timers: self.read_usize()?,
        }))
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        match self.read_u8()? {
            TAG_TRIGGER => self.decode_trigger(),
            TAG_REVEAL => self.decode_reveal(),
            TAG_STEP => self.decode_step(),
            TAG_PHASE_CHANGE => self.decode_phase_change(),
            TAG_CURSOR => self.decode_cursor(),
            TAG_COMPLETE => self.decode_complete(),
            TAG_TEARDOWN => self.decode_teardown(),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use marquee_core::time::HostTime;
    use marquee_core::trace::Tracer;
    use marquee_core::typewriter::{TypewriterConfig, TypewriterEngine};

    use super::*;

    #[test]
    fn trigger_ratio_survives_recording() {
        let mut rec = RecorderSink::new();
        let orig = TriggerEvent {
            region: RegionHandle(3),
            at: HostTime(420),
            ratio: 0.237_5,
        };
        rec.on_trigger(&orig);

        let events: Vec<_> = decode(rec.as_bytes()).collect();
        assert_eq!(events, [RecordedEvent::Trigger(orig)]);
    }

    #[test]
    fn records_a_live_typewriter_in_order() {
        let config = TypewriterConfig::new(["AB", "CD"]).unwrap();
        let mut engine = TypewriterEngine::new(config, HostTime(0)).unwrap();
        let mut rec = RecorderSink::new();
        engine.advance_traced(HostTime(1780), &mut Tracer::new(&mut rec));
        engine.teardown_traced(&mut Tracer::new(&mut rec));

        let events: Vec<_> = decode(rec.as_bytes()).collect();
        let steps: Vec<usize> = events
            .iter()
            .filter_map(|e| match e {
                RecordedEvent::Step(s) => Some(s.prefix_len),
                _ => None,
            })
            .collect();
        assert_eq!(steps, [1, 2, 1, 0], "typed AB, then deleted it");

        let times: Vec<HostTime> = events.iter().filter_map(RecordedEvent::at).collect();
        assert!(times.is_sorted(), "events come out in time order");

        assert!(matches!(
            events.last(),
            Some(RecordedEvent::Teardown(TeardownEvent {
                source: SourceKind::Typewriter,
                canceled_timers: 2,
            }))
        ));
    }

    #[test]
    fn phase_change_keeps_both_ends() {
        let mut rec = RecorderSink::new();
        let orig = PhaseChangeEvent {
            source: SourceKind::Intro,
            at: HostTime(1040),
            string_index: 0,
            from: PhaseKind::Holding,
            to: PhaseKind::Closing,
        };
        rec.on_phase_change(&orig);
        assert_eq!(
            decode(rec.as_bytes()).next(),
            Some(RecordedEvent::PhaseChange(orig))
        );
    }

    #[test]
    fn truncated_record_stops_iteration() {
        let mut rec = RecorderSink::new();
        rec.on_complete(&CompleteEvent {
            source: SourceKind::Intro,
            at: HostTime(2240),
        });
        rec.on_complete(&CompleteEvent {
            source: SourceKind::LoadingGate,
            at: HostTime(2240),
        });
        let bytes = rec.into_bytes();
        let cut = &bytes[..bytes.len() - 3];
        assert_eq!(decode(cut).count(), 1);
    }

    #[test]
    fn empty_buffer_decodes_to_nothing() {
        assert_eq!(decode(&[]).count(), 0);
    }
}
