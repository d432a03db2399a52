// Copyright 2026 the Marquee Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][format] JSON to the given writer.
//!
//! Each [`SourceKind`] gets its own track (`tid`). Phases become complete
//! (`"X"`) slices that end at the phase change leaving them; everything else
//! is an instant.
//!
//! Events carry no instance id, so a recording should hold at most one
//! instance per source kind. Two typewriters traced into the same recorder
//! share a track and their phase slices interleave.
//!
//! [format]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::collections::HashMap;
use std::io::{self, Write};

use serde_json::{Value, json};

use marquee_core::time::HostTime;
use marquee_core::trace::SourceKind;

use crate::recorder::{RecordedEvent, decode};

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
///
/// The first phase slice of a source starts at that source's first recorded
/// event.
pub fn export(bytes: &[u8], writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();
    let mut phase_start: HashMap<SourceKind, HostTime> = HashMap::new();

    for recorded in decode(bytes) {
        if let Some((source, at)) = timed_source(&recorded) {
            phase_start.entry(source).or_insert(at);
        }
        match recorded {
            RecordedEvent::Trigger(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "Trigger",
                    "cat": "Visibility",
                    "ts": ms_to_us(e.at),
                    "pid": 0,
                    "tid": track(SourceKind::Detector),
                    "s": "t",
                    "args": {
                        "region": e.region.0,
                        "ratio": e.ratio,
                    }
                }));
            }
            RecordedEvent::Reveal(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "Reveal",
                    "cat": "Reveal",
                    "ts": ms_to_us(e.at),
                    "pid": 0,
                    "tid": track(SourceKind::Reveal),
                    "s": "t",
                    "args": {
                        "index": e.index,
                        "revealed": e.revealed,
                        "total": e.total,
                    }
                }));
            }
            RecordedEvent::Step(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "Step",
                    "cat": "Text",
                    "ts": ms_to_us(e.at),
                    "pid": 0,
                    "tid": track(e.source),
                    "s": "t",
                    "args": {
                        "string_index": e.string_index,
                        "prefix_len": e.prefix_len,
                    }
                }));
            }
            RecordedEvent::PhaseChange(e) => {
                let start = phase_start.insert(e.source, e.at).unwrap_or(e.at);
                events.push(json!({
                    "ph": "X",
                    "name": format!("{:?}", e.from),
                    "cat": "Phase",
                    "ts": ms_to_us(start),
                    "dur": e.at.saturating_duration_since(start).as_millis().saturating_mul(1000),
                    "pid": 0,
                    "tid": track(e.source),
                    "args": {
                        "string_index": e.string_index,
                        "next": format!("{:?}", e.to),
                    }
                }));
            }
            RecordedEvent::Cursor(e) => {
                events.push(json!({
                    "ph": "C",
                    "name": format!("{:?} cursor", e.source),
                    "cat": "Cursor",
                    "ts": ms_to_us(e.at),
                    "pid": 0,
                    "args": {
                        "visible": u8::from(e.visible),
                    }
                }));
            }
            RecordedEvent::Complete(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "Complete",
                    "cat": "Lifecycle",
                    "ts": ms_to_us(e.at),
                    "pid": 0,
                    "tid": track(e.source),
                    "s": "p",
                    "args": {
                        "source": format!("{:?}", e.source),
                    }
                }));
            }
            RecordedEvent::Teardown(e) => {
                // Untimed; pin it to the end of the source's last phase.
                let at = phase_start
                    .get(&e.source)
                    .copied()
                    .unwrap_or(HostTime::ZERO);
                events.push(json!({
                    "ph": "i",
                    "name": "Teardown",
                    "cat": "Lifecycle",
                    "ts": ms_to_us(at),
                    "pid": 0,
                    "tid": track(e.source),
                    "s": "t",
                    "args": {
                        "canceled_timers": e.canceled_timers,
                    }
                }));
            }
        }
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

fn timed_source(recorded: &RecordedEvent) -> Option<(SourceKind, HostTime)> {
    match recorded {
        RecordedEvent::Trigger(e) => Some((SourceKind::Detector, e.at)),
        RecordedEvent::Reveal(e) => Some((SourceKind::Reveal, e.at)),
        RecordedEvent::Step(e) => Some((e.source, e.at)),
        RecordedEvent::PhaseChange(e) => Some((e.source, e.at)),
        RecordedEvent::Cursor(e) => Some((e.source, e.at)),
        RecordedEvent::Complete(e) => Some((e.source, e.at)),
        RecordedEvent::Teardown(_) => None,
    }
}

fn ms_to_us(t: HostTime) -> u64 {
    t.as_millis().saturating_mul(1000)
}

fn track(source: SourceKind) -> u8 {
    match source {
        SourceKind::Detector => 0,
        SourceKind::Reveal => 1,
        SourceKind::Typewriter => 2,
        SourceKind::Intro => 3,
        SourceKind::LoadingGate => 4,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::RecorderSink;
    use marquee_core::intro::{IntroConfig, IntroSequencer};
    use marquee_core::trace::{
        PhaseChangeEvent, PhaseKind, RevealEvent, StepEvent, TraceSink, Tracer,
    };

    #[test]
    fn export_produces_valid_json() {
        let mut intro = IntroSequencer::new(IntroConfig::new("Hi"), HostTime(0)).unwrap();
        let mut rec = RecorderSink::new();
        intro.advance_traced(HostTime(2240), &mut Tracer::new(&mut rec));

        let mut out = Vec::new();
        export(rec.as_bytes(), &mut out).unwrap();
        let parsed: Vec<Value> = serde_json::from_slice(&out).unwrap();

        let slices: Vec<&Value> = parsed.iter().filter(|v| v["ph"] == "X").collect();
        assert_eq!(slices.len(), 3, "typing, holding, closing");
        assert_eq!(slices[0]["name"], "Typing");
        assert_eq!(slices[0]["ts"], 120_000, "first step");
        assert_eq!(slices[0]["dur"], 120_000);
        assert_eq!(slices[1]["name"], "Holding");
        assert_eq!(slices[1]["ts"], 240_000);
        assert_eq!(slices[2]["name"], "Closing");
        assert_eq!(slices[2]["dur"], 1_200_000);

        let last = parsed.last().unwrap();
        assert_eq!(last["name"], "Complete");
        assert_eq!(last["ts"], 2_240_000);
    }

    #[test]
    fn late_source_slice_starts_at_its_first_event() {
        let mut rec = RecorderSink::new();
        rec.on_step(&StepEvent {
            source: SourceKind::Typewriter,
            at: HostTime(5000),
            string_index: 0,
            prefix_len: 1,
        });
        rec.on_phase_change(&PhaseChangeEvent {
            source: SourceKind::Typewriter,
            at: HostTime(5100),
            string_index: 0,
            from: PhaseKind::Typing,
            to: PhaseKind::Holding,
        });
        let mut out = Vec::new();
        export(rec.as_bytes(), &mut out).unwrap();
        let parsed: Vec<Value> = serde_json::from_slice(&out).unwrap();
        let slice = parsed.iter().find(|v| v["ph"] == "X").unwrap();
        assert_eq!(slice["ts"], 5_000_000);
        assert_eq!(slice["dur"], 100_000);
    }

    #[test]
    fn reveals_land_on_their_own_track() {
        let mut rec = RecorderSink::new();
        rec.on_reveal(&RevealEvent {
            at: HostTime(100),
            index: 1,
            revealed: 2,
            total: 3,
        });
        let mut out = Vec::new();
        export(rec.as_bytes(), &mut out).unwrap();
        let parsed: Vec<Value> = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed[0]["tid"], 1);
        assert_eq!(parsed[0]["ts"], 100_000);
        assert_eq!(parsed[0]["args"]["index"], 1);
    }

    #[test]
    fn export_empty_recording() {
        let mut out = Vec::new();
        export(&[], &mut out).unwrap();
        let parsed: Vec<Value> = serde_json::from_slice(&out).unwrap();
        assert!(parsed.is_empty());
    }
}
