// Copyright 2026 the Marquee Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.

use std::io::Write;

use marquee_core::trace::{
    CompleteEvent, CursorEvent, PhaseChangeEvent, RevealEvent, StepEvent, TeardownEvent, TraceSink,
    TriggerEvent,
};

/// A [`TraceSink`] that writes one line per event.
///
/// Write errors are counted rather than propagated, since sink methods
/// cannot fail.
#[derive(Debug)]
pub struct PrettyPrintSink<W> {
    out: W,
    errors: usize,
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink writing to `out`.
    pub fn new(out: W) -> Self {
        Self { out, errors: 0 }
    }

    /// Number of lines that failed to write.
    #[must_use]
    pub fn write_errors(&self) -> usize {
        self.errors
    }

    /// Consumes the sink and returns the writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, args: std::fmt::Arguments<'_>) {
        if writeln!(self.out, "{args}").is_err() {
            self.errors += 1;
        }
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_trigger(&mut self, e: &TriggerEvent) {
        self.line(format_args!(
            "[{:>7}ms] trigger   region={} ratio={:.3}",
            e.at.as_millis(),
            e.region.0,
            e.ratio
        ));
    }

    fn on_reveal(&mut self, e: &RevealEvent) {
        self.line(format_args!(
            "[{:>7}ms] reveal    item={} ({}/{})",
            e.at.as_millis(),
            e.index,
            e.revealed,
            e.total
        ));
    }

    fn on_step(&mut self, e: &StepEvent) {
        self.line(format_args!(
            "[{:>7}ms] step      {:?} string={} len={}",
            e.at.as_millis(),
            e.source,
            e.string_index,
            e.prefix_len
        ));
    }

    fn on_phase_change(&mut self, e: &PhaseChangeEvent) {
        self.line(format_args!(
            "[{:>7}ms] phase     {:?} string={} {:?} -> {:?}",
            e.at.as_millis(),
            e.source,
            e.string_index,
            e.from,
            e.to
        ));
    }

    fn on_cursor(&mut self, e: &CursorEvent) {
        self.line(format_args!(
            "[{:>7}ms] cursor    {:?} {}",
            e.at.as_millis(),
            e.source,
            if e.visible { "on" } else { "off" }
        ));
    }

    fn on_complete(&mut self, e: &CompleteEvent) {
        self.line(format_args!(
            "[{:>7}ms] complete  {:?}",
            e.at.as_millis(),
            e.source
        ));
    }

    fn on_teardown(&mut self, e: &TeardownEvent) {
        self.line(format_args!(
            "            teardown  {:?} canceled={}",
            e.source, e.canceled_timers
        ));
    }
}

#[cfg(test)]
mod tests {
    use marquee_core::time::HostTime;
    use marquee_core::trace::SourceKind;

    use super::*;

    #[test]
    fn one_line_per_event() {
        let mut sink = PrettyPrintSink::new(Vec::new());
        sink.on_reveal(&RevealEvent {
            at: HostTime(300),
            index: 2,
            revealed: 3,
            total: 5,
        });
        sink.on_cursor(&CursorEvent {
            source: SourceKind::Intro,
            at: HostTime(500),
            visible: false,
        });
        let text = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "[    300ms] reveal    item=2 (3/5)");
        assert_eq!(lines[1], "[    500ms] cursor    Intro off");
    }

    struct Broken;

    impl Write for Broken {
        fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("closed"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn write_failures_are_counted() {
        let mut sink = PrettyPrintSink::new(Broken);
        sink.on_complete(&CompleteEvent {
            source: SourceKind::LoadingGate,
            at: HostTime(3000),
        });
        assert_eq!(sink.write_errors(), 1);
    }
}
