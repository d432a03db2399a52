// Copyright 2026 the Marquee Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Simulated landing page that exercises every primitive and the diagnostics
//! pipeline.
//!
//! A virtual clock runs the loading overlay, the hero typewriter, the scroll
//! cue and a staggered skills list while a scripted scroll moves down the
//! page. Events go to both a
//! [`PrettyPrintSink`](marquee_debug::pretty::PrettyPrintSink) and a
//! [`RecorderSink`](marquee_debug::recorder::RecorderSink); the recording is
//! exported as a Chrome trace JSON file.

use std::fs::File;
use std::io::BufWriter;

use kurbo::Rect;
use marquee_core::intro::{IntroConfig, LoadingGate, LoadingGateConfig};
use marquee_core::reveal::{Reveal, RevealPolicy};
use marquee_core::scroll_cue::ScrollCue;
use marquee_core::time::{Duration, HostTime};
use marquee_core::trace::{
    CompleteEvent, CursorEvent, PhaseChangeEvent, RevealEvent, StepEvent, TeardownEvent, TraceSink,
    Tracer, TriggerEvent,
};
use marquee_core::typewriter::{TypewriterConfig, TypewriterEngine};
use marquee_core::visibility::{IntersectionEntry, RegionHandle};

use marquee_debug::pretty::PrettyPrintSink;
use marquee_debug::recorder::RecorderSink;

const VIEWPORT_WIDTH: f64 = 1280.0;
const VIEWPORT_HEIGHT: f64 = 800.0;
/// Top of the "about" section the scroll cue anchors to.
const ABOUT_TOP: f64 = 900.0;
/// Skills list, in page coordinates.
const SKILLS: Rect = Rect::new(0.0, 1600.0, VIEWPORT_WIDTH, 2000.0);
const SKILL_COUNT: usize = 6;

const FRAME_MS: u64 = 16;
const END_MS: u64 = 8000;
/// Scrolling starts once the overlay is gone and runs at this speed.
const SCROLL_START_MS: u64 = 3500;
const SCROLL_PX_PER_MS: f64 = 0.5;

/// Forwards every event to two sinks.
struct Tee<'a> {
    a: &'a mut dyn TraceSink,
    b: &'a mut dyn TraceSink,
}

impl TraceSink for Tee<'_> {
    fn on_trigger(&mut self, e: &TriggerEvent) {
        self.a.on_trigger(e);
        self.b.on_trigger(e);
    }

    fn on_reveal(&mut self, e: &RevealEvent) {
        self.a.on_reveal(e);
        self.b.on_reveal(e);
    }

    fn on_step(&mut self, e: &StepEvent) {
        self.a.on_step(e);
        self.b.on_step(e);
    }

    fn on_phase_change(&mut self, e: &PhaseChangeEvent) {
        self.a.on_phase_change(e);
        self.b.on_phase_change(e);
    }

    fn on_cursor(&mut self, e: &CursorEvent) {
        self.a.on_cursor(e);
        self.b.on_cursor(e);
    }

    fn on_complete(&mut self, e: &CompleteEvent) {
        self.a.on_complete(e);
        self.b.on_complete(e);
    }

    fn on_teardown(&mut self, e: &TeardownEvent) {
        self.a.on_teardown(e);
        self.b.on_teardown(e);
    }
}

fn scroll_at(t: u64) -> f64 {
    let elapsed = t.saturating_sub(SCROLL_START_MS) as f64;
    elapsed * SCROLL_PX_PER_MS
}

fn main() {
    // -- sinks -------------------------------------------------------------
    let mut pretty = PrettyPrintSink::new(std::io::stdout());
    let mut recorder = RecorderSink::new();
    let mut tee = Tee {
        a: &mut pretty,
        b: &mut recorder,
    };
    let mut tracer = Tracer::new(&mut tee);

    // -- page --------------------------------------------------------------
    let start = HostTime::ZERO;
    let mut gate = LoadingGate::new(
        IntroConfig::new("Hello, world."),
        LoadingGateConfig::DEFAULT,
        start,
    )
    .expect("intro config is valid");
    let mut headline = TypewriterEngine::new(
        TypewriterConfig::new(["systems programmer", "compiler hobbyist", "coffee drinker"])
            .expect("headline list is non-empty"),
        start,
    )
    .expect("headline cadence is valid");
    let mut cue = ScrollCue::default();
    let mut skills = Reveal::new(RegionHandle(1), RevealPolicy::Staggered, SKILL_COUNT);

    // -- simulated loop ----------------------------------------------------
    let mut now = start;
    let mut frames = 0_u64;
    while now.as_millis() <= END_MS {
        if let Some(at) = gate.advance_traced(now, &mut tracer) {
            println!("overlay dismissed at {}ms", at.as_millis());
        }
        headline.advance_traced(now, &mut tracer);

        let scroll_y = scroll_at(now.as_millis());
        if cue.on_scroll(scroll_y) {
            let was = cue.is_visible();
            if cue.on_frame(Some(ABOUT_TOP)) != was {
                println!(
                    "scroll cue visible={} at scroll_y={scroll_y}",
                    cue.is_visible()
                );
            }
        }

        let viewport = Rect::new(0.0, scroll_y, VIEWPORT_WIDTH, scroll_y + VIEWPORT_HEIGHT);
        let entry = IntersectionEntry {
            region: SKILLS,
            viewport,
        };
        skills.report_traced(&entry, now, &mut tracer);
        skills.advance_traced(now, &mut tracer);

        frames += 1;
        now = now + Duration::from_millis(FRAME_MS);
    }

    println!(
        "headline: {:?} | skills revealed: {}/{} | next deadline: {:?}",
        headline.text(),
        skills.revealed().revealed_count(),
        SKILL_COUNT,
        headline.next_deadline(),
    );

    headline.teardown_traced(&mut tracer);
    skills.teardown_traced(&mut tracer);

    // -- export Chrome trace -----------------------------------------------
    let path = "trace.json";
    let file = File::create(path).expect("failed to create trace.json");
    let mut writer = BufWriter::new(file);
    marquee_debug::chrome::export(recorder.as_bytes(), &mut writer)
        .expect("failed to write Chrome trace");

    println!("Wrote {path} ({frames} frames)");
}
