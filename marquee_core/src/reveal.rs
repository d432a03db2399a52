// Copyright 2026 the Marquee Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Timed per-item reveals.
//!
//! A [`RevealScheduler`] owns a [`RevealSet`] of `N` flags. When it is
//! triggered it schedules `N` callbacks at offsets `0, d, 2d, …, (N−1)d` from
//! the trigger instant; each one flips its item to `true`. The scheduler runs
//! at most once and its item count is fixed at construction, so a consumer
//! that needs a different count builds a new scheduler.
//!
//! [`RevealPolicy`] names the two cadences callers pick between. They share
//! the algorithm and differ only in their defaults.
//!
//! [`Reveal`] bundles a [`VisibilityDetector`] with a scheduler, which is the
//! usual way a list section is wired up.

use alloc::vec;
use alloc::vec::Vec;

use crate::error::ConfigError;
use crate::host::Timed;
use crate::oneshot::OneShot;
use crate::time::{Duration, HostTime};
use crate::timer::{Lifecycle, TimerQueue};
use crate::trace::{RevealEvent, SourceKind, TeardownEvent, Tracer};
use crate::visibility::{
    DetectorOptions, IntersectionEntry, MarginLength, RegionHandle, RootMargin, VisibilityDetector,
};

/// Default inter-item delay for [`RevealPolicy::Sequential`].
pub const SEQUENTIAL_DELAY: Duration = Duration::from_millis(200);

/// Default inter-item delay for [`RevealPolicy::Staggered`].
pub const STAGGERED_DELAY: Duration = Duration::from_millis(100);

/// Named reveal cadences.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RevealPolicy {
    /// Slower one-by-one cadence, used for timelines.
    Sequential,
    /// Quicker cascade, used for card grids.
    Staggered,
}

impl RevealPolicy {
    /// Default inter-item delay.
    #[must_use]
    pub const fn default_delay(self) -> Duration {
        match self {
            Self::Sequential => SEQUENTIAL_DELAY,
            Self::Staggered => STAGGERED_DELAY,
        }
    }

    /// Observer options used alongside this policy.
    #[must_use]
    pub const fn detector_options(self) -> DetectorOptions {
        let vertical = match self {
            Self::Sequential => 100.0,
            Self::Staggered => 50.0,
        };
        DetectorOptions {
            threshold: 0.1,
            margin: RootMargin::symmetric(MarginLength::Px(vertical), MarginLength::Px(0.0)),
        }
    }
}

/// Item count and cadence for a [`RevealScheduler`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RevealConfig {
    /// Number of items; fixed for the scheduler's lifetime.
    pub item_count: usize,
    /// Delay between consecutive items.
    pub per_item_delay: Duration,
}

impl RevealConfig {
    /// `item_count` items at the policy's default cadence.
    #[must_use]
    pub const fn new(policy: RevealPolicy, item_count: usize) -> Self {
        Self {
            item_count,
            per_item_delay: policy.default_delay(),
        }
    }

    /// Like [`new`](Self::new) for hosts that carry counts as signed
    /// integers.
    pub fn from_signed(policy: RevealPolicy, item_count: i64) -> Result<Self, ConfigError> {
        let count =
            usize::try_from(item_count).map_err(|_| ConfigError::NegativeItemCount(item_count))?;
        Ok(Self::new(policy, count))
    }

    /// Overrides the inter-item delay.
    #[must_use]
    pub const fn with_delay(self, per_item_delay: Duration) -> Self {
        Self {
            per_item_delay,
            ..self
        }
    }
}

/// Fixed-length set of reveal flags.
///
/// Flags only ever go from `false` to `true`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RevealSet {
    flags: Vec<bool>,
    revealed: usize,
}

impl RevealSet {
    fn new(len: usize) -> Self {
        Self {
            flags: vec![false; len],
            revealed: 0,
        }
    }

    /// Sets `index`; returns `false` if it was already set.
    fn mark(&mut self, index: usize) -> bool {
        match self.flags.get_mut(index) {
            Some(flag) if !*flag => {
                *flag = true;
                self.revealed += 1;
                true
            }
            _ => false,
        }
    }

    /// Number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.flags.len()
    }

    /// Returns `true` for an empty set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    /// Whether `index` is revealed; out-of-range indices never are.
    #[must_use]
    pub fn is_revealed(&self, index: usize) -> bool {
        self.flags.get(index).copied().unwrap_or(false)
    }

    /// Number of revealed items.
    #[must_use]
    pub fn revealed_count(&self) -> usize {
        self.revealed
    }

    /// Returns `true` once every item is revealed (immediately for `N = 0`).
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.revealed == self.flags.len()
    }

    /// The flags, in item order.
    #[must_use]
    pub fn as_slice(&self) -> &[bool] {
        &self.flags
    }
}

/// Schedules one reveal per item, once.
#[derive(Debug)]
pub struct RevealScheduler {
    config: RevealConfig,
    set: RevealSet,
    started: OneShot,
    timers: TimerQueue<usize>,
    lifecycle: Lifecycle,
}

impl RevealScheduler {
    /// Creates an idle scheduler.
    #[must_use]
    pub fn new(config: RevealConfig) -> Self {
        Self {
            set: RevealSet::new(config.item_count),
            config,
            started: OneShot::new(),
            timers: TimerQueue::new(),
            lifecycle: Lifecycle::Mounted,
        }
    }

    /// Starts the reveal pass at `now`.
    ///
    /// Returns `false` if the pass already started or the scheduler was torn
    /// down. For `N = 0` nothing is scheduled.
    pub fn trigger(&mut self, now: HostTime) -> bool {
        if !self.lifecycle.is_mounted() || !self.started.fire(now) {
            return false;
        }
        let d = self.config.per_item_delay;
        for index in 0..self.config.item_count {
            let offset = d.saturating_mul(index as u64);
            self.timers.schedule(now + offset, index);
        }
        true
    }

    /// Triggers if `detector` has entered; a no-op otherwise.
    ///
    /// The trigger instant is the detector's entry time, so polling late does
    /// not shift the schedule.
    pub fn follow(&mut self, detector: &VisibilityDetector) -> bool {
        match detector.entered_at() {
            Some(at) => self.trigger(at),
            None => false,
        }
    }

    /// Fires every reveal due at or before `now`.
    pub fn advance(&mut self, now: HostTime) {
        self.advance_traced(now, &mut Tracer::none());
    }

    /// Like [`advance`](Self::advance), emitting a [`RevealEvent`] per item.
    pub fn advance_traced(&mut self, now: HostTime, tracer: &mut Tracer<'_>) {
        while self.lifecycle.is_mounted() {
            let Some(expired) = self.timers.pop_expired(now) else {
                break;
            };
            if self.set.mark(expired.key) {
                tracer.reveal(&RevealEvent {
                    at: expired.deadline,
                    index: expired.key,
                    revealed: self.set.revealed_count(),
                    total: self.set.len(),
                });
            }
        }
    }

    /// Cancels pending reveals. Already revealed items stay revealed.
    pub fn teardown(&mut self) {
        self.teardown_traced(&mut Tracer::none());
    }

    /// Like [`teardown`](Self::teardown), emitting a [`TeardownEvent`].
    pub fn teardown_traced(&mut self, tracer: &mut Tracer<'_>) {
        if !self.lifecycle.is_mounted() {
            return;
        }
        self.lifecycle = Lifecycle::TornDown;
        let canceled_timers = self.timers.clear();
        tracer.teardown(&TeardownEvent {
            source: SourceKind::Reveal,
            canceled_timers,
        });
    }

    /// The reveal flags.
    #[must_use]
    pub fn revealed(&self) -> &RevealSet {
        &self.set
    }

    /// The configuration this scheduler was built with.
    #[must_use]
    pub const fn config(&self) -> &RevealConfig {
        &self.config
    }

    /// Returns `true` once the pass has started.
    #[must_use]
    pub const fn is_triggered(&self) -> bool {
        self.started.is_fired()
    }

    /// Number of reveals still pending.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.timers.len()
    }

    /// Earliest pending reveal.
    #[must_use]
    pub fn next_deadline(&self) -> Option<HostTime> {
        if self.lifecycle.is_mounted() {
            self.timers.next_deadline()
        } else {
            None
        }
    }
}

impl Timed for RevealScheduler {
    fn next_deadline(&self) -> Option<HostTime> {
        Self::next_deadline(self)
    }

    fn advance(&mut self, now: HostTime) {
        Self::advance(self, now);
    }
}

/// A detector wired to a scheduler: geometry in, reveal flags out.
#[derive(Debug)]
pub struct Reveal {
    detector: VisibilityDetector,
    scheduler: RevealScheduler,
}

impl Reveal {
    /// Observes `region` with the policy's detector options and cadence.
    #[must_use]
    pub fn new(region: RegionHandle, policy: RevealPolicy, item_count: usize) -> Self {
        Self::with_options(
            region,
            policy.detector_options(),
            RevealConfig::new(policy, item_count),
        )
    }

    /// Fully custom wiring.
    #[must_use]
    pub fn with_options(
        region: RegionHandle,
        options: DetectorOptions,
        config: RevealConfig,
    ) -> Self {
        Self {
            detector: VisibilityDetector::observe(region, options),
            scheduler: RevealScheduler::new(config),
        }
    }

    /// Feeds a geometry report; starts the pass when the region enters.
    ///
    /// Returns `true` for the report that triggered.
    pub fn report(&mut self, entry: &IntersectionEntry, now: HostTime) -> bool {
        self.report_traced(entry, now, &mut Tracer::none())
    }

    /// Like [`report`](Self::report), with tracing.
    pub fn report_traced(
        &mut self,
        entry: &IntersectionEntry,
        now: HostTime,
        tracer: &mut Tracer<'_>,
    ) -> bool {
        self.detector.report_traced(entry, now, tracer) && self.scheduler.follow(&self.detector)
    }

    /// Fires due reveals.
    pub fn advance(&mut self, now: HostTime) {
        self.scheduler.advance(now);
    }

    /// Like [`advance`](Self::advance), with tracing.
    pub fn advance_traced(&mut self, now: HostTime, tracer: &mut Tracer<'_>) {
        self.scheduler.advance_traced(now, tracer);
    }

    /// Releases the region and cancels pending reveals.
    pub fn teardown(&mut self) {
        self.teardown_traced(&mut Tracer::none());
    }

    /// Like [`teardown`](Self::teardown), with tracing.
    pub fn teardown_traced(&mut self, tracer: &mut Tracer<'_>) {
        self.detector.release_traced(tracer);
        self.scheduler.teardown_traced(tracer);
    }

    /// The bound region.
    #[must_use]
    pub const fn region(&self) -> RegionHandle {
        self.detector.region()
    }

    /// The detector half.
    #[must_use]
    pub const fn detector(&self) -> &VisibilityDetector {
        &self.detector
    }

    /// The reveal flags.
    #[must_use]
    pub fn revealed(&self) -> &RevealSet {
        self.scheduler.revealed()
    }
}

impl Timed for Reveal {
    fn next_deadline(&self) -> Option<HostTime> {
        self.scheduler.next_deadline()
    }

    fn advance(&mut self, now: HostTime) {
        Self::advance(self, now);
    }
}

#[cfg(test)]
mod tests {
    use kurbo::Rect;

    use super::*;

    fn visible() -> IntersectionEntry {
        IntersectionEntry {
            region: Rect::new(0.0, 100.0, 400.0, 300.0),
            viewport: Rect::new(0.0, 0.0, 400.0, 600.0),
        }
    }

    fn hidden() -> IntersectionEntry {
        IntersectionEntry {
            region: Rect::new(0.0, 2000.0, 400.0, 2200.0),
            viewport: Rect::new(0.0, 0.0, 400.0, 600.0),
        }
    }

    #[test]
    fn policies_share_algorithm_but_not_cadence() {
        assert_eq!(RevealPolicy::Sequential.default_delay(), Duration(200));
        assert_eq!(RevealPolicy::Staggered.default_delay(), Duration(100));
        assert_eq!(
            RevealPolicy::Sequential.detector_options().margin.top,
            MarginLength::Px(100.0)
        );
    }

    #[test]
    fn staggered_policy_observes_with_a_narrow_band() {
        assert_eq!(
            RevealPolicy::Staggered.detector_options(),
            DetectorOptions::new(0.1, "50px 0px").unwrap()
        );
        assert_eq!(
            RevealPolicy::Sequential.detector_options(),
            DetectorOptions::new(0.1, "100px 0px").unwrap()
        );
    }

    #[test]
    fn late_follow_keeps_the_entry_time() {
        let mut d = VisibilityDetector::observe(RegionHandle(3), DetectorOptions::scroll_reveal());
        assert!(d.report(&visible(), HostTime(100)));

        let mut s = RevealScheduler::new(RevealConfig::new(RevealPolicy::Staggered, 5));
        assert!(s.follow(&d));
        s.advance(HostTime(500));
        assert!(s.revealed().is_complete(), "last item was due at 500");
        assert!(!s.follow(&d));

        let mut s = RevealScheduler::new(RevealConfig::new(RevealPolicy::Staggered, 5));
        s.follow(&d);
        s.advance(HostTime(250));
        assert_eq!(
            s.revealed().revealed_count(),
            2,
            "items 0 and 1 at 100 and 200"
        );
        assert_eq!(s.next_deadline(), Some(HostTime(300)));
    }

    #[test]
    fn negative_item_count_is_rejected() {
        assert_eq!(
            RevealConfig::from_signed(RevealPolicy::Staggered, -1),
            Err(ConfigError::NegativeItemCount(-1))
        );
        assert_eq!(
            RevealConfig::from_signed(RevealPolicy::Staggered, 3).map(|c| c.item_count),
            Ok(3)
        );
    }

    #[test]
    fn items_reveal_at_multiples_of_the_delay() {
        let mut s = RevealScheduler::new(RevealConfig::new(RevealPolicy::Sequential, 3));
        assert!(s.trigger(HostTime(1000)));
        assert_eq!(s.pending(), 3);

        s.advance(HostTime(1000));
        assert_eq!(s.revealed().as_slice(), &[true, false, false]);
        s.advance(HostTime(1199));
        assert_eq!(s.revealed().as_slice(), &[true, false, false]);
        s.advance(HostTime(1200));
        assert_eq!(s.revealed().as_slice(), &[true, true, false]);
        s.advance(HostTime(1400));
        assert!(s.revealed().is_complete());
        assert_eq!(s.next_deadline(), None);
    }

    #[test]
    fn every_count_completes_after_last_offset() {
        for n in 0..12_usize {
            let config = RevealConfig::new(RevealPolicy::Staggered, n);
            let mut s = RevealScheduler::new(config);
            s.trigger(HostTime(0));

            let mut last = vec![false; n];
            let end = 100 * n.saturating_sub(1) as u64;
            for t in (0..=end).step_by(25) {
                s.advance(HostTime(t));
                for (i, (&was, &now)) in last.iter().zip(s.revealed().as_slice()).enumerate() {
                    assert!(!was || now, "item {i} reverted at t={t}");
                }
                last = s.revealed().as_slice().to_vec();
            }
            assert!(s.revealed().is_complete(), "n={n} incomplete at t={end}");
        }
    }

    #[test]
    fn empty_set_is_vacuously_complete() {
        let mut s = RevealScheduler::new(RevealConfig::new(RevealPolicy::Sequential, 0));
        assert!(s.revealed().is_complete(), "complete before trigger");
        assert!(s.trigger(HostTime(0)));
        assert_eq!(s.pending(), 0, "no timers for N = 0");
    }

    #[test]
    fn trigger_runs_once() {
        let mut s = RevealScheduler::new(RevealConfig::new(RevealPolicy::Staggered, 2));
        assert!(s.trigger(HostTime(0)));
        assert!(!s.trigger(HostTime(50)), "second trigger ignored");
        assert_eq!(s.pending(), 2);
    }

    #[test]
    fn teardown_mid_schedule_freezes_state() {
        let mut s = RevealScheduler::new(RevealConfig::new(RevealPolicy::Sequential, 4));
        s.trigger(HostTime(0));
        s.advance(HostTime(200));
        s.teardown();

        s.advance(HostTime(10_000));
        assert_eq!(s.revealed().as_slice(), &[true, true, false, false]);
        assert_eq!(s.next_deadline(), None);
        assert!(
            !s.trigger(HostTime(20_000)),
            "torn-down scheduler stays inert"
        );
    }

    #[test]
    fn coarse_advance_matches_fine_advance() {
        let config = RevealConfig::new(RevealPolicy::Staggered, 5);
        let mut fine = RevealScheduler::new(config);
        let mut coarse = RevealScheduler::new(config);
        fine.trigger(HostTime(0));
        coarse.trigger(HostTime(0));
        for t in 0..=250 {
            fine.advance(HostTime(t));
        }
        coarse.advance(HostTime(250));
        assert_eq!(fine.revealed(), coarse.revealed());
    }

    #[test]
    fn composite_triggers_from_geometry_once() {
        let mut r = Reveal::new(RegionHandle(7), RevealPolicy::Staggered, 3);
        assert!(!r.report(&hidden(), HostTime(0)));
        assert!(r.report(&visible(), HostTime(500)));
        assert!(!r.report(&hidden(), HostTime(550)));
        assert!(!r.report(&visible(), HostTime(600)), "re-entry ignored");

        r.advance(HostTime(600));
        assert_eq!(r.revealed().as_slice(), &[true, true, false]);
        r.advance(HostTime(700));
        assert!(r.revealed().is_complete());
    }

    #[test]
    fn composite_teardown_releases_region() {
        let mut r = Reveal::new(RegionHandle(1), RevealPolicy::Sequential, 2);
        r.report(&visible(), HostTime(0));
        r.teardown();
        assert!(!r.detector().is_observing());
        r.advance(HostTime(1000));
        assert_eq!(r.revealed().revealed_count(), 0, "no reveal after teardown");
    }
}
