// Copyright 2026 the Marquee Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! One-shot viewport entry detection.
//!
//! A [`VisibilityDetector`] is bound to one region of the host surface. The
//! host reports geometry through [`IntersectionEntry`] values; the first
//! report in which the region intersects the margin-expanded viewport by at
//! least the configured threshold fires the detector's one-shot signal.
//! After that the detector ignores geometry entirely: scrolling the region
//! back out never un-reveals it and scrolling it in again never re-triggers.
//!
//! # Geometry
//!
//! The visible fraction is `area(region ∩ root) / area(region)`, where `root`
//! is the viewport grown by the [`RootMargin`]. Edge-adjacent rectangles
//! count as intersecting; a zero-area region counts as fully visible when it
//! touches the root.

use core::fmt;
use core::str::FromStr;

use kurbo::Rect;

use crate::error::ConfigError;
use crate::oneshot::OneShot;
use crate::time::HostTime;
use crate::trace::{SourceKind, TeardownEvent, Tracer, TriggerEvent};

/// Default visible fraction required to trigger.
pub const DEFAULT_THRESHOLD: f64 = 0.2;

/// Identifies the region a detector is bound to.
///
/// Hosts assign these; the detector passes them through without
/// interpreting the value.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct RegionHandle(pub u32);

impl fmt::Debug for RegionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RegionHandle({})", self.0)
    }
}

// ---------------------------------------------------------------------------
// Root margin
// ---------------------------------------------------------------------------

/// One side of a [`RootMargin`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MarginLength {
    /// Absolute offset in surface units.
    Px(f64),
    /// Percentage of the viewport extent along the side's axis.
    Percent(f64),
}

impl MarginLength {
    fn resolve(self, extent: f64) -> f64 {
        match self {
            Self::Px(v) => v,
            Self::Percent(p) => extent * p / 100.0,
        }
    }
}

impl FromStr for MarginLength {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse = |num: &str| {
            num.parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or(ConfigError::InvalidMargin)
        };
        if let Some(num) = s.strip_suffix("px") {
            parse(num).map(Self::Px)
        } else if let Some(num) = s.strip_suffix('%') {
            parse(num).map(Self::Percent)
        } else if parse(s)? == 0.0 {
            Ok(Self::Px(0.0))
        } else {
            Err(ConfigError::InvalidMargin)
        }
    }
}

/// Offsets that grow (or, when negative, shrink) the viewport before the
/// intersection test.
///
/// Parsed from the CSS margin shorthand: `"50px"`, `"50px 0px"`,
/// `"10px 5% 20px"`, `"1px 2px 3px 4px"`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RootMargin {
    /// Offset above the viewport.
    pub top: MarginLength,
    /// Offset right of the viewport.
    pub right: MarginLength,
    /// Offset below the viewport.
    pub bottom: MarginLength,
    /// Offset left of the viewport.
    pub left: MarginLength,
}

impl RootMargin {
    /// No margin.
    pub const ZERO: Self = Self::uniform(MarginLength::Px(0.0));

    /// The default margin, `50px` on every side.
    pub const DEFAULT: Self = Self::uniform(MarginLength::Px(50.0));

    /// The same offset on all four sides.
    #[must_use]
    pub const fn uniform(len: MarginLength) -> Self {
        Self {
            top: len,
            right: len,
            bottom: len,
            left: len,
        }
    }

    /// Vertical offset above and below, horizontal offset left and right.
    #[must_use]
    pub const fn symmetric(vertical: MarginLength, horizontal: MarginLength) -> Self {
        Self {
            top: vertical,
            right: horizontal,
            bottom: vertical,
            left: horizontal,
        }
    }

    /// Returns `viewport` grown by this margin.
    #[must_use]
    pub fn expand(&self, viewport: Rect) -> Rect {
        let viewport = viewport.abs();
        let (w, h) = (viewport.width(), viewport.height());
        Rect::new(
            viewport.x0 - self.left.resolve(w),
            viewport.y0 - self.top.resolve(h),
            viewport.x1 + self.right.resolve(w),
            viewport.y1 + self.bottom.resolve(h),
        )
    }
}

impl Default for RootMargin {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl FromStr for RootMargin {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut values = [MarginLength::Px(0.0); 4];
        let mut n = 0;
        for part in s.split_ascii_whitespace() {
            if n == 4 {
                return Err(ConfigError::InvalidMargin);
            }
            values[n] = part.parse()?;
            n += 1;
        }
        let [a, b, c, d] = values;
        match n {
            1 => Ok(Self::uniform(a)),
            2 => Ok(Self::symmetric(a, b)),
            3 => Ok(Self {
                top: a,
                right: b,
                bottom: c,
                left: b,
            }),
            4 => Ok(Self {
                top: a,
                right: b,
                bottom: c,
                left: d,
            }),
            _ => Err(ConfigError::InvalidMargin),
        }
    }
}

// ---------------------------------------------------------------------------
// Options and geometry
// ---------------------------------------------------------------------------

/// Configuration for a [`VisibilityDetector`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DetectorOptions {
    /// Minimum visible fraction of the region, `0.0..=1.0`.
    pub threshold: f64,
    /// Viewport growth applied before testing.
    pub margin: RootMargin,
}

impl DetectorOptions {
    /// Validates a threshold and parses a margin string.
    pub fn new(threshold: f64, margin: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            threshold: check_threshold(threshold)?,
            margin: margin.parse()?,
        })
    }

    /// Options for standalone scroll reveals: `0.2` and `"50px 0px"`.
    #[must_use]
    pub const fn scroll_reveal() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            margin: RootMargin::symmetric(MarginLength::Px(50.0), MarginLength::Px(0.0)),
        }
    }

    /// Returns a copy with a different threshold.
    pub fn with_threshold(self, threshold: f64) -> Result<Self, ConfigError> {
        Ok(Self {
            threshold: check_threshold(threshold)?,
            ..self
        })
    }

    /// Returns a copy with a different margin.
    #[must_use]
    pub const fn with_margin(self, margin: RootMargin) -> Self {
        Self { margin, ..self }
    }
}

impl Default for DetectorOptions {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            margin: RootMargin::DEFAULT,
        }
    }
}

fn check_threshold(threshold: f64) -> Result<f64, ConfigError> {
    if (0.0..=1.0).contains(&threshold) {
        Ok(threshold)
    } else {
        Err(ConfigError::InvalidThreshold(threshold))
    }
}

/// One geometry report from the host.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IntersectionEntry {
    /// Current bounds of the observed region.
    pub region: Rect,
    /// Current viewport bounds, in the same coordinate space.
    pub viewport: Rect,
}

impl IntersectionEntry {
    /// Returns the visible fraction of the region against `root`, or `None`
    /// when the two do not touch.
    #[must_use]
    pub fn visible_ratio(&self, margin: &RootMargin) -> Option<f64> {
        let root = margin.expand(self.viewport);
        let region = self.region.abs();
        let x0 = region.x0.max(root.x0);
        let y0 = region.y0.max(root.y0);
        let x1 = region.x1.min(root.x1);
        let y1 = region.y1.min(root.y1);
        if x0 > x1 || y0 > y1 {
            return None;
        }
        let area = region.area();
        if area <= 0.0 {
            return Some(1.0);
        }
        Some(((x1 - x0) * (y1 - y0) / area).min(1.0))
    }
}

// ---------------------------------------------------------------------------
// Detector
// ---------------------------------------------------------------------------

/// Snapshot of a detector's flags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct VisibilityState {
    /// The region has entered the viewport.
    pub has_entered: bool,
    /// The one-shot signal has fired; never reset.
    pub has_triggered: bool,
}

/// Reports, exactly once, that its region entered the viewport.
#[derive(Clone, Debug)]
pub struct VisibilityDetector {
    region: RegionHandle,
    options: DetectorOptions,
    signal: OneShot,
    observing: bool,
}

impl VisibilityDetector {
    /// Starts observing `region`.
    #[must_use]
    pub fn observe(region: RegionHandle, options: DetectorOptions) -> Self {
        Self {
            region,
            options,
            signal: OneShot::new(),
            observing: true,
        }
    }

    /// Feeds one geometry report.
    ///
    /// Returns `true` only for the report that fired the signal.
    pub fn report(&mut self, entry: &IntersectionEntry, now: HostTime) -> bool {
        self.report_traced(entry, now, &mut Tracer::none())
    }

    /// Like [`report`](Self::report), emitting a [`TriggerEvent`] on fire.
    pub fn report_traced(
        &mut self,
        entry: &IntersectionEntry,
        now: HostTime,
        tracer: &mut Tracer<'_>,
    ) -> bool {
        if !self.observing || self.signal.is_fired() {
            return false;
        }
        let Some(ratio) = entry.visible_ratio(&self.options.margin) else {
            return false;
        };
        if ratio < self.options.threshold || !self.signal.fire(now) {
            return false;
        }
        tracer.trigger(&TriggerEvent {
            region: self.region,
            at: now,
            ratio,
        });
        true
    }

    /// Stops observing. The trigger state is kept as-is.
    pub fn release(&mut self) {
        self.release_traced(&mut Tracer::none());
    }

    /// Like [`release`](Self::release), emitting a [`TeardownEvent`].
    pub fn release_traced(&mut self, tracer: &mut Tracer<'_>) {
        if !self.observing {
            return;
        }
        self.observing = false;
        tracer.teardown(&TeardownEvent {
            source: SourceKind::Detector,
            canceled_timers: 0,
        });
    }

    /// The bound region.
    #[must_use]
    pub const fn region(&self) -> RegionHandle {
        self.region
    }

    /// The configured options.
    #[must_use]
    pub const fn options(&self) -> &DetectorOptions {
        &self.options
    }

    /// Returns `true` once the region has entered.
    #[must_use]
    pub const fn has_entered(&self) -> bool {
        self.signal.is_fired()
    }

    /// Instant of entry, if it happened.
    #[must_use]
    pub const fn entered_at(&self) -> Option<HostTime> {
        self.signal.fired_at()
    }

    /// Returns `true` until [`release`](Self::release).
    #[must_use]
    pub const fn is_observing(&self) -> bool {
        self.observing
    }

    /// Both flags at once.
    #[must_use]
    pub const fn state(&self) -> VisibilityState {
        let fired = self.signal.is_fired();
        VisibilityState {
            has_entered: fired,
            has_triggered: fired,
        }
    }
}
