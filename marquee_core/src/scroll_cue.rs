// Copyright 2026 the Marquee Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame-throttled "scroll down" cue.
//!
//! A [`ScrollCue`] stays visible while the page is scrolled less than
//! `offset` above an anchor section. Scroll events only record the latest
//! offset and request a frame; the visibility decision happens once per
//! frame, so a burst of scroll events between two frames costs one check.

/// Default distance above the anchor at which the cue hides.
pub const DEFAULT_CUE_OFFSET: f64 = 200.0;

/// Scroll cue visibility, decided at most once per frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollCue {
    offset: f64,
    scroll_y: f64,
    frame_pending: bool,
    visible: bool,
}

impl Default for ScrollCue {
    fn default() -> Self {
        Self::new(DEFAULT_CUE_OFFSET)
    }
}

impl ScrollCue {
    /// A visible cue at the top of the page.
    #[must_use]
    pub const fn new(offset: f64) -> Self {
        Self {
            offset,
            scroll_y: 0.0,
            frame_pending: false,
            visible: true,
        }
    }

    /// Records a scroll event.
    ///
    /// Returns `true` when the host must request an animation frame; while a
    /// frame is already pending, further events only update the offset.
    pub fn on_scroll(&mut self, scroll_y: f64) -> bool {
        self.scroll_y = scroll_y;
        if self.frame_pending {
            return false;
        }
        self.frame_pending = true;
        true
    }

    /// Runs the pending frame against the anchor's current top.
    ///
    /// A missing anchor keeps the previous visibility. Returns the
    /// visibility after the frame.
    pub fn on_frame(&mut self, anchor_top: Option<f64>) -> bool {
        if !self.frame_pending {
            return self.visible;
        }
        self.frame_pending = false;
        if let Some(top) = anchor_top {
            self.visible = self.scroll_y < top - self.offset;
        }
        self.visible
    }

    /// Current visibility.
    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.visible
    }

    /// Returns `true` while a frame has been requested but not yet run.
    #[must_use]
    pub const fn is_frame_pending(&self) -> bool {
        self.frame_pending
    }

    /// Last recorded scroll offset.
    #[must_use]
    pub const fn scroll_y(&self) -> f64 {
        self.scroll_y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bursts_request_one_frame() {
        let mut cue = ScrollCue::default();
        assert!(cue.on_scroll(10.0));
        assert!(!cue.on_scroll(20.0));
        assert!(!cue.on_scroll(30.0));
        assert!(cue.is_frame_pending());
        cue.on_frame(Some(1000.0));
        assert!(!cue.is_frame_pending());
        assert!(
            cue.on_scroll(40.0),
            "next event after the frame requests again"
        );
    }

    #[test]
    fn frame_uses_latest_offset() {
        let mut cue = ScrollCue::default();
        cue.on_scroll(100.0);
        cue.on_scroll(850.0);
        assert!(!cue.on_frame(Some(1000.0)), "850 is past 1000 - 200");
    }

    #[test]
    fn boundary_hides_the_cue() {
        let mut cue = ScrollCue::default();
        cue.on_scroll(799.0);
        assert!(cue.on_frame(Some(1000.0)));
        cue.on_scroll(800.0);
        assert!(
            !cue.on_frame(Some(1000.0)),
            "strictly less than is required"
        );
        cue.on_scroll(0.0);
        assert!(cue.on_frame(Some(1000.0)), "scrolling back shows it again");
    }

    #[test]
    fn missing_anchor_keeps_visibility() {
        let mut cue = ScrollCue::default();
        cue.on_scroll(5000.0);
        assert!(cue.on_frame(None));
        assert!(cue.is_visible());
    }

    #[test]
    fn frame_without_request_is_a_no_op() {
        let mut cue = ScrollCue::new(0.0);
        assert!(cue.on_frame(Some(-10.0)), "no frame was pending");
    }
}
