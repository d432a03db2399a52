// Copyright 2026 the Marquee Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Blinking cursor shared by the text engines.

use crate::time::{Duration, HostTime};
use crate::timer::{TimerHandle, TimerQueue};

/// Default blink interval.
pub const DEFAULT_BLINK: Duration = Duration::from_millis(500);

/// A cursor that toggles on its own fixed interval.
///
/// The cursor lives in its owner's [`TimerQueue`] under a dedicated slot key,
/// independent of whatever cadence the owner steps text at. It starts visible.
#[derive(Debug)]
pub(crate) struct CursorBlink {
    interval: Duration,
    visible: bool,
    handle: Option<TimerHandle>,
}

impl CursorBlink {
    pub(crate) const fn new(interval: Duration) -> Self {
        Self {
            interval,
            visible: true,
            handle: None,
        }
    }

    /// Arms the first toggle one interval after `now`.
    pub(crate) fn start<K>(&mut self, timers: &mut TimerQueue<K>, now: HostTime, slot: K) {
        if let Some(old) = self.handle.take() {
            timers.cancel(old);
        }
        self.handle = Some(timers.schedule(now + self.interval, slot));
    }

    /// Handles the expired toggle and re-arms relative to its deadline.
    ///
    /// Returns the new visibility.
    pub(crate) fn on_expired<K>(
        &mut self,
        timers: &mut TimerQueue<K>,
        deadline: HostTime,
        slot: K,
    ) -> bool {
        self.visible = !self.visible;
        self.handle = Some(timers.schedule(deadline + self.interval, slot));
        self.visible
    }

    pub(crate) const fn is_visible(&self) -> bool {
        self.visible
    }
}
