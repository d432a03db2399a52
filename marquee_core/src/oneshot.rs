// Copyright 2026 the Marquee Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Write-once signals.
//!
//! A [`OneShot`] moves from [`Idle`](OneShotState::Idle) to
//! [`Fired`](OneShotState::Fired) at most once. The only way in is
//! [`fire`](OneShot::fire), which reports whether *this* call performed the
//! transition; there is no way back.

use crate::time::HostTime;

/// State of a [`OneShot`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum OneShotState {
    /// Not fired yet.
    #[default]
    Idle,
    /// Fired at the given instant.
    Fired(HostTime),
}

/// A signal that can transition false→true exactly once.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct OneShot {
    state: OneShotState,
}

impl OneShot {
    /// Creates an idle signal.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: OneShotState::Idle,
        }
    }

    /// Fires the signal.
    ///
    /// Returns `true` only for the call that moved it out of `Idle`.
    pub fn fire(&mut self, at: HostTime) -> bool {
        match self.state {
            OneShotState::Idle => {
                self.state = OneShotState::Fired(at);
                true
            }
            OneShotState::Fired(_) => false,
        }
    }

    /// Returns `true` once fired.
    #[inline]
    #[must_use]
    pub const fn is_fired(&self) -> bool {
        matches!(self.state, OneShotState::Fired(_))
    }

    /// The instant the signal fired, if it has.
    #[must_use]
    pub const fn fired_at(&self) -> Option<HostTime> {
        match self.state {
            OneShotState::Fired(t) => Some(t),
            OneShotState::Idle => None,
        }
    }

    /// Returns the current state.
    #[must_use]
    pub const fn state(&self) -> OneShotState {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_first_fire_transitions() {
        let mut s = OneShot::new();
        assert!(!s.is_fired());
        assert!(s.fire(HostTime(10)));
        assert!(!s.fire(HostTime(20)), "second fire must be ignored");
        assert_eq!(s.fired_at(), Some(HostTime(10)), "first instant is kept");
    }
}
