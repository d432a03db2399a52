// Copyright 2026 the Marquee Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host event-loop contract.
//!
//! Primitives never run on their own. A host drives them by asking for the
//! next deadline and calling `advance` when it arrives. [`Timed`] is the
//! trait all timed primitives implement so hosts and test doubles can drive
//! a heterogeneous set generically.
//!
//! # Event loop pseudocode
//!
//! ```rust,ignore
//! loop {
//!     let Some(at) = items.iter().filter_map(|t| t.next_deadline()).min() else { break };
//!     sleep_until(at);
//!     for item in &mut items { item.advance(at); }
//!     render(&items);
//! }
//! ```
//!
//! [`run_until`] does the same against a virtual clock.

use crate::time::HostTime;

/// Something that owns timers and can be advanced to a host time.
pub trait Timed {
    /// Earliest pending deadline, or `None` when idle or torn down.
    fn next_deadline(&self) -> Option<HostTime>;

    /// Processes every callback due at or before `now`.
    ///
    /// Each callback observes its own deadline, so one late call reaches the
    /// same state as many punctual ones.
    fn advance(&mut self, now: HostTime);
}

/// Dispatches deadlines across `items` in global time order up to `until`,
/// then advances everything to `until`.
///
/// Returns the number of dispatch rounds. Items with equal deadlines are
/// advanced in slice order.
pub fn run_until(items: &mut [&mut dyn Timed], until: HostTime) -> usize {
    let mut rounds = 0;
    while let Some(at) = items
        .iter()
        .filter_map(|item| item.next_deadline())
        .filter(|&at| at <= until)
        .min()
    {
        for item in items.iter_mut() {
            if item.next_deadline().is_some_and(|d| d <= at) {
                item.advance(at);
            }
        }
        rounds += 1;
    }
    for item in items.iter_mut() {
        item.advance(until);
    }
    rounds
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use super::*;
    use crate::reveal::{RevealConfig, RevealPolicy, RevealScheduler};

    struct Probe {
        deadlines: Vec<HostTime>,
        seen: Vec<HostTime>,
    }

    impl Timed for Probe {
        fn next_deadline(&self) -> Option<HostTime> {
            self.deadlines.first().copied()
        }

        fn advance(&mut self, now: HostTime) {
            while self.deadlines.first().is_some_and(|&d| d <= now) {
                self.deadlines.remove(0);
                self.seen.push(now);
            }
        }
    }

    #[test]
    fn dispatches_each_deadline_at_its_own_time() {
        let mut a = Probe {
            deadlines: [HostTime(10), HostTime(30)].into(),
            seen: Vec::new(),
        };
        let mut b = Probe {
            deadlines: [HostTime(20)].into(),
            seen: Vec::new(),
        };
        let rounds = run_until(&mut [&mut a, &mut b], HostTime(25));
        assert_eq!(rounds, 2);
        assert_eq!(a.seen, [HostTime(10)], "30 is beyond the horizon");
        assert_eq!(b.seen, [HostTime(20)]);
    }

    #[test]
    fn drives_real_schedulers() {
        let mut s = RevealScheduler::new(RevealConfig::new(RevealPolicy::Staggered, 4));
        s.trigger(HostTime(0));
        run_until(&mut [&mut s], HostTime(1000));
        assert!(s.revealed().is_complete());
    }
}
