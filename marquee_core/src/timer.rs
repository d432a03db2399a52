// Copyright 2026 the Marquee Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-instance timer queues.
//!
//! Every timed primitive owns one [`TimerQueue`]. Scheduling a callback
//! returns a [`TimerHandle`]; the handle is not `Clone`, so exactly one owner
//! can cancel the callback it stands for. The host event loop never sees the
//! callbacks themselves: it asks the owner for its
//! [`next_deadline`](TimerQueue::next_deadline) and later calls the owner's
//! `advance(now)`, which drains expired entries with
//! [`pop_expired`](TimerQueue::pop_expired).
//!
//! # Ordering
//!
//! Expired entries come out ordered by deadline, then by registration order.
//! Callbacks registered at the same instant with smaller delays therefore
//! fire no later than those with larger delays, and equal deadlines fire in
//! the order they were scheduled.

use alloc::vec::Vec;

use crate::time::HostTime;

/// Owned token for one pending callback.
///
/// Dropping a handle does **not** cancel the callback; pass it to
/// [`TimerQueue::cancel`] or clear the queue on teardown.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

/// A callback that reached its deadline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Expired<K> {
    /// The instant the callback was scheduled for.
    pub deadline: HostTime,
    /// The logical slot the owner attached to the callback.
    pub key: K,
}

#[derive(Clone, Copy, Debug)]
struct Pending<K> {
    id: u64,
    deadline: HostTime,
    key: K,
}

/// A deadline-ordered set of pending callbacks owned by one instance.
///
/// Not `Clone`: a copy would duplicate callbacks its handles cannot reach.
#[derive(Debug)]
pub struct TimerQueue<K> {
    next_id: u64,
    pending: Vec<Pending<K>>,
}

impl<K> Default for TimerQueue<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> TimerQueue<K> {
    /// Creates an empty queue.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            next_id: 0,
            pending: Vec::new(),
        }
    }

    /// Schedules a callback for `key` at `deadline`.
    pub fn schedule(&mut self, deadline: HostTime, key: K) -> TimerHandle {
        let id = self.next_id;
        self.next_id += 1;
        self.pending.push(Pending { id, deadline, key });
        TimerHandle(id)
    }

    /// Cancels a pending callback.
    ///
    /// Returns `false` if the callback already fired or was already canceled.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        match self.pending.iter().position(|p| p.id == handle.0) {
            Some(idx) => {
                self.pending.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Cancels every pending callback and returns how many there were.
    pub fn clear(&mut self) -> usize {
        let n = self.pending.len();
        self.pending.clear();
        n
    }

    /// Returns the earliest pending deadline.
    #[must_use]
    pub fn next_deadline(&self) -> Option<HostTime> {
        self.pending.iter().map(|p| p.deadline).min()
    }

    /// Number of pending callbacks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Returns `true` when nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl<K: Copy> TimerQueue<K> {
    /// Removes and returns the earliest callback whose deadline is at or
    /// before `now`.
    pub fn pop_expired(&mut self, now: HostTime) -> Option<Expired<K>> {
        let idx = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, p)| p.deadline <= now)
            .min_by_key(|(_, p)| (p.deadline, p.id))
            .map(|(idx, _)| idx)?;
        let p = self.pending.remove(idx);
        Some(Expired {
            deadline: p.deadline,
            key: p.key,
        })
    }
}

/// Whether an instance is still attached to its host.
///
/// Torn-down instances keep answering queries with their last state but
/// never mutate again.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Lifecycle {
    /// Attached; timers may fire.
    #[default]
    Mounted,
    /// Detached; all timers were canceled.
    TornDown,
}

impl Lifecycle {
    /// Returns `true` while mounted.
    #[inline]
    #[must_use]
    pub const fn is_mounted(self) -> bool {
        matches!(self, Self::Mounted)
    }
}
