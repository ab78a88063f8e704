#![forbid(unsafe_code)]

//! Single-deadline deferred task slots.
//!
//! A [`DeferredSlot`] stands in for one cancellable timer handle. It holds at
//! most one pending deadline: scheduling again replaces the previous deadline
//! instead of queueing a second task, and cancelling clears it.
//!
//! Slots never read a clock. The owner passes `now` to
//! [`take_due`](DeferredSlot::take_due) whenever it polls, which keeps every
//! deferral deterministic under test.
//!
//! # Invariants
//!
//! 1. At most one deadline is pending per slot.
//! 2. A deadline fires at most once: `take_due` clears it.
//! 3. After `cancel()` the slot is idle until the next `schedule()`.
//! 4. `generation()` increases on every schedule, so a caller can tell a
//!    rescheduled task from the one it observed earlier.

use web_time::{Duration, Instant};

/// A cancellable, replace-on-reschedule deadline.
#[derive(Debug, Clone, Default)]
pub struct DeferredSlot {
    deadline: Option<Instant>,
    generation: u64,
}

impl DeferredSlot {
    /// Create an idle slot.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            deadline: None,
            generation: 0,
        }
    }

    /// Arm the slot to fire `delay` after `now`.
    ///
    /// Returns `true` if a pending deadline was replaced.
    pub fn schedule(&mut self, now: Instant, delay: Duration) -> bool {
        let replaced = self.deadline.is_some();
        self.deadline = Some(now + delay);
        self.generation = self.generation.wrapping_add(1);
        replaced
    }

    /// Drop any pending deadline.
    ///
    /// Returns `true` if something was pending.
    pub fn cancel(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    /// Whether a deadline is pending.
    #[inline]
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// The pending deadline, if any.
    #[inline]
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Number of times the slot has been armed.
    #[inline]
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether the pending deadline has passed at `now`.
    #[inline]
    #[must_use]
    pub fn is_due(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|deadline| now >= deadline)
    }

    /// Consume the deadline if it has passed at `now`.
    ///
    /// Returns the deadline that fired.
    pub fn take_due(&mut self, now: Instant) -> Option<Instant> {
        if self.is_due(now) {
            self.deadline.take()
        } else {
            None
        }
    }
}
