//! Dual-debounce checkpoint timing.
//!
//! A mutation notification fires after the mutation is applied, so the state
//! visible at that moment is already the new one. To undo it we need the
//! state from before the burst began. Two debouncers share one window:
//!
//! - the leading one fires when a burst starts and asks for the last settled
//!   state to be pushed as a checkpoint;
//! - the trailing one fires when the burst settles and asks for the last
//!   known state to be refreshed for the next burst.

use crate::debounce::{DebounceOptions, Debouncer, Edge};
use std::time::{Duration, Instant};

/// What the history should do in response to the strategy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SnapshotAction {
    /// Push the last known state onto the undo stack.
    CaptureBefore,
    /// Refresh the last known state to the settled state.
    CaptureAfter,
}

#[derive(Clone, Debug)]
pub struct SnapshotStrategy {
    leading: Debouncer,
    trailing: Debouncer,
}

impl SnapshotStrategy {
    pub fn new(delay: Duration) -> Self {
        Self {
            leading: Debouncer::new(delay, DebounceOptions::leading()),
            trailing: Debouncer::new(delay, DebounceOptions::trailing()),
        }
    }

    /// Register one snapshot request.
    ///
    /// An overdue trailing edge from the previous burst is reported before
    /// the new burst's leading edge.
    pub fn snapshot(&mut self, now: Instant) -> Vec<SnapshotAction> {
        let mut actions = Vec::with_capacity(2);

        if self.trailing.poll(now) == Some(Edge::Trailing) {
            actions.push(SnapshotAction::CaptureAfter);
        }
        if self.leading.trigger(now).contains(&Edge::Leading) {
            actions.push(SnapshotAction::CaptureBefore);
        }
        self.trailing.trigger(now);

        actions
    }

    /// Expire timers that are due.
    pub fn poll(&mut self, now: Instant) -> Option<SnapshotAction> {
        self.leading.poll(now);
        self.trailing
            .poll(now)
            .map(|_| SnapshotAction::CaptureAfter)
    }

    /// End the current burst now.
    pub fn flush(&mut self) -> Option<SnapshotAction> {
        self.leading.cancel();
        self.trailing.flush().map(|_| SnapshotAction::CaptureAfter)
    }

    /// Drop both timers without firing.
    pub fn cancel(&mut self) {
        self.leading.cancel();
        self.trailing.cancel();
    }

    /// Whether a trailing refresh is still owed.
    pub fn awaiting_settle(&self) -> bool {
        self.trailing.is_active()
    }

    pub fn is_idle(&self) -> bool {
        !self.leading.is_active() && !self.trailing.is_active()
    }

    /// Earliest pending timer deadline.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.leading.next_deadline(), self.trailing.next_deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }
}
