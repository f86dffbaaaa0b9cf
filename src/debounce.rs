//! Leading/trailing-edge debouncing.
//!
//! [`Debouncer`] is a deterministic state machine: callers feed it the
//! current time on every trigger and every timer poll, and it answers with
//! the edges that fire. Nothing runs in the background; whoever owns the
//! debouncer decides when to poll (see [`crate::TimerDriver`]).
//!
//! [`Debounced`] wraps a debouncer together with a callback and a clock for
//! the common "call this at most once per burst" use.
//!
//! # Example
//!
//! ```ignore
//! let clock = Arc::new(ManualClock::new());
//! let mut save = make_debounced(|| println!("saved"), Duration::from_millis(50),
//!     DebounceOptions::trailing(), clock.clone());
//! save.trigger();
//! save.trigger();
//! clock.advance_ms(60);
//! save.poll(); // prints "saved" once
//! ```

use crate::clock::Clock;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Which edges of a burst invoke the callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DebounceOptions {
    pub leading: bool,
    pub trailing: bool,
}

impl DebounceOptions {
    /// Fire once when a burst starts.
    pub const fn leading() -> Self {
        Self {
            leading: true,
            trailing: false,
        }
    }

    /// Fire once when a burst settles.
    pub const fn trailing() -> Self {
        Self {
            leading: false,
            trailing: true,
        }
    }

    /// Fire on both edges.
    pub const fn both() -> Self {
        Self {
            leading: true,
            trailing: true,
        }
    }
}

impl Default for DebounceOptions {
    fn default() -> Self {
        Self::trailing()
    }
}

/// An edge of a burst at which the callback fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Edge {
    Leading,
    Trailing,
}

/// Burst-coalescing state machine.
///
/// A burst starts with the first trigger after the debouncer was idle and
/// ends once `delay` has elapsed without a further trigger. With both edges
/// enabled, a burst of a single trigger fires only the leading edge.
#[derive(Clone, Debug)]
pub struct Debouncer {
    delay: Duration,
    options: DebounceOptions,
    /// When the current burst settles. `None` while idle.
    deadline: Option<Instant>,
    /// Whether the trailing edge owes a call when the burst settles.
    pending_trailing: bool,
}

impl Debouncer {
    pub fn new(delay: Duration, options: DebounceOptions) -> Self {
        Self {
            delay,
            options,
            deadline: None,
            pending_trailing: false,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn options(&self) -> DebounceOptions {
        self.options
    }

    /// Whether a burst is in progress.
    pub fn is_active(&self) -> bool {
        self.deadline.is_some()
    }

    /// When the current burst will settle, if one is in progress.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Register a trigger at `now`.
    ///
    /// Returns the edges that fire, in order. A previous burst whose
    /// deadline already passed is settled first, so its trailing edge can
    /// precede the new burst's leading edge.
    pub fn trigger(&mut self, now: Instant) -> Vec<Edge> {
        let mut fired: Vec<Edge> = self.poll(now).into_iter().collect();

        let burst_start = self.deadline.is_none();
        self.deadline = Some(now + self.delay);

        if burst_start && self.options.leading {
            fired.push(Edge::Leading);
        } else if self.options.trailing {
            self.pending_trailing = true;
        }

        fired
    }

    /// Expire the current burst if its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<Edge> {
        match self.deadline {
            Some(deadline) if now >= deadline => self.finish(),
            _ => None,
        }
    }

    /// End the current burst immediately, as if its deadline had passed.
    pub fn flush(&mut self) -> Option<Edge> {
        if self.deadline.is_some() {
            self.finish()
        } else {
            None
        }
    }

    /// Drop the current burst without firing anything.
    pub fn cancel(&mut self) {
        self.deadline = None;
        self.pending_trailing = false;
    }

    fn finish(&mut self) -> Option<Edge> {
        self.deadline = None;
        if std::mem::take(&mut self.pending_trailing) {
            Some(Edge::Trailing)
        } else {
            None
        }
    }
}

/// A debounced callback bound to a clock.
pub struct Debounced<F: FnMut()> {
    debouncer: Debouncer,
    clock: Arc<dyn Clock>,
    callback: F,
}

impl<F: FnMut()> Debounced<F> {
    /// Register a call. The callback runs now if this opens a burst with the
    /// leading edge enabled.
    pub fn trigger(&mut self) {
        let now = self.clock.now();
        for _ in self.debouncer.trigger(now) {
            (self.callback)();
        }
    }

    /// Run the trailing edge if the burst has settled. Returns whether the
    /// callback ran.
    pub fn poll(&mut self) -> bool {
        let now = self.clock.now();
        if self.debouncer.poll(now).is_some() {
            (self.callback)();
            true
        } else {
            false
        }
    }

    /// Run any owed trailing call right away.
    pub fn flush(&mut self) -> bool {
        if self.debouncer.flush().is_some() {
            (self.callback)();
            true
        } else {
            false
        }
    }

    /// Stop the pending timer; no further call is owed.
    pub fn cancel(&mut self) {
        self.debouncer.cancel();
    }

    pub fn is_pending(&self) -> bool {
        self.debouncer.is_active()
    }
}

/// Build a debounced callback.
pub fn make_debounced<F: FnMut()>(
    callback: F,
    delay: Duration,
    options: DebounceOptions,
    clock: Arc<dyn Clock>,
) -> Debounced<F> {
    Debounced {
        debouncer: Debouncer::new(delay, options),
        clock,
        callback,
    }
}
