//! Snapshot history: the undo/redo stacks, the last known state, and the
//! timing strategy that decides when a checkpoint is taken.
//!
//! [`History`] never talks to a host. The engine reads and clones host state
//! and hands the copies in; the history only decides where they go.

mod snapshot;
mod stacks;

pub use snapshot::{SnapshotAction, SnapshotStrategy};
pub use stacks::{Stack, UndoRedoStacks};

use std::time::{Duration, Instant};

/// What a call to [`History::snapshot`] did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SnapshotOutcome {
    /// A checkpoint was pushed onto the undo stack.
    pub checkpoint: bool,
    /// The last known state was missing and the history was reset instead.
    pub recovered: bool,
    /// An overdue burst was settled first.
    pub settled: bool,
}

/// Undo/redo history for one store.
#[derive(Clone, Debug)]
pub struct History<S> {
    stacks: UndoRedoStacks<S>,
    /// State as of the end of the last settled burst.
    last_known: Option<S>,
    /// State observed at the latest notification of the current burst.
    /// Becomes `last_known` when the burst settles.
    pending_after: Option<S>,
    strategy: SnapshotStrategy,
}

impl<S: Clone + PartialEq> History<S> {
    pub fn new(stack_size: usize, debounce: Duration) -> Self {
        Self {
            stacks: UndoRedoStacks::new(stack_size),
            last_known: None,
            pending_after: None,
            strategy: SnapshotStrategy::new(debounce),
        }
    }

    /// Record an undoable change. `current` is a detached copy of the store
    /// state after the change.
    pub fn snapshot(&mut self, now: Instant, current: S) -> SnapshotOutcome {
        let mut outcome = SnapshotOutcome::default();

        for action in self.strategy.snapshot(now) {
            match action {
                SnapshotAction::CaptureAfter => {
                    self.capture_after();
                    outcome.settled = true;
                }
                SnapshotAction::CaptureBefore => match self.capture_before() {
                    Some(pushed) => outcome.checkpoint = pushed,
                    None => {
                        tracing::warn!("No last known state at burst start; resetting history");
                        self.reset_stacks(current.clone());
                        outcome.recovered = true;
                    }
                },
            }
        }

        self.pending_after = Some(current);
        outcome
    }

    /// Whether a change that is not itself checkpointed should still be
    /// recorded as the burst's settled state.
    pub fn awaiting_settle(&self) -> bool {
        self.strategy.awaiting_settle()
    }

    /// Refresh the pending settled state without opening a burst.
    pub fn observe(&mut self, current: S) {
        if self.awaiting_settle() {
            self.pending_after = Some(current);
        }
    }

    /// Expire due timers. Returns whether the last known state moved.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.strategy.poll(now) {
            Some(SnapshotAction::CaptureAfter) => {
                self.capture_after();
                true
            }
            _ => false,
        }
    }

    /// End the current burst immediately.
    pub fn settle(&mut self) -> bool {
        match self.strategy.flush() {
            Some(SnapshotAction::CaptureAfter) => {
                self.capture_after();
                true
            }
            _ => false,
        }
    }

    /// Clear both stacks, drop pending timers, and start over from `current`.
    pub fn reset(&mut self, current: S) {
        self.strategy.cancel();
        self.reset_stacks(current);
    }

    /// Drop pending timers without firing them.
    pub fn cancel_timers(&mut self) {
        self.strategy.cancel();
        self.pending_after = None;
    }

    /// Clear the redo stack. Returns whether anything was dropped.
    pub fn clear_redo(&mut self) -> bool {
        let had = self.stacks.can_redo();
        self.stacks.redo.clear();
        had
    }

    /// Clear everything, including the last known state.
    pub fn release(&mut self) {
        self.strategy.cancel();
        self.stacks.clear();
        self.last_known = None;
        self.pending_after = None;
    }

    /// Move the top of the undo stack into place. `current` is the state
    /// being replaced, which becomes the newest redo entry.
    ///
    /// Call only after the host accepted the restored state.
    pub fn apply_undo(&mut self, current: S) -> bool {
        let Some(restored) = self.stacks.undo.pop() else {
            return false;
        };
        self.stacks.redo.push(current);
        self.adopt(restored);
        true
    }

    /// Mirror of [`History::apply_undo`] for the redo stack.
    pub fn apply_redo(&mut self, current: S) -> bool {
        let Some(restored) = self.stacks.redo.pop() else {
            return false;
        };
        self.stacks.undo.push(current);
        self.adopt(restored);
        true
    }

    pub fn peek_undo(&self) -> Option<&S> {
        self.stacks.undo.top()
    }

    pub fn peek_redo(&self) -> Option<&S> {
        self.stacks.redo.top()
    }

    pub fn can_undo(&self) -> bool {
        self.stacks.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.stacks.can_redo()
    }

    pub fn undo_len(&self) -> usize {
        self.stacks.undo.len()
    }

    pub fn redo_len(&self) -> usize {
        self.stacks.redo.len()
    }

    /// Undo entries, oldest first.
    pub fn undo_entries(&self) -> &[S] {
        self.stacks.undo.as_slice()
    }

    /// Redo entries, oldest first (the next redo is last).
    pub fn redo_entries(&self) -> &[S] {
        self.stacks.redo.as_slice()
    }

    pub fn last_known(&self) -> Option<&S> {
        self.last_known.as_ref()
    }

    /// The newest state this history has seen: the pending burst's state if
    /// one is still settling, else the last known state.
    pub fn latest_observed(&self) -> Option<&S> {
        self.pending_after.as_ref().or(self.last_known.as_ref())
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.strategy.next_deadline()
    }

    /// Push the last known state unless it equals the current top.
    /// `None` when there is no last known state.
    fn capture_before(&mut self) -> Option<bool> {
        let last_known = self.last_known.as_ref()?;
        if self.stacks.undo.top() == Some(last_known) {
            return Some(false);
        }

        let evicted = self.stacks.undo.push(last_known.clone());
        tracing::debug!(
            undo_len = self.stacks.undo.len(),
            evicted,
            "Checkpoint pushed"
        );
        Some(true)
    }

    fn capture_after(&mut self) {
        if let Some(settled) = self.pending_after.take() {
            self.last_known = Some(settled);
        }
    }

    fn reset_stacks(&mut self, current: S) {
        self.stacks.clear();
        self.last_known = Some(current);
        self.pending_after = None;
    }

    fn adopt(&mut self, restored: S) {
        self.last_known = Some(restored);
        self.cancel_timers();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_millis(50);

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn started(stack_size: usize, initial: i32) -> History<i32> {
        let mut history = History::new(stack_size, DELAY);
        history.reset(initial);
        history
    }

    #[test]
    fn test_burst_pushes_pre_burst_state_once() {
        let t0 = Instant::now();
        let mut h = started(10, 0);

        let outcome = h.snapshot(t0, 1);
        assert!(outcome.checkpoint);
        h.snapshot(t0 + ms(10), 2);
        h.snapshot(t0 + ms(20), 3);
        assert_eq!(h.undo_entries(), &[0]);
        assert_eq!(h.last_known(), Some(&0));

        assert!(h.poll(t0 + ms(70)));
        assert_eq!(h.last_known(), Some(&3));
        assert_eq!(h.undo_entries(), &[0]);
    }

    #[test]
    fn test_consecutive_bursts_push_each_settled_state() {
        let t0 = Instant::now();
        let mut h = started(10, 0);

        h.snapshot(t0, 1);
        h.poll(t0 + ms(60));
        h.snapshot(t0 + ms(60), 2);
        h.poll(t0 + ms(120));
        h.snapshot(t0 + ms(120), 3);
        h.poll(t0 + ms(180));

        assert_eq!(h.undo_entries(), &[0, 1, 2]);
        assert_eq!(h.last_known(), Some(&3));
    }

    #[test]
    fn test_overdue_timer_uses_state_seen_during_burst() {
        let t0 = Instant::now();
        let mut h = started(10, 0);

        h.snapshot(t0, 1);
        // Nobody polled; the next burst finds the old one overdue.
        let outcome = h.snapshot(t0 + ms(500), 2);
        assert!(outcome.settled);
        assert!(outcome.checkpoint);
        assert_eq!(h.undo_entries(), &[0, 1]);
    }

    #[test]
    fn test_identical_state_not_pushed_twice() {
        let t0 = Instant::now();
        let mut h = started(10, 0);

        h.snapshot(t0, 0);
        h.poll(t0 + ms(60));
        let outcome = h.snapshot(t0 + ms(60), 0);
        assert!(!outcome.checkpoint);
        assert_eq!(h.undo_entries(), &[0]);
    }

    #[test]
    fn test_capacity_keeps_most_recent() {
        let t0 = Instant::now();
        let mut h = started(2, 0);

        for i in 1..=3 {
            let at = t0 + ms(60 * (i as u64 - 1));
            h.snapshot(at, i);
            h.poll(at + ms(60));
        }
        assert_eq!(h.undo_entries(), &[1, 2]);
    }

    #[test]
    fn test_missing_last_known_resets() {
        let t0 = Instant::now();
        let mut h: History<i32> = History::new(10, DELAY);

        let outcome = h.snapshot(t0, 5);
        assert!(outcome.recovered);
        assert!(!outcome.checkpoint);
        assert!(!h.can_undo());
        assert_eq!(h.last_known(), Some(&5));
    }

    #[test]
    fn test_undo_redo_moves_between_stacks() {
        let t0 = Instant::now();
        let mut h = started(10, 0);
        h.snapshot(t0, 1);
        h.poll(t0 + ms(60));

        assert!(h.apply_undo(1));
        assert_eq!(h.last_known(), Some(&0));
        assert_eq!(h.redo_entries(), &[1]);
        assert!(!h.can_undo());

        assert!(h.apply_redo(0));
        assert_eq!(h.last_known(), Some(&1));
        assert_eq!(h.undo_entries(), &[0]);
        assert!(!h.can_redo());
    }

    #[test]
    fn test_apply_on_empty_is_refused() {
        let mut h = started(10, 0);
        assert!(!h.apply_undo(1));
        assert!(!h.apply_redo(1));
        assert_eq!(h.redo_len(), 0);
        assert_eq!(h.undo_len(), 0);
    }

    #[test]
    fn test_restore_opens_fresh_burst() {
        let t0 = Instant::now();
        let mut h = started(10, 0);
        h.snapshot(t0, 1);
        h.poll(t0 + ms(60));
        h.snapshot(t0 + ms(60), 2);

        // Undo in the middle of a burst cancels it.
        assert!(h.apply_undo(2));
        assert_eq!(h.last_known(), Some(&1));
        assert!(h.next_deadline().is_none());

        // An edit right after the undo still checkpoints.
        let outcome = h.snapshot(t0 + ms(61), 9);
        assert!(outcome.checkpoint);
        assert_eq!(h.undo_entries(), &[0, 1]);
    }

    #[test]
    fn test_observe_only_while_settling() {
        let t0 = Instant::now();
        let mut h = started(10, 0);

        h.observe(7);
        h.poll(t0 + ms(100));
        assert_eq!(h.last_known(), Some(&0));

        h.snapshot(t0, 1);
        h.observe(7);
        h.poll(t0 + ms(60));
        assert_eq!(h.last_known(), Some(&7));
    }

    #[test]
    fn test_latest_observed_prefers_unsettled_burst() {
        let t0 = Instant::now();
        let mut h = started(10, 0);
        assert_eq!(h.latest_observed(), Some(&0));

        h.snapshot(t0, 1);
        assert_eq!(h.last_known(), Some(&0));
        assert_eq!(h.latest_observed(), Some(&1));

        h.poll(t0 + ms(60));
        assert_eq!(h.latest_observed(), Some(&1));

        h.release();
        assert_eq!(h.latest_observed(), None);
    }

    #[test]
    fn test_settle_and_release() {
        let t0 = Instant::now();
        let mut h = started(10, 0);
        h.snapshot(t0, 1);
        assert!(h.settle());
        assert_eq!(h.last_known(), Some(&1));
        assert!(!h.settle());

        h.release();
        assert!(!h.can_undo());
        assert_eq!(h.last_known(), None);
    }
}
