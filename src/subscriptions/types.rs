//! Subscription types for engine change notifications.

use crate::types::Direction;
use serde::{Deserialize, Serialize};

/// Configuration for a subscription.
#[derive(Clone, Debug)]
pub struct SubscriptionConfig {
    /// Max buffered events before dropping subscriber.
    /// Default: 256
    pub buffer_size: usize,

    /// Filter criteria.
    pub filter: SubscriptionFilter,
}

impl Default for SubscriptionConfig {
    fn default() -> Self {
        Self {
            buffer_size: 256,
            filter: SubscriptionFilter::availability(),
        }
    }
}

/// Filter criteria for subscriptions.
#[derive(Clone, Debug, Default)]
pub struct SubscriptionFilter {
    /// `can_undo` / `can_redo` flips.
    pub include_availability: bool,

    /// Checkpoints, restores, and resets.
    pub include_history: bool,

    /// Suspend, resume, and destroy.
    pub include_lifecycle: bool,
}

impl SubscriptionFilter {
    /// Only the reactive `can_undo` / `can_redo` flags.
    pub fn availability() -> Self {
        Self {
            include_availability: true,
            ..Default::default()
        }
    }

    /// Stack movements.
    pub fn history() -> Self {
        Self {
            include_history: true,
            ..Default::default()
        }
    }

    /// Engine state transitions.
    pub fn lifecycle() -> Self {
        Self {
            include_lifecycle: true,
            ..Default::default()
        }
    }

    /// Subscribe to everything.
    pub fn all() -> Self {
        Self {
            include_availability: true,
            include_history: true,
            include_lifecycle: true,
        }
    }

    pub(crate) fn matches(&self, event: &HistoryEvent) -> bool {
        match event {
            HistoryEvent::CanUndoChanged { .. } | HistoryEvent::CanRedoChanged { .. } => {
                self.include_availability
            }
            HistoryEvent::CheckpointPushed { .. }
            | HistoryEvent::Restored { .. }
            | HistoryEvent::Reset => self.include_history,
            HistoryEvent::Suspended | HistoryEvent::Resumed | HistoryEvent::Destroyed => {
                self.include_lifecycle
            }
            // Addressed to a single subscriber, never broadcast.
            HistoryEvent::Dropped { .. } => false,
        }
    }
}

/// Events emitted by subscriptions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HistoryEvent {
    // --- Availability ---
    CanUndoChanged {
        can_undo: bool,
    },

    CanRedoChanged {
        can_redo: bool,
    },

    // --- History ---
    /// A checkpoint was pushed onto the undo stack.
    CheckpointPushed {
        undo_len: usize,
    },

    /// The store adopted a state from one of the stacks.
    Restored {
        direction: Direction,
        undo_len: usize,
        redo_len: usize,
    },

    /// Both stacks were cleared.
    Reset,

    // --- Lifecycle ---
    Suspended,

    Resumed,

    Destroyed,

    /// Subscription was dropped.
    Dropped {
        reason: DropReason,
    },
}

/// Why a subscription was dropped.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    /// Send buffer overflowed (slow consumer).
    BufferOverflow,
    /// Explicitly unsubscribed.
    Unsubscribed,
    /// The engine was destroyed.
    EngineDestroyed,
}

/// Unique identifier for a subscription.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// Handle to manage a subscription.
pub struct SubscriptionHandle {
    pub id: SubscriptionId,
    /// Channel to receive events.
    pub receiver: crossbeam_channel::Receiver<HistoryEvent>,
}

impl SubscriptionHandle {
    /// Receive the next event (blocking).
    pub fn recv(&self) -> Result<HistoryEvent, crossbeam_channel::RecvError> {
        self.receiver.recv()
    }

    /// Try to receive an event (non-blocking).
    pub fn try_recv(&self) -> Result<HistoryEvent, crossbeam_channel::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Receive with timeout.
    pub fn recv_timeout(
        &self,
        timeout: std::time::Duration,
    ) -> Result<HistoryEvent, crossbeam_channel::RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }

    /// Everything currently buffered.
    pub fn drain(&self) -> Vec<HistoryEvent> {
        self.receiver.try_iter().collect()
    }
}
