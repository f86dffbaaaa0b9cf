//! Core types shared by the engine and its host.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A mutation notification delivered by the host store after a commit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Mutation {
    /// Name of the committed mutation (e.g., "increment", "undoRedo").
    pub identifier: String,

    /// Payload passed to the mutation, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
}

impl Mutation {
    /// Create a mutation notification without a payload.
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            payload: None,
        }
    }

    /// Create a mutation notification carrying a payload.
    pub fn with_payload(identifier: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            identifier: identifier.into(),
            payload: Some(payload),
        }
    }
}

/// Identifier of a mutation handler registered with a host store.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct HandlerId(pub u64);

impl fmt::Debug for HandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HandlerId({})", self.0)
    }
}

impl fmt::Display for HandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle of an engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineState {
    /// Producing checkpoints on undoable mutations.
    Active,
    /// Still subscribed, but not producing checkpoints.
    Suspended,
    /// Unsubscribed and released. Terminal.
    Destroyed,
}

impl EngineState {
    pub fn is_destroyed(self) -> bool {
        matches!(self, EngineState::Destroyed)
    }
}

/// Which way a restore moved through history.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Undo,
    Redo,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Undo => write!(f, "undo"),
            Direction::Redo => write!(f, "redo"),
        }
    }
}
