//! Deep-copying of host state into stored snapshots.
//!
//! A snapshot must never alias live state. For plain owned data `Clone` is
//! already a deep copy, but state that shares interior through `Arc`/`Rc`
//! clones shallowly; the serde-based cloners sever that sharing by round
//! tripping through an encoded form.

use crate::error::{HistoryError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Produces a detached copy of a state value.
pub trait StateCloner<S>: Send + Sync {
    fn clone_state(&self, state: &S) -> Result<S>;
}

/// Copies with `Clone`. Never fails.
#[derive(Clone, Copy, Debug, Default)]
pub struct NativeClone;

impl<S: Clone> StateCloner<S> for NativeClone {
    fn clone_state(&self, state: &S) -> Result<S> {
        Ok(state.clone())
    }
}

/// Copies through a JSON encoding.
///
/// Fails on values JSON cannot represent, such as maps with non-string keys
/// or non-finite floats.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonRoundTrip;

impl<S: Serialize + DeserializeOwned> StateCloner<S> for JsonRoundTrip {
    fn clone_state(&self, state: &S) -> Result<S> {
        let encoded =
            serde_json::to_vec(state).map_err(|e| HistoryError::CloneFailure(e.to_string()))?;
        serde_json::from_slice(&encoded).map_err(|e| HistoryError::CloneFailure(e.to_string()))
    }
}

/// Copies through a MessagePack encoding.
///
/// Keeps integer and float types distinct and handles non-string map keys.
#[derive(Clone, Copy, Debug, Default)]
pub struct MessagePackRoundTrip;

impl<S: Serialize + DeserializeOwned> StateCloner<S> for MessagePackRoundTrip {
    fn clone_state(&self, state: &S) -> Result<S> {
        let encoded =
            rmp_serde::to_vec_named(state).map_err(|e| HistoryError::CloneFailure(e.to_string()))?;
        rmp_serde::from_slice(&encoded).map_err(|e| HistoryError::CloneFailure(e.to_string()))
    }
}
