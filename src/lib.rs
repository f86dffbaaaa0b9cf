//! # Rewind
//!
//! An undo/redo engine for mutation-based state stores. The engine watches a
//! host store's mutation notifications, coalesces bursts of edits into single
//! checkpoints, and restores prior or later full-state snapshots on demand.
//!
//! ## Core Concepts
//!
//! - **Checkpoints**: full copies of the store state taken just before a
//!   burst of edits began
//! - **Bursts**: edits less than the debounce window apart, undone as one
//! - **Host store**: anything implementing [`HostStore`]; the engine reads
//!   through a named getter and restores through a named mutation
//! - **Observers**: `can_undo` / `can_redo` flips are broadcast over
//!   bounded channels
//!
//! ## Example
//!
//! ```ignore
//! use rewind::{create_engine, EngineOptions, MemoryStore};
//!
//! let store = Arc::new(
//!     MemoryStore::new(0i64)
//!         .with_undo_hooks("undoRedo", "undoRedo")
//!         .with_mutation("increment", |n, _| { *n += 1; Ok(()) }),
//! );
//! let engine = create_engine(store.clone(), EngineOptions::default())?;
//! let _timers = TimerDriver::spawn(&engine, Duration::from_millis(10));
//!
//! store.commit("increment", None)?;
//! engine.undo()?;
//! assert_eq!(store.state(), 0);
//! ```

pub mod clock;
pub mod cloner;
pub mod debounce;
pub mod driver;
pub mod engine;
pub mod error;
pub mod filter;
pub mod history;
pub mod host;
pub mod options;
pub mod subscriptions;
pub mod types;

// Re-exports
pub use clock::{Clock, ManualClock, SystemClock};
pub use cloner::{JsonRoundTrip, MessagePackRoundTrip, NativeClone, StateCloner};
pub use debounce::{make_debounced, DebounceOptions, Debounced, Debouncer, Edge};
pub use driver::TimerDriver;
pub use engine::{create_engine, Engine, EngineBuilder};
pub use error::{HistoryError, Result};
pub use filter::{MutationClass, MutationFilter, Verdict};
pub use history::{History, SnapshotAction, SnapshotOutcome, SnapshotStrategy, Stack, UndoRedoStacks};
pub use host::{HostStore, MemoryStore, MutationHandler};
pub use options::{EngineOptions, IgnoredMutationPolicy};
pub use subscriptions::{
    DropReason, HistoryEvent, SubscriptionConfig, SubscriptionFilter, SubscriptionHandle,
    SubscriptionId, SubscriptionManager,
};
pub use types::*;
