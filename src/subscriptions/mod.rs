//! Change notifications for engine observers.
//!
//! UI bindings that need to react to `can_undo` / `can_redo` subscribe here
//! instead of polling. Each subscriber gets a bounded channel; a subscriber
//! that stops draining it is dropped rather than blocking the engine.
//!
//! # Example
//!
//! ```ignore
//! let handle = engine.subscribe(SubscriptionConfig::default());
//!
//! loop {
//!     match handle.recv() {
//!         Ok(HistoryEvent::CanUndoChanged { can_undo }) => undo_button.set_enabled(can_undo),
//!         Ok(HistoryEvent::CanRedoChanged { can_redo }) => redo_button.set_enabled(can_redo),
//!         Ok(HistoryEvent::Dropped { .. }) | Err(_) => break,
//!         Ok(_) => {}
//!     }
//! }
//! ```

mod manager;
mod types;

pub use manager::SubscriptionManager;
pub use types::{
    DropReason, HistoryEvent, SubscriptionConfig, SubscriptionFilter, SubscriptionHandle,
    SubscriptionId,
};
