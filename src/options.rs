//! Engine configuration.

use crate::error::{HistoryError, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::time::Duration;

/// Default undo stack capacity.
const DEFAULT_STACK_SIZE: usize = 10;

/// Default burst-coalescing window in milliseconds.
const DEFAULT_DEBOUNCE_MS: u64 = 1000;

/// Default name of the host mutation that adopts a restored state, and of
/// the getter that reads the current state.
const DEFAULT_IDENTIFIER: &str = "undoRedo";

/// What an ignored (but real) mutation does to the redo stack.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IgnoredMutationPolicy {
    /// The document changed outside tracked history, so redo is invalidated.
    InvalidateRedo,
    /// The mutation is inert; redo history survives it.
    #[default]
    PreserveRedo,
}

/// Options for an engine.
///
/// Every field is optional when parsed from JSON; unknown fields are rejected.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct EngineOptions {
    /// Undo stack capacity. Oldest checkpoints are evicted first.
    pub stack_size: usize,

    /// Burst-coalescing window in milliseconds.
    pub debounce_time: u64,

    /// Mutation identifiers that never create a checkpoint.
    pub ignore_mutations: HashSet<String>,

    /// Host mutation used to commit a restored state.
    #[serde(alias = "mutator")]
    pub mutator_identifier: String,

    /// Host getter used to read the current state.
    #[serde(alias = "getter")]
    pub state_getter_identifier: String,

    /// Redo handling for mutations in `ignore_mutations`. By default they
    /// neither checkpoint nor touch the redo stack.
    pub ignored_policy: IgnoredMutationPolicy,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            stack_size: DEFAULT_STACK_SIZE,
            debounce_time: DEFAULT_DEBOUNCE_MS,
            ignore_mutations: HashSet::new(),
            mutator_identifier: DEFAULT_IDENTIFIER.to_string(),
            state_getter_identifier: DEFAULT_IDENTIFIER.to_string(),
            ignored_policy: IgnoredMutationPolicy::default(),
        }
    }
}

impl EngineOptions {
    /// Parse options from JSON, e.g. `{"stackSize": 2, "debounceTime": 50}`.
    pub fn from_json(json: &str) -> Result<Self> {
        let options: EngineOptions = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    /// Check invariants that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.stack_size == 0 {
            return Err(HistoryError::invalid_option("stackSize", "must be >= 1"));
        }
        if self.mutator_identifier.is_empty() {
            return Err(HistoryError::invalid_option(
                "mutatorIdentifier",
                "must not be empty",
            ));
        }
        if self.state_getter_identifier.is_empty() {
            return Err(HistoryError::invalid_option(
                "stateGetterIdentifier",
                "must not be empty",
            ));
        }
        Ok(())
    }

    /// The debounce window as a `Duration`.
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_time)
    }

    pub fn with_stack_size(mut self, stack_size: usize) -> Self {
        self.stack_size = stack_size;
        self
    }

    pub fn with_debounce_time(mut self, millis: u64) -> Self {
        self.debounce_time = millis;
        self
    }

    /// Add a mutation identifier to the ignore set.
    pub fn ignore(mut self, identifier: impl Into<String>) -> Self {
        self.ignore_mutations.insert(identifier.into());
        self
    }

    pub fn with_mutator(mut self, identifier: impl Into<String>) -> Self {
        self.mutator_identifier = identifier.into();
        self
    }

    pub fn with_getter(mut self, identifier: impl Into<String>) -> Self {
        self.state_getter_identifier = identifier.into();
        self
    }

    pub fn with_ignored_policy(mut self, policy: IgnoredMutationPolicy) -> Self {
        self.ignored_policy = policy;
        self
    }
}
