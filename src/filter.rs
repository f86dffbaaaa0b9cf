//! Classification of host mutation notifications.

use crate::options::{EngineOptions, IgnoredMutationPolicy};
use crate::types::Mutation;
use std::collections::HashSet;

/// How a notification relates to tracked history.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MutationClass {
    /// Caused by the engine's own restore commit.
    SelfInflicted,
    /// Listed in `ignore_mutations`.
    Ignorable,
    /// A forward edit that belongs in history.
    Undoable,
}

/// What the engine must do for one notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Verdict {
    pub class: MutationClass,
    /// Drop redo history, immediately and synchronously.
    pub clear_redo: bool,
    /// Feed the snapshot strategy.
    pub snapshot: bool,
}

/// Classifies notifications against the engine's options.
#[derive(Clone, Debug)]
pub struct MutationFilter {
    mutator: String,
    ignored: HashSet<String>,
    policy: IgnoredMutationPolicy,
}

impl MutationFilter {
    pub fn new(options: &EngineOptions) -> Self {
        Self {
            mutator: options.mutator_identifier.clone(),
            ignored: options.ignore_mutations.clone(),
            policy: options.ignored_policy,
        }
    }

    pub fn classify(&self, mutation: &Mutation) -> MutationClass {
        if mutation.identifier == self.mutator {
            MutationClass::SelfInflicted
        } else if self.ignored.contains(&mutation.identifier) {
            MutationClass::Ignorable
        } else {
            MutationClass::Undoable
        }
    }

    pub fn verdict(&self, mutation: &Mutation) -> Verdict {
        let class = self.classify(mutation);
        let (clear_redo, snapshot) = match class {
            MutationClass::SelfInflicted => (false, false),
            MutationClass::Ignorable => (self.policy == IgnoredMutationPolicy::InvalidateRedo, false),
            MutationClass::Undoable => (true, true),
        };
        Verdict {
            class,
            clear_redo,
            snapshot,
        }
    }

    pub fn policy(&self) -> IgnoredMutationPolicy {
        self.policy
    }
}
