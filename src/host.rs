//! The host store the engine observes and commands.
//!
//! [`HostStore`] is the seam between the engine and whatever owns the live
//! state. [`MemoryStore`] is a small in-process host with named mutations and
//! getters, useful on its own and as the reference for implementing the trait.

use crate::error::{HistoryError, Result};
use crate::types::{HandlerId, Mutation};
use parking_lot::{ReentrantMutex, RwLock};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Callback run synchronously after every committed mutation.
///
/// An error from a handler is reported to whoever made the commit.
pub type MutationHandler = Arc<dyn Fn(&Mutation) -> Result<()> + Send + Sync>;

/// A mutation-based state store.
pub trait HostStore: Send + Sync + 'static {
    type State: Send + 'static;

    /// Read the current state through the named getter.
    fn read_state(&self, getter: &str) -> Result<Self::State>;

    /// Replace the whole state through the named mutation.
    ///
    /// `Err` means the state was not adopted. Subscribers are notified
    /// synchronously before this returns.
    fn commit_state(&self, mutator: &str, state: Self::State) -> Result<()>;

    /// Register a handler for mutation notifications.
    fn subscribe(&self, handler: MutationHandler) -> HandlerId;

    /// Remove a handler. Unknown ids are ignored.
    fn unsubscribe(&self, id: HandlerId);

    /// Run `f` with every other writer held off, so a read followed by a
    /// commit inside `f` cannot lose an interleaved commit. Must be
    /// re-entrant on the calling thread, and a host commit must hold the
    /// same exclusion while it notifies subscribers.
    ///
    /// The default excludes nothing; hosts written to from one thread need
    /// not override it.
    fn exclusive<R>(&self, f: impl FnOnce() -> R) -> R
    where
        Self: Sized,
    {
        f()
    }
}

type MutationFn<S> = Arc<dyn Fn(&mut S, Option<&serde_json::Value>) -> Result<()> + Send + Sync>;
type GetterFn<S> = Arc<dyn Fn(&S) -> S + Send + Sync>;

/// In-process host store.
///
/// Mutations run against a copy of the state and are swapped in only when
/// they succeed. Handlers run after the swap with no state locks held, so
/// they may read from or commit to the store. Commits from different threads
/// are serialized, notifications included.
pub struct MemoryStore<S> {
    /// Held by a commit until its handlers have run.
    writer: ReentrantMutex<()>,
    state: RwLock<S>,
    mutations: RwLock<HashMap<String, MutationFn<S>>>,
    /// Mutations that replace the whole state with their argument.
    replacers: RwLock<HashSet<String>>,
    getters: RwLock<HashMap<String, GetterFn<S>>>,
    handlers: RwLock<BTreeMap<HandlerId, MutationHandler>>,
    next_id: AtomicU64,
}

impl<S: Clone + Send + Sync + 'static> MemoryStore<S> {
    pub fn new(initial: S) -> Self {
        Self {
            writer: ReentrantMutex::new(()),
            state: RwLock::new(initial),
            mutations: RwLock::new(HashMap::new()),
            replacers: RwLock::new(HashSet::new()),
            getters: RwLock::new(HashMap::new()),
            handlers: RwLock::new(BTreeMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Register the replace mutation and identity getter under the names
    /// an engine with default options uses.
    pub fn with_undo_hooks(self, mutator: &str, getter: &str) -> Self {
        self.with_replace(mutator).with_getter(getter, |s: &S| s.clone())
    }

    /// Register a named mutation.
    pub fn with_mutation<F>(self, name: &str, mutation: F) -> Self
    where
        F: Fn(&mut S, Option<&serde_json::Value>) -> Result<()> + Send + Sync + 'static,
    {
        self.mutations
            .write()
            .insert(name.to_string(), Arc::new(mutation));
        self
    }

    /// Register a full-state replacement mutation.
    pub fn with_replace(self, name: &str) -> Self {
        self.replacers.write().insert(name.to_string());
        self
    }

    /// Register a named getter.
    pub fn with_getter<F>(self, name: &str, getter: F) -> Self
    where
        F: Fn(&S) -> S + Send + Sync + 'static,
    {
        self.getters.write().insert(name.to_string(), Arc::new(getter));
        self
    }

    /// Commit a named mutation.
    ///
    /// Returns the mutation's error if it failed (state untouched), or the
    /// first handler error once every handler has run.
    pub fn commit(&self, name: &str, payload: Option<serde_json::Value>) -> Result<()> {
        let _writer = self.writer.lock();
        let mutation = self
            .mutations
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| HistoryError::HostCommit(format!("Unknown mutation: {}", name)))?;

        {
            let mut state = self.state.write();
            let mut next = state.clone();
            mutation(&mut next, payload.as_ref())?;
            *state = next;
        }

        self.notify(&Mutation {
            identifier: name.to_string(),
            payload,
        })
    }

    /// A copy of the live state.
    pub fn state(&self) -> S {
        self.state.read().clone()
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.read().len()
    }

    /// Run every handler; report the first failure.
    fn notify(&self, mutation: &Mutation) -> Result<()> {
        let handlers: Vec<MutationHandler> = self.handlers.read().values().cloned().collect();

        let mut first_error = None;
        for handler in handlers {
            if let Err(e) = handler(mutation) {
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl<S: Clone + Send + Sync + 'static> HostStore for MemoryStore<S> {
    type State = S;

    fn read_state(&self, getter: &str) -> Result<S> {
        let getter = self
            .getters
            .read()
            .get(getter)
            .cloned()
            .ok_or_else(|| HistoryError::HostRead(format!("Unknown getter: {}", getter)))?;
        let state = self.state.read();
        Ok(getter(&state))
    }

    fn commit_state(&self, mutator: &str, state: S) -> Result<()> {
        let _writer = self.writer.lock();
        if !self.replacers.read().contains(mutator) {
            return Err(HistoryError::HostCommit(format!(
                "No replace mutation named {}",
                mutator
            )));
        }

        *self.state.write() = state;

        // The state is adopted at this point; a failing subscriber does not
        // undo that.
        if let Err(e) = self.notify(&Mutation::new(mutator)) {
            tracing::warn!(mutator, "Subscriber failed on state replacement: {e}");
        }
        Ok(())
    }

    fn subscribe(&self, handler: MutationHandler) -> HandlerId {
        let id = HandlerId(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.handlers.write().insert(id, handler);
        id
    }

    fn unsubscribe(&self, id: HandlerId) {
        self.handlers.write().remove(&id);
    }

    fn exclusive<R>(&self, f: impl FnOnce() -> R) -> R {
        let _writer = self.writer.lock();
        f()
    }
}
