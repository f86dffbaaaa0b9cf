//! The engine: wires a host store to a snapshot history.

use crate::clock::{Clock, SystemClock};
use crate::cloner::{NativeClone, StateCloner};
use crate::driver::TimerTarget;
use crate::error::{HistoryError, Result};
use crate::filter::{MutationClass, MutationFilter};
use crate::history::History;
use crate::host::{HostStore, MutationHandler};
use crate::options::EngineOptions;
use crate::subscriptions::{
    DropReason, HistoryEvent, SubscriptionConfig, SubscriptionHandle, SubscriptionId,
    SubscriptionManager,
};
use crate::types::{Direction, EngineState, HandlerId, Mutation};
use parking_lot::{Mutex, ReentrantMutex};
use std::sync::{Arc, Weak};
use std::time::Instant;

/// Create an engine with the system clock and `Clone`-based snapshots.
pub fn create_engine<H>(store: Arc<H>, options: EngineOptions) -> Result<Engine<H>>
where
    H: HostStore,
    H::State: Clone + PartialEq,
{
    EngineBuilder::new(store).options(options).build()
}

/// Builder for engines that need a custom clock or cloner.
pub struct EngineBuilder<H: HostStore, C = NativeClone> {
    store: Arc<H>,
    options: EngineOptions,
    clock: Arc<dyn Clock>,
    cloner: C,
}

impl<H: HostStore> EngineBuilder<H, NativeClone> {
    pub fn new(store: Arc<H>) -> Self {
        Self {
            store,
            options: EngineOptions::default(),
            clock: Arc::new(SystemClock),
            cloner: NativeClone,
        }
    }
}

impl<H: HostStore, C> EngineBuilder<H, C> {
    pub fn options(mut self, options: EngineOptions) -> Self {
        self.options = options;
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn cloner<C2>(self, cloner: C2) -> EngineBuilder<H, C2> {
        EngineBuilder {
            store: self.store,
            options: self.options,
            clock: self.clock,
            cloner,
        }
    }

    /// Validate options, take the initial snapshot, and subscribe to the
    /// store.
    pub fn build(self) -> Result<Engine<H, C>>
    where
        H::State: Clone + PartialEq,
        C: StateCloner<H::State> + 'static,
    {
        self.options.validate()?;

        let inner = Arc::new(EngineInner {
            filter: MutationFilter::new(&self.options),
            core: Mutex::new(Core {
                history: History::new(self.options.stack_size, self.options.debounce()),
                state: EngineState::Active,
            }),
            store: self.store,
            cloner: self.cloner,
            clock: self.clock,
            options: self.options,
            op_lock: ReentrantMutex::new(()),
            handler: Mutex::new(None),
            subscriptions: SubscriptionManager::new(),
        });

        let initial = inner.capture()?;
        inner.core.lock().history.reset(initial);

        let weak = Arc::downgrade(&inner);
        let handler: MutationHandler = Arc::new(move |mutation: &Mutation| match weak.upgrade() {
            Some(inner) => inner.on_mutation(mutation),
            None => Ok(()),
        });
        let id = inner.store.subscribe(handler);
        *inner.handler.lock() = Some(id);

        tracing::debug!(
            stack_size = inner.options.stack_size,
            debounce_ms = inner.options.debounce_time,
            "Engine attached"
        );
        Ok(Engine { inner })
    }
}

/// Undo/redo engine attached to one host store.
///
/// Dropping the engine destroys it.
pub struct Engine<H: HostStore, C = NativeClone>
where
    H::State: Clone + PartialEq,
    C: StateCloner<H::State> + 'static,
{
    inner: Arc<EngineInner<H, C>>,
}

impl<H, C> Engine<H, C>
where
    H: HostStore,
    H::State: Clone + PartialEq,
    C: StateCloner<H::State> + 'static,
{
    /// Restore the newest checkpoint. Returns `Ok(false)` when there is
    /// nothing to undo.
    pub fn undo(&self) -> Result<bool> {
        self.inner.restore(Direction::Undo)
    }

    /// Re-apply the most recently undone state. Returns `Ok(false)` when
    /// there is nothing to redo.
    pub fn redo(&self) -> Result<bool> {
        self.inner.restore(Direction::Redo)
    }

    /// Clear both stacks and start history from the current store state.
    pub fn reset(&self) -> Result<()> {
        self.inner.reset()
    }

    /// Stop creating checkpoints. Redo invalidation keeps working.
    pub fn suspend(&self) -> Result<()> {
        self.inner.suspend()
    }

    /// Start creating checkpoints again, capturing whatever changed while
    /// suspended as one checkpoint.
    pub fn resume(&self) -> Result<()> {
        self.inner.resume()
    }

    /// Unsubscribe from the store and release history. Idempotent.
    pub fn destroy(&self) {
        self.inner.destroy()
    }

    /// Fire debounce timers that are due. Returns whether the last known
    /// state moved.
    pub fn tick(&self) -> bool {
        self.inner.tick().unwrap_or(false)
    }

    /// End the current burst now; the next edit opens a new checkpoint.
    pub fn settle(&self) -> bool {
        self.inner.settle()
    }

    pub fn can_undo(&self) -> bool {
        self.inner.core.lock().history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.inner.core.lock().history.can_redo()
    }

    pub fn undo_len(&self) -> usize {
        self.inner.core.lock().history.undo_len()
    }

    pub fn redo_len(&self) -> usize {
        self.inner.core.lock().history.redo_len()
    }

    /// Copies of the undo stack, oldest first.
    pub fn undo_snapshots(&self) -> Vec<H::State> {
        self.inner.core.lock().history.undo_entries().to_vec()
    }

    /// Copies of the redo stack, oldest first (the next redo is last).
    pub fn redo_snapshots(&self) -> Vec<H::State> {
        self.inner.core.lock().history.redo_entries().to_vec()
    }

    pub fn last_known(&self) -> Option<H::State> {
        self.inner.core.lock().history.last_known().cloned()
    }

    pub fn state(&self) -> EngineState {
        self.inner.core.lock().state
    }

    /// When the pending burst will settle, if any.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.inner.core.lock().history.next_deadline()
    }

    pub fn options(&self) -> &EngineOptions {
        &self.inner.options
    }

    pub fn store(&self) -> &Arc<H> {
        &self.inner.store
    }

    /// Receive change notifications. On a destroyed engine the handle is
    /// already closed: it yields one `Dropped` event and then disconnects.
    pub fn subscribe(&self, config: SubscriptionConfig) -> SubscriptionHandle {
        self.inner.subscribe(config)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.inner.subscriptions.unsubscribe(id)
    }

    pub(crate) fn timer_target(&self) -> Weak<dyn TimerTarget> {
        let weak: Weak<EngineInner<H, C>> = Arc::downgrade(&self.inner);
        weak
    }
}

impl<H, C> Drop for Engine<H, C>
where
    H: HostStore,
    H::State: Clone + PartialEq,
    C: StateCloner<H::State> + 'static,
{
    fn drop(&mut self) {
        self.inner.destroy();
    }
}

impl<H, C> std::fmt::Debug for Engine<H, C>
where
    H: HostStore,
    H::State: Clone + PartialEq,
    C: StateCloner<H::State> + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let core = self.inner.core.lock();
        f.debug_struct("Engine")
            .field("state", &core.state)
            .field("undo_len", &core.history.undo_len())
            .field("redo_len", &core.history.redo_len())
            .field("subscribers", &self.inner.subscriptions.subscription_count())
            .finish()
    }
}

struct Core<S> {
    history: History<S>,
    state: EngineState,
}

/// Snapshot of the two reactive flags, for change detection.
#[derive(Clone, Copy, PartialEq, Eq)]
struct Availability {
    can_undo: bool,
    can_redo: bool,
}

impl Availability {
    fn of<S: Clone + PartialEq>(history: &History<S>) -> Self {
        Self {
            can_undo: history.can_undo(),
            can_redo: history.can_redo(),
        }
    }

    fn changes(self, after: Availability, events: &mut Vec<HistoryEvent>) {
        if self.can_undo != after.can_undo {
            events.push(HistoryEvent::CanUndoChanged {
                can_undo: after.can_undo,
            });
        }
        if self.can_redo != after.can_redo {
            events.push(HistoryEvent::CanRedoChanged {
                can_redo: after.can_redo,
            });
        }
    }
}

struct EngineInner<H: HostStore, C> {
    store: Arc<H>,
    cloner: C,
    clock: Arc<dyn Clock>,
    options: EngineOptions,
    filter: MutationFilter,
    /// Serializes operations. Re-entrant: a restore's commit notifies this
    /// engine on the same thread before returning.
    op_lock: ReentrantMutex<()>,
    /// Never held across a host call.
    core: Mutex<Core<H::State>>,
    handler: Mutex<Option<HandlerId>>,
    subscriptions: SubscriptionManager,
}

impl<H, C> EngineInner<H, C>
where
    H: HostStore,
    H::State: Clone + PartialEq,
    C: StateCloner<H::State>,
{
    /// Read and detach the current store state.
    fn capture(&self) -> Result<H::State> {
        let live = self
            .store
            .read_state(&self.options.state_getter_identifier)?;
        self.cloner.clone_state(&live).map_err(|e| {
            tracing::error!("Snapshot failed: {e}");
            e
        })
    }

    /// Run `f` on the core, then publish what changed.
    fn with_core<T>(&self, f: impl FnOnce(&mut Core<H::State>, &mut Vec<HistoryEvent>) -> T) -> T {
        let mut events = Vec::new();
        let result = {
            let mut core = self.core.lock();
            let before = Availability::of(&core.history);
            let result = f(&mut core, &mut events);
            before.changes(Availability::of(&core.history), &mut events);
            result
        };
        for event in events {
            self.subscriptions.broadcast(event);
        }
        result
    }

    fn engine_state(&self) -> EngineState {
        self.core.lock().state
    }

    fn ensure_live(&self) -> Result<EngineState> {
        match self.engine_state() {
            EngineState::Destroyed => Err(HistoryError::Destroyed),
            state => Ok(state),
        }
    }

    fn on_mutation(&self, mutation: &Mutation) -> Result<()> {
        let _op = self.op_lock.lock();

        let verdict = self.filter.verdict(mutation);
        tracing::trace!(
            identifier = %mutation.identifier,
            class = ?verdict.class,
            "Mutation observed"
        );

        if verdict.class == MutationClass::SelfInflicted {
            return Ok(());
        }

        let (state, awaiting_settle) = self.with_core(|core, _| {
            if verdict.clear_redo && core.state != EngineState::Destroyed {
                core.history.clear_redo();
            }
            (core.state, core.history.awaiting_settle())
        });

        if state != EngineState::Active {
            return Ok(());
        }
        if !verdict.snapshot && !awaiting_settle {
            return Ok(());
        }

        let current = self.capture()?;
        let now = self.clock.now();

        self.with_core(|core, events| {
            if verdict.snapshot {
                let outcome = core.history.snapshot(now, current);
                if outcome.recovered {
                    events.push(HistoryEvent::Reset);
                }
                if outcome.checkpoint {
                    events.push(HistoryEvent::CheckpointPushed {
                        undo_len: core.history.undo_len(),
                    });
                }
            } else {
                core.history.observe(current);
            }
        });
        Ok(())
    }

    fn restore(&self, direction: Direction) -> Result<bool> {
        // Host writers first, then the op lock: the order a host commit
        // takes them in before notifying us.
        self.store.exclusive(|| self.restore_exclusive(direction))
    }

    fn restore_exclusive(&self, direction: Direction) -> Result<bool> {
        let _op = self.op_lock.lock();
        self.ensure_live()?;

        // Copy the target out; the stacks stay untouched until the host
        // has accepted it.
        let target = {
            let core = self.core.lock();
            let top = match direction {
                Direction::Undo => core.history.peek_undo(),
                Direction::Redo => core.history.peek_redo(),
            };
            match top {
                Some(state) => self.cloner.clone_state(state)?,
                None => return Ok(false),
            }
        };
        let current = self.capture()?;

        self.store
            .commit_state(&self.options.mutator_identifier, target)?;

        self.with_core(|core, events| {
            let applied = match direction {
                Direction::Undo => core.history.apply_undo(current),
                Direction::Redo => core.history.apply_redo(current),
            };
            if applied {
                tracing::debug!(
                    %direction,
                    undo_len = core.history.undo_len(),
                    redo_len = core.history.redo_len(),
                    "State restored"
                );
                events.push(HistoryEvent::Restored {
                    direction,
                    undo_len: core.history.undo_len(),
                    redo_len: core.history.redo_len(),
                });
            }
            applied
        });
        Ok(true)
    }

    fn reset(&self) -> Result<()> {
        let _op = self.op_lock.lock();
        self.ensure_live()?;

        let current = self.capture()?;
        self.with_core(|core, events| {
            core.history.reset(current);
            events.push(HistoryEvent::Reset);
        });
        tracing::debug!("History reset");
        Ok(())
    }

    fn suspend(&self) -> Result<()> {
        let _op = self.op_lock.lock();
        self.with_core(|core, events| match core.state {
            EngineState::Destroyed => Err(HistoryError::Destroyed),
            EngineState::Suspended => Ok(()),
            EngineState::Active => {
                core.state = EngineState::Suspended;
                events.push(HistoryEvent::Suspended);
                tracing::debug!("Checkpoints suspended");
                Ok(())
            }
        })
    }

    fn resume(&self) -> Result<()> {
        let _op = self.op_lock.lock();
        if self.ensure_live()? == EngineState::Active {
            return Ok(());
        }

        // Read before flipping state so a failed read leaves us suspended.
        let current = self.capture()?;
        let now = self.clock.now();

        self.with_core(|core, events| {
            core.state = EngineState::Active;
            events.push(HistoryEvent::Resumed);

            core.history.poll(now);
            if core.history.latest_observed() != Some(&current) {
                let outcome = core.history.snapshot(now, current);
                if outcome.checkpoint {
                    events.push(HistoryEvent::CheckpointPushed {
                        undo_len: core.history.undo_len(),
                    });
                }
            }
        });
        tracing::debug!("Checkpoints resumed");
        Ok(())
    }

    fn destroy(&self) {
        let _op = self.op_lock.lock();

        if let Some(id) = self.handler.lock().take() {
            self.store.unsubscribe(id);
        }

        let destroyed = self.with_core(|core, events| {
            if core.state.is_destroyed() {
                return false;
            }
            core.state = EngineState::Destroyed;
            core.history.release();
            events.push(HistoryEvent::Destroyed);
            true
        });

        if destroyed {
            self.subscriptions.close_all(DropReason::EngineDestroyed);
            tracing::debug!("Engine destroyed");
        }
    }

    fn subscribe(&self, config: SubscriptionConfig) -> SubscriptionHandle {
        let _op = self.op_lock.lock();
        let handle = self.subscriptions.subscribe(config);
        if self.engine_state().is_destroyed() {
            self.subscriptions.close(handle.id, DropReason::EngineDestroyed);
        }
        handle
    }

    /// `None` once destroyed.
    fn tick(&self) -> Option<bool> {
        let _op = self.op_lock.lock();
        let now = self.clock.now();
        let mut core = self.core.lock();
        if core.state.is_destroyed() {
            return None;
        }
        Some(core.history.poll(now))
    }

    fn settle(&self) -> bool {
        let _op = self.op_lock.lock();
        let mut core = self.core.lock();
        if core.state.is_destroyed() {
            return false;
        }
        core.history.settle()
    }
}

impl<H, C> TimerTarget for EngineInner<H, C>
where
    H: HostStore,
    H::State: Clone + PartialEq,
    C: StateCloner<H::State> + 'static,
{
    fn fire_due(&self) -> Option<bool> {
        self.tick()
    }
}
