//! Property-based tests for checkpointing and restore.
//!
//! 1. A burst of edits yields exactly one checkpoint: the pre-burst state
//! 2. The undo stack keeps the newest `stack_size` checkpoints
//! 3. Undoing everything then redoing everything is a round trip
//! 4. Arbitrary interleavings keep the stacks bounded and restores exact

use proptest::prelude::*;
use rewind::{Engine, EngineBuilder, EngineOptions, ManualClock, MemoryStore};
use std::sync::Arc;

const DEBOUNCE_MS: u64 = 100;

type Store = Arc<MemoryStore<i64>>;

fn store() -> Store {
    Arc::new(
        MemoryStore::new(0)
            .with_undo_hooks("undoRedo", "undoRedo")
            .with_mutation("increment", |n, _| {
                *n += 1;
                Ok(())
            }),
    )
}

fn engine(store: &Store, stack_size: usize, clock: &Arc<ManualClock>) -> Engine<MemoryStore<i64>> {
    EngineBuilder::new(Arc::clone(store))
        .options(
            EngineOptions::default()
                .with_stack_size(stack_size)
                .with_debounce_time(DEBOUNCE_MS),
        )
        .clock(clock.clone())
        .build()
        .unwrap()
}

/// Run one burst of `edits` increments, then let it settle.
fn burst(store: &Store, engine: &Engine<MemoryStore<i64>>, clock: &ManualClock, edits: usize) {
    for _ in 0..edits {
        store.commit("increment", None).unwrap();
        clock.advance_ms(DEBOUNCE_MS / 4);
        engine.tick();
    }
    clock.advance_ms(DEBOUNCE_MS * 2);
    engine.tick();
}

#[derive(Debug, Clone)]
enum Op {
    Edit { gap_ms: u64 },
    Undo,
    Redo,
    Settle,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0u64..3 * DEBOUNCE_MS).prop_map(|gap_ms| Op::Edit { gap_ms }),
        2 => Just(Op::Undo),
        2 => Just(Op::Redo),
        1 => Just(Op::Settle),
    ]
}

// ═══════════════════════════════════════════════════════════════════════
// 1. Burst coalescing
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn burst_yields_single_checkpoint(edits in 1usize..40, start in 0i64..5) {
        let clock = Arc::new(ManualClock::new());
        let store = store();
        for _ in 0..start {
            store.commit("increment", None).unwrap();
        }
        let engine = engine(&store, 10, &clock);

        burst(&store, &engine, &clock, edits);

        prop_assert_eq!(engine.undo_snapshots(), vec![start]);
        prop_assert_eq!(engine.last_known(), Some(start + edits as i64));
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 2. Capacity
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn undo_stack_keeps_newest_checkpoints(
        stack_size in 1usize..8,
        bursts in proptest::collection::vec(1usize..4, 1..16),
    ) {
        let clock = Arc::new(ManualClock::new());
        let store = store();
        let engine = engine(&store, stack_size, &clock);

        let mut pre_burst = Vec::new();
        for edits in &bursts {
            pre_burst.push(store.state());
            burst(&store, &engine, &clock, *edits);
        }

        let keep = pre_burst.len().min(stack_size);
        let expected = pre_burst[pre_burst.len() - keep..].to_vec();
        prop_assert_eq!(engine.undo_snapshots(), expected);
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 3. Round trip
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn undo_all_then_redo_all_round_trips(bursts in 1usize..12) {
        let clock = Arc::new(ManualClock::new());
        let store = store();
        let engine = engine(&store, 32, &clock);
        for _ in 0..bursts {
            burst(&store, &engine, &clock, 2);
        }
        let final_state = store.state();

        let mut undone = 0;
        while engine.can_undo() {
            let (undo_len, redo_len) = (engine.undo_len(), engine.redo_len());
            prop_assert!(engine.undo().unwrap());
            prop_assert_eq!(engine.undo_len(), undo_len - 1);
            prop_assert_eq!(engine.redo_len(), redo_len + 1);
            undone += 1;
        }
        prop_assert_eq!(undone, bursts);
        prop_assert_eq!(store.state(), 0);

        while engine.can_redo() {
            prop_assert!(engine.redo().unwrap());
        }
        prop_assert_eq!(store.state(), final_state);
        prop_assert_eq!(engine.undo_len(), bursts);
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 4. Arbitrary interleavings
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn restores_are_exact_and_stacks_bounded(
        stack_size in 1usize..6,
        ops in proptest::collection::vec(op_strategy(), 1..60),
    ) {
        let clock = Arc::new(ManualClock::new());
        let store = store();
        let engine = engine(&store, stack_size, &clock);

        for op in ops {
            match op {
                Op::Edit { gap_ms } => {
                    clock.advance_ms(gap_ms);
                    engine.tick();
                    store.commit("increment", None).unwrap();
                    prop_assert!(!engine.can_redo());
                    prop_assert!(engine.can_undo());
                }
                Op::Undo => {
                    let expected = engine.undo_snapshots().last().copied();
                    let before = store.state();
                    prop_assert_eq!(engine.undo().unwrap(), expected.is_some());
                    if let Some(expected) = expected {
                        prop_assert_eq!(store.state(), expected);
                        prop_assert_eq!(engine.redo_snapshots().last().copied(), Some(before));
                        prop_assert_eq!(engine.last_known(), Some(expected));
                    }
                }
                Op::Redo => {
                    let expected = engine.redo_snapshots().last().copied();
                    prop_assert_eq!(engine.redo().unwrap(), expected.is_some());
                    if let Some(expected) = expected {
                        prop_assert_eq!(store.state(), expected);
                    }
                }
                Op::Settle => {
                    engine.settle();
                    prop_assert_eq!(engine.last_known(), Some(store.state()));
                }
            }

            prop_assert!(engine.undo_len() <= stack_size);
            prop_assert!(engine.redo_len() <= stack_size);
        }
    }
}
