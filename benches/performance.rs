//! Performance benchmarks for the undo/redo engine.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rewind::{
    EngineBuilder, EngineOptions, JsonRoundTrip, ManualClock, MemoryStore, MessagePackRoundTrip,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct Document {
    title: String,
    rows: Vec<Vec<u64>>,
}

fn document(rows: usize) -> Document {
    Document {
        title: "bench".to_string(),
        rows: (0..rows).map(|i| vec![i as u64; 16]).collect(),
    }
}

fn document_store(rows: usize) -> Arc<MemoryStore<Document>> {
    Arc::new(
        MemoryStore::new(document(rows))
            .with_undo_hooks("undoRedo", "undoRedo")
            .with_mutation("touch", |d: &mut Document, _| {
                if let Some(row) = d.rows.first_mut() {
                    row[0] += 1;
                }
                Ok(())
            }),
    )
}

/// Benchmark notifications inside one burst (no checkpoint after the first)
fn bench_burst_notifications(c: &mut Criterion) {
    let mut group = c.benchmark_group("burst_notifications");

    for rows in [10, 100, 1000] {
        group.bench_with_input(BenchmarkId::new("rows", rows), &rows, |b, &rows| {
            let clock = Arc::new(ManualClock::new());
            let store = document_store(rows);
            let _engine = EngineBuilder::new(Arc::clone(&store))
                .clock(clock.clone())
                .build()
                .unwrap();

            // The clock never moves, so every commit lands in the same burst.
            b.iter(|| {
                store.commit("touch", None).unwrap();
            });
        });
    }

    group.finish();
}

/// Benchmark a checkpoint per edit with each cloner
fn bench_checkpoint_cloners(c: &mut Criterion) {
    let mut group = c.benchmark_group("checkpoint_cloners");
    let options = EngineOptions::default().with_debounce_time(0).with_stack_size(50);

    for rows in [10, 100] {
        group.bench_with_input(BenchmarkId::new("native", rows), &rows, |b, &rows| {
            let store = document_store(rows);
            let _engine = EngineBuilder::new(Arc::clone(&store))
                .options(options.clone())
                .clock(Arc::new(ManualClock::new()))
                .build()
                .unwrap();
            b.iter(|| store.commit("touch", None).unwrap());
        });

        group.bench_with_input(BenchmarkId::new("json", rows), &rows, |b, &rows| {
            let store = document_store(rows);
            let _engine = EngineBuilder::new(Arc::clone(&store))
                .options(options.clone())
                .clock(Arc::new(ManualClock::new()))
                .cloner(JsonRoundTrip)
                .build()
                .unwrap();
            b.iter(|| store.commit("touch", None).unwrap());
        });

        group.bench_with_input(BenchmarkId::new("msgpack", rows), &rows, |b, &rows| {
            let store = document_store(rows);
            let _engine = EngineBuilder::new(Arc::clone(&store))
                .options(options.clone())
                .clock(Arc::new(ManualClock::new()))
                .cloner(MessagePackRoundTrip)
                .build()
                .unwrap();
            b.iter(|| store.commit("touch", None).unwrap());
        });
    }

    group.finish();
}

/// Benchmark undo followed by redo over a full stack
fn bench_undo_redo_cycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("undo_redo_cycle");

    for stack_size in [10, 100] {
        group.bench_with_input(
            BenchmarkId::new("stack_size", stack_size),
            &stack_size,
            |b, &stack_size| {
                let store = document_store(100);
                let engine = EngineBuilder::new(Arc::clone(&store))
                    .options(
                        EngineOptions::default()
                            .with_debounce_time(0)
                            .with_stack_size(stack_size),
                    )
                    .clock(Arc::new(ManualClock::new()))
                    .build()
                    .unwrap();
                for _ in 0..stack_size {
                    store.commit("touch", None).unwrap();
                }

                b.iter(|| {
                    black_box(engine.undo().unwrap());
                    black_box(engine.redo().unwrap());
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_burst_notifications,
    bench_checkpoint_cloners,
    bench_undo_redo_cycle,
);

criterion_main!(benches);
