//! Measures the cost of the core event operations.
//!
//! * Dispatching to a varying number of connected callbacks.
//! * Connecting and immediately dropping a connection.
//! * Dispatching right after a disconnect, which includes erasing the disconnected entry.

#![allow(
    missing_docs,
    reason = "No need for API documentation in benchmark code"
)]

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use signals::Event;

criterion_group!(benches, entrypoint);
criterion_main!(benches);

type Payload = u64;

const CALLBACK_COUNTS: &[usize] = &[0, 1, 10, 100];

fn entrypoint(c: &mut Criterion) {
    let mut group = c.benchmark_group("signals_dispatch");

    for &count in CALLBACK_COUNTS {
        let event = Event::<Payload>::new();
        let _connections: Vec<_> = (0..count)
            .map(|_| {
                event.connect(|value| {
                    black_box(*value);
                })
            })
            .collect();

        group.bench_with_input(BenchmarkId::new("dispatch", count), &event, |b, event| {
            b.iter(|| event.dispatch(black_box(&42)).unwrap());
        });
    }

    group.bench_function("connect_drop", |b| {
        let event = Event::<Payload>::new();

        b.iter(|| {
            drop(event.connect(|value| {
                black_box(*value);
            }));
        });
    });

    group.bench_function("disconnect_then_dispatch", |b| {
        let event = Event::<Payload>::new();
        let _permanent = event.connect(|value| {
            black_box(*value);
        });

        b.iter(|| {
            drop(event.connect(|value| {
                black_box(*value);
            }));
            event.dispatch(black_box(&42)).unwrap();
        });
    });

    group.finish();
}
