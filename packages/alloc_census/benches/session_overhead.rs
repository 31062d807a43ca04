//! Benchmarks to measure the compute overhead of `alloc_census` logic itself.
//!
//! The empty session measures only starting and finishing a session. The allocating
//! variants show what the counting allocator adds to each allocation while a session
//! is active, compared to the same allocations without any session.

#![allow(
    missing_docs,
    reason = "No need for API documentation in benchmark code"
)]

use std::hint::black_box;

use alloc_census::Allocator;
use criterion::{Criterion, criterion_group, criterion_main};

#[global_allocator]
static ALLOCATOR: Allocator<std::alloc::System> = Allocator::system();

criterion_group!(benches, entrypoint);
criterion_main!(benches);

fn entrypoint(c: &mut Criterion) {
    alloc_census::warm_up();

    let mut group = c.benchmark_group("alloc_census_overhead");

    group.bench_function("baseline_empty", |b| {
        b.iter(|| {
            black_box(());
        });
    });

    group.bench_function("session_empty", |b| {
        b.iter(|| black_box(alloc_census::start(|| ())));
    });

    group.bench_function("allocate_100_without_session", |b| {
        b.iter(|| {
            for i in 0..100_u64 {
                black_box(Box::new(i));
            }
        });
    });

    group.bench_function("allocate_100_with_session", |b| {
        b.iter(|| {
            black_box(alloc_census::start(|| {
                for i in 0..100_u64 {
                    black_box(Box::new(i));
                }
            }))
        });
    });

    group.finish();
}
