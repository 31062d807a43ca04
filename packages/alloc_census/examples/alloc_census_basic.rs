//! Counting the allocations of a few everyday operations with `alloc_census`.
//!
//! Run with: `cargo run --example alloc_census_basic`.

use std::collections::HashMap;
use std::hint::black_box;
use std::thread;

use alloc_census::Allocator;

#[global_allocator]
static ALLOCATOR: Allocator<std::alloc::System> = Allocator::system();

fn main() {
    println!("=== alloc_census {} ===\n", alloc_census::VERSION);

    alloc_census::warm_up();

    let formatting = alloc_census::start(|| black_box(format!("{} + {}", 40, 2)));
    println!("format!() of a short string: {formatting} allocation(s)");

    let (collecting, words) = alloc_census::start_with_result(|| {
        "the quick brown fox"
            .split(' ')
            .map(str::to_uppercase)
            .collect::<Vec<_>>()
    });
    println!("Collecting {} uppercase words: {collecting} allocation(s)", words.len());

    let hashing = alloc_census::start(|| {
        let mut map = HashMap::new();
        for i in 0..1000 {
            map.insert(i, i * 2);
        }
        black_box(map)
    });
    println!("Filling a HashMap with 1000 entries: {hashing} allocation(s)");

    let parsed = alloc_census::start_fallible(|| "12345".parse::<u64>());
    match parsed {
        Ok((count, value)) => println!("Parsing {value}: {count} allocation(s)"),
        Err(e) => println!("Parsing failed: {e}"),
    }

    // Each thread counts only its own allocations, even while other threads are busy.
    let handles: Vec<_> = (1..=4_usize)
        .map(|worker| {
            thread::spawn(move || {
                alloc_census::start(|| {
                    for i in 0..worker * 10 {
                        black_box(Box::new(i));
                    }
                })
            })
        })
        .collect();

    for (worker, handle) in (1..=4).zip(handles) {
        let count = handle.join().expect("worker thread should complete successfully");
        println!("Worker {worker} boxed {} values: {count} allocation(s)", worker * 10);
    }

    println!("\nEvent source still active after all sessions: {}", alloc_census::is_active());
}
