//! Tests for the process-wide activation state of allocation event delivery.
//!
//! Activation is shared by every thread in the process, so this file holds a single test
//! that is the only user of sessions in its test binary.

#![cfg(not(miri))] // Miri replaces the global allocator, so cannot be used here.

use std::panic;
use std::sync::{Arc, Barrier};
use std::thread;

use alloc_census::Allocator;
use testing::{allocate_objects, with_watchdog};

#[global_allocator]
static ALLOCATOR: Allocator<std::alloc::System> = Allocator::system();

#[test]
fn event_delivery_follows_session_lifetimes() {
    with_watchdog(|| {
        alloc_census::warm_up();
        assert!(!alloc_census::is_active());

        // Active exactly while a session runs.
        let observed_inside = alloc_census::start_with_result(alloc_census::is_active).1;
        assert!(observed_inside);
        assert!(!alloc_census::is_active());

        // Released again when the block unwinds.
        let outcome = panic::catch_unwind(|| {
            alloc_census::start(|| {
                assert!(alloc_census::is_active());
                panic!("boom");
            })
        });
        assert!(outcome.is_err());
        assert!(!alloc_census::is_active());

        // Released again when a nested session is rejected.
        let (_, nested) = alloc_census::start_with_result(|| alloc_census::try_start(|| ()));
        assert!(nested.is_err());
        assert!(!alloc_census::is_active());

        // One session ending does not switch delivery off under another thread's session.
        let long_session_started = Arc::new(Barrier::new(2));
        let short_session_ended = Arc::new(Barrier::new(2));

        let long_runner = thread::spawn({
            let long_session_started = Arc::clone(&long_session_started);
            let short_session_ended = Arc::clone(&short_session_ended);

            move || {
                alloc_census::start_with_result(|| {
                    long_session_started.wait();
                    short_session_ended.wait();

                    // The other thread's session has ended by now.
                    let still_active = alloc_census::is_active();
                    allocate_objects(30);
                    still_active
                })
            }
        });

        long_session_started.wait();
        let short = alloc_census::start(|| allocate_objects(3));
        short_session_ended.wait();

        let (long, still_active) = long_runner.join().unwrap();

        assert_eq!(short, 3);
        assert_eq!(long, 30);
        assert!(still_active);
        assert!(!alloc_census::is_active());
    });
}
