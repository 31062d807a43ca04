//! Integration tests for sessions whose block fails and for unsupported nesting.

#![cfg(not(miri))] // Miri replaces the global allocator, so cannot be used here.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use alloc_census::{Allocator, Error};
use testing::allocate_objects;

#[global_allocator]
static ALLOCATOR: Allocator<std::alloc::System> = Allocator::system();

fn panic_message(payload: &(dyn Any + Send)) -> Option<&str> {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
}

#[derive(Debug, PartialEq, Eq)]
struct Boom {
    detail: String,
}

#[test]
fn panic_in_block_propagates_unchanged() {
    let outcome = panic::catch_unwind(|| {
        alloc_census::start(|| {
            allocate_objects(10);
            panic!("boom");
        })
    });

    let payload = outcome.expect_err("a panicking block must not produce a count");
    assert_eq!(panic_message(payload.as_ref()), Some("boom"));
}

#[test]
fn formatted_panic_message_is_preserved() {
    let outcome = panic::catch_unwind(|| {
        alloc_census::start_with_result(|| -> u32 {
            let code = 42;
            panic!("boom {code}");
        })
    });

    let payload = outcome.unwrap_err();
    assert_eq!(panic_message(payload.as_ref()), Some("boom 42"));
}

#[test]
fn custom_panic_payload_is_preserved() {
    let outcome = panic::catch_unwind(|| {
        alloc_census::start(|| {
            panic::panic_any(Boom {
                detail: "custom".to_string(),
            });
        })
    });

    let payload = outcome.unwrap_err();
    assert_eq!(
        payload.downcast_ref::<Boom>(),
        Some(&Boom {
            detail: "custom".to_string()
        })
    );
}

#[test]
fn session_after_panicking_block_starts_fresh() {
    let outcome = panic::catch_unwind(|| {
        alloc_census::start(|| {
            allocate_objects(123);
            panic!("boom");
        })
    });
    assert!(outcome.is_err());

    let allocations = alloc_census::start(|| allocate_objects(4));

    assert_eq!(allocations, 4);
}

#[test]
fn error_from_fallible_block_is_returned_unchanged() {
    let outcome = alloc_census::start_fallible(|| -> Result<(), Boom> {
        allocate_objects(3);
        Err(Boom {
            detail: "boom".to_string(),
        })
    });

    assert_eq!(
        outcome,
        Err(Boom {
            detail: "boom".to_string()
        })
    );

    // The partial count is discarded, not carried into the next session.
    assert_eq!(alloc_census::start(|| allocate_objects(2)), 2);
}

#[test]
fn success_from_fallible_block_returns_count() {
    let outcome = alloc_census::start_fallible(|| -> Result<&str, Boom> {
        allocate_objects(8);
        Ok("fine")
    });

    assert_eq!(outcome, Ok((8, "fine")));
}

#[test]
fn nested_session_on_same_thread_is_rejected() {
    let (outer, nested) = alloc_census::start_with_result(|| {
        allocate_objects(5);
        alloc_census::try_start(|| allocate_objects(1_000))
    });

    let error = nested.expect_err("nested session must be rejected");
    assert!(matches!(error, Error::DuplicateSession { .. }));

    // The rejected block never ran and the rejection itself does not allocate.
    assert_eq!(outer, 5);
}

#[test]
fn nested_start_panics_with_duplicate_session_message() {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        alloc_census::start(|| alloc_census::start(|| ()))
    }));

    let payload = outcome.unwrap_err();
    let message = panic_message(payload.as_ref()).expect("panic message should be a string");
    assert!(message.contains("already active"), "{message}");

    // Both sessions cleaned up, so the thread can count again.
    assert_eq!(alloc_census::start(|| allocate_objects(1)), 1);
}
