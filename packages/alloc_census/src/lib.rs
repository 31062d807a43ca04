#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Counts the heap allocations made by a block of code on the current thread.
//!
//! This package answers the question "how many new heap objects did this code create?" for
//! performance profiling and allocation regression tests. Allocations made concurrently by
//! other threads, and allocations made outside the measured block, are not counted.
//!
//! The core functionality includes:
//! - [`Allocator`] - A Rust memory allocator wrapper that turns allocations into events
//! - [`start()`] - Counts the allocations made by a closure on the current thread
//! - [`start_with_result()`] - Same, also returning the value produced by the closure
//! - [`try_start()`] - Same, reporting an already active session as an [`Error`]
//! - [`start_fallible()`] - Counts the allocations of a closure that returns a `Result`
//!
//! This package is not meant for use in production, serving only as a development tool.
//!
//! # Simple Usage
//!
//! Install the allocator and wrap the code you want to measure:
//!
//! ```
//! use std::hint::black_box;
//!
//! use alloc_census::Allocator;
//!
//! #[global_allocator]
//! static ALLOCATOR: Allocator<std::alloc::System> = Allocator::system();
//!
//! fn main() {
//!     // Allocations out here are not counted.
//!     let _warm = vec![0_u8; 1024];
//!
//!     let allocations = alloc_census::start(|| {
//!         for i in 0..100 {
//!             black_box(Box::new(i));
//!         }
//!     });
//!
//!     assert_eq!(allocations, 100);
//! }
//! ```
//!
//! # What counts as an allocation
//!
//! Every `alloc` and `alloc_zeroed` call that reaches the global allocator is one allocation.
//! Growing or shrinking an existing allocation in place via `realloc` is not a new object and is
//! not counted, and neither is releasing memory. Sizes are not tracked.
//!
//! # Threads
//!
//! Each thread can run one session at a time and every thread's session counts only the
//! allocations of that thread. Any number of threads may run sessions concurrently:
//!
//! ```
//! use std::hint::black_box;
//! use std::thread;
//!
//! use alloc_census::Allocator;
//!
//! #[global_allocator]
//! static ALLOCATOR: Allocator<std::alloc::System> = Allocator::system();
//!
//! fn main() {
//!     let busy = thread::spawn(|| {
//!         alloc_census::start(|| {
//!             for i in 0..100 {
//!                 black_box(Box::new(i));
//!             }
//!         })
//!     });
//!
//!     let quiet = thread::spawn(|| {
//!         alloc_census::start(|| {
//!             for i in 0..20 {
//!                 black_box(Box::new(i));
//!             }
//!         })
//!     });
//!
//!     assert_eq!(busy.join().unwrap(), 100);
//!     assert_eq!(quiet.join().unwrap(), 20);
//! }
//! ```
//!
//! Starting a second session on a thread that already has one is not supported. [`start()`]
//! panics in that case and [`try_start()`] returns [`Error::DuplicateSession`].
//!
//! # Overhead
//!
//! While no session is active anywhere in the process, the allocator adds one relaxed atomic
//! load per allocation. While any session is active, every allocation also touches a
//! thread-local counter.
//!
//! # Miri compatibility
//!
//! Miri replaces the global allocator with its own logic, so you cannot execute code that uses
//! this package under Miri.

mod activation;
mod allocator;
mod constants;
mod error;
mod registry;
mod session;

pub use activation::is_active;
pub use allocator::*;
pub use error::Error;
pub(crate) use error::Result;
pub use session::*;

/// The version of this package, for diagnostic output.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
