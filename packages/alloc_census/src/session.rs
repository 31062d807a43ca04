use std::sync::atomic::{AtomicBool, Ordering};

use scopeguard::ScopeGuard;
use tracing::{debug, trace};

use crate::activation::{self, Interest};
use crate::constants::ERR_COUNTER_MISSING;
use crate::{Result, registry};

static WARMED_UP: AtomicBool = AtomicBool::new(false);

/// Performs the one-time initialization of the allocation event machinery.
///
/// The first activation of allocation event delivery in a process, and the first registry
/// access on a thread, may carry one-time costs. Sessions call this automatically before
/// doing anything else, so those costs are never attributed to a measured block. Calling it
/// explicitly at program start moves that work to a predictable point in time.
///
/// Calling this again is cheap and has no further effect.
///
/// # Examples
///
/// ```
/// alloc_census::warm_up();
/// ```
#[cfg_attr(test, mutants::skip)] // Counts are identical with or without the warm-up. Intentional.
pub fn warm_up() {
    // Not a `Once`: activation logs, and a subscriber that starts a session while handling
    // that log event would otherwise re-enter the one-time initialization.
    if !WARMED_UP.swap(true, Ordering::Relaxed) {
        activation::activate();
        activation::deactivate();

        debug!("allocation event source warmed up");
    }

    // Touch the current thread's slot so any lazy thread-local setup happens here.
    _ = registry::is_registered();
}

/// Counts the heap allocations made by `block` on the current thread.
///
/// Allocations made concurrently on other threads, or on this thread before or after the call,
/// are not counted. The value returned by `block` is dropped after the count has been taken.
///
/// The [`Allocator`][crate::Allocator] must be installed as the global allocator, otherwise
/// the count is always zero.
///
/// If `block` panics, the panic propagates unchanged after the session has cleaned up and the
/// partial count is discarded.
///
/// # Panics
///
/// Panics if an allocation counting session is already active on the current thread.
///
/// # Examples
///
/// ```
/// use std::hint::black_box;
///
/// use alloc_census::Allocator;
///
/// #[global_allocator]
/// static ALLOCATOR: Allocator<std::alloc::System> = Allocator::system();
///
/// let allocations = alloc_census::start(|| {
///     for i in 0..3 {
///         black_box(Box::new(i));
///     }
/// });
///
/// assert_eq!(allocations, 3);
/// ```
pub fn start<F, R>(block: F) -> u64
where
    F: FnOnce() -> R,
{
    let (count, result) = start_with_result(block);
    drop(result);
    count
}

/// Counts the heap allocations made by `block` on the current thread and returns the count
/// together with the value returned by `block`.
///
/// Behaves exactly like [`start()`] otherwise.
///
/// # Panics
///
/// Panics if an allocation counting session is already active on the current thread.
///
/// # Examples
///
/// ```
/// use alloc_census::Allocator;
///
/// #[global_allocator]
/// static ALLOCATOR: Allocator<std::alloc::System> = Allocator::system();
///
/// let (allocations, words) = alloc_census::start_with_result(|| {
///     vec!["one".to_string(), "two".to_string()]
/// });
///
/// // One allocation for the Vec buffer and one for each String.
/// assert_eq!(allocations, 3);
/// assert_eq!(words.len(), 2);
/// ```
pub fn start_with_result<F, R>(block: F) -> (u64, R)
where
    F: FnOnce() -> R,
{
    try_start(block).unwrap_or_else(|e| panic!("{e}"))
}

/// Counts the heap allocations made by `block` on the current thread, reporting a session
/// that is already active on this thread as an error instead of panicking.
///
/// `block` is not executed if the session cannot be started.
///
/// # Errors
///
/// Returns [`Error::DuplicateSession`][crate::Error::DuplicateSession] if an allocation
/// counting session is already active on the current thread.
///
/// # Examples
///
/// ```
/// use alloc_census::{Allocator, Error};
///
/// #[global_allocator]
/// static ALLOCATOR: Allocator<std::alloc::System> = Allocator::system();
///
/// let (_, nested) = alloc_census::start_with_result(|| alloc_census::try_start(|| ()));
///
/// assert!(matches!(nested, Err(Error::DuplicateSession { .. })));
/// ```
pub fn try_start<F, R>(block: F) -> Result<(u64, R)>
where
    F: FnOnce() -> R,
{
    warm_up();

    trace!("allocation counting session starting");

    // Interest is acquired before the counter is registered and released after it is
    // unregistered, so the bookkeeping of the session itself is never counted.
    let interest = Interest::acquire();
    registry::register()?;

    let registration = scopeguard::guard((), |()| {
        // Only reached when `block` unwinds. The partial count is discarded.
        let discarded = registry::unregister().expect(ERR_COUNTER_MISSING);
        debug!(
            allocations = discarded,
            "allocation counting session abandoned by unwinding block"
        );
    });

    let result = block();

    ScopeGuard::into_inner(registration);
    let count = registry::unregister().expect(ERR_COUNTER_MISSING);

    drop(interest);

    trace!(allocations = count, "allocation counting session finished");

    Ok((count, result))
}

/// Counts the heap allocations made by a fallible `block` on the current thread.
///
/// If `block` returns `Ok`, the count is returned together with the success value. If `block`
/// returns `Err`, the session cleans up, discards the partial count and returns that exact
/// error value unchanged.
///
/// # Errors
///
/// Returns the error returned by `block`, if any.
///
/// # Panics
///
/// Panics if an allocation counting session is already active on the current thread.
///
/// # Examples
///
/// ```
/// use alloc_census::Allocator;
///
/// #[global_allocator]
/// static ALLOCATOR: Allocator<std::alloc::System> = Allocator::system();
///
/// let outcome = alloc_census::start_fallible(|| "42".parse::<u32>());
/// assert_eq!(outcome, Ok((0, 42)));
///
/// let failure = alloc_census::start_fallible(|| "boom".parse::<u32>());
/// assert!(failure.is_err());
/// ```
pub fn start_fallible<F, R, E>(block: F) -> std::result::Result<(u64, R), E>
where
    F: FnOnce() -> std::result::Result<R, E>,
{
    let (count, result) = start_with_result(block);

    result.map(|value| (count, value))
}
