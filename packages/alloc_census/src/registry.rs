//! Routes allocation events to the counter of the thread that performed the allocation.
//!
//! Every thread owns one slot in thread-local storage. The slot is `Some(count)` while a session
//! is live on that thread and `None` otherwise. Since the allocating thread is always the thread
//! executing the allocator, looking up "the counter of the allocating thread" is a plain
//! thread-local access: no shared map, no lock and no allocation on the hot path.

use std::cell::Cell;
use std::thread;

use crate::{Error, Result};

thread_local! {
    // Const-initialized and free of drop logic, so first access on a thread neither allocates
    // nor registers a TLS destructor. This keeps the allocator hook from re-entering itself and
    // keeps the slot usable during thread teardown.
    static LIVE_COUNTER: Cell<Option<u64>> = const { Cell::new(None) };
}

/// Creates a zero-initialized counter for the current thread.
///
/// Fails if the current thread already has a live counter.
pub(crate) fn register() -> Result<()> {
    LIVE_COUNTER.with(|slot| {
        if slot.get().is_some() {
            return Err(Error::DuplicateSession {
                thread_id: thread::current().id(),
            });
        }

        slot.set(Some(0));
        Ok(())
    })
}

/// Counts one allocation event against the current thread's counter, if it has one.
///
/// Called from inside the global allocator, so this must never allocate, block or panic.
#[inline]
pub(crate) fn increment() {
    // `try_with` because allocations can happen after thread-local storage has been torn down.
    _ = LIVE_COUNTER.try_with(|slot| {
        if let Some(count) = slot.get() {
            slot.set(Some(count.wrapping_add(1)));
        }
    });
}

/// Removes the current thread's counter and returns its final value.
pub(crate) fn unregister() -> Result<u64> {
    LIVE_COUNTER
        .with(Cell::take)
        .ok_or_else(|| Error::SessionNotFound {
            thread_id: thread::current().id(),
        })
}

/// Whether the current thread has a live counter.
#[inline]
pub(crate) fn is_registered() -> bool {
    LIVE_COUNTER.with(|slot| slot.get().is_some())
}
