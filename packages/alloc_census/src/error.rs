use std::thread::ThreadId;

use thiserror::Error;

/// Errors raised by the allocation counting session bookkeeping.
///
/// Failures of the measured block itself are never wrapped in this type. A panic in the block
/// unwinds through the session unchanged and an error returned by a block passed to
/// [`start_fallible()`][crate::start_fallible] is handed back as-is.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A session was started on a thread that already has a live session.
    ///
    /// Nested sessions on the same thread are not supported.
    #[error("an allocation counting session is already active on thread {thread_id:?}")]
    DuplicateSession {
        /// The thread on which the second session was attempted.
        thread_id: ThreadId,
    },

    /// A session tried to remove a counter that was never registered for its thread.
    ///
    /// This indicates broken session bookkeeping and is never expected to reach user code.
    #[error("no allocation counter is registered for thread {thread_id:?}")]
    SessionNotFound {
        /// The thread whose counter was expected to exist.
        thread_id: ThreadId,
    },
}

/// A specialized `Result` type for session bookkeeping, returning the crate's
/// [`Error`] type as the error value.
pub(crate) type Result<T> = std::result::Result<T, Error>;
