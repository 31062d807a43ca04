//! Allocator wrapper that turns heap allocations into allocation events.

use std::alloc::{GlobalAlloc, Layout};
use std::fmt;

use crate::{activation, registry};

/// Delivers one allocation event to the allocating thread's counter.
///
/// The allocator always runs on the allocating thread, so the registry lookup is simply
/// "the current thread". Threads without a live session ignore the event.
#[inline]
fn on_allocation() {
    if activation::is_delivering() {
        registry::increment();
    }
}

/// A memory allocator that reports every new heap object to allocation counting sessions.
///
/// This allocator wraps any [`GlobalAlloc`] implementation, forwarding every call to it
/// unchanged. Install it as the global allocator to make [`start()`][crate::start] and
/// related functions observe allocations. Without it, every session reports zero.
///
/// Each `alloc` and `alloc_zeroed` call is one allocation event. Resizing an existing object
/// via `realloc` and releasing memory via `dealloc` are not counted.
///
/// # Examples
///
/// ```rust
/// use alloc_census::Allocator;
///
/// #[global_allocator]
/// static ALLOCATOR: Allocator<std::alloc::System> = Allocator::system();
/// ```
pub struct Allocator<A: GlobalAlloc> {
    inner: A,
}

impl<A: GlobalAlloc> fmt::Debug for Allocator<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Allocator")
            .field("inner", &"<allocator>")
            .finish()
    }
}

impl Allocator<std::alloc::System> {
    /// Creates a new counting allocator on top of the system's default allocator.
    #[must_use]
    #[inline]
    pub const fn system() -> Self {
        Self {
            inner: std::alloc::System,
        }
    }
}

impl<A: GlobalAlloc> Allocator<A> {
    /// Creates a new counting allocator that forwards to the provided allocator.
    ///
    /// The resulting allocator has the same behavior as the underlying allocator, with
    /// allocation events delivered to any live counting session on the allocating thread.
    #[must_use]
    #[inline]
    pub const fn new(allocator: A) -> Self {
        Self { inner: allocator }
    }
}

// SAFETY: We delegate all allocation operations to the underlying allocator,
// which already implements GlobalAlloc safely. The event hook neither allocates nor unwinds.
unsafe impl<A: GlobalAlloc> GlobalAlloc for Allocator<A> {
    #[inline]
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        on_allocation();

        // SAFETY: We forward the call to the underlying allocator which implements GlobalAlloc.
        unsafe { self.inner.alloc(layout) }
    }

    #[inline]
    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        // SAFETY: We forward the call to the underlying allocator which implements GlobalAlloc.
        unsafe { self.inner.dealloc(ptr, layout) }
    }

    #[inline]
    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        on_allocation();

        // SAFETY: We forward the call to the underlying allocator which implements GlobalAlloc.
        unsafe { self.inner.alloc_zeroed(layout) }
    }

    #[inline]
    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        // SAFETY: We forward the call to the underlying allocator which implements GlobalAlloc.
        unsafe { self.inner.realloc(ptr, layout, new_size) }
    }
}
