//! Reference-counted on/off switch for allocation event delivery.
//!
//! The switch is process-wide while sessions are per-thread, so each session registers
//! interest and delivery stays enabled for as long as any session anywhere still needs it.

use std::marker::PhantomData;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug;

use crate::constants::{ERR_INTEREST_UNDERFLOW, ERR_POISONED_LOCK};

// Number of live sessions in the process. Every transition of DELIVERING happens
// while this lock is held, so the two can never disagree.
static INTEREST: Mutex<u64> = Mutex::new(0);

// Read by the allocator on every allocation. Relaxed loads suffice: a thread that acquired
// interest has synchronized with the last writer through INTEREST, and the flag cannot turn
// off while that interest is held.
static DELIVERING: AtomicBool = AtomicBool::new(false);

/// Registers interest in allocation events, enabling delivery if this is the first interest.
pub(crate) fn activate() {
    let enabled = {
        let mut interest = INTEREST.lock().expect(ERR_POISONED_LOCK);

        let enabled = *interest == 0;
        if enabled {
            DELIVERING.store(true, Ordering::Relaxed);
        }

        *interest = interest
            .checked_add(1)
            .expect("interest count overflows u64 - this indicates an unrealistic scenario");

        enabled
    };

    // Logged after the lock is released, the subscriber may itself start sessions.
    if enabled {
        debug!("allocation event delivery enabled");
    }
}

/// Releases interest in allocation events, disabling delivery once nobody is interested.
///
/// # Panics
///
/// Panics if there is no outstanding interest to release.
pub(crate) fn deactivate() {
    let disabled = {
        let mut interest = INTEREST.lock().expect(ERR_POISONED_LOCK);

        *interest = interest.checked_sub(1).expect(ERR_INTEREST_UNDERFLOW);

        let disabled = *interest == 0;
        if disabled {
            DELIVERING.store(false, Ordering::Relaxed);
        }

        disabled
    };

    if disabled {
        debug!("allocation event delivery disabled");
    }
}

/// Whether allocation events are currently being delivered to thread counters.
#[inline]
pub(crate) fn is_delivering() -> bool {
    DELIVERING.load(Ordering::Relaxed)
}

/// Whether any allocation counting session is currently active anywhere in the process.
///
/// This is a diagnostic snapshot; by the time the caller inspects the value, sessions on
/// other threads may have started or ended.
#[must_use]
pub fn is_active() -> bool {
    is_delivering()
}

/// Interest in allocation events held for as long as this value lives.
///
/// Tied to the thread that acquired it, just like the session that owns it.
#[derive(Debug)]
#[must_use = "Interest is released when the value is dropped"]
pub(crate) struct Interest {
    _single_threaded: PhantomData<*const ()>,
}

impl Interest {
    pub(crate) fn acquire() -> Self {
        activate();

        Self {
            _single_threaded: PhantomData,
        }
    }
}

impl Drop for Interest {
    fn drop(&mut self) {
        deactivate();
    }
}
