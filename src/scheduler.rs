//! Work distribution across match workers.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Hands out match slots `1..=total`, each exactly once, to any number of
/// concurrent claimers. Claiming is a single atomic increment and never waits
/// on I/O.
#[derive(Debug)]
pub(crate) struct WorkScheduler {
    next: AtomicUsize,
    total: usize,
}

impl WorkScheduler {
    pub fn new(total: usize) -> WorkScheduler {
        WorkScheduler {
            next: AtomicUsize::new(0),
            total,
        }
    }

    /// Claim the next match slot, or `None` once all slots are taken.
    ///
    /// `None` is the normal end-of-work signal for a worker, not an error.
    pub fn claim(&self) -> Option<usize> {
        let slot = self.next.fetch_add(1, Ordering::Relaxed) + 1;
        (slot <= self.total).then_some(slot)
    }
}
