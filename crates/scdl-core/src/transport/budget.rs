//! Process-wide connection budget.
//!
//! Every probe and transfer holds one slot while its connection is open, so the
//! total number of simultaneous connections stays under `max_connections`.
//! Requests beyond the limit wait for a slot instead of failing.

use std::sync::{Condvar, Mutex};
use std::time::Duration;

/// How often a waiting request re-checks cancellation.
const WAIT_SLICE: Duration = Duration::from_millis(50);

#[derive(Debug)]
pub struct ConnectionBudget {
    max: usize,
    in_use: Mutex<usize>,
    freed: Condvar,
}

/// Held while a connection is open; releases its slot on drop.
#[derive(Debug)]
pub struct ConnectionSlot<'a> {
    budget: &'a ConnectionBudget,
}

impl ConnectionBudget {
    pub fn new(max: usize) -> Self {
        Self {
            max: max.max(1),
            in_use: Mutex::new(0),
            freed: Condvar::new(),
        }
    }

    pub fn max(&self) -> usize {
        self.max
    }

    /// Number of slots currently held.
    pub fn in_use(&self) -> usize {
        *self.in_use.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Wait for a slot. Returns `None` if `cancel` reports true before one frees up.
    ///
    /// `cancel` is never called with the budget lock held.
    pub fn acquire(&self, cancel: &dyn Fn() -> bool) -> Option<ConnectionSlot<'_>> {
        loop {
            if cancel() {
                return None;
            }
            let mut used = self.in_use.lock().unwrap_or_else(|e| e.into_inner());
            if *used < self.max {
                *used += 1;
                return Some(ConnectionSlot { budget: self });
            }
            // The guard comes back and is dropped here, before the next cancel check.
            let _ = self.freed.wait_timeout(used, WAIT_SLICE);
        }
    }

    fn release(&self) {
        let mut used = self.in_use.lock().unwrap_or_else(|e| e.into_inner());
        *used = used.saturating_sub(1);
        drop(used);
        self.freed.notify_one();
    }
}

impl Drop for ConnectionSlot<'_> {
    fn drop(&mut self) {
        self.budget.release();
    }
}
