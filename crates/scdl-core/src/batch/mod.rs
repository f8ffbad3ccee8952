//! Shared state of one download run.
//!
//! Every transfer task reports its own unit's byte count through
//! [`BatchState::record_progress`], which updates the unit and computes the
//! aggregate totals and speed under a single lock. The lock is never held
//! while doing I/O or calling back into the caller.

mod speed;
mod unit;

pub use speed::{SpeedMeter, SAMPLE_INTERVAL};
pub use unit::{DownloadUnit, UnitState};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Instant;

/// Aggregate progress handed to the caller's progress hook.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressSnapshot {
    pub total_received: u64,
    /// Sum of probed sizes; units with unknown size contribute 0.
    pub total_size: u64,
    pub bytes_per_sec: f64,
}

impl ProgressSnapshot {
    /// Fraction complete in [0.0, 1.0], or None when the total size is unknown.
    pub fn fraction(&self) -> Option<f64> {
        if self.total_size == 0 {
            return None;
        }
        Some((self.total_received as f64 / self.total_size as f64).min(1.0))
    }
}

#[derive(Debug)]
struct BatchInner {
    units: Vec<DownloadUnit>,
    speed: SpeedMeter,
}

impl BatchInner {
    fn totals(&self) -> (u64, u64) {
        self.units.iter().fold((0, 0), |(recv, size), u| {
            (recv + u.bytes_received(), size + u.total_size())
        })
    }
}

/// Units of a batch plus its cancellation latch and speed sample.
#[derive(Debug)]
pub struct BatchState {
    inner: Mutex<BatchInner>,
    cancelled: AtomicBool,
}

impl BatchState {
    pub fn new(units: Vec<DownloadUnit>) -> Self {
        Self {
            inner: Mutex::new(BatchInner {
                units,
                speed: SpeedMeter::new(),
            }),
            cancelled: AtomicBool::new(false),
        }
    }

    // Guarded data is plain counters; a panic elsewhere cannot leave it inconsistent.
    fn lock(&self) -> MutexGuard<'_, BatchInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Set unit `index`'s received count and return the new aggregate snapshot.
    pub fn record_progress(&self, index: usize, bytes_received: u64, now: Instant) -> ProgressSnapshot {
        let mut inner = self.lock();
        if let Some(unit) = inner.units.get_mut(index) {
            unit.record_received(bytes_received);
        }
        let (total_received, total_size) = inner.totals();
        let bytes_per_sec = inner.speed.observe(total_received, now);
        ProgressSnapshot {
            total_received,
            total_size,
            bytes_per_sec,
        }
    }

    /// Move unit `index` to `next`. Returns false if the transition is not allowed.
    pub fn transition(&self, index: usize, next: UnitState) -> bool {
        self.lock()
            .units
            .get_mut(index)
            .map(|u| u.transition(next))
            .unwrap_or(false)
    }

    /// Current totals with the last displayed speed (does not take a new sample).
    pub fn snapshot(&self) -> ProgressSnapshot {
        let inner = self.lock();
        let (total_received, total_size) = inner.totals();
        ProgressSnapshot {
            total_received,
            total_size,
            bytes_per_sec: inner.speed.bytes_per_sec(),
        }
    }

    /// Copy of all units.
    pub fn units(&self) -> Vec<DownloadUnit> {
        self.lock().units.clone()
    }

    pub fn unit(&self, index: usize) -> Option<DownloadUnit> {
        self.lock().units.get(index).cloned()
    }

    /// Poll the caller's cancellation check and latch a positive answer.
    pub fn observe_cancel(&self, check: &dyn Fn() -> bool) -> bool {
        if self.cancelled.load(Ordering::SeqCst) {
            return true;
        }
        if check() {
            self.cancelled.store(true, Ordering::SeqCst);
            return true;
        }
        false
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
