//! Batch outcome counts.

use super::{DownloadOutcome, OutcomeStatus};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub cancelled: usize,
    /// Successful downloads whose tag hook failed.
    pub tag_failures: usize,
}

impl BatchSummary {
    pub fn from_outcomes(outcomes: &[DownloadOutcome]) -> Self {
        let mut s = Self::default();
        for o in outcomes {
            match o.status {
                OutcomeStatus::Success => s.succeeded += 1,
                OutcomeStatus::Failed => s.failed += 1,
                OutcomeStatus::Cancelled => s.cancelled += 1,
            }
            if o.tag_error.is_some() {
                s.tag_failures += 1;
            }
        }
        s
    }

    pub fn total(&self) -> usize {
        self.succeeded + self.failed + self.cancelled
    }

    /// Every track downloaded (tag failures do not count against this).
    pub fn is_complete_success(&self) -> bool {
        self.failed == 0 && self.cancelled == 0
    }
}
