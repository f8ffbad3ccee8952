//! Per-track download bookkeeping.

/// Lifecycle of one unit: `Pending → InFlight → {Completed, Failed, Cancelled}`.
/// `Pending → Cancelled` happens when cancellation is seen before the transfer starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitState {
    Pending,
    InFlight,
    Completed,
    Failed,
    Cancelled,
}

impl UnitState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            UnitState::Completed | UnitState::Failed | UnitState::Cancelled
        )
    }

    /// Whether moving from `self` to `next` is allowed.
    pub fn can_transition_to(self, next: UnitState) -> bool {
        use UnitState::*;
        matches!(
            (self, next),
            (Pending, InFlight)
                | (Pending, Cancelled)
                | (InFlight, Completed)
                | (InFlight, Failed)
                | (InFlight, Cancelled)
        )
    }
}

/// One track's download progress within a batch. `url` is unique within the batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadUnit {
    url: String,
    bytes_received: u64,
    /// Probed size; 0 means unknown.
    total_size: u64,
    state: UnitState,
}

impl DownloadUnit {
    pub fn new(url: impl Into<String>, total_size: u64) -> Self {
        Self {
            url: url.into(),
            bytes_received: 0,
            total_size,
            state: UnitState::Pending,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn bytes_received(&self) -> u64 {
        self.bytes_received
    }

    pub fn total_size(&self) -> u64 {
        self.total_size
    }

    pub fn state(&self) -> UnitState {
        self.state
    }

    /// Raise the received count. Never decreases within an attempt.
    pub(crate) fn record_received(&mut self, bytes: u64) {
        if bytes > self.bytes_received {
            self.bytes_received = bytes;
        }
    }

    /// Apply a state transition; invalid transitions (including any out of a
    /// terminal state) are ignored and reported as false.
    pub(crate) fn transition(&mut self, next: UnitState) -> bool {
        if self.state.can_transition_to(next) {
            self.state = next;
            true
        } else {
            tracing::debug!(url = %self.url, from = ?self.state, to = ?next, "ignored state transition");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn received_is_monotonic() {
        let mut u = DownloadUnit::new("http://x/1", 100);
        u.record_received(40);
        u.record_received(10);
        assert_eq!(u.bytes_received(), 40);
        u.record_received(100);
        assert_eq!(u.bytes_received(), 100);
    }

    #[test]
    fn terminal_states_are_final() {
        let mut u = DownloadUnit::new("http://x/1", 0);
        assert!(u.transition(UnitState::InFlight));
        assert!(u.transition(UnitState::Completed));
        assert!(!u.transition(UnitState::Failed));
        assert!(!u.transition(UnitState::InFlight));
        assert_eq!(u.state(), UnitState::Completed);
    }

    #[test]
    fn pending_can_be_cancelled_but_not_completed() {
        let mut u = DownloadUnit::new("http://x/1", 0);
        assert!(!u.transition(UnitState::Completed));
        assert!(u.transition(UnitState::Cancelled));
        assert!(u.state().is_terminal());
    }
}
