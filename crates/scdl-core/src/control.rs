//! Batch cancellation: a shared flag set once by the caller.
//!
//! The orchestrator only sees a `&dyn Fn() -> bool` check; `CancelToken` is the
//! usual way to produce one and to flip it from another thread (Ctrl-C handler,
//! UI button).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Error returned when a transfer stops because the batch was cancelled.
#[derive(Debug)]
pub struct Cancelled;

impl std::fmt::Display for Cancelled {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "cancelled by user")
    }
}

impl std::error::Error for Cancelled {}

/// Cloneable handle on a batch cancellation flag. Once set it stays set.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Returns true the first time it is called.
    pub fn cancel(&self) -> bool {
        !self.flag.swap(true, Ordering::SeqCst)
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_is_latched_and_shared() {
        let token = CancelToken::new();
        let other = token.clone();
        assert!(!other.is_cancelled());
        assert!(token.cancel());
        assert!(!token.cancel(), "second cancel is a no-op");
        assert!(other.is_cancelled());
    }
}
