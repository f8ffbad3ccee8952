//! Per-track transfer error.

use thiserror::Error;

/// Why a single track's transfer did not complete.
#[derive(Debug, Error)]
pub enum TransferError {
    /// The batch was cancelled before or during the transfer.
    #[error("cancelled by user")]
    Cancelled,
    /// Curl reported an error (timeout, connection, etc.).
    #[error("{0}")]
    Curl(#[from] curl::Error),
    /// HTTP response had a non-2xx status.
    #[error("HTTP {0}")]
    Http(u32),
    /// Creating, writing or renaming the local file failed.
    #[error("storage: {0}")]
    Storage(#[from] std::io::Error),
    /// Server announced a length and closed early.
    #[error("partial transfer: expected {expected} bytes, got {received}")]
    PartialTransfer { expected: u64, received: u64 },
    /// The worker thread running the transfer panicked.
    #[error("worker panicked: {0}")]
    Panicked(String),
}
