//! Human-level batch events for a log/status sink.
//!
//! The core emits these; formatting and display are left to the receiver.

use crate::track::TrackRecord;

use super::summary::BatchSummary;

#[derive(Debug, Clone, PartialEq)]
pub enum BatchEvent {
    Started { tracks: usize },
    ProbingSize { track: TrackRecord },
    /// Size unknown; progress totals will under-count this track.
    ProbeFailed { track: TrackRecord, error: String },
    Downloaded { track: TrackRecord },
    DownloadFailed { track: TrackRecord, error: String },
    TagFailed { track: TrackRecord, error: String },
    Cancelled,
    Finished { summary: BatchSummary },
}

/// Receives batch events. Called from worker threads.
pub trait EventSink: Send + Sync {
    fn event(&self, event: &BatchEvent);
}

impl<F> EventSink for F
where
    F: Fn(&BatchEvent) + Send + Sync,
{
    fn event(&self, event: &BatchEvent) {
        self(event)
    }
}

/// Sink that forwards every event to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn event(&self, event: &BatchEvent) {
        match event {
            BatchEvent::Started { tracks } => tracing::info!(tracks, "download started"),
            BatchEvent::ProbingSize { track } => {
                tracing::debug!(track = %track, "computing size")
            }
            BatchEvent::ProbeFailed { track, error } => {
                tracing::warn!(track = %track, "size unknown, progress may be wrong: {}", error)
            }
            BatchEvent::Downloaded { track } => {
                tracing::info!(file = %track.file_name(), "downloaded track")
            }
            BatchEvent::DownloadFailed { track, error } => {
                tracing::warn!(file = %track.file_name(), "unable to download track: {}", error)
            }
            BatchEvent::TagFailed { track, error } => {
                tracing::warn!(file = %track.file_name(), "tagging failed: {}", error)
            }
            BatchEvent::Cancelled => tracing::info!("downloads cancelled by user"),
            BatchEvent::Finished { summary } => tracing::info!(
                succeeded = summary.succeeded,
                failed = summary.failed,
                cancelled = summary.cancelled,
                "batch finished"
            ),
        }
    }
}
