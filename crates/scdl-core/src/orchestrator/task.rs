//! One unit's lifecycle: cancellation check, transfer, completion handling.

use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::batch::{BatchState, UnitState};
use crate::downloader::{self, TransferError};
use crate::track::TrackRecord;
use crate::transport::Transport;

use super::events::{BatchEvent, EventSink};
use super::{CancelCheck, DownloadOutcome, ProgressHook, TagHook};

/// Everything a unit task borrows from the batch.
pub(super) struct UnitContext<'a> {
    pub transport: &'a Transport,
    pub state: &'a BatchState,
    pub events: &'a dyn EventSink,
    /// Destination file per unit, distinct within the batch.
    pub paths: &'a [PathBuf],
    pub tag_hook: Option<TagHook<'a>>,
    pub progress_hook: ProgressHook<'a>,
    pub cancel: CancelCheck<'a>,
}

impl UnitContext<'_> {
    fn cancelled(&self) -> bool {
        self.state.observe_cancel(self.cancel)
    }

    fn bytes_received(&self, index: usize) -> u64 {
        self.state.unit(index).map_or(0, |u| u.bytes_received())
    }
}

/// Download unit `index` (track `track`) to completion, failure or cancellation.
pub(super) fn run_unit(ctx: &UnitContext<'_>, index: usize, track: &TrackRecord) -> DownloadOutcome {
    if ctx.cancelled() {
        ctx.state.transition(index, UnitState::Cancelled);
        return DownloadOutcome::cancelled(track.clone(), 0);
    }
    ctx.state.transition(index, UnitState::InFlight);

    let path = ctx.paths[index].as_path();
    tracing::debug!(url = %track.media_url(), path = %path.display(), "starting transfer");

    let mut on_progress = |bytes: u64| {
        let snapshot = ctx.state.record_progress(index, bytes, Instant::now());
        (ctx.progress_hook)(snapshot);
    };
    let cancel = || ctx.cancelled();
    let result = downloader::download_to_file(
        ctx.transport,
        track.media_url(),
        path,
        &mut on_progress,
        &cancel,
    );

    match result {
        Ok(bytes) => complete(ctx, index, track, path, bytes),
        Err(TransferError::Cancelled) => {
            ctx.state.transition(index, UnitState::Cancelled);
            DownloadOutcome::cancelled(track.clone(), ctx.bytes_received(index))
        }
        Err(e) => {
            ctx.state.transition(index, UnitState::Failed);
            ctx.events.event(&BatchEvent::DownloadFailed {
                track: track.clone(),
                error: e.to_string(),
            });
            DownloadOutcome::failed(track.clone(), e, ctx.bytes_received(index))
        }
    }
}

/// Completion handler: post-processing is skipped once cancellation is seen.
fn complete(
    ctx: &UnitContext<'_>,
    index: usize,
    track: &TrackRecord,
    path: &Path,
    bytes: u64,
) -> DownloadOutcome {
    let snapshot = ctx.state.record_progress(index, bytes, Instant::now());
    (ctx.progress_hook)(snapshot);

    if ctx.cancelled() {
        tracing::debug!(path = %path.display(), "transfer finished after cancellation, skipping post-processing");
        ctx.state.transition(index, UnitState::Cancelled);
        return DownloadOutcome::cancelled(track.clone(), bytes);
    }
    ctx.state.transition(index, UnitState::Completed);

    let tag_error = ctx.tag_hook.and_then(|hook| run_tag_hook(hook, track, path).err());
    if let Some(error) = &tag_error {
        ctx.events.event(&BatchEvent::TagFailed {
            track: track.clone(),
            error: error.clone(),
        });
    }
    ctx.events.event(&BatchEvent::Downloaded {
        track: track.clone(),
    });
    DownloadOutcome::success(track.clone(), bytes, tag_error)
}

/// Run the tag hook, turning both errors and panics into a message.
fn run_tag_hook(hook: TagHook<'_>, track: &TrackRecord, path: &Path) -> Result<(), String> {
    match panic::catch_unwind(AssertUnwindSafe(|| hook(track, path))) {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(format!("{:#}", e)),
        Err(payload) => Err(format!("tag hook panicked: {}", panic_message(&payload))),
    }
}

pub(super) fn panic_message(payload: &Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
