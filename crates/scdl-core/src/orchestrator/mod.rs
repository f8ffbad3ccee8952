//! Download orchestrator: size probing, destination preparation and batch runs.
//!
//! A batch is run either sequentially (one track fully downloaded before the
//! next, in input order) or in parallel (one worker thread per track, bounded
//! only by the transport's connection budget). Single-track failures are
//! recorded in that track's outcome; only destination creation aborts a batch.

mod events;
mod summary;
mod task;

pub use events::{BatchEvent, EventSink, TracingSink};
pub use summary::BatchSummary;

use std::fs;
use std::path::{Path, PathBuf};

use crate::batch::{BatchState, DownloadUnit, ProgressSnapshot, UnitState};
use crate::control::Cancelled;
use crate::downloader::TransferError;
use crate::probe;
use crate::track::{unique_file_names, TrackRecord};
use crate::transport::Transport;

use task::{panic_message, run_unit, UnitContext};

/// Post-download hook (e.g. ID3 tagging) called with the track and its local file.
pub type TagHook<'a> = &'a (dyn Fn(&TrackRecord, &Path) -> anyhow::Result<()> + Sync);
/// Receives the aggregate progress after every chunk of any transfer.
pub type ProgressHook<'a> = &'a (dyn Fn(ProgressSnapshot) + Sync);
/// Returns true once the caller wants the batch cancelled.
pub type CancelCheck<'a> = &'a (dyn Fn() -> bool + Sync);

/// Download strategy for a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    Sequential,
    #[default]
    Parallel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeStatus {
    Success,
    Failed,
    Cancelled,
}

/// Result for one input track.
#[derive(Debug)]
pub struct DownloadOutcome {
    pub track: TrackRecord,
    pub status: OutcomeStatus,
    /// Set when `status` is `Failed`.
    pub error: Option<TransferError>,
    /// Tag hook failure; does not change `status`.
    pub tag_error: Option<String>,
    /// Bytes received for this track; partial when the transfer did not finish.
    pub bytes: u64,
}

impl DownloadOutcome {
    pub fn success(track: TrackRecord, bytes: u64, tag_error: Option<String>) -> Self {
        Self {
            track,
            status: OutcomeStatus::Success,
            error: None,
            tag_error,
            bytes,
        }
    }

    pub fn failed(track: TrackRecord, error: TransferError, bytes: u64) -> Self {
        Self {
            track,
            status: OutcomeStatus::Failed,
            error: Some(error),
            tag_error: None,
            bytes,
        }
    }

    pub fn cancelled(track: TrackRecord, bytes: u64) -> Self {
        Self {
            track,
            status: OutcomeStatus::Cancelled,
            error: None,
            tag_error: None,
            bytes,
        }
    }
}

/// Destination directory could not be created. Fatal for the batch.
#[derive(Debug, thiserror::Error)]
pub enum PrepareError {
    #[error("cannot create destination directory {path}: {source}")]
    DestinationCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Outcomes plus the final unit bookkeeping of a run.
#[derive(Debug)]
pub struct BatchReport {
    /// One per input track, in input order.
    pub outcomes: Vec<DownloadOutcome>,
    pub units: Vec<DownloadUnit>,
    pub progress: ProgressSnapshot,
    pub cancelled: bool,
}

impl BatchReport {
    pub fn summary(&self) -> BatchSummary {
        BatchSummary::from_outcomes(&self.outcomes)
    }
}

/// Runs download batches over a shared transport.
pub struct Orchestrator {
    transport: Transport,
    events: Box<dyn EventSink>,
}

impl Orchestrator {
    pub fn new(transport: Transport, events: Box<dyn EventSink>) -> Self {
        Self { transport, events }
    }

    /// Orchestrator that only logs events through `tracing`.
    pub fn with_tracing(transport: Transport) -> Self {
        Self::new(transport, Box::new(TracingSink))
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// HEAD-probe each track's size, in order.
    ///
    /// A failed probe records size 0 (unknown) and moves on. Returns an empty
    /// list as soon as `cancel` reports true.
    pub fn probe_sizes(&self, tracks: &[TrackRecord], cancel: CancelCheck<'_>) -> Vec<DownloadUnit> {
        let mut units = Vec::with_capacity(tracks.len());
        for track in tracks {
            if cancel() {
                return Vec::new();
            }
            self.events.event(&BatchEvent::ProbingSize {
                track: track.clone(),
            });

            let size = match probe::probe_size(&self.transport, track.media_url(), cancel) {
                Ok(n) => n,
                Err(e) if e.is::<Cancelled>() => return Vec::new(),
                Err(e) => {
                    self.events.event(&BatchEvent::ProbeFailed {
                        track: track.clone(),
                        error: format!("{:#}", e),
                    });
                    0
                }
            };
            units.push(DownloadUnit::new(track.media_url(), size));
        }
        units
    }

    /// Ensure the destination directory exists.
    pub fn prepare_destination(&self, path: &Path) -> Result<(), PrepareError> {
        fs::create_dir_all(path).map_err(|source| PrepareError::DestinationCreate {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "destination ready");
        Ok(())
    }

    /// Download every track and return one outcome per track, in input order.
    pub fn run(
        &self,
        tracks: &[TrackRecord],
        destination_dir: &Path,
        units: Vec<DownloadUnit>,
        mode: Mode,
        tag_hook: Option<TagHook<'_>>,
        progress_hook: ProgressHook<'_>,
        cancel: CancelCheck<'_>,
    ) -> Vec<DownloadOutcome> {
        self.run_with_report(tracks, destination_dir, units, mode, tag_hook, progress_hook, cancel)
            .outcomes
    }

    /// Like [`run`](Self::run) but also returns the final unit state and totals.
    pub fn run_with_report(
        &self,
        tracks: &[TrackRecord],
        destination_dir: &Path,
        units: Vec<DownloadUnit>,
        mode: Mode,
        tag_hook: Option<TagHook<'_>>,
        progress_hook: ProgressHook<'_>,
        cancel: CancelCheck<'_>,
    ) -> BatchReport {
        let state = BatchState::new(align_units(tracks, units));
        self.events.event(&BatchEvent::Started {
            tracks: tracks.len(),
        });
        tracing::info!(tracks = tracks.len(), ?mode, dir = %destination_dir.display(), "batch started");

        // Fixed before any transfer starts so no two units share a file.
        let paths: Vec<PathBuf> = unique_file_names(tracks)
            .into_iter()
            .map(|name| destination_dir.join(name))
            .collect();

        let ctx = UnitContext {
            transport: &self.transport,
            state: &state,
            events: self.events.as_ref(),
            paths: &paths,
            tag_hook,
            progress_hook,
            cancel,
        };

        let outcomes = match mode {
            Mode::Sequential => tracks
                .iter()
                .enumerate()
                .map(|(index, track)| run_unit(&ctx, index, track))
                .collect(),
            Mode::Parallel => run_parallel(&ctx, tracks),
        };

        let cancelled = state.is_cancelled();
        if cancelled {
            self.events.event(&BatchEvent::Cancelled);
        }
        let summary = BatchSummary::from_outcomes(&outcomes);
        self.events.event(&BatchEvent::Finished { summary });

        BatchReport {
            outcomes,
            units: state.units(),
            progress: state.snapshot(),
            cancelled,
        }
    }
}

/// One scoped thread per track; waits for all of them.
fn run_parallel(ctx: &UnitContext<'_>, tracks: &[TrackRecord]) -> Vec<DownloadOutcome> {
    std::thread::scope(|s| {
        let handles: Vec<_> = tracks
            .iter()
            .enumerate()
            .map(|(index, track)| s.spawn(move || run_unit(ctx, index, track)))
            .collect();

        handles
            .into_iter()
            .zip(tracks)
            .enumerate()
            .map(|(index, (handle, track))| match handle.join() {
                Ok(outcome) => outcome,
                Err(payload) => {
                    let msg = panic_message(&payload);
                    tracing::warn!(track = %track, "download worker panicked: {}", msg);
                    ctx.state.transition(index, UnitState::Failed);
                    let bytes = ctx.state.unit(index).map_or(0, |u| u.bytes_received());
                    DownloadOutcome::failed(track.clone(), TransferError::Panicked(msg), bytes)
                }
            })
            .collect()
    })
}

/// One unit per track, in track order. Units are matched by URL; tracks without
/// a probed unit get one with unknown size.
fn align_units(tracks: &[TrackRecord], units: Vec<DownloadUnit>) -> Vec<DownloadUnit> {
    let mut pool: Vec<Option<DownloadUnit>> = units.into_iter().map(Some).collect();
    tracks
        .iter()
        .map(|track| {
            pool.iter_mut()
                .find(|slot| matches!(slot, Some(u) if u.url() == track.media_url()))
                .and_then(Option::take)
                .map(|u| DownloadUnit::new(u.url(), u.total_size()))
                .unwrap_or_else(|| DownloadUnit::new(track.media_url(), 0))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn align_units_matches_by_url_and_fills_gaps() {
        let tracks = vec![
            TrackRecord::unknown("http://x/a"),
            TrackRecord::unknown("http://x/b"),
            TrackRecord::unknown("http://x/c"),
        ];
        let units = vec![DownloadUnit::new("http://x/c", 30), DownloadUnit::new("http://x/a", 10)];
        let aligned = align_units(&tracks, units);
        assert_eq!(aligned.len(), 3);
        assert_eq!(aligned[0].url(), "http://x/a");
        assert_eq!(aligned[0].total_size(), 10);
        assert_eq!(aligned[1].total_size(), 0);
        assert_eq!(aligned[2].total_size(), 30);
        assert!(aligned.iter().all(|u| u.state() == UnitState::Pending));
    }

    #[test]
    fn prepare_destination_creates_nested_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("SC tracks").join("2024");
        let orch = Orchestrator::with_tracing(Transport::default());
        orch.prepare_destination(&target).unwrap();
        assert!(target.is_dir());
        // Idempotent.
        orch.prepare_destination(&target).unwrap();
    }

    #[test]
    fn prepare_destination_fails_on_file_path() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("occupied");
        std::fs::write(&file, b"x").unwrap();
        let orch = Orchestrator::with_tracing(Transport::default());
        let err = orch.prepare_destination(&file.join("sub")).unwrap_err();
        assert!(matches!(err, PrepareError::DestinationCreate { .. }));
    }

    #[test]
    fn probe_sizes_cancelled_returns_empty() {
        let orch = Orchestrator::with_tracing(Transport::default());
        let tracks = vec![TrackRecord::unknown("http://127.0.0.1:9/a")];
        assert!(orch.probe_sizes(&tracks, &|| true).is_empty());
    }

    #[test]
    fn run_cancelled_before_start_marks_all_cancelled() {
        let dir = tempfile::tempdir().unwrap();
        let orch = Orchestrator::with_tracing(Transport::default());
        let tracks = vec![
            TrackRecord::new("A", "One", "http://127.0.0.1:9/1"),
            TrackRecord::new("B", "Two", "http://127.0.0.1:9/2"),
        ];
        for mode in [Mode::Sequential, Mode::Parallel] {
            let report = orch.run_with_report(
                &tracks,
                dir.path(),
                Vec::new(),
                mode,
                None,
                &|_| panic!("no progress expected"),
                &|| true,
            );
            assert_eq!(report.outcomes.len(), 2);
            assert!(report
                .outcomes
                .iter()
                .all(|o| o.status == OutcomeStatus::Cancelled));
            assert!(report.cancelled);
            assert_eq!(report.progress.total_received, 0);
            assert!(report.units.iter().all(|u| u.state() == UnitState::Cancelled));
        }
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
