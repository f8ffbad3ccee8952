//! SCDL core: track extraction from page markup and concurrent track downloads.

pub mod config;
pub mod logging;

pub mod batch;
pub mod control;
pub mod downloader;
pub mod extract;
pub mod orchestrator;
pub mod probe;
pub mod storage;
pub mod track;
pub mod transport;

pub use batch::{DownloadUnit, ProgressSnapshot, UnitState};
pub use control::CancelToken;
pub use extract::{collect_tracks, extract_tracks, PageFetcher};
pub use orchestrator::{
    BatchEvent, BatchReport, BatchSummary, DownloadOutcome, EventSink, Mode, Orchestrator,
    OutcomeStatus, PrepareError,
};
pub use track::TrackRecord;
pub use transport::{Transport, TransportOptions};
