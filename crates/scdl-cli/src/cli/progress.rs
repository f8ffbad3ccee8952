//! Terminal output for a running batch: throttled progress line and event lines.

use std::io::Write;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use scdl_core::orchestrator::TracingSink;
use scdl_core::{BatchEvent, EventSink, ProgressSnapshot};

const PRINT_INTERVAL: Duration = Duration::from_millis(500);
const MIB: f64 = 1_048_576.0;

/// `"  1.5 / 6.0 MiB (25.0%)  320 kB/s"`, or without the total when sizes are unknown.
pub fn format_progress(s: &ProgressSnapshot) -> String {
    let done = s.total_received as f64 / MIB;
    let rate_kb = s.bytes_per_sec / 1000.0;
    match s.fraction() {
        Some(f) => format!(
            "  {:.1} / {:.1} MiB ({:.1}%)  {:.0} kB/s",
            done,
            s.total_size as f64 / MIB,
            f * 100.0,
            rate_kb
        ),
        None => format!("  {:.1} MiB  {:.0} kB/s", done, rate_kb),
    }
}

/// Prints the progress line at most every 500 ms, plus the final state.
#[derive(Default)]
pub struct ProgressPrinter {
    last_print: Mutex<Option<Instant>>,
}

impl ProgressPrinter {
    pub fn update(&self, snapshot: ProgressSnapshot) {
        let now = Instant::now();
        let finished = snapshot.total_size > 0 && snapshot.total_received >= snapshot.total_size;
        {
            let mut last = self.last_print.lock().unwrap_or_else(|e| e.into_inner());
            if !finished && last.is_some_and(|t| now.duration_since(t) < PRINT_INTERVAL) {
                return;
            }
            *last = Some(now);
        }
        let mut err = std::io::stderr().lock();
        let _ = write!(err, "\r{}   ", format_progress(&snapshot));
        let _ = err.flush();
    }

    /// End the progress line.
    pub fn finish(&self) {
        if self.last_print.lock().map(|l| l.is_some()).unwrap_or(false) {
            eprintln!();
        }
    }
}

/// Shows batch events to the user and logs them.
pub struct ConsoleSink;

impl EventSink for ConsoleSink {
    fn event(&self, event: &BatchEvent) {
        TracingSink.event(event);
        match event {
            BatchEvent::Started { tracks } => eprintln!("Downloading {} track(s)", tracks),
            BatchEvent::ProbingSize { .. } => {}
            BatchEvent::ProbeFailed { track, .. } => {
                eprintln!("\rSize unknown for {}, progress may be inaccurate", track)
            }
            BatchEvent::Downloaded { track } => eprintln!("\rDownloaded: {}", track.file_name()),
            BatchEvent::DownloadFailed { track, error } => {
                eprintln!("\rUnable to download {}: {}", track.file_name(), error)
            }
            BatchEvent::TagFailed { track, error } => {
                eprintln!("\rTagging failed for {}: {}", track.file_name(), error)
            }
            BatchEvent::Cancelled => eprintln!("\rDownloads cancelled"),
            BatchEvent::Finished { summary } => eprintln!(
                "\rFinished: {} downloaded, {} failed, {} cancelled",
                summary.succeeded, summary.failed, summary.cancelled
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_known_total() {
        let s = ProgressSnapshot {
            total_received: 1_572_864,
            total_size: 6_291_456,
            bytes_per_sec: 320_000.0,
        };
        assert_eq!(format_progress(&s), "  1.5 / 6.0 MiB (25.0%)  320 kB/s");
    }

    #[test]
    fn formats_unknown_total() {
        let s = ProgressSnapshot {
            total_received: 524_288,
            total_size: 0,
            bytes_per_sec: 0.0,
        };
        assert_eq!(format_progress(&s), "  0.5 MiB  0 kB/s");
    }
}
