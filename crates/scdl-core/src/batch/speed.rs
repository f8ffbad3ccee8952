//! Download speed sampling.

use std::time::{Duration, Instant};

/// Minimum wall-clock time between two speed samples.
pub const SAMPLE_INTERVAL: Duration = Duration::from_millis(500);

/// Holds the last speed sample and the value currently displayed.
///
/// The first observation only seeds the baseline and reports 0. After that the
/// speed is recomputed at most once per [`SAMPLE_INTERVAL`]; in between, the
/// last computed value is returned unchanged.
#[derive(Debug, Clone, Default)]
pub struct SpeedMeter {
    baseline: Option<(Instant, u64)>,
    bytes_per_sec: f64,
}

impl SpeedMeter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the aggregate byte count observed at `now`; returns the speed to display.
    pub fn observe(&mut self, total_received: u64, now: Instant) -> f64 {
        match self.baseline {
            None => {
                self.baseline = Some((now, total_received));
                self.bytes_per_sec = 0.0;
            }
            Some((at, bytes)) => {
                let elapsed = now.saturating_duration_since(at);
                if elapsed > SAMPLE_INTERVAL {
                    let delta = total_received.saturating_sub(bytes);
                    self.bytes_per_sec = delta as f64 / elapsed.as_secs_f64();
                    self.baseline = Some((now, total_received));
                }
            }
        }
        self.bytes_per_sec
    }

    /// Last computed speed.
    pub fn bytes_per_sec(&self) -> f64 {
        self.bytes_per_sec
    }
}
