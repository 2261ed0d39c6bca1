//! FFmpeg progress parsing and reporting.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tracing::info;

/// Progress information from FFmpeg.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FfmpegProgress {
    /// Current frame number
    pub frame: u64,
    /// Current FPS
    pub fps: f64,
    /// Output time in milliseconds
    pub out_time_ms: i64,
    /// Output time as string (HH:MM:SS.microseconds)
    pub out_time: String,
    /// Encoding speed (e.g., 1.5 = 1.5x realtime)
    pub speed: f64,
    /// Whether encoding is complete
    pub is_complete: bool,
}

impl FfmpegProgress {
    /// Progress percentage for an output of `total_secs`.
    pub fn percentage(&self, total_secs: f64) -> f64 {
        if self.is_complete {
            return 100.0;
        }
        if total_secs <= 0.0 {
            return 0.0;
        }
        ((self.out_time_ms as f64 / 1000.0 / total_secs) * 100.0).clamp(0.0, 100.0)
    }
}

/// Logs render progress in fixed percentage steps.
///
/// FFmpeg reports progress twice a second; only the first report that
/// crosses each step is logged.
#[derive(Debug, Clone)]
pub struct ProgressReporter {
    label: String,
    total_secs: f64,
    step: u32,
    last_logged: Arc<AtomicU32>,
}

impl ProgressReporter {
    pub fn new(label: impl Into<String>, total_secs: f64) -> Self {
        Self {
            label: label.into(),
            total_secs,
            step: 25,
            last_logged: Arc::new(AtomicU32::new(0)),
        }
    }

    /// Returns the percentage bucket if this report crossed a new step.
    pub fn observe(&self, progress: &FfmpegProgress) -> Option<u32> {
        let bucket = (progress.percentage(self.total_secs) as u32 / self.step) * self.step;
        let previous = self.last_logged.fetch_max(bucket, Ordering::Relaxed);
        (bucket > previous).then_some(bucket)
    }

    /// Callback suitable for `FfmpegRunner::run_with_progress`.
    pub fn callback(self) -> impl Fn(FfmpegProgress) + Send + 'static {
        move |progress| {
            if let Some(percent) = self.observe(&progress) {
                info!(
                    label = %self.label,
                    percent,
                    speed = progress.speed,
                    "Render progress"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_percentage() {
        let progress = FfmpegProgress {
            out_time_ms: 5000,
            ..Default::default()
        };

        assert!((progress.percentage(10.0) - 50.0).abs() < 0.01);
        assert!((progress.percentage(5.0) - 100.0).abs() < 0.01);
        assert_eq!(progress.percentage(0.0), 0.0);
    }

    #[test]
    fn test_reporter_logs_each_step_once() {
        let reporter = ProgressReporter::new("final", 10.0);
        let at = |ms| FfmpegProgress {
            out_time_ms: ms,
            ..Default::default()
        };

        assert_eq!(reporter.observe(&at(1000)), None);
        assert_eq!(reporter.observe(&at(2600)), Some(25));
        assert_eq!(reporter.observe(&at(3000)), None);
        assert_eq!(reporter.observe(&at(7600)), Some(75));
        assert_eq!(reporter.observe(&at(5000)), None);

        let done = FfmpegProgress {
            is_complete: true,
            ..Default::default()
        };
        assert_eq!(reporter.observe(&done), Some(100));
    }
}
