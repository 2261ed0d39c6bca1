//! Run metrics.
//!
//! Recorded through the `metrics` facade; nothing is exported unless the
//! embedding program installs a recorder.

use metrics::{counter, histogram};

use autoclip_models::RunStage;

/// Metric names as constants for consistency.
pub mod names {
    pub const RUNS_TOTAL: &str = "autoclip_runs_total";
    pub const RUN_DURATION_SECONDS: &str = "autoclip_run_duration_seconds";
    pub const STAGES_COMPLETED_TOTAL: &str = "autoclip_stages_completed_total";
    pub const STAGE_DURATION_SECONDS: &str = "autoclip_stage_duration_seconds";
    pub const FALLBACKS_TOTAL: &str = "autoclip_fallbacks_total";
}

/// Record a stage reached and how long it took.
pub fn record_stage(stage: RunStage, duration_secs: f64) {
    let labels = [("stage", stage.as_str().to_string())];
    counter!(names::STAGES_COMPLETED_TOTAL, &labels).increment(1);
    histogram!(names::STAGE_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record a fallback taken by a step (`script`, `music`, `audio_mix`).
pub fn record_fallback(step: &str) {
    let labels = [("step", step.to_string())];
    counter!(names::FALLBACKS_TOTAL, &labels).increment(1);
}

/// Record a finished run.
pub fn record_run(success: bool, duration_secs: f64) {
    let labels = [(
        "outcome",
        if success { "success" } else { "failure" }.to_string(),
    )];
    counter!(names::RUNS_TOTAL, &labels).increment(1);
    histogram!(names::RUN_DURATION_SECONDS, &labels).record(duration_secs);
}
