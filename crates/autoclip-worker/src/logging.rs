//! Structured run logging utilities.
//!
//! Provides consistent, structured logging for a pipeline run with
//! tracing spans and contextual information.

use tracing::{error, info, warn, Span};

use autoclip_models::{RunId, RunStage};

/// Run logger for structured logging with consistent formatting.
///
/// Every event carries the run ID and the stage it refers to.
#[derive(Debug, Clone)]
pub struct RunLogger {
    run_id: String,
}

impl RunLogger {
    pub fn new(run_id: &RunId) -> Self {
        Self {
            run_id: run_id.to_string(),
        }
    }

    /// Log the start of a run.
    pub fn log_start(&self, message: &str) {
        info!(
            run_id = %self.run_id,
            stage = %RunStage::Start,
            "Run started: {}", message
        );
    }

    /// Log that a stage was reached.
    pub fn log_stage(&self, stage: RunStage, elapsed_secs: f64) {
        info!(
            run_id = %self.run_id,
            stage = %stage,
            elapsed_secs,
            "Stage reached"
        );
    }

    /// Log a fallback taken instead of failing.
    pub fn log_fallback(&self, stage: RunStage, message: &str) {
        warn!(
            run_id = %self.run_id,
            stage = %stage,
            "Run fallback: {}", message
        );
    }

    /// Log a fatal error, with FFmpeg's error output when there is some.
    pub fn log_error(&self, stage: RunStage, message: &str, stderr: Option<&str>) {
        error!(
            run_id = %self.run_id,
            stage = %stage,
            stderr,
            "Run failed: {}", message
        );
    }

    /// Log the completion of a run.
    pub fn log_completion(&self, message: &str) {
        info!(
            run_id = %self.run_id,
            stage = %RunStage::Done,
            "Run completed: {}", message
        );
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Tracing span covering the whole run.
    pub fn create_span(&self) -> Span {
        tracing::info_span!("run", run_id = %self.run_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_logger_creation() {
        let run_id = RunId::from_string("run-123");
        let logger = RunLogger::new(&run_id);
        assert_eq!(logger.run_id(), "run-123");
    }
}
