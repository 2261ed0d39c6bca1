//! Worker error types.

use thiserror::Error;

use autoclip_models::RunStage;

pub type WorkerResult<T> = Result<T, WorkerError>;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A fatal step failed; no video was produced.
    #[error("Run failed before {stage}: {source}")]
    StageFailed {
        stage: RunStage,
        #[source]
        source: Box<WorkerError>,
    },

    #[error("Source error: {0}")]
    Source(#[from] autoclip_sources::SourceError),

    #[error("Media error: {0}")]
    Media(#[from] autoclip_media::MediaError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WorkerError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn stage_failed(stage: RunStage, source: impl Into<WorkerError>) -> Self {
        Self::StageFailed {
            stage,
            source: Box::new(source.into()),
        }
    }

    /// Stage the run was trying to reach when it failed.
    ///
    /// `Start` means the run directory itself could not be set up.
    pub fn failed_stage(&self) -> Option<RunStage> {
        match self {
            WorkerError::StageFailed { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// Tail of FFmpeg/FFprobe error output behind this error, if any.
    pub fn ffmpeg_stderr(&self) -> Option<&str> {
        match self {
            WorkerError::StageFailed { source, .. } => source.ffmpeg_stderr(),
            WorkerError::Media(e) => e.stderr(),
            _ => None,
        }
    }
}
