//! Run identity, lifecycle stages and the per-run path set.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Unique identifier for a pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub String);

impl RunId {
    /// Generate a new random run ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Linear lifecycle of a run.
///
/// Stages only ever advance; there is no branching state. A failure leaves
/// the run at the last stage it reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RunStage {
    #[default]
    Start,
    TopicFetched,
    ScriptReady,
    ImagesReady,
    VoiceoverReady,
    MusicResolved,
    AudioComposed,
    ClipsBuilt,
    VideoRendered,
    Done,
}

impl RunStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStage::Start => "start",
            RunStage::TopicFetched => "topic_fetched",
            RunStage::ScriptReady => "script_ready",
            RunStage::ImagesReady => "images_ready",
            RunStage::VoiceoverReady => "voiceover_ready",
            RunStage::MusicResolved => "music_resolved",
            RunStage::AudioComposed => "audio_composed",
            RunStage::ClipsBuilt => "clips_built",
            RunStage::VideoRendered => "video_rendered",
            RunStage::Done => "done",
        }
    }

    /// The stage that follows this one, or `None` once the run is done.
    pub fn next(&self) -> Option<RunStage> {
        match self {
            RunStage::Start => Some(RunStage::TopicFetched),
            RunStage::TopicFetched => Some(RunStage::ScriptReady),
            RunStage::ScriptReady => Some(RunStage::ImagesReady),
            RunStage::ImagesReady => Some(RunStage::VoiceoverReady),
            RunStage::VoiceoverReady => Some(RunStage::MusicResolved),
            RunStage::MusicResolved => Some(RunStage::AudioComposed),
            RunStage::AudioComposed => Some(RunStage::ClipsBuilt),
            RunStage::ClipsBuilt => Some(RunStage::VideoRendered),
            RunStage::VideoRendered => Some(RunStage::Done),
            RunStage::Done => None,
        }
    }
}

impl fmt::Display for RunStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// File names used inside a run directory.
pub mod names {
    pub const VOICEOVER: &str = "voiceover.mp3";
    pub const BACKGROUND_MUSIC: &str = "background_music.mp3";
    pub const MIXED_AUDIO: &str = "mixed_audio.m4a";
    pub const OUTPUT_VIDEO: &str = "output_video.mp4";
}

/// Path set for a single run.
///
/// Every artifact of a run lives under `<root>/<run_id>/`, so two runs that
/// share a work root never write to the same files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunWorkspace {
    run_id: RunId,
    dir: PathBuf,
}

impl RunWorkspace {
    /// Build the path set for `run_id` under `root`. Nothing is created on disk.
    pub fn new(root: impl AsRef<Path>, run_id: RunId) -> Self {
        let dir = root.as_ref().join(run_id.as_str());
        Self { run_id, dir }
    }

    pub fn run_id(&self) -> &RunId {
        &self.run_id
    }

    /// The run directory itself.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn voiceover(&self) -> PathBuf {
        self.dir.join(names::VOICEOVER)
    }

    pub fn background_music(&self) -> PathBuf {
        self.dir.join(names::BACKGROUND_MUSIC)
    }

    /// Downloaded image `index` (zero-based).
    pub fn image(&self, index: usize) -> PathBuf {
        self.dir.join(format!("image_{}.jpg", index))
    }

    /// Rendered intermediate clip for image `index`.
    pub fn clip(&self, index: usize) -> PathBuf {
        self.dir.join(format!("clip_{}.mp4", index))
    }

    pub fn mixed_audio(&self) -> PathBuf {
        self.dir.join(names::MIXED_AUDIO)
    }

    pub fn output(&self) -> PathBuf {
        self.dir.join(names::OUTPUT_VIDEO)
    }
}
