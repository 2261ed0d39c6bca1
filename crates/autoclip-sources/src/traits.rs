//! Collaborator seams used by the run pipeline.

use async_trait::async_trait;
use std::path::Path;

use autoclip_models::{ImageAsset, RunWorkspace, Script, Topic};

use crate::error::SourceResult;

/// Supplies the trending topic for a run.
#[cfg_attr(any(test, feature = "mocks"), mockall::automock)]
#[async_trait]
pub trait TopicSource: Send + Sync {
    async fn fetch_topic(&self, country: &str) -> SourceResult<Topic>;
}

/// Turns a topic into narration text.
#[cfg_attr(any(test, feature = "mocks"), mockall::automock)]
#[async_trait]
pub trait ScriptWriter: Send + Sync {
    async fn write_script(&self, topic: &Topic) -> SourceResult<Script>;
}

/// Finds and saves `count` images for a topic, in order.
#[cfg_attr(any(test, feature = "mocks"), mockall::automock)]
#[async_trait]
pub trait ImageSource: Send + Sync {
    async fn fetch_images(
        &self,
        topic: &Topic,
        count: usize,
        workspace: &RunWorkspace,
    ) -> SourceResult<Vec<ImageAsset>>;
}

/// Synthesizes the voiceover for a script into `output`.
#[cfg_attr(any(test, feature = "mocks"), mockall::automock)]
#[async_trait]
pub trait VoiceSynthesizer: Send + Sync {
    async fn synthesize(&self, script: &Script, output: &Path) -> SourceResult<()>;
}

/// Saves one background track into `output`.
#[cfg_attr(any(test, feature = "mocks"), mockall::automock)]
#[async_trait]
pub trait MusicSource: Send + Sync {
    async fn fetch_music(&self, output: &Path) -> SourceResult<()>;
}
