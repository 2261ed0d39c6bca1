//! Assembler seam between the run pipeline and FFmpeg.
//!
//! The pipeline drives assembly step by step (probe, audio, clips, render)
//! so each stage transition stays observable. [`FfmpegAssembler`] is the
//! production implementation; tests substitute the generated mock.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use autoclip_models::{EncodingConfig, MusicResolution, RunWorkspace};

use crate::audio::{self, AudioTrack, ComposedAudio};
use crate::command::FfmpegRunner;
use crate::concat::{concat_and_mux, RenderedVideo};
use crate::error::MediaResult;
use crate::probe::probe_audio_duration;
use crate::visual::{load_images, plan_clips, render_clips, CanvasBounds, ClipPlan};

#[cfg_attr(any(test, feature = "mocks"), mockall::automock)]
#[async_trait]
pub trait Assembler: Send + Sync {
    /// Duration of an audio file; fails if it has no decodable audio.
    async fn probe_audio(&self, path: &Path) -> MediaResult<f64>;

    /// Final audio track. Never fails; degrades to the voiceover alone.
    async fn compose_audio(
        &self,
        voiceover: &AudioTrack,
        music: &MusicResolution,
        output: &Path,
    ) -> ComposedAudio;

    /// Plan and render one clip per image, in order, covering `total_duration`.
    async fn build_clips(
        &self,
        images: &[PathBuf],
        total_duration: f64,
        workspace: &RunWorkspace,
    ) -> MediaResult<Vec<ClipPlan>>;

    /// Join rendered clips and mux them with the composed audio.
    async fn render(
        &self,
        clips: &[ClipPlan],
        audio: &ComposedAudio,
        output: &Path,
    ) -> MediaResult<RenderedVideo>;
}

/// Assembler backed by the local `ffmpeg`/`ffprobe` binaries.
#[derive(Debug, Clone, Default)]
pub struct FfmpegAssembler {
    runner: FfmpegRunner,
    encoding: EncodingConfig,
    bounds: CanvasBounds,
}

impl FfmpegAssembler {
    pub fn new(runner: FfmpegRunner, encoding: EncodingConfig, bounds: CanvasBounds) -> Self {
        Self {
            runner,
            encoding,
            bounds,
        }
    }
}

#[async_trait]
impl Assembler for FfmpegAssembler {
    async fn probe_audio(&self, path: &Path) -> MediaResult<f64> {
        probe_audio_duration(path).await
    }

    async fn compose_audio(
        &self,
        voiceover: &AudioTrack,
        music: &MusicResolution,
        output: &Path,
    ) -> ComposedAudio {
        audio::compose_audio(&self.runner, voiceover, music.path(), output, &self.encoding).await
    }

    async fn build_clips(
        &self,
        images: &[PathBuf],
        total_duration: f64,
        workspace: &RunWorkspace,
    ) -> MediaResult<Vec<ClipPlan>> {
        let stills = load_images(images).await?;
        let plans = plan_clips(&stills, total_duration, self.bounds, |i| workspace.clip(i))?;
        render_clips(&self.runner, &plans, &self.encoding).await?;
        Ok(plans)
    }

    async fn render(
        &self,
        clips: &[ClipPlan],
        audio: &ComposedAudio,
        output: &Path,
    ) -> MediaResult<RenderedVideo> {
        concat_and_mux(&self.runner, clips, audio.track(), output, &self.encoding).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use autoclip_models::RunId;
    use std::process::Command;

    fn lavfi(args: &[&str]) {
        let status = Command::new("ffmpeg")
            .args(["-y", "-v", "error"])
            .args(args)
            .status()
            .unwrap();
        assert!(status.success());
    }

    #[tokio::test]
    async fn test_missing_image_fails_build() {
        let dir = tempfile::tempdir().unwrap();
        let workspace = RunWorkspace::new(dir.path(), RunId::new());
        let assembler = FfmpegAssembler::default();

        let result = assembler
            .build_clips(&[dir.path().join("image_0.jpg")], 5.0, &workspace)
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    #[ignore = "requires ffmpeg"]
    async fn test_assembles_video_matching_voiceover_length() {
        let dir = tempfile::tempdir().unwrap();
        let workspace = RunWorkspace::new(dir.path(), RunId::from_string("it"));
        std::fs::create_dir_all(workspace.dir()).unwrap();

        let voiceover = workspace.voiceover();
        let music = workspace.background_music();
        lavfi(&["-f", "lavfi", "-i", "sine=frequency=440:duration=6", voiceover.to_str().unwrap()]);
        lavfi(&["-f", "lavfi", "-i", "sine=frequency=220:duration=2", music.to_str().unwrap()]);

        let mut images = Vec::new();
        for (i, size) in ["1280x720", "600x900", "2400x1600"].iter().enumerate() {
            let path = workspace.image(i);
            lavfi(&[
                "-f",
                "lavfi",
                "-i",
                &format!("color=c=blue:s={}", size),
                "-frames:v",
                "1",
                path.to_str().unwrap(),
            ]);
            images.push(path);
        }

        let assembler = FfmpegAssembler::default();
        let duration = assembler.probe_audio(&voiceover).await.unwrap();
        let voice = AudioTrack::new(&voiceover, duration);

        let composed = assembler
            .compose_audio(&voice, &MusicResolution::Downloaded(music), &workspace.mixed_audio())
            .await;
        assert!(composed.is_mixed());

        let clips = assembler.build_clips(&images, duration, &workspace).await.unwrap();
        assert_eq!(clips.len(), 3);

        let video = assembler
            .render(&clips, &composed, &workspace.output())
            .await
            .unwrap();
        assert_eq!(video.canvas.width, 1620);
        assert_eq!(video.canvas.height, 1080);

        let info = crate::probe::probe_media(&video.path).await.unwrap();
        assert!(info.has_audio && info.has_video);
        assert!((info.duration - duration).abs() < 0.25);
    }
}
