//! Still-image clip sequence.
//!
//! Splits the voiceover duration evenly across the ordered images and renders
//! each image as its own faded clip.

use std::path::PathBuf;
use tracing::info;

use autoclip_models::EncodingConfig;

use crate::command::{format_seconds, FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};
use crate::filters::{fit_within, still_clip_filter, FadeSpec};
use crate::probe::probe_dimensions;

/// Requested fade-in and fade-out length per clip, in seconds.
pub const FADE_SECONDS: f64 = 1.0;

/// Largest frame a single clip may occupy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanvasBounds {
    pub max_width: u32,
    pub max_height: u32,
}

impl Default for CanvasBounds {
    fn default() -> Self {
        Self {
            max_width: 1920,
            max_height: 1080,
        }
    }
}

/// A local image with its decoded size.
#[derive(Debug, Clone, PartialEq)]
pub struct StillImage {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
}

/// Everything needed to render one clip.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipPlan {
    /// Position in the sequence
    pub index: usize,
    pub image: PathBuf,
    /// Rendered clip path
    pub output: PathBuf,
    /// Seconds on screen
    pub duration: f64,
    pub fade: FadeSpec,
    /// Rendered frame size
    pub width: u32,
    pub height: u32,
}

/// Plan one clip per image, each `total_duration / N` long.
///
/// `clip_path` names the rendered file for each index.
pub fn plan_clips<F>(
    images: &[StillImage],
    total_duration: f64,
    bounds: CanvasBounds,
    clip_path: F,
) -> MediaResult<Vec<ClipPlan>>
where
    F: Fn(usize) -> PathBuf,
{
    if images.is_empty() {
        return Err(MediaError::invalid_input("cannot build a video from zero images"));
    }
    if !(total_duration.is_finite() && total_duration > 0.0) {
        return Err(MediaError::invalid_input(format!(
            "total duration must be positive, got {}",
            total_duration
        )));
    }

    let per_clip = total_duration / images.len() as f64;
    let fade = FadeSpec::clamped(FADE_SECONDS, per_clip);

    Ok(images
        .iter()
        .enumerate()
        .map(|(index, image)| {
            let (width, height) =
                fit_within(image.width, image.height, bounds.max_width, bounds.max_height);
            ClipPlan {
                index,
                image: image.path.clone(),
                output: clip_path(index),
                duration: per_clip,
                fade,
                width,
                height,
            }
        })
        .collect())
}

/// Build the FFmpeg command that renders one planned clip.
pub fn build_clip_command(plan: &ClipPlan, encoding: &EncodingConfig) -> FfmpegCommand {
    FfmpegCommand::new(&plan.output)
        .input_with(
            [
                "-loop".to_string(),
                "1".to_string(),
                "-framerate".to_string(),
                encoding.fps.to_string(),
                "-t".to_string(),
                format_seconds(plan.duration),
            ],
            &plan.image,
        )
        .video_filter(still_clip_filter(plan.width, plan.height, &plan.fade, plan.duration))
        .output_args(encoding.video_args())
        .no_audio()
        .duration(plan.duration)
}

/// Probe each image's size; this is also the load-and-check for downloads.
pub async fn load_images(paths: &[PathBuf]) -> MediaResult<Vec<StillImage>> {
    let mut images = Vec::with_capacity(paths.len());
    for path in paths {
        let (width, height) = probe_dimensions(path).await?;
        images.push(StillImage {
            path: path.clone(),
            width,
            height,
        });
    }
    Ok(images)
}

/// Render planned clips in order.
pub async fn render_clips(
    runner: &FfmpegRunner,
    plans: &[ClipPlan],
    encoding: &EncodingConfig,
) -> MediaResult<()> {
    for plan in plans {
        info!(
            index = plan.index,
            image = %plan.image.display(),
            duration = plan.duration,
            width = plan.width,
            height = plan.height,
            "Rendering clip"
        );
        runner.run(&build_clip_command(plan, encoding)).await?;
    }
    Ok(())
}

/// Sum of clip durations.
pub fn total_duration(plans: &[ClipPlan]) -> f64 {
    plans.iter().map(|p| p.duration).sum()
}
