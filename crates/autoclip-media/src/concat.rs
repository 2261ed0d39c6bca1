//! Final compose: clips joined in order, muxed with the composed audio.

use std::path::{Path, PathBuf};
use tracing::info;

use autoclip_models::EncodingConfig;

use crate::audio::AudioTrack;
use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};
use crate::filters::{compose_concat_filter, even_floor};
use crate::progress::ProgressReporter;
use crate::visual::{total_duration, ClipPlan};

/// Output frame of the final video.
///
/// Clips of different sizes are centred on a canvas as wide as the widest
/// clip and as tall as the tallest one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
}

impl Canvas {
    pub fn compose<I>(dims: I) -> MediaResult<Self>
    where
        I: IntoIterator<Item = (u32, u32)>,
    {
        let (width, height) = dims
            .into_iter()
            .fold(None, |acc: Option<(u32, u32)>, (w, h)| match acc {
                Some((mw, mh)) => Some((mw.max(w), mh.max(h))),
                None => Some((w, h)),
            })
            .ok_or_else(|| MediaError::invalid_input("cannot compose a canvas from zero clips"))?;

        Ok(Self {
            width: even_floor(width),
            height: even_floor(height),
        })
    }

    pub fn for_clips(clips: &[ClipPlan]) -> MediaResult<Self> {
        Self::compose(clips.iter().map(|c| (c.width, c.height)))
    }
}

/// The rendered output file.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedVideo {
    pub path: PathBuf,
    /// Seconds; equal to the audio duration
    pub duration: f64,
    pub clip_count: usize,
    pub canvas: Canvas,
}

/// Build the compose command.
///
/// Inputs `0..N` are the rendered clips, input `N` the audio track. The
/// output is cut to the clip total, which equals the audio duration.
pub fn build_concat_command(
    clips: &[ClipPlan],
    audio: &AudioTrack,
    canvas: Canvas,
    output: &Path,
    encoding: &EncodingConfig,
) -> MediaResult<FfmpegCommand> {
    if clips.is_empty() {
        return Err(MediaError::invalid_input("no clips to concatenate"));
    }

    let mut cmd = FfmpegCommand::new(output);
    for clip in clips {
        cmd = cmd.input(&clip.output);
    }

    Ok(cmd
        .input(&audio.path)
        .filter_complex(compose_concat_filter(
            clips.len(),
            canvas.width,
            canvas.height,
            encoding.fps,
        ))
        .map("[vout]")
        .map(format!("{}:a:0", clips.len()))
        .output_args(encoding.video_args())
        .output_args(encoding.audio_args())
        .output_args(["-movflags", "+faststart"])
        .duration(total_duration(clips)))
}

/// Concatenate rendered clips and mux them with `audio` into `output`.
pub async fn concat_and_mux(
    runner: &FfmpegRunner,
    clips: &[ClipPlan],
    audio: &AudioTrack,
    output: &Path,
    encoding: &EncodingConfig,
) -> MediaResult<RenderedVideo> {
    let canvas = Canvas::for_clips(clips)?;
    let duration = total_duration(clips);
    let cmd = build_concat_command(clips, audio, canvas, output, encoding)?;

    info!(
        clips = clips.len(),
        width = canvas.width,
        height = canvas.height,
        duration,
        output = %output.display(),
        "Composing final video"
    );

    let reporter = ProgressReporter::new("compose", duration);
    runner.run_with_progress(&cmd, reporter.callback()).await?;

    if !output.exists() {
        return Err(MediaError::internal(format!(
            "FFmpeg reported success but {} is missing",
            output.display()
        )));
    }

    Ok(RenderedVideo {
        path: output.to_path_buf(),
        duration,
        clip_count: clips.len(),
        canvas,
    })
}
