//! Audio track composition.
//!
//! Produces the single audio track of the final video from the voiceover
//! and an optional background track. The voiceover's duration is the
//! reference for everything: the background is attenuated, looped or trimmed
//! to it, and the mixed result is cut to exactly that length.
//!
//! Background music is strictly best-effort. Any failure while probing,
//! adjusting or mixing it degrades to voiceover-only audio.

use std::path::{Path, PathBuf};
use tracing::{info, warn};

use autoclip_models::EncodingConfig;

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};
use crate::filters::background_mix_filter;
use crate::probe::probe_audio_duration;

/// Level applied to the background track relative to its original volume.
pub const BACKGROUND_VOLUME: f64 = 0.3;

/// An audio file with a known duration.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioTrack {
    pub path: PathBuf,
    /// Duration in seconds
    pub duration: f64,
}

impl AudioTrack {
    pub fn new(path: impl Into<PathBuf>, duration: f64) -> Self {
        Self {
            path: path.into(),
            duration,
        }
    }
}

/// How the background track is matched to the voiceover length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BackgroundFit {
    /// Background is shorter: play it `extra_passes` more times, giving
    /// `looped_duration` seconds before the final cut.
    Loop { extra_passes: u32, looped_duration: f64 },
    /// Background is at least as long: keep `[0, end]`.
    Trim { end: f64 },
}

impl BackgroundFit {
    /// Decide how a background of `music_duration` covers `voice_duration`.
    pub fn reconcile(music_duration: f64, voice_duration: f64) -> MediaResult<Self> {
        if !(music_duration.is_finite() && music_duration > 0.0) {
            return Err(MediaError::invalid_media(format!(
                "background duration must be positive, got {}",
                music_duration
            )));
        }
        if !(voice_duration.is_finite() && voice_duration > 0.0) {
            return Err(MediaError::invalid_input(format!(
                "voiceover duration must be positive, got {}",
                voice_duration
            )));
        }

        if music_duration < voice_duration {
            let passes = (voice_duration / music_duration).ceil() as u32;
            Ok(BackgroundFit::Loop {
                extra_passes: passes.saturating_sub(1).max(1),
                looped_duration: music_duration * passes.max(2) as f64,
            })
        } else {
            Ok(BackgroundFit::Trim {
                end: voice_duration,
            })
        }
    }

    /// Length of background material available before the final cut.
    pub fn covered_duration(&self) -> f64 {
        match self {
            BackgroundFit::Loop {
                looped_duration, ..
            } => *looped_duration,
            BackgroundFit::Trim { end } => *end,
        }
    }

    /// Input options for the background input.
    fn input_args(&self) -> Vec<String> {
        match self {
            BackgroundFit::Loop { extra_passes, .. } => {
                vec!["-stream_loop".to_string(), extra_passes.to_string()]
            }
            BackgroundFit::Trim { .. } => Vec::new(),
        }
    }
}

/// The audio track attached to the final video.
#[derive(Debug, Clone, PartialEq)]
pub enum ComposedAudio {
    /// The voiceover file, untouched.
    VoiceoverOnly(AudioTrack),
    /// Voiceover overlaid with the adjusted background.
    Mixed {
        track: AudioTrack,
        background: BackgroundFit,
    },
}

impl ComposedAudio {
    pub fn track(&self) -> &AudioTrack {
        match self {
            ComposedAudio::VoiceoverOnly(track) | ComposedAudio::Mixed { track, .. } => track,
        }
    }

    pub fn duration(&self) -> f64 {
        self.track().duration
    }

    pub fn is_mixed(&self) -> bool {
        matches!(self, ComposedAudio::Mixed { .. })
    }
}

/// Build the FFmpeg command that mixes `voiceover` with the background.
pub fn build_mix_command(
    voiceover: &AudioTrack,
    music: &Path,
    fit: &BackgroundFit,
    output: &Path,
    encoding: &EncodingConfig,
) -> FfmpegCommand {
    FfmpegCommand::new(output)
        .input(&voiceover.path)
        .input_with(fit.input_args(), music)
        .filter_complex(background_mix_filter(BACKGROUND_VOLUME, voiceover.duration))
        .map("[aout]")
        .no_video()
        .output_args(encoding.audio_args())
        .duration(voiceover.duration)
}

/// Compose the final audio track.
///
/// Never fails: without music, or on any background error, the voiceover
/// itself is returned.
pub async fn compose_audio(
    runner: &FfmpegRunner,
    voiceover: &AudioTrack,
    music: Option<&Path>,
    output: &Path,
    encoding: &EncodingConfig,
) -> ComposedAudio {
    let Some(music) = music else {
        info!("No background music, using voiceover only");
        return ComposedAudio::VoiceoverOnly(voiceover.clone());
    };

    match mix_background(runner, voiceover, music, output, encoding).await {
        Ok(composed) => composed,
        Err(e) => {
            warn!(
                music = %music.display(),
                error = %e,
                stderr = e.stderr(),
                "Background music mix failed, falling back to voiceover only"
            );
            ComposedAudio::VoiceoverOnly(voiceover.clone())
        }
    }
}

async fn mix_background(
    runner: &FfmpegRunner,
    voiceover: &AudioTrack,
    music: &Path,
    output: &Path,
    encoding: &EncodingConfig,
) -> MediaResult<ComposedAudio> {
    let music_duration = probe_audio_duration(music).await?;
    let fit = BackgroundFit::reconcile(music_duration, voiceover.duration)?;

    info!(
        voiceover_secs = voiceover.duration,
        music_secs = music_duration,
        covered_secs = fit.covered_duration(),
        fit = ?fit,
        "Mixing background music"
    );

    let cmd = build_mix_command(voiceover, music, &fit, output, encoding);
    runner.run(&cmd).await?;

    Ok(ComposedAudio::Mixed {
        track: AudioTrack::new(output, voiceover.duration),
        background: fit,
    })
}
