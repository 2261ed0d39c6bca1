#![deny(unreachable_patterns)]
//! FFmpeg CLI wrapper and asset-to-video assembly.
//!
//! This crate provides:
//! - Type-safe FFmpeg command building
//! - Progress parsing from `-progress pipe:2`
//! - FFprobe duration and dimension checks
//! - Voiceover/background audio mixing
//! - Still-image clip rendering and final compose

pub mod assembly;
pub mod audio;
pub mod command;
pub mod concat;
pub mod error;
pub mod filters;
pub mod probe;
pub mod progress;
pub mod visual;

pub use assembly::{Assembler, FfmpegAssembler};
#[cfg(any(test, feature = "mocks"))]
pub use assembly::MockAssembler;
pub use audio::{compose_audio, AudioTrack, BackgroundFit, ComposedAudio, BACKGROUND_VOLUME};
pub use command::{check_ffmpeg, check_ffprobe, FfmpegCommand, FfmpegRunner};
pub use concat::{concat_and_mux, Canvas, RenderedVideo};
pub use error::{MediaError, MediaResult};
pub use probe::{probe_audio_duration, probe_dimensions, probe_media, MediaInfo};
pub use progress::{FfmpegProgress, ProgressReporter};
pub use visual::{plan_clips, CanvasBounds, ClipPlan, StillImage, FADE_SECONDS};
