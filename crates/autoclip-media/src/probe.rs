//! FFprobe media information.
//!
//! Used both to read durations/dimensions for planning and as the basic
//! load-and-check for downloaded assets.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

use crate::command::check_ffprobe;
use crate::error::{MediaError, MediaResult};

/// Media file information.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaInfo {
    /// Duration in seconds (0.0 when the container reports none, e.g. stills)
    pub duration: f64,
    /// Width in pixels of the first video stream
    pub width: Option<u32>,
    /// Height in pixels of the first video stream
    pub height: Option<u32>,
    /// Whether an audio stream is present
    pub has_audio: bool,
    /// Whether a video (or image) stream is present
    pub has_video: bool,
}

/// FFprobe JSON output format.
#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: Option<FfprobeFormat>,
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: String,
    width: Option<u32>,
    height: Option<u32>,
    duration: Option<String>,
}

/// Probe a media file.
pub async fn probe_media(path: impl AsRef<Path>) -> MediaResult<MediaInfo> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(MediaError::FileNotFound(path.to_path_buf()));
    }

    check_ffprobe()?;

    let output = Command::new("ffprobe")
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ])
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await?;

    if !output.status.success() {
        return Err(MediaError::FfprobeFailed {
            message: format!("FFprobe could not read {}", path.display()),
            stderr: Some(String::from_utf8_lossy(&output.stderr).to_string()),
        });
    }

    parse_probe_output(&output.stdout)
}

fn parse_probe_output(stdout: &[u8]) -> MediaResult<MediaInfo> {
    let probe: FfprobeOutput = serde_json::from_slice(stdout)?;

    let video = probe.streams.iter().find(|s| s.codec_type == "video");
    let audio = probe.streams.iter().find(|s| s.codec_type == "audio");

    // Container duration first; fall back to the audio stream's own duration
    let duration = probe
        .format
        .as_ref()
        .and_then(|f| f.duration.as_deref())
        .and_then(parse_seconds)
        .or_else(|| audio.and_then(|s| s.duration.as_deref()).and_then(parse_seconds))
        .unwrap_or(0.0);

    Ok(MediaInfo {
        duration,
        width: video.and_then(|s| s.width),
        height: video.and_then(|s| s.height),
        has_audio: audio.is_some(),
        has_video: video.is_some(),
    })
}

fn parse_seconds(s: &str) -> Option<f64> {
    s.parse::<f64>().ok().filter(|d| d.is_finite() && *d >= 0.0)
}

/// Duration of an audio file, rejecting files without audio or duration.
pub async fn probe_audio_duration(path: impl AsRef<Path>) -> MediaResult<f64> {
    let path = path.as_ref();
    let info = probe_media(path).await?;
    audio_duration(&info).map_err(|reason| {
        MediaError::invalid_media(format!("{}: {}", path.display(), reason))
    })
}

fn audio_duration(info: &MediaInfo) -> Result<f64, &'static str> {
    if !info.has_audio {
        return Err("no audio stream");
    }
    if info.duration <= 0.0 {
        return Err("audio has no duration");
    }
    Ok(info.duration)
}

/// Pixel dimensions of an image (or the first video stream of a file).
pub async fn probe_dimensions(path: impl AsRef<Path>) -> MediaResult<(u32, u32)> {
    let path = path.as_ref();
    let info = probe_media(path).await?;
    match (info.width, info.height) {
        (Some(w), Some(h)) if w > 0 && h > 0 => Ok((w, h)),
        _ => Err(MediaError::invalid_media(format!(
            "{}: no decodable image",
            path.display()
        ))),
    }
}
