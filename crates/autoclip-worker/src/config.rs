//! Worker configuration.

use std::path::PathBuf;
use std::time::Duration;

use autoclip_media::CanvasBounds;

use crate::error::{WorkerError, WorkerResult};

/// Accepted range for the number of images per video.
pub const IMAGE_COUNT_RANGE: std::ops::RangeInclusive<usize> = 1..=10;

/// Worker configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Root under which each run gets its own directory
    pub work_dir: PathBuf,
    /// Region code for the trending headline
    pub country: String,
    /// Images per video
    pub image_count: usize,
    /// Local track used when the music download fails
    pub default_music: PathBuf,
    /// Largest frame a clip may occupy
    pub max_width: u32,
    pub max_height: u32,
    /// Per-invocation FFmpeg timeout
    pub ffmpeg_timeout: Duration,
    /// Emit JSON log lines
    pub json_logs: bool,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            work_dir: PathBuf::from("./runs"),
            country: "us".to_string(),
            image_count: 3,
            default_music: PathBuf::from("default_music.mp3"),
            max_width: 1920,
            max_height: 1080,
            ffmpeg_timeout: Duration::from_secs(900),
            json_logs: false,
        }
    }
}

impl WorkerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> WorkerResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> WorkerResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let image_count = match lookup("AUTOCLIP_IMAGE_COUNT") {
            Some(raw) => {
                let count: usize = raw.trim().parse().map_err(|_| {
                    WorkerError::config_error(format!(
                        "AUTOCLIP_IMAGE_COUNT must be a number, got {:?}",
                        raw
                    ))
                })?;
                if !IMAGE_COUNT_RANGE.contains(&count) {
                    return Err(WorkerError::config_error(format!(
                        "AUTOCLIP_IMAGE_COUNT must be between {} and {}, got {}",
                        IMAGE_COUNT_RANGE.start(),
                        IMAGE_COUNT_RANGE.end(),
                        count
                    )));
                }
                count
            }
            None => defaults.image_count,
        };

        let config = Self {
            work_dir: lookup("AUTOCLIP_WORK_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.work_dir),
            country: lookup("AUTOCLIP_COUNTRY")
                .map(|c| c.trim().to_lowercase())
                .filter(|c| !c.is_empty())
                .unwrap_or(defaults.country),
            image_count,
            default_music: lookup("AUTOCLIP_DEFAULT_MUSIC")
                .map(PathBuf::from)
                .unwrap_or(defaults.default_music),
            max_width: lookup("AUTOCLIP_MAX_WIDTH")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_width),
            max_height: lookup("AUTOCLIP_MAX_HEIGHT")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_height),
            ffmpeg_timeout: Duration::from_secs(
                lookup("FFMPEG_TIMEOUT_SECS")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(defaults.ffmpeg_timeout.as_secs()),
            ),
            json_logs: lookup("LOG_FORMAT")
                .map(|v| v.to_lowercase() == "json")
                .unwrap_or(false),
        };

        if config.max_width < 2 || config.max_height < 2 {
            return Err(WorkerError::config_error(format!(
                "canvas bounds too small: {}x{}",
                config.max_width, config.max_height
            )));
        }

        Ok(config)
    }

    pub fn canvas_bounds(&self) -> CanvasBounds {
        CanvasBounds {
            max_width: self.max_width,
            max_height: self.max_height,
        }
    }
}
