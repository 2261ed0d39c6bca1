//! The run pipeline.
//!
//! A run walks a strictly linear state machine:
//!
//! ```text
//! start -> topic_fetched -> script_ready -> images_ready -> voiceover_ready
//!       -> music_resolved -> audio_composed -> clips_built -> video_rendered -> done
//! ```
//!
//! Script generation and background music degrade to fallbacks; every other
//! step is fatal and stops the run before any video is written.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use tracing::{info, warn, Instrument};

use autoclip_media::{
    Assembler, AudioTrack, ComposedAudio, FfmpegAssembler, FfmpegRunner, RenderedVideo,
};
use autoclip_models::{
    EncodingConfig, ImageAsset, MusicResolution, Resolved, RunId, RunStage, RunWorkspace, Script,
    Topic,
};
use autoclip_sources::{
    ElevenLabsClient, ImageSource, MusicSource, NewsApiClient, OpenAiScriptWriter, PixabayClient,
    ScriptWriter, SourceError, SourcesConfig, TopicSource, UnsplashClient, VoiceSynthesizer,
};

use crate::config::WorkerConfig;
use crate::error::{WorkerError, WorkerResult};
use crate::logging::RunLogger;
use crate::metrics;

/// External services and the assembler a pipeline drives.
#[derive(Clone)]
pub struct Collaborators {
    pub topics: Arc<dyn TopicSource>,
    pub scripts: Arc<dyn ScriptWriter>,
    pub images: Arc<dyn ImageSource>,
    pub voice: Arc<dyn VoiceSynthesizer>,
    pub music: Arc<dyn MusicSource>,
    pub assembler: Arc<dyn Assembler>,
}

impl Collaborators {
    /// Wire the HTTP clients and the FFmpeg assembler.
    pub fn from_config(sources: &SourcesConfig, worker: &WorkerConfig) -> WorkerResult<Self> {
        let client = sources.build_http_client()?;
        let runner = FfmpegRunner::new().with_timeout(worker.ffmpeg_timeout.as_secs());

        Ok(Self {
            topics: Arc::new(NewsApiClient::new(client.clone(), sources)),
            scripts: Arc::new(OpenAiScriptWriter::new(client.clone(), sources)),
            images: Arc::new(UnsplashClient::new(client.clone(), sources)),
            voice: Arc::new(ElevenLabsClient::new(client.clone(), sources)),
            music: Arc::new(PixabayClient::new(client, sources)),
            assembler: Arc::new(FfmpegAssembler::new(
                runner,
                EncodingConfig::default(),
                worker.canvas_bounds(),
            )),
        })
    }
}

/// Per-run inputs taken from the worker config.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub country: String,
    pub image_count: usize,
    pub default_music: PathBuf,
}

impl From<&WorkerConfig> for PipelineSettings {
    fn from(config: &WorkerConfig) -> Self {
        Self {
            country: config.country.clone(),
            image_count: config.image_count,
            default_music: config.default_music.clone(),
        }
    }
}

/// Everything a finished run produced.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub run_id: RunId,
    pub topic: Topic,
    pub script: Resolved<Script>,
    pub images: Vec<ImageAsset>,
    pub music: MusicResolution,
    pub audio: ComposedAudio,
    pub video: RenderedVideo,
}

/// Tracks the current stage and times each transition.
struct StageTracker<'a> {
    logger: &'a RunLogger,
    current: RunStage,
    since: Instant,
}

impl<'a> StageTracker<'a> {
    fn new(logger: &'a RunLogger) -> Self {
        Self {
            logger,
            current: RunStage::Start,
            since: Instant::now(),
        }
    }

    fn advance(&mut self, stage: RunStage) {
        let elapsed = self.since.elapsed().as_secs_f64();
        self.logger.log_stage(stage, elapsed);
        metrics::record_stage(stage, elapsed);
        self.current = stage;
        self.since = Instant::now();
    }

    /// Wrap a fatal error with the stage the run was trying to reach.
    fn fail(&self, error: impl Into<WorkerError>) -> WorkerError {
        self.fail_at(self.current.next().unwrap_or(self.current), error)
    }

    fn fail_at(&self, stage: RunStage, error: impl Into<WorkerError>) -> WorkerError {
        let error = error.into();
        self.logger
            .log_error(stage, &error.to_string(), error.ffmpeg_stderr());
        WorkerError::stage_failed(stage, error)
    }
}

/// Linear topic-to-video pipeline.
pub struct Pipeline {
    collaborators: Collaborators,
    settings: PipelineSettings,
}

impl Pipeline {
    pub fn new(collaborators: Collaborators, settings: PipelineSettings) -> Self {
        Self {
            collaborators,
            settings,
        }
    }

    /// Execute one run inside `workspace`.
    pub async fn run(&self, workspace: &RunWorkspace) -> WorkerResult<RunReport> {
        let logger = RunLogger::new(workspace.run_id());
        let span = logger.create_span();
        let started = Instant::now();

        let result = self.run_stages(workspace, &logger).instrument(span).await;
        metrics::record_run(result.is_ok(), started.elapsed().as_secs_f64());
        result
    }

    async fn run_stages(
        &self,
        workspace: &RunWorkspace,
        logger: &RunLogger,
    ) -> WorkerResult<RunReport> {
        let mut tracker = StageTracker::new(logger);
        let c = &self.collaborators;

        tokio::fs::create_dir_all(workspace.dir())
            .await
            .map_err(|e| tracker.fail_at(RunStage::Start, e))?;
        logger.log_start(&format!("writing to {}", workspace.dir().display()));

        let topic = c
            .topics
            .fetch_topic(&self.settings.country)
            .await
            .map_err(|e| tracker.fail(e))?;
        tracker.advance(RunStage::TopicFetched);

        let script = self.resolve_script(&topic, logger).await;
        tracker.advance(RunStage::ScriptReady);

        let images = c
            .images
            .fetch_images(&topic, self.settings.image_count, workspace)
            .await
            .map_err(|e| tracker.fail(e))?;
        if images.is_empty() {
            return Err(tracker.fail(SourceError::empty("images", "image source returned nothing")));
        }
        if images.len() < self.settings.image_count {
            warn!(
                requested = self.settings.image_count,
                received = images.len(),
                "Fewer images than requested"
            );
        }
        tracker.advance(RunStage::ImagesReady);

        let voiceover_path = workspace.voiceover();
        c.voice
            .synthesize(script.value(), &voiceover_path)
            .await
            .map_err(|e| tracker.fail(e))?;
        tracker.advance(RunStage::VoiceoverReady);

        let music = self.resolve_music(workspace, logger).await;
        tracker.advance(RunStage::MusicResolved);

        let voice_duration = c
            .assembler
            .probe_audio(&voiceover_path)
            .await
            .map_err(|e| tracker.fail(e))?;
        let voiceover = AudioTrack::new(voiceover_path, voice_duration);
        let audio = c
            .assembler
            .compose_audio(&voiceover, &music, &workspace.mixed_audio())
            .await;
        if music.is_available() && !audio.is_mixed() {
            logger.log_fallback(RunStage::AudioComposed, "background mix failed, voiceover only");
            metrics::record_fallback("audio_mix");
        }
        tracker.advance(RunStage::AudioComposed);

        let image_paths: Vec<PathBuf> = images.iter().map(|i| i.path.clone()).collect();
        let clips = c
            .assembler
            .build_clips(&image_paths, voiceover.duration, workspace)
            .await
            .map_err(|e| tracker.fail(e))?;
        tracker.advance(RunStage::ClipsBuilt);

        let video = c
            .assembler
            .render(&clips, &audio, &workspace.output())
            .await
            .map_err(|e| tracker.fail(e))?;
        tracker.advance(RunStage::VideoRendered);

        tracker.advance(RunStage::Done);
        logger.log_completion(&format!(
            "{} ({:.1}s, {} clips, music: {})",
            video.path.display(),
            video.duration,
            video.clip_count,
            if audio.is_mixed() { "yes" } else { "no" }
        ));

        Ok(RunReport {
            run_id: workspace.run_id().clone(),
            topic,
            script,
            images,
            music,
            audio,
            video,
        })
    }

    /// Generated script, or the template when generation fails.
    pub async fn resolve_script(&self, topic: &Topic, logger: &RunLogger) -> Resolved<Script> {
        match self.collaborators.scripts.write_script(topic).await {
            Ok(script) => Resolved::Fetched(script),
            Err(e) => {
                logger.log_fallback(
                    RunStage::ScriptReady,
                    &format!("script generation failed, using template: {}", e),
                );
                metrics::record_fallback("script");
                Resolved::fallback(Script::template_for(topic), e.to_string())
            }
        }
    }

    /// Downloaded music, else the local default, else none. Never fails.
    pub async fn resolve_music(
        &self,
        workspace: &RunWorkspace,
        logger: &RunLogger,
    ) -> MusicResolution {
        let target = workspace.background_music();
        let downloaded = async {
            self.collaborators.music.fetch_music(&target).await?;
            Ok::<_, WorkerError>(self.collaborators.assembler.probe_audio(&target).await?)
        }
        .await;

        match downloaded {
            Ok(duration) => {
                info!(duration, "Background music ready");
                return MusicResolution::Downloaded(target);
            }
            Err(e) => {
                logger.log_fallback(
                    RunStage::MusicResolved,
                    &format!("background music download failed: {}", e),
                );
                metrics::record_fallback("music");
            }
        }

        let default = &self.settings.default_music;
        if !default.exists() {
            logger.log_fallback(
                RunStage::MusicResolved,
                &format!("no default music at {}, continuing without", default.display()),
            );
            return MusicResolution::Unavailable;
        }

        match self.collaborators.assembler.probe_audio(default).await {
            Ok(_) => {
                info!(path = %default.display(), "Using default background music");
                MusicResolution::LocalDefault(default.clone())
            }
            Err(e) => {
                logger.log_fallback(
                    RunStage::MusicResolved,
                    &format!("default music unusable, continuing without: {}", e),
                );
                MusicResolution::Unavailable
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use autoclip_media::filters::FadeSpec;
    use autoclip_media::{Canvas, ClipPlan, MediaError, MockAssembler};
    use autoclip_sources::{
        MockImageSource, MockMusicSource, MockScriptWriter, MockTopicSource, MockVoiceSynthesizer,
    };
    use std::path::Path;

    const VOICE_SECS: f64 = 12.0;

    struct Mocks {
        topics: MockTopicSource,
        scripts: MockScriptWriter,
        images: MockImageSource,
        voice: MockVoiceSynthesizer,
        music: MockMusicSource,
        assembler: MockAssembler,
    }

    impl Mocks {
        /// Every collaborator succeeds.
        fn happy() -> Self {
            let mut topics = MockTopicSource::new();
            topics
                .expect_fetch_topic()
                .returning(|_| Ok(Topic::new("Markets rally")));

            let mut scripts = MockScriptWriter::new();
            scripts
                .expect_write_script()
                .returning(|_| Ok(Script::generated("Markets rallied today.")));

            let mut images = MockImageSource::new();
            images.expect_fetch_images().returning(|_, count, ws| {
                Ok((0..count)
                    .map(|i| ImageAsset {
                        index: i,
                        path: ws.image(i),
                        source_url: format!("https://images.test/{}.jpg", i),
                    })
                    .collect())
            });

            let mut voice = MockVoiceSynthesizer::new();
            voice.expect_synthesize().returning(|_, _| Ok(()));

            let mut music = MockMusicSource::new();
            music.expect_fetch_music().returning(|_| Ok(()));

            Self {
                topics,
                scripts,
                images,
                voice,
                music,
                assembler: happy_assembler(),
            }
        }

        fn pipeline(self, default_music: PathBuf) -> Pipeline {
            Pipeline::new(
                Collaborators {
                    topics: Arc::new(self.topics),
                    scripts: Arc::new(self.scripts),
                    images: Arc::new(self.images),
                    voice: Arc::new(self.voice),
                    music: Arc::new(self.music),
                    assembler: Arc::new(self.assembler),
                },
                PipelineSettings {
                    country: "us".to_string(),
                    image_count: 3,
                    default_music,
                },
            )
        }
    }

    fn happy_assembler() -> MockAssembler {
        let mut assembler = MockAssembler::new();
        assembler.expect_probe_audio().returning(|path| {
            if path.ends_with("voiceover.mp3") {
                Ok(VOICE_SECS)
            } else {
                Ok(30.0)
            }
        });
        assembler
            .expect_compose_audio()
            .returning(|voice, music, output| match music {
                MusicResolution::Unavailable => ComposedAudio::VoiceoverOnly(voice.clone()),
                _ => ComposedAudio::Mixed {
                    track: AudioTrack::new(output, voice.duration),
                    background: autoclip_media::BackgroundFit::Trim {
                        end: voice.duration,
                    },
                },
            });
        expect_clips_and_render(&mut assembler);
        assembler
    }

    /// Plans one 1920x1080 clip per image and writes a stub output file.
    fn expect_clips_and_render(assembler: &mut MockAssembler) {
        assembler
            .expect_build_clips()
            .returning(|images, total, ws| {
                let per_clip = total / images.len() as f64;
                Ok(images
                    .iter()
                    .enumerate()
                    .map(|(index, image)| ClipPlan {
                        index,
                        image: image.clone(),
                        output: ws.clip(index),
                        duration: per_clip,
                        fade: FadeSpec::clamped(1.0, per_clip),
                        width: 1920,
                        height: 1080,
                    })
                    .collect())
            });
        assembler.expect_render().returning(|clips, audio, output| {
            std::fs::write(output, b"video").unwrap();
            Ok(RenderedVideo {
                path: output.to_path_buf(),
                duration: audio.duration(),
                clip_count: clips.len(),
                canvas: Canvas {
                    width: 1920,
                    height: 1080,
                },
            })
        });
    }

    fn workspace(dir: &tempfile::TempDir) -> RunWorkspace {
        RunWorkspace::new(dir.path(), RunId::from_string("test-run"))
    }

    #[tokio::test]
    async fn test_full_run_produces_video() {
        let dir = tempfile::tempdir().unwrap();
        let ws = workspace(&dir);
        let pipeline = Mocks::happy().pipeline(dir.path().join("none.mp3"));

        let report = pipeline.run(&ws).await.unwrap();

        assert_eq!(report.topic.as_str(), "Markets rally");
        assert!(!report.script.is_fallback());
        assert_eq!(report.images.len(), 3);
        assert_eq!(report.music, MusicResolution::Downloaded(ws.background_music()));
        assert!(report.audio.is_mixed());
        assert_eq!(report.video.clip_count, 3);
        assert_eq!(report.video.duration, VOICE_SECS);
        assert!(ws.output().exists());
    }

    #[tokio::test]
    async fn test_script_failure_uses_template() {
        let dir = tempfile::tempdir().unwrap();
        let ws = workspace(&dir);
        let mut mocks = Mocks::happy();

        mocks.scripts = MockScriptWriter::new();
        mocks
            .scripts
            .expect_write_script()
            .returning(|_| Err(SourceError::MissingCredential("OPENAI_API_KEY")));

        mocks.voice = MockVoiceSynthesizer::new();
        mocks
            .voice
            .expect_synthesize()
            .withf(|script: &Script, _: &Path| {
                script.is_template()
                    && script.text
                        == "This is a short video about Markets rally. Stay tuned to our channel to learn more."
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let report = mocks.pipeline(dir.path().join("none.mp3")).run(&ws).await.unwrap();
        assert!(report.script.is_fallback());
        assert!(ws.output().exists());
    }

    #[tokio::test]
    async fn test_voice_failure_aborts_before_any_video() {
        let dir = tempfile::tempdir().unwrap();
        let ws = workspace(&dir);
        let mut mocks = Mocks::happy();

        mocks.voice = MockVoiceSynthesizer::new();
        mocks.voice.expect_synthesize().returning(|_, _| {
            Err(SourceError::Api {
                service: "elevenlabs",
                status: 401,
                body: "invalid_api_key".into(),
            })
        });

        mocks.music = MockMusicSource::new();
        mocks.music.expect_fetch_music().times(0);

        mocks.assembler = MockAssembler::new();
        mocks.assembler.expect_probe_audio().times(0);
        mocks.assembler.expect_compose_audio().times(0);
        mocks.assembler.expect_build_clips().times(0);
        mocks.assembler.expect_render().times(0);

        let err = mocks
            .pipeline(dir.path().join("none.mp3"))
            .run(&ws)
            .await
            .unwrap_err();

        assert_eq!(err.failed_stage(), Some(RunStage::VoiceoverReady));
        assert!(!ws.output().exists());
    }

    #[tokio::test]
    async fn test_music_failure_still_renders_voiceover_only() {
        let dir = tempfile::tempdir().unwrap();
        let ws = workspace(&dir);
        let mut mocks = Mocks::happy();

        mocks.music = MockMusicSource::new();
        mocks
            .music
            .expect_fetch_music()
            .returning(|_| Err(SourceError::empty("pixabay", "no music hits")));

        mocks.assembler = MockAssembler::new();
        mocks
            .assembler
            .expect_probe_audio()
            .returning(|_| Ok(VOICE_SECS));
        mocks
            .assembler
            .expect_compose_audio()
            .withf(|_, music: &MusicResolution, _| *music == MusicResolution::Unavailable)
            .times(1)
            .returning(|voice, _, _| ComposedAudio::VoiceoverOnly(voice.clone()));
        expect_clips_and_render(&mut mocks.assembler);

        let report = mocks
            .pipeline(dir.path().join("missing_default.mp3"))
            .run(&ws)
            .await
            .unwrap();

        assert_eq!(report.music, MusicResolution::Unavailable);
        assert_eq!(report.audio, ComposedAudio::VoiceoverOnly(AudioTrack::new(ws.voiceover(), VOICE_SECS)));
        assert!(ws.output().exists());
    }

    #[tokio::test]
    async fn test_music_falls_back_to_local_default() {
        let dir = tempfile::tempdir().unwrap();
        let ws = workspace(&dir);
        let default_music = dir.path().join("default_music.mp3");
        std::fs::write(&default_music, b"ID3").unwrap();

        let mut mocks = Mocks::happy();
        mocks.music = MockMusicSource::new();
        mocks
            .music
            .expect_fetch_music()
            .returning(|_| Err(SourceError::MissingCredential("PIXABAY_API_KEY")));

        let pipeline = mocks.pipeline(default_music.clone());
        let logger = RunLogger::new(ws.run_id());
        let music = pipeline.resolve_music(&ws, &logger).await;

        assert_eq!(music, MusicResolution::LocalDefault(default_music));
    }

    #[tokio::test]
    async fn test_unreadable_download_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let ws = workspace(&dir);

        let mut mocks = Mocks::happy();
        mocks.assembler = MockAssembler::new();
        mocks
            .assembler
            .expect_probe_audio()
            .returning(|_| Err(MediaError::invalid_media("no audio stream")));

        let pipeline = mocks.pipeline(dir.path().join("absent.mp3"));
        let logger = RunLogger::new(ws.run_id());
        assert_eq!(
            pipeline.resolve_music(&ws, &logger).await,
            MusicResolution::Unavailable
        );
    }

    #[tokio::test]
    async fn test_topic_failure_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let ws = workspace(&dir);
        let mut mocks = Mocks::happy();

        mocks.topics = MockTopicSource::new();
        mocks
            .topics
            .expect_fetch_topic()
            .returning(|_| Err(SourceError::MissingCredential("NEWS_API_KEY")));
        mocks.scripts = MockScriptWriter::new();
        mocks.scripts.expect_write_script().times(0);

        let err = mocks
            .pipeline(dir.path().join("none.mp3"))
            .run(&ws)
            .await
            .unwrap_err();
        assert_eq!(err.failed_stage(), Some(RunStage::TopicFetched));
    }

    #[tokio::test]
    async fn test_image_failure_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let ws = workspace(&dir);
        let mut mocks = Mocks::happy();

        mocks.images = MockImageSource::new();
        mocks
            .images
            .expect_fetch_images()
            .returning(|_, _, _| Err(SourceError::empty("unsplash", "no photos")));
        mocks.voice = MockVoiceSynthesizer::new();
        mocks.voice.expect_synthesize().times(0);

        let err = mocks
            .pipeline(dir.path().join("none.mp3"))
            .run(&ws)
            .await
            .unwrap_err();
        assert_eq!(err.failed_stage(), Some(RunStage::ImagesReady));
    }

    #[tokio::test]
    async fn test_voiceover_probe_failure_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let ws = workspace(&dir);
        let mut mocks = Mocks::happy();

        mocks.assembler = MockAssembler::new();
        mocks
            .assembler
            .expect_probe_audio()
            .returning(|_| Err(MediaError::invalid_media("no audio stream")));
        mocks.assembler.expect_render().times(0);

        let err = mocks
            .pipeline(dir.path().join("none.mp3"))
            .run(&ws)
            .await
            .unwrap_err();
        assert_eq!(err.failed_stage(), Some(RunStage::AudioComposed));
        assert!(!ws.output().exists());
    }

    #[tokio::test]
    async fn test_unusable_run_directory_fails_at_start() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not_a_dir");
        std::fs::write(&blocker, b"").unwrap();
        let ws = RunWorkspace::new(&blocker, RunId::from_string("test-run"));

        let mut mocks = Mocks::happy();
        mocks.topics = MockTopicSource::new();
        mocks.topics.expect_fetch_topic().times(0);

        let err = mocks
            .pipeline(dir.path().join("none.mp3"))
            .run(&ws)
            .await
            .unwrap_err();
        assert_eq!(err.failed_stage(), Some(RunStage::Start));
    }

    #[tokio::test]
    async fn test_clip_build_failure_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let ws = workspace(&dir);
        let mut mocks = Mocks::happy();

        mocks.assembler = MockAssembler::new();
        mocks.assembler.expect_probe_audio().returning(|_| Ok(VOICE_SECS));
        mocks
            .assembler
            .expect_compose_audio()
            .returning(|voice, _, _| ComposedAudio::VoiceoverOnly(voice.clone()));
        mocks
            .assembler
            .expect_build_clips()
            .returning(|images, _, _| Err(MediaError::FileNotFound(images[0].clone())));
        mocks.assembler.expect_render().times(0);

        let err = mocks
            .pipeline(dir.path().join("none.mp3"))
            .run(&ws)
            .await
            .unwrap_err();
        assert_eq!(err.failed_stage(), Some(RunStage::ClipsBuilt));
        assert!(!ws.output().exists());
    }

    #[tokio::test]
    async fn test_render_failure_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let ws = workspace(&dir);
        let mut mocks = Mocks::happy();

        mocks.assembler = MockAssembler::new();
        mocks.assembler.expect_probe_audio().returning(|_| Ok(VOICE_SECS));
        mocks
            .assembler
            .expect_compose_audio()
            .returning(|voice, _, _| ComposedAudio::VoiceoverOnly(voice.clone()));
        mocks
            .assembler
            .expect_build_clips()
            .returning(|_, _, _| Ok(Vec::new()));
        mocks
            .assembler
            .expect_render()
            .returning(|_, _, _| {
                Err(MediaError::ffmpeg_failed(
                    "concat failed",
                    Some("Invalid data found when processing input".to_string()),
                    Some(1),
                ))
            });

        let err = mocks
            .pipeline(dir.path().join("none.mp3"))
            .run(&ws)
            .await
            .unwrap_err();
        assert_eq!(err.failed_stage(), Some(RunStage::VideoRendered));
        assert_eq!(
            err.ffmpeg_stderr(),
            Some("Invalid data found when processing input")
        );
    }
}
