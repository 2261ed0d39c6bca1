//! HTTP collaborators for the video pipeline.
//!
//! Each external service sits behind a trait so the pipeline can be driven
//! by the real clients or by mocks:
//! - [`TopicSource`]: NewsAPI top headlines
//! - [`ScriptWriter`]: OpenAI chat completions
//! - [`ImageSource`]: Unsplash photo search
//! - [`VoiceSynthesizer`]: ElevenLabs text-to-speech
//! - [`MusicSource`]: Pixabay music search

pub mod config;
mod download;
pub mod elevenlabs;
pub mod error;
pub mod news;
pub mod openai;
pub mod pixabay;
pub mod traits;
pub mod unsplash;

pub use config::{Credentials, Endpoints, SourcesConfig};
pub use elevenlabs::{ElevenLabsClient, VoiceSettings};
pub use error::{SourceError, SourceResult};
pub use news::NewsApiClient;
pub use openai::OpenAiScriptWriter;
pub use pixabay::PixabayClient;
pub use traits::{ImageSource, MusicSource, ScriptWriter, TopicSource, VoiceSynthesizer};
#[cfg(any(test, feature = "mocks"))]
pub use traits::{
    MockImageSource, MockMusicSource, MockScriptWriter, MockTopicSource, MockVoiceSynthesizer,
};
pub use unsplash::UnsplashClient;
