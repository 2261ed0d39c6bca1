//! ElevenLabs text-to-speech client.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::path::Path;
use tracing::info;

use autoclip_models::Script;

use crate::config::{require, SourcesConfig};
use crate::download::{endpoint, write_body};
use crate::error::SourceResult;
use crate::traits::VoiceSynthesizer;

const SERVICE: &str = "elevenlabs";

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VoiceSettings {
    pub stability: f64,
    pub similarity_boost: f64,
    pub style: f64,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            stability: 0.5,
            similarity_boost: 0.8,
            style: 0.2,
        }
    }
}

#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    text: &'a str,
    voice_settings: VoiceSettings,
}

/// Synthesizes narration with a fixed voice.
#[derive(Debug, Clone)]
pub struct ElevenLabsClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    voice_id: String,
    settings: VoiceSettings,
    max_download_bytes: u64,
}

impl ElevenLabsClient {
    pub fn new(client: Client, config: &SourcesConfig) -> Self {
        Self {
            client,
            base_url: config.endpoints.elevenlabs.clone(),
            api_key: config.credentials.elevenlabs_api_key.clone(),
            voice_id: config.voice_id.clone(),
            settings: VoiceSettings::default(),
            max_download_bytes: config.max_download_bytes,
        }
    }
}

#[async_trait]
impl VoiceSynthesizer for ElevenLabsClient {
    async fn synthesize(&self, script: &Script, output: &Path) -> SourceResult<()> {
        let api_key = require(&self.api_key, "ELEVENLABS_API_KEY")?;
        let url = endpoint(
            &self.base_url,
            &format!("/v1/text-to-speech/{}", self.voice_id),
        )?;

        let request = SpeechRequest {
            text: &script.text,
            voice_settings: self.settings,
        };

        let response = self
            .client
            .post(url)
            .header("xi-api-key", api_key)
            .header(reqwest::header::ACCEPT, "audio/mpeg")
            .json(&request)
            .send()
            .await?;
        let bytes = write_body(SERVICE, response, output, self.max_download_bytes).await?;

        info!(
            voice_id = %self.voice_id,
            bytes,
            output = %output.display(),
            "Synthesized voiceover"
        );
        Ok(())
    }
}
