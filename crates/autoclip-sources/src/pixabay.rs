//! Pixabay background music lookup.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::path::Path;
use tracing::info;

use crate::config::{require, SourcesConfig};
use crate::download::{download_to_file, endpoint};
use crate::error::{ensure_success, SourceError, SourceResult};
use crate::traits::MusicSource;

const SERVICE: &str = "pixabay";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    hits: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
struct Hit {
    #[serde(rename = "previewURL")]
    preview_url: Option<String>,
}

/// Saves the first short music hit.
#[derive(Debug, Clone)]
pub struct PixabayClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    max_download_bytes: u64,
}

impl PixabayClient {
    pub fn new(client: Client, config: &SourcesConfig) -> Self {
        Self {
            client,
            base_url: config.endpoints.pixabay.clone(),
            api_key: config.credentials.pixabay_api_key.clone(),
            max_download_bytes: config.max_download_bytes,
        }
    }
}

#[async_trait]
impl MusicSource for PixabayClient {
    async fn fetch_music(&self, output: &Path) -> SourceResult<()> {
        let api_key = require(&self.api_key, "PIXABAY_API_KEY")?;

        let mut url = endpoint(&self.base_url, "/api/")?;
        url.query_pairs_mut()
            .append_pair("key", &api_key)
            .append_pair("q", "music")
            .append_pair("audio_duration", "short");

        let response = self.client.get(url).send().await?;
        let search: SearchResponse = ensure_success(SERVICE, response).await?.json().await?;

        let music_url = search
            .hits
            .into_iter()
            .next()
            .and_then(|h| h.preview_url)
            .ok_or_else(|| SourceError::empty(SERVICE, "no music hits"))?;

        let bytes = download_to_file(
            &self.client,
            SERVICE,
            &music_url,
            output,
            self.max_download_bytes,
        )
        .await?;
        info!(bytes, output = %output.display(), "Downloaded background music");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Endpoints;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> PixabayClient {
        let mut config = SourcesConfig {
            endpoints: Endpoints::all(server.uri()),
            ..Default::default()
        };
        config.credentials.pixabay_api_key = Some("px".into());
        PixabayClient::new(Client::new(), &config)
    }

    #[tokio::test]
    async fn test_downloads_first_hit_preview() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/"))
            .and(query_param("key", "px"))
            .and(query_param("q", "music"))
            .and(query_param("audio_duration", "short"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "total": 2,
                "hits": [
                    {"previewURL": format!("{}/track1.mp3", server.uri())},
                    {"previewURL": format!("{}/track2.mp3", server.uri())}
                ]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/track1.mp3"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"track-one".to_vec()))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("background_music.mp3");
        client(&server).fetch_music(&output).await.unwrap();
        assert_eq!(std::fs::read(&output).unwrap(), b"track-one");
    }

    #[tokio::test]
    async fn test_no_hits_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"hits": []})))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("background_music.mp3");
        let err = client(&server).fetch_music(&output).await.unwrap_err();
        assert!(matches!(err, SourceError::EmptyResponse { .. }));
        assert!(!output.exists());
    }
}
