//! Unsplash photo search and download.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

use autoclip_models::{ImageAsset, RunWorkspace, Topic};

use crate::config::{require, SourcesConfig};
use crate::download::{download_to_file, endpoint};
use crate::error::{ensure_success, SourceError, SourceResult};
use crate::traits::ImageSource;

const SERVICE: &str = "unsplash";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<Photo>,
}

#[derive(Debug, Deserialize)]
struct Photo {
    urls: PhotoUrls,
}

#[derive(Debug, Deserialize)]
struct PhotoUrls {
    full: String,
}

/// Searches photos for a topic and saves them as `image_{i}.jpg`.
#[derive(Debug, Clone)]
pub struct UnsplashClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    max_download_bytes: u64,
}

impl UnsplashClient {
    pub fn new(client: Client, config: &SourcesConfig) -> Self {
        Self {
            client,
            base_url: config.endpoints.unsplash.clone(),
            api_key: config.credentials.unsplash_api_key.clone(),
            max_download_bytes: config.max_download_bytes,
        }
    }

    async fn search(&self, query: &str, count: usize) -> SourceResult<Vec<String>> {
        let api_key = require(&self.api_key, "UNSPLASH_API_KEY")?;

        let mut url = endpoint(&self.base_url, "/search/photos")?;
        url.query_pairs_mut()
            .append_pair("query", query)
            .append_pair("per_page", &count.to_string())
            .append_pair("client_id", &api_key);

        let response = self.client.get(url).send().await?;
        let search: SearchResponse = ensure_success(SERVICE, response).await?.json().await?;

        Ok(search
            .results
            .into_iter()
            .take(count)
            .map(|p| p.urls.full)
            .collect())
    }
}

#[async_trait]
impl ImageSource for UnsplashClient {
    async fn fetch_images(
        &self,
        topic: &Topic,
        count: usize,
        workspace: &RunWorkspace,
    ) -> SourceResult<Vec<ImageAsset>> {
        let urls = self.search(topic.as_str(), count).await?;
        if urls.is_empty() {
            return Err(SourceError::empty(
                SERVICE,
                format!("no photos found for {:?}", topic.as_str()),
            ));
        }

        let mut assets = Vec::with_capacity(urls.len());
        for (index, source_url) in urls.into_iter().enumerate() {
            let path = workspace.image(index);
            let bytes = download_to_file(
                &self.client,
                SERVICE,
                &source_url,
                &path,
                self.max_download_bytes,
            )
            .await?;
            debug!(index, bytes, "Downloaded image");
            assets.push(ImageAsset {
                index,
                path,
                source_url,
            });
        }

        info!(count = assets.len(), requested = count, "Downloaded images");
        Ok(assets)
    }
}
