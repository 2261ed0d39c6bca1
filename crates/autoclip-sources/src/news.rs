//! NewsAPI top-headlines client.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

use autoclip_models::Topic;

use crate::config::{require, SourcesConfig};
use crate::download::endpoint;
use crate::error::{ensure_success, SourceError, SourceResult};
use crate::traits::TopicSource;

const SERVICE: &str = "newsapi";

#[derive(Debug, Deserialize)]
struct TopHeadlines {
    #[serde(default)]
    articles: Vec<Article>,
}

#[derive(Debug, Deserialize)]
struct Article {
    title: Option<String>,
}

/// Reads the first top headline for a country.
#[derive(Debug, Clone)]
pub struct NewsApiClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl NewsApiClient {
    pub fn new(client: Client, config: &SourcesConfig) -> Self {
        Self {
            client,
            base_url: config.endpoints.news_api.clone(),
            api_key: config.credentials.news_api_key.clone(),
        }
    }
}

#[async_trait]
impl TopicSource for NewsApiClient {
    async fn fetch_topic(&self, country: &str) -> SourceResult<Topic> {
        let api_key = require(&self.api_key, "NEWS_API_KEY")?;

        let mut url = endpoint(&self.base_url, "/v2/top-headlines")?;
        url.query_pairs_mut()
            .append_pair("country", country)
            .append_pair("apiKey", &api_key);

        debug!(country, "Requesting top headlines");
        let response = self.client.get(url).send().await?;
        let headlines: TopHeadlines = ensure_success(SERVICE, response).await?.json().await?;

        let title = headlines
            .articles
            .into_iter()
            .next()
            .and_then(|a| a.title)
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| SourceError::empty(SERVICE, "no articles in top headlines"))?;

        info!(topic = %title, "Fetched trending topic");
        Ok(Topic::new(title))
    }
}
