//! OpenAI chat-completions script writer.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use autoclip_models::{Script, Topic};

use crate::config::{require, SourcesConfig};
use crate::download::endpoint;
use crate::error::{ensure_success, SourceError, SourceResult};
use crate::traits::ScriptWriter;

const SERVICE: &str = "openai";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// Prompt sent for a topic.
pub fn script_prompt(topic: &Topic) -> String {
    format!("Write a short script for a YouTube video about: {}", topic)
}

/// Generates narration with a single-turn chat completion.
#[derive(Debug, Clone)]
pub struct OpenAiScriptWriter {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl OpenAiScriptWriter {
    pub fn new(client: Client, config: &SourcesConfig) -> Self {
        Self {
            client,
            base_url: config.endpoints.openai.clone(),
            api_key: config.credentials.openai_api_key.clone(),
            model: config.openai_model.clone(),
        }
    }
}

#[async_trait]
impl ScriptWriter for OpenAiScriptWriter {
    async fn write_script(&self, topic: &Topic) -> SourceResult<Script> {
        let api_key = require(&self.api_key, "OPENAI_API_KEY")?;
        let url = endpoint(&self.base_url, "/v1/chat/completions")?;

        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: script_prompt(topic),
            }],
        };

        debug!(model = %self.model, "Requesting script");
        let response = self
            .client
            .post(url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;
        let chat: ChatResponse = ensure_success(SERVICE, response).await?.json().await?;

        let text = chat
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| SourceError::empty(SERVICE, "no message content in completion"))?;

        info!(chars = text.len(), "Generated script");
        Ok(Script::generated(text))
    }
}
