//! Credentials and endpoints for the HTTP collaborators.

use std::time::Duration;

use reqwest::Client;

use crate::error::{SourceError, SourceResult};

pub const DEFAULT_NEWS_API_BASE_URL: &str = "https://newsapi.org";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_UNSPLASH_BASE_URL: &str = "https://api.unsplash.com";
pub const DEFAULT_ELEVENLABS_BASE_URL: &str = "https://api.elevenlabs.io";
pub const DEFAULT_PIXABAY_BASE_URL: &str = "https://pixabay.com";

pub const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_VOICE_ID: &str = "21m00Tcm4TlvDq8ikWAM";

/// 50 MiB
pub const DEFAULT_MAX_DOWNLOAD_BYTES: u64 = 50 * 1024 * 1024;

/// API keys. `None` means the variable was unset or empty.
#[derive(Clone, Default)]
pub struct Credentials {
    pub news_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub unsplash_api_key: Option<String>,
    pub elevenlabs_api_key: Option<String>,
    pub pixabay_api_key: Option<String>,
}

// Keys never reach the logs.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mark = |k: &Option<String>| if k.is_some() { "set" } else { "unset" };
        f.debug_struct("Credentials")
            .field("news_api_key", &mark(&self.news_api_key))
            .field("openai_api_key", &mark(&self.openai_api_key))
            .field("unsplash_api_key", &mark(&self.unsplash_api_key))
            .field("elevenlabs_api_key", &mark(&self.elevenlabs_api_key))
            .field("pixabay_api_key", &mark(&self.pixabay_api_key))
            .finish()
    }
}

/// Service base URLs, overridable for proxies and tests.
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub news_api: String,
    pub openai: String,
    pub unsplash: String,
    pub elevenlabs: String,
    pub pixabay: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            news_api: DEFAULT_NEWS_API_BASE_URL.to_string(),
            openai: DEFAULT_OPENAI_BASE_URL.to_string(),
            unsplash: DEFAULT_UNSPLASH_BASE_URL.to_string(),
            elevenlabs: DEFAULT_ELEVENLABS_BASE_URL.to_string(),
            pixabay: DEFAULT_PIXABAY_BASE_URL.to_string(),
        }
    }
}

impl Endpoints {
    /// Point every service at one base URL.
    pub fn all(base: impl Into<String>) -> Self {
        let base = base.into();
        Self {
            news_api: base.clone(),
            openai: base.clone(),
            unsplash: base.clone(),
            elevenlabs: base.clone(),
            pixabay: base,
        }
    }
}

/// Collaborator configuration.
#[derive(Debug, Clone)]
pub struct SourcesConfig {
    pub credentials: Credentials,
    pub endpoints: Endpoints,
    /// Chat model used for script generation
    pub openai_model: String,
    /// ElevenLabs voice
    pub voice_id: String,
    /// Per-request timeout
    pub http_timeout: Duration,
    /// Upper bound for any single downloaded asset
    pub max_download_bytes: u64,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            credentials: Credentials::default(),
            endpoints: Endpoints::default(),
            openai_model: DEFAULT_OPENAI_MODEL.to_string(),
            voice_id: DEFAULT_VOICE_ID.to_string(),
            http_timeout: Duration::from_secs(120),
            max_download_bytes: DEFAULT_MAX_DOWNLOAD_BYTES,
        }
    }
}

impl SourcesConfig {
    /// Create config from environment variables.
    ///
    /// Missing keys are not an error here; the collaborator that needs one
    /// fails with [`SourceError::MissingCredential`] when called.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            credentials: Credentials {
                news_api_key: non_empty("NEWS_API_KEY"),
                openai_api_key: non_empty("OPENAI_API_KEY"),
                unsplash_api_key: non_empty("UNSPLASH_API_KEY"),
                elevenlabs_api_key: non_empty("ELEVENLABS_API_KEY"),
                pixabay_api_key: non_empty("PIXABAY_API_KEY"),
            },
            endpoints: Endpoints {
                news_api: non_empty("NEWS_API_BASE_URL").unwrap_or(defaults.endpoints.news_api),
                openai: non_empty("OPENAI_BASE_URL").unwrap_or(defaults.endpoints.openai),
                unsplash: non_empty("UNSPLASH_BASE_URL").unwrap_or(defaults.endpoints.unsplash),
                elevenlabs: non_empty("ELEVENLABS_BASE_URL")
                    .unwrap_or(defaults.endpoints.elevenlabs),
                pixabay: non_empty("PIXABAY_BASE_URL").unwrap_or(defaults.endpoints.pixabay),
            },
            openai_model: non_empty("OPENAI_MODEL").unwrap_or(defaults.openai_model),
            voice_id: non_empty("ELEVENLABS_VOICE_ID").unwrap_or(defaults.voice_id),
            http_timeout: non_empty("HTTP_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.http_timeout),
            max_download_bytes: non_empty("MAX_DOWNLOAD_BYTES")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_download_bytes),
        }
    }

    /// Shared HTTP client with the configured timeout.
    pub fn build_http_client(&self) -> SourceResult<Client> {
        Client::builder()
            .timeout(self.http_timeout)
            .user_agent(concat!("autoclip/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(SourceError::from)
    }
}

/// Look up a credential, failing with its variable name when absent.
pub(crate) fn require(key: &Option<String>, name: &'static str) -> SourceResult<String> {
    key.clone().ok_or(SourceError::MissingCredential(name))
}
