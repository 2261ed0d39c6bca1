//! Error types for the HTTP collaborators.

use thiserror::Error;

/// Result type for collaborator calls.
pub type SourceResult<T> = Result<T, SourceError>;

/// Errors returned by the topic, script, image, voice and music sources.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Missing credential: {0} is not set")]
    MissingCredential(&'static str),

    #[error("{service} returned {status}: {body}")]
    Api {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("{service} returned no usable content: {detail}")]
    EmptyResponse {
        service: &'static str,
        detail: String,
    },

    #[error("Download exceeds {limit} bytes: {url}")]
    PayloadTooLarge { url: String, limit: u64 },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SourceError {
    pub fn empty(service: &'static str, detail: impl Into<String>) -> Self {
        Self::EmptyResponse {
            service,
            detail: detail.into(),
        }
    }

    /// Status code of an API rejection, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            SourceError::Api { status, .. } => Some(*status),
            SourceError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Turn a non-2xx response into [`SourceError::Api`], keeping the body.
pub(crate) async fn ensure_success(
    service: &'static str,
    response: reqwest::Response,
) -> SourceResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(SourceError::Api {
        service,
        status: status.as_u16(),
        body: truncate(&body, 512),
    })
}

fn truncate(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}
