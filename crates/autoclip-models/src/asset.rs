//! Content produced by the collaborator steps.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Trending headline that drives all downstream content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Topic(pub String);

impl Topic {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where a script's text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptOrigin {
    Generated,
    Template,
}

/// Narration text for the voiceover.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Script {
    pub text: String,
    pub origin: ScriptOrigin,
}

impl Script {
    pub fn generated(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            origin: ScriptOrigin::Generated,
        }
    }

    /// Offline narration used when generation is unavailable.
    pub fn template_for(topic: &Topic) -> Self {
        Self {
            text: format!(
                "This is a short video about {}. Stay tuned to our channel to learn more.",
                topic
            ),
            origin: ScriptOrigin::Template,
        }
    }

    pub fn is_template(&self) -> bool {
        self.origin == ScriptOrigin::Template
    }
}

/// A downloaded image, in video order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageAsset {
    /// Position in the final visual sequence
    pub index: usize,
    /// Local file path
    pub path: PathBuf,
    /// URL it was fetched from
    pub source_url: String,
}
