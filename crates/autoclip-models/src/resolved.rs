//! Tagged results for steps that degrade instead of failing.

use std::path::{Path, PathBuf};

/// Outcome of a step with a predetermined substitute.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved<T> {
    /// The collaborator produced the value.
    Fetched(T),
    /// The collaborator failed; `value` is the substitute.
    Fallback { value: T, reason: String },
}

impl<T> Resolved<T> {
    pub fn fallback(value: T, reason: impl Into<String>) -> Self {
        Self::Fallback {
            value,
            reason: reason.into(),
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Resolved::Fallback { .. })
    }

    pub fn value(&self) -> &T {
        match self {
            Resolved::Fetched(value) | Resolved::Fallback { value, .. } => value,
        }
    }
}

/// Whether background music is available for the mix, and from where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MusicResolution {
    /// Freshly downloaded and load-checked.
    Downloaded(PathBuf),
    /// Download failed; a pre-existing local file is used instead.
    LocalDefault(PathBuf),
    /// No background music for this run.
    Unavailable,
}

impl MusicResolution {
    pub fn path(&self) -> Option<&Path> {
        match self {
            MusicResolution::Downloaded(path) | MusicResolution::LocalDefault(path) => Some(path),
            MusicResolution::Unavailable => None,
        }
    }

    pub fn is_available(&self) -> bool {
        self.path().is_some()
    }
}
