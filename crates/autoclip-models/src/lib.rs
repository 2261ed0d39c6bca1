//! Shared data models for autoclip.
//!
//! This crate provides Serde-serializable types for:
//! - Run identity, stages and the per-run path set
//! - Content produced along the way (topic, script, images)
//! - Tagged fallback results for non-fatal steps
//! - Encoding configuration for the final render

pub mod asset;
pub mod encoding;
pub mod resolved;
pub mod run;

// Re-export common types
pub use asset::{ImageAsset, Script, ScriptOrigin, Topic};
pub use encoding::EncodingConfig;
pub use resolved::{MusicResolution, Resolved};
pub use run::{RunId, RunStage, RunWorkspace};
