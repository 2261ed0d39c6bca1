//! Batch runner that turns a trending headline into a short video.
//!
//! This crate provides:
//! - Environment configuration for a run
//! - The linear run pipeline with script and music fallbacks
//! - Structured run logging and metrics

pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod pipeline;

pub use config::WorkerConfig;
pub use error::{WorkerError, WorkerResult};
pub use logging::RunLogger;
pub use pipeline::{Collaborators, Pipeline, PipelineSettings, RunReport};
