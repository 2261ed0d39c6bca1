//! `autoclip` binary: one run, then exit.

use anyhow::Context;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use autoclip_media::check_ffmpeg;
use autoclip_models::{RunId, RunWorkspace};
use autoclip_sources::SourcesConfig;
use autoclip_worker::{Collaborators, Pipeline, PipelineSettings, WorkerConfig};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Install rustls crypto provider (required for TLS/HTTPS)
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    // Load environment variables
    dotenvy::dotenv().ok();

    let config = WorkerConfig::from_env().context("invalid worker configuration")?;
    init_tracing(config.json_logs)?;

    info!("Starting autoclip");
    info!("Worker config: {:?}", config);

    check_ffmpeg().context("ffmpeg is required")?;

    let sources = SourcesConfig::from_env();
    info!(credentials = ?sources.credentials, "Sources configured");

    let collaborators = Collaborators::from_config(&sources, &config)
        .context("failed to create service clients")?;
    let pipeline = Pipeline::new(collaborators, PipelineSettings::from(&config));

    let workspace = RunWorkspace::new(&config.work_dir, RunId::new());
    match pipeline.run(&workspace).await {
        Ok(report) => {
            info!(
                run_id = %report.run_id,
                topic = %report.topic,
                output = %report.video.path.display(),
                "Video ready"
            );
            println!("{}", report.video.path.display());
            Ok(())
        }
        Err(e) => {
            error!(
                run_id = %workspace.run_id(),
                stderr = e.ffmpeg_stderr(),
                "Run failed: {}", e
            );
            Err(e).context(format!("run {} failed", workspace.run_id()))
        }
    }
}

/// Colored output for dev, JSON for production.
fn init_tracing(json: bool) -> anyhow::Result<()> {
    // Prefix match: covers the binary and every autoclip_* crate
    let env_filter = EnvFilter::from_default_env().add_directive("autoclip=info".parse()?);

    if json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }
    Ok(())
}
