//! cvewatch daemon entry point.
//!
//! Parses CLI arguments, loads configuration, initializes logging,
//! and hands control to the [`Orchestrator`].

use anyhow::Result;
use clap::Parser;

use cvewatch_core::config::CvewatchConfig;

use cvewatch_daemon::cli::DaemonCli;
use cvewatch_daemon::logging;
use cvewatch_daemon::orchestrator::Orchestrator;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = DaemonCli::parse();

    let mut config = CvewatchConfig::load(&cli.config)
        .await
        .map_err(|e| anyhow::anyhow!("failed to load config {}: {}", cli.config.display(), e))?;

    // CLI flags override file and environment settings
    if let Some(log_level) = &cli.log_level {
        config.general.log_level = log_level.clone();
    }
    if let Some(log_format) = &cli.log_format {
        config.general.log_format = log_format.clone();
    }
    if let Some(pid_file) = &cli.pid_file {
        config.general.pid_file = pid_file.clone();
    }

    if cli.validate {
        config
            .validate()
            .map_err(|e| anyhow::anyhow!("config validation failed: {}", e))?;
        println!("configuration ok: {}", cli.config.display());
        return Ok(());
    }

    logging::init_tracing(&config.general)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %cli.config.display(),
        "cvewatch-daemon starting"
    );

    let mut orchestrator = Orchestrator::build_from_config(config).await?;
    orchestrator.run().await?;

    tracing::info!("cvewatch-daemon shut down");
    Ok(())
}
