//! cvewatch CLI entry point.
//!
//! Parses arguments, initializes logging, and dispatches to the
//! subcommand handlers. Errors are printed to stderr and mapped to
//! process exit codes via [`CliError::exit_code`].

use clap::Parser;

mod cli;
mod commands;
mod error;
mod output;

use cli::{Cli, Commands};
use error::CliError;
use output::OutputWriter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // CLI logging goes to stderr so stdout stays clean for rendered output
    let log_level = cli.log_level.as_deref().unwrap_or("warn");
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("error: {}", e);
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let writer = OutputWriter::new(cli.output);

    match cli.command {
        Commands::Watch(args) => commands::watch::execute(args, &cli.config, &writer).await,
        Commands::Search(args) => commands::search::execute(args, &cli.config, &writer).await,
        Commands::Run => commands::run::execute(&cli.config, &writer).await,
        Commands::Config(args) => commands::config::execute(args, &cli.config, &writer).await,
    }
}
