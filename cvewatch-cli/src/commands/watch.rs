//! `cvewatch watch` command handler

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::cli::{WatchAction, WatchArgs};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `watch` command.
pub async fn execute(
    args: WatchArgs,
    config_path: &Path,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    match args.action {
        WatchAction::Add { keyword } => execute_add(&keyword, config_path, writer).await,
        WatchAction::List => execute_list(config_path, writer).await,
    }
}

/// Add a keyword to the watch list.
///
/// Adding an already-watched keyword is a no-op and is reported as such.
///
/// # Errors
///
/// Returns `CliError::Config` for an empty keyword and `CliError::Storage`
/// when the database is unreachable.
async fn execute_add(
    keyword: &str,
    config_path: &Path,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let config = super::load_config(config_path).await?;
    let store = super::open_store(&config).await?;
    let registry = store.registry();

    let added = registry.add(keyword).await?;
    info!(keyword = keyword.trim(), added, "watch add");

    let report = WatchAddReport {
        keyword: keyword.trim().to_owned(),
        added,
    };
    writer.render(&report)?;

    Ok(())
}

/// List all watched keywords in lexicographic order.
async fn execute_list(config_path: &Path, writer: &OutputWriter) -> Result<(), CliError> {
    let config = super::load_config(config_path).await?;
    let store = super::open_store(&config).await?;
    let registry = store.registry();

    let products = registry.list().await?;

    let report = WatchListReport { products };
    writer.render(&report)?;

    Ok(())
}

/// Result of a `watch add` invocation.
#[derive(Serialize)]
pub struct WatchAddReport {
    /// The trimmed keyword that was submitted.
    pub keyword: String,
    /// True if a new row was inserted, false if the keyword was already watched.
    pub added: bool,
}

impl Render for WatchAddReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        if self.added {
            writeln!(w, "{} {}", "Watching:".green().bold(), self.keyword)?;
        } else {
            writeln!(
                w,
                "{} {} (already watched)",
                "Unchanged:".yellow().bold(),
                self.keyword
            )?;
        }

        Ok(())
    }
}

/// Result of a `watch list` invocation.
#[derive(Serialize)]
pub struct WatchListReport {
    /// Watched keywords in lexicographic order.
    pub products: Vec<String>,
}

impl Render for WatchListReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        if self.products.is_empty() {
            writeln!(w, "{}", "No products are being watched.".dimmed())?;
            return Ok(());
        }

        writeln!(w, "Watched products ({}):", self.products.len())?;
        for product in &self.products {
            writeln!(w, "  {}", product)?;
        }

        Ok(())
    }
}
