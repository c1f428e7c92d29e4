//! `cvewatch run` command handler

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use cvewatch_core::types::{CycleSummary, NotifyStatus};
use cvewatch_watcher::{CveWatcherBuilder, WatcherConfig};

use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `run` command.
///
/// Performs a single poll cycle: every watched product is fetched,
/// unseen advisories are recorded and notified, and the per-product
/// outcome is rendered.
pub async fn execute(config_path: &Path, writer: &OutputWriter) -> Result<(), CliError> {
    let config = super::load_config(config_path).await?;
    let store = super::open_store(&config).await?;

    let watcher_config = WatcherConfig::from_core(&config);
    let (watcher, _cycle_rx) = CveWatcherBuilder::new()
        .config(watcher_config)
        .store(store)
        .build()?;

    info!("running one poll cycle");
    let summary = watcher.run_once().await?;

    let report = RunReport::from_summary(&summary);
    writer.render(&report)?;

    Ok(())
}

/// Rendered result of a one-shot poll cycle.
#[derive(Serialize)]
pub struct RunReport {
    /// Number of watched products polled.
    pub products: usize,
    /// Total advisories accepted across all products.
    pub accepted: usize,
    /// Number of notifications sent.
    pub notifications_sent: usize,
    /// Number of products that failed.
    pub failed: usize,
    /// Per-product outcomes in watch-list order.
    pub outcomes: Vec<OutcomeEntry>,
}

/// One product's outcome within the cycle.
#[derive(Serialize)]
pub struct OutcomeEntry {
    pub product: String,
    pub fetched: usize,
    pub malformed: usize,
    pub accepted: usize,
    pub notify: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RunReport {
    fn from_summary(summary: &CycleSummary) -> Self {
        let outcomes = summary
            .outcomes
            .iter()
            .map(|o| OutcomeEntry {
                product: o.product.clone(),
                fetched: o.fetched,
                malformed: o.malformed,
                accepted: o.accepted,
                notify: notify_label(o.notify).to_owned(),
                error: o.error.clone(),
            })
            .collect();

        Self {
            products: summary.outcomes.len(),
            accepted: summary.total_accepted(),
            notifications_sent: summary.notifications_sent(),
            failed: summary.failed_products(),
            outcomes,
        }
    }
}

fn notify_label(status: NotifyStatus) -> &'static str {
    match status {
        NotifyStatus::Skipped => "skipped",
        NotifyStatus::Sent => "sent",
        NotifyStatus::Failed => "failed",
    }
}

impl Render for RunReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(
            w,
            "Cycle complete: {} product(s), {} accepted, {} notified, {} failed",
            self.products, self.accepted, self.notifications_sent, self.failed
        )?;

        if self.outcomes.is_empty() {
            writeln!(w, "{}", "Watch list is empty; nothing to poll.".dimmed())?;
            return Ok(());
        }

        writeln!(w)?;
        writeln!(
            w,
            "{:<20} {:>8} {:>10} {:>9} {:<8}",
            "Product", "Fetched", "Malformed", "Accepted", "Notify"
        )?;
        writeln!(w, "{}", "-".repeat(60))?;

        for o in &self.outcomes {
            let notify_colored = match o.notify.as_str() {
                "sent" => o.notify.green(),
                "failed" => o.notify.red(),
                _ => o.notify.dimmed(),
            };

            writeln!(
                w,
                "{:<20} {:>8} {:>10} {:>9} {}",
                o.product, o.fetched, o.malformed, o.accepted, notify_colored
            )?;

            if let Some(error) = &o.error {
                writeln!(w, "  {}", error.red())?;
            }
        }

        Ok(())
    }
}
