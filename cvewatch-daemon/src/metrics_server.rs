//! Prometheus scrape endpoint.
//!
//! The exporter's built-in HTTP listener serves the scrape path;
//! everything recorded through the `metrics` macros after installation
//! shows up there. The watcher's series are seeded at zero so the first
//! scrape already lists them, before any poll cycle has run.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use metrics::{counter, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;

use cvewatch_core::config::MetricsConfig;
use cvewatch_core::metrics as metric_names;

/// The only scrape path the built-in listener serves.
const SCRAPE_PATH: &str = "/metrics";

/// Install the global recorder and start the scrape listener.
///
/// Must be called once per process, before any module records metrics.
///
/// # Errors
///
/// Fails when the configured endpoint is not `/metrics`, the listen
/// address does not parse, or a recorder is already installed.
pub fn install_metrics_recorder(config: &MetricsConfig) -> Result<()> {
    let addr = scrape_addr(config)?;

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .with_context(|| format!("failed to install metrics recorder on {addr}"))?;

    metric_names::describe_all();
    seed_watcher_series();

    tracing::info!(
        listen_addr = %addr,
        path = SCRAPE_PATH,
        "Prometheus scrape endpoint active"
    );
    Ok(())
}

/// Resolve the configured listen address, rejecting unsupported scrape paths.
fn scrape_addr(config: &MetricsConfig) -> Result<SocketAddr> {
    if config.endpoint != SCRAPE_PATH {
        anyhow::bail!(
            "unsupported metrics endpoint '{}': the exporter serves {SCRAPE_PATH} only",
            config.endpoint
        );
    }

    let addr: SocketAddr = format!("{}:{}", config.listen_addr, config.port)
        .parse()
        .with_context(|| {
            format!(
                "invalid metrics listen address '{}:{}'",
                config.listen_addr, config.port
            )
        })?;

    if addr.ip().is_unspecified() {
        tracing::warn!(
            listen_addr = %addr,
            "metrics listener bound to all interfaces; restrict listen_addr on untrusted networks"
        );
    }

    Ok(addr)
}

/// Publish the watcher series at zero.
///
/// An absent series and a zero-valued series are different things to a
/// scraper; alert rules need the counters present from the first scrape.
fn seed_watcher_series() {
    counter!(metric_names::WATCHER_CYCLES_TOTAL).absolute(0);
    counter!(metric_names::WATCHER_ADVISORIES_ACCEPTED_TOTAL).absolute(0);
    counter!(metric_names::WATCHER_ADVISORIES_MALFORMED_TOTAL).absolute(0);
    counter!(metric_names::NOTIFY_SENT_TOTAL).absolute(0);
    counter!(metric_names::NOTIFY_FAILURES_TOTAL).absolute(0);
    gauge!(metric_names::WATCHER_PRODUCTS_WATCHED).set(0.0);
    gauge!(metric_names::DAEMON_UPTIME_SECONDS).set(0.0);
}
