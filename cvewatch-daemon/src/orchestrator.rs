//! Module orchestration -- assembly, channel wiring, and lifecycle management.
//!
//! The [`Orchestrator`] is the central coordinator of `cvewatch-daemon`.
//! It loads configuration, connects the SQLite store, builds enabled
//! modules, manages startup/shutdown ordering, and runs the main event loop.
//!
//! # Startup Order
//!
//! 1. SQLite store (shared by the watcher module)
//! 2. CVE watcher (produces CycleEvents)
//! 3. Cycle logger task (consumes CycleEvents)
//!
//! # Shutdown Order
//!
//! 1. CVE watcher (finishes the product being polled, stops the loop)
//! 2. Cycle logger task (drains remaining events)

use std::path::Path;
use std::time::Instant;

use anyhow::Result;
use tokio::sync::{broadcast, mpsc};

use cvewatch_core::config::CvewatchConfig;
use cvewatch_core::event::CycleEvent;
use cvewatch_core::plugin::PluginRegistry;

use cvewatch_watcher::Store;

use crate::health::{DaemonHealth, ModuleHealth, aggregate_status};
use crate::metrics_server;
use crate::modules;

/// The main daemon orchestrator.
///
/// Manages the complete lifecycle of all cvewatch modules:
/// configuration loading, store connection, ordered startup,
/// health monitoring, and graceful shutdown.
pub struct Orchestrator {
    /// Loaded and validated configuration.
    config: CvewatchConfig,
    /// Registry of all plugins (ordered for start/stop).
    plugins: PluginRegistry,
    /// Shutdown broadcast sender (signals all background tasks).
    shutdown_tx: broadcast::Sender<()>,
    /// Daemon start time (for uptime reporting).
    start_time: Instant,
    /// Optional cycle event receiver (for logging/audit).
    cycle_rx: Option<mpsc::Receiver<CycleEvent>>,
}

impl Orchestrator {
    /// Load configuration and build the orchestrator.
    ///
    /// This performs the following steps:
    /// 1. Load `cvewatch.toml` and apply environment variable overrides
    /// 2. Validate the configuration
    /// 3. Connect the SQLite store
    /// 4. Initialize enabled modules
    ///
    /// # Arguments
    ///
    /// * `config_path` - Path to the `cvewatch.toml` configuration file
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Configuration file cannot be read or parsed
    /// - Configuration validation fails
    /// - The store cannot be connected
    /// - Any enabled module fails to initialize
    pub async fn build(config_path: &Path) -> Result<Self> {
        let config = CvewatchConfig::load(config_path)
            .await
            .map_err(|e| anyhow::anyhow!("failed to load config: {}", e))?;
        Self::build_from_config(config).await
    }

    /// Build from an already-loaded configuration.
    ///
    /// Useful for testing or when config has already been loaded.
    pub async fn build_from_config(config: CvewatchConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| anyhow::anyhow!("config validation failed: {}", e))?;

        // Install metrics recorder before module initialization
        if config.metrics.enabled {
            metrics_server::install_metrics_recorder(&config.metrics)?;
            tracing::info!(port = config.metrics.port, "metrics endpoint enabled");
        }

        let (shutdown_tx, _) = broadcast::channel(16);

        let mut plugins = PluginRegistry::new();
        let mut cycle_rx = None;

        // Initialize the CVE watcher
        if config.watcher.enabled {
            tracing::info!(db_path = %config.storage.db_path, "connecting sqlite store");
            let store = Store::connect(&config.storage.db_path)
                .await
                .map_err(|e| anyhow::anyhow!("failed to connect store: {}", e))?;

            if let Some((module, rx)) = modules::watcher::init(&config, store)? {
                plugins.register(Box::new(module))?;
                cycle_rx = rx;
            }
        } else {
            tracing::info!("cve watcher disabled, daemon will only serve health and metrics");
        }

        tracing::info!(total_plugins = plugins.count(), "orchestrator initialized");

        // Record daemon metrics
        if config.metrics.enabled {
            record_daemon_metrics(plugins.count());
        }

        Ok(Self {
            config,
            plugins,
            shutdown_tx,
            start_time: Instant::now(),
            cycle_rx,
        })
    }

    /// Start all enabled modules and enter the main event loop.
    ///
    /// This method blocks until a shutdown signal is received.
    ///
    /// # Shutdown Triggers
    ///
    /// - `SIGTERM` (from systemd, Docker, or `kill`)
    /// - `SIGINT` (Ctrl+C)
    pub async fn run(&mut self) -> Result<()> {
        // Write PID file if configured
        if !self.config.general.pid_file.is_empty() {
            let path = Path::new(&self.config.general.pid_file);
            write_pid_file(path)?;
        }

        // Initialize and start all plugins
        tracing::info!("initializing all plugins");
        if let Err(e) = self.plugins.init_all().await {
            tracing::error!(error = %e, "plugin initialization failed");
            if !self.config.general.pid_file.is_empty() {
                let path = Path::new(&self.config.general.pid_file);
                remove_pid_file(path);
            }
            return Err(e.into());
        }

        tracing::info!("starting all plugins");
        if let Err(e) = self.plugins.start_all().await {
            // Rollback: stop any plugins that were successfully started
            tracing::warn!("startup failed, rolling back already-started plugins");
            if let Err(stop_err) = self.plugins.stop_all().await {
                tracing::error!(
                    startup_error = %e,
                    rollback_error = %stop_err,
                    "rollback also failed during startup failure cleanup"
                );
            }

            if !self.config.general.pid_file.is_empty() {
                let path = Path::new(&self.config.general.pid_file);
                remove_pid_file(path);
            }
            return Err(e.into());
        }

        // Spawn cycle logger task
        let mut cycle_logger_task = if let Some(cycle_rx) = self.cycle_rx.take() {
            let shutdown_rx = self.shutdown_tx.subscribe();
            Some(spawn_cycle_logger(cycle_rx, shutdown_rx))
        } else {
            None
        };

        // Spawn uptime updater task
        let mut uptime_updater_task = if self.config.metrics.enabled {
            let shutdown_rx = self.shutdown_tx.subscribe();
            let start_time = self.start_time;
            Some(spawn_uptime_updater(start_time, shutdown_rx))
        } else {
            None
        };

        // Main event loop
        tracing::info!("entering main event loop");
        let signal = wait_for_shutdown_signal().await?;
        tracing::info!(signal = signal, "shutdown signal received");

        // Initiate shutdown
        tracing::info!("broadcasting shutdown signal to all tasks");
        let _ = self.shutdown_tx.send(());

        // Wait for cycle logger to finish
        if let Some(task) = cycle_logger_task.take() {
            let _ = task.await;
        }

        // Wait for uptime updater to finish
        if let Some(task) = uptime_updater_task.take() {
            let _ = task.await;
        }

        // Stop all modules
        self.shutdown().await?;

        // Remove PID file
        if !self.config.general.pid_file.is_empty() {
            let path = Path::new(&self.config.general.pid_file);
            remove_pid_file(path);
        }

        Ok(())
    }

    /// Perform graceful shutdown of all plugins.
    async fn shutdown(&mut self) -> Result<()> {
        tracing::info!("stopping all plugins");
        self.plugins.stop_all().await.map_err(|e| e.into())
    }

    /// Get the current aggregated health status.
    pub async fn health(&self) -> DaemonHealth {
        let statuses = self.plugins.health_check_all().await;
        let modules: Vec<ModuleHealth> = statuses
            .into_iter()
            .map(|(name, _plugin_state, status)| ModuleHealth {
                name,
                enabled: true, // All registered plugins are enabled
                status,
            })
            .collect();

        let overall_status = aggregate_status(&modules);
        let uptime_secs = self.start_time.elapsed().as_secs();

        // Update uptime metric
        if self.config.metrics.enabled {
            use cvewatch_core::metrics as m;
            #[allow(clippy::cast_precision_loss)]
            metrics::gauge!(m::DAEMON_UPTIME_SECONDS).set(uptime_secs as f64);
        }

        DaemonHealth {
            status: overall_status,
            uptime_secs,
            modules,
        }
    }

    /// Get a reference to the loaded configuration.
    pub fn config(&self) -> &CvewatchConfig {
        &self.config
    }

    /// Number of registered plugins.
    pub fn plugin_count(&self) -> usize {
        self.plugins.count()
    }
}

/// Wait for a shutdown signal (SIGTERM or SIGINT).
///
/// Returns the name of the signal that triggered the shutdown.
///
/// # Errors
///
/// Returns an error if signal handlers cannot be installed.
async fn wait_for_shutdown_signal() -> Result<&'static str> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("failed to install SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("failed to install SIGINT handler: {}", e))?;

    Ok(tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    })
}

/// Write the current process PID to a file.
///
/// Used to prevent duplicate daemon instances.
///
/// # Security
///
/// - Uses `create_new(true)` to atomically create file (prevents TOCTOU races)
/// - Verifies the created file is a regular file (prevents symlink attacks)
/// - Creates parent directory with restrictive permissions (0o700)
///
/// # Errors
///
/// Returns an error if the PID file cannot be written.
fn write_pid_file(path: &Path) -> Result<()> {
    use std::fs::{self, OpenOptions};
    use std::io::{ErrorKind, Write};

    // Create parent directory with restrictive permissions (0o700)
    if let Some(parent) = path.parent() {
        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            let mut builder = fs::DirBuilder::new();
            builder.mode(0o700).recursive(true);
            builder.create(parent)?;
        }
        #[cfg(not(unix))]
        {
            fs::create_dir_all(parent)?;
        }
    }

    let pid = std::process::id();

    // Atomically create file only if it doesn't exist (eliminates TOCTOU race)
    let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            // File already exists, read the existing PID for error message
            let existing_pid = fs::read_to_string(path).unwrap_or_else(|_| "unknown".to_string());
            return Err(anyhow::anyhow!(
                "PID file {} already exists with PID: {}. Is another instance running?",
                path.display(),
                existing_pid.trim()
            ));
        }
        Err(e) => return Err(e.into()),
    };

    // Verify the created file is a regular file (not a symlink or other special file)
    let metadata = file.metadata()?;
    if !metadata.is_file() {
        let _ = fs::remove_file(path);
        return Err(anyhow::anyhow!(
            "PID file {} is not a regular file (possible symlink attack)",
            path.display()
        ));
    }

    // Set restrictive permissions on the PID file (0o600)
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let permissions = std::fs::Permissions::from_mode(0o600);
        file.set_permissions(permissions)?;
    }

    writeln!(file, "{}", pid)?;

    tracing::info!(pid = pid, path = %path.display(), "PID file written");
    Ok(())
}

/// Remove the PID file on daemon shutdown.
///
/// Logs a warning but does not fail if the file cannot be removed.
fn remove_pid_file(path: &Path) {
    if let Err(e) = std::fs::remove_file(path) {
        tracing::warn!(
            path = %path.display(),
            error = %e,
            "failed to remove PID file"
        );
    } else {
        tracing::info!(path = %path.display(), "PID file removed");
    }
}

/// Spawn a background task that logs received CycleEvents.
///
/// CycleEvents summarize each completed poll cycle. This task logs
/// them for audit purposes and surfaces per-product failures.
fn spawn_cycle_logger(
    mut cycle_rx: mpsc::Receiver<CycleEvent>,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                cycle_result = cycle_rx.recv() => {
                    match cycle_result {
                        Some(event) => {
                            tracing::info!(
                                event_id = %event.id,
                                products = event.summary.outcomes.len(),
                                accepted = event.summary.total_accepted(),
                                notified = event.summary.notifications_sent(),
                                failed = event.summary.failed_products(),
                                "poll cycle completed"
                            );
                            for outcome in event.summary.outcomes.iter().filter(|o| !o.is_ok()) {
                                tracing::warn!(
                                    event_id = %event.id,
                                    product = %outcome.product,
                                    error = %outcome.error.as_deref().unwrap_or("unknown"),
                                    "product failed during poll cycle"
                                );
                            }
                        }
                        None => {
                            tracing::debug!("cycle channel closed, exiting logger");
                            break;
                        }
                    }
                }
                _ = shutdown_rx.recv() => {
                    tracing::debug!("cycle logger shutting down");
                    break;
                }
            }
        }
    })
}

/// Record daemon-level metrics (modules registered).
///
/// This should be called once during orchestrator initialization.
fn record_daemon_metrics(plugin_count: usize) {
    use cvewatch_core::metrics as m;

    #[allow(clippy::cast_precision_loss)]
    metrics::gauge!(m::DAEMON_MODULES_RUNNING).set(plugin_count as f64);

    tracing::debug!(
        plugin_count = plugin_count,
        version = env!("CARGO_PKG_VERSION"),
        "daemon metrics recorded"
    );
}

/// Spawn a background task that periodically updates the uptime metric.
///
/// Updates every 10 seconds to keep the metric fresh for Prometheus scrapes.
fn spawn_uptime_updater(
    start_time: Instant,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> tokio::task::JoinHandle<()> {
    use cvewatch_core::metrics as m;

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(tokio::time::Duration::from_secs(10));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let uptime_secs = start_time.elapsed().as_secs();
                    #[allow(clippy::cast_precision_loss)]
                    metrics::gauge!(m::DAEMON_UPTIME_SECONDS).set(uptime_secs as f64);
                }
                _ = shutdown_rx.recv() => {
                    tracing::debug!("uptime updater shutting down");
                    break;
                }
            }
        }
    })
}
