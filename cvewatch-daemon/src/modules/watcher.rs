//! CVE watcher module initialization.
//!
//! Converts `CvewatchConfig` into a `WatcherConfig`, builds the
//! `CveWatcher`, and wraps it as a [`WatcherModule`] plugin.
//!
//! # Channel Wiring
//!
//! ```text
//! CveWatcher --CycleEvent--> cycle_rx --> orchestrator cycle logger
//! ```

use anyhow::Result;
use tokio::sync::mpsc;

use cvewatch_core::config::CvewatchConfig;
use cvewatch_core::error::{CvewatchError, PluginError};
use cvewatch_core::event::{CycleEvent, MODULE_WATCHER};
use cvewatch_core::pipeline::{HealthStatus, Pipeline};
use cvewatch_core::plugin::{Plugin, PluginInfo, PluginState, PluginType};

use cvewatch_watcher::{CveWatcher, CveWatcherBuilder, Store, WatcherConfig};

/// Plugin wrapper around [`CveWatcher`].
///
/// Adds plugin metadata and the `Created -> Initialized -> Running ->
/// Stopped` state machine on top of the watcher's `Pipeline` lifecycle.
/// Schema migrations run during `init()`.
pub struct WatcherModule {
    info: PluginInfo,
    state: PluginState,
    store: Store,
    watcher: CveWatcher,
}

/// Initialize the CVE watcher module.
///
/// Returns `None` if the watcher is disabled in configuration.
///
/// # Arguments
///
/// * `config` - The full cvewatch configuration
/// * `store` - Connected SQLite store (migrations run later, in `init()`)
///
/// # Returns
///
/// * `Ok(Some((module, cycle_rx)))` - Watcher initialized and ready to start
/// * `Ok(None)` - Module disabled in configuration
/// * `Err(_)` - Initialization failed
pub fn init(
    config: &CvewatchConfig,
    store: Store,
) -> Result<Option<(WatcherModule, Option<mpsc::Receiver<CycleEvent>>)>> {
    if !config.watcher.enabled {
        tracing::info!("cve watcher disabled in configuration");
        return Ok(None);
    }

    tracing::info!("initializing cve watcher");

    let watcher_config = WatcherConfig::from_core(config);

    let (watcher, cycle_rx) = CveWatcherBuilder::new()
        .config(watcher_config)
        .store(store.clone())
        .build()
        .map_err(|e| anyhow::anyhow!("failed to build cve watcher: {}", e))?;

    let module = WatcherModule {
        info: PluginInfo {
            name: MODULE_WATCHER.to_owned(),
            version: env!("CARGO_PKG_VERSION").to_owned(),
            description: "NVD CVE polling and notification".to_owned(),
            plugin_type: PluginType::Watcher,
        },
        state: PluginState::Created,
        store,
        watcher,
    };

    Ok(Some((module, cycle_rx)))
}

impl WatcherModule {
    fn invalid_state(&self, expected: &str) -> CvewatchError {
        PluginError::InvalidState {
            name: self.info.name.clone(),
            current: self.state.to_string(),
            expected: expected.to_owned(),
        }
        .into()
    }
}

impl Plugin for WatcherModule {
    fn info(&self) -> &PluginInfo {
        &self.info
    }

    fn state(&self) -> PluginState {
        self.state
    }

    async fn init(&mut self) -> Result<(), CvewatchError> {
        if self.state != PluginState::Created {
            return Err(self.invalid_state("created"));
        }
        if let Err(e) = self.store.run_migrations().await {
            self.state = PluginState::Failed;
            return Err(e.into());
        }
        self.state = PluginState::Initialized;
        Ok(())
    }

    async fn start(&mut self) -> Result<(), CvewatchError> {
        if self.state != PluginState::Initialized {
            return Err(self.invalid_state("initialized"));
        }
        if let Err(e) = self.watcher.start().await {
            self.state = PluginState::Failed;
            return Err(e);
        }
        self.state = PluginState::Running;
        Ok(())
    }

    async fn stop(&mut self) -> Result<(), CvewatchError> {
        if self.state != PluginState::Running {
            return Err(self.invalid_state("running"));
        }
        if let Err(e) = self.watcher.stop().await {
            self.state = PluginState::Failed;
            return Err(e);
        }
        self.state = PluginState::Stopped;
        Ok(())
    }

    async fn health_check(&self) -> HealthStatus {
        self.watcher.health_check().await
    }
}
