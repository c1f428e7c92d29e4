//! Command handlers -- one module per subcommand

use std::path::Path;

use cvewatch_core::config::CvewatchConfig;
use cvewatch_watcher::Store;

use crate::error::CliError;

pub mod config;
pub mod run;
pub mod search;
pub mod watch;

/// Load and validate the configuration file.
pub(crate) async fn load_config(config_path: &Path) -> Result<CvewatchConfig, CliError> {
    CvewatchConfig::load(config_path).await.map_err(Into::into)
}

/// Connect the SQLite store and ensure the schema exists.
pub(crate) async fn open_store(config: &CvewatchConfig) -> Result<Store, CliError> {
    let store = Store::connect(&config.storage.db_path).await?;
    store.run_migrations().await?;
    Ok(store)
}
