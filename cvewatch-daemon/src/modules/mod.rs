//! Module initialization.
//!
//! Each cvewatch crate is wrapped as a plugin implementing the core
//! [`Plugin`](cvewatch_core::plugin::Plugin) trait so the orchestrator
//! can manage all modules through one `PluginRegistry`.

pub mod watcher;

pub use watcher::WatcherModule;
