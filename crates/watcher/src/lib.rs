#![doc = include_str!("../README.md")]
//!
//! # Module Structure
//!
//! - [`error`]: Domain error types (`WatcherError`)
//! - [`config`]: Watcher configuration (`WatcherConfig`, builder)
//! - [`store`]: SQLite persistence (`Store`, `WatchRegistry`, `SeenLedger`)
//! - [`feed`]: Advisory feeds (`AdvisoryFeed` trait, `NvdFeed`)
//! - [`notify`]: Notification delivery (`Notifier` trait, `WebexNotifier`)
//! - [`engine`]: Poll cycle execution (`PollEngine`, message formatting)
//! - [`watcher`]: Main orchestrator (`CveWatcher`, `CveWatcherBuilder`, `Pipeline` impl)
//!
//! # Architecture
//!
//! ```text
//! WatchRegistry --> PollEngine --> AdvisoryFeed (NVD)
//!                       |
//!                  SeenLedger (dedupe)
//!                       |
//!                   Notifier (Webex)
//!                       |
//!                  CycleSummary --> CycleEvent --> mpsc --> downstream
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod feed;
pub mod notify;
pub mod store;
pub mod watcher;

// --- Public API Re-exports ---

// Watcher (main orchestrator)
pub use watcher::{CveWatcher, CveWatcherBuilder};

// Configuration
pub use config::{WatcherConfig, WatcherConfigBuilder};

// Error
pub use error::WatcherError;

// Storage
pub use store::{SeenLedger, Store, WatchRegistry};

// Feed
pub use feed::{AdvisoryFeed, NvdFeed};

// Notification
pub use notify::{Notifier, WebexNotifier};

// Engine
pub use engine::{PollEngine, format_message};
