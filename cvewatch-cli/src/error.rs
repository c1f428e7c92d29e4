//! CLI-specific error types and exit code mapping

use cvewatch_core::error::CvewatchError;
use cvewatch_watcher::WatcherError;

/// CLI-specific error type.
///
/// Each variant carries enough context for a user-friendly message.
/// The `exit_code()` method maps errors to standard Unix exit codes.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading or validation failure, or an invalid keyword.
    #[error("configuration error: {0}")]
    Config(String),

    /// A subcommand-specific operation failed.
    #[error("{0}")]
    Command(String),

    /// SQLite store unavailable or query failed.
    #[error("storage error: {0}")]
    Storage(String),

    /// Advisory feed request or decode failure.
    #[error("feed error: {0}")]
    Feed(String),

    /// JSON serialisation failed during output rendering.
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// IO error (file read, stdout write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped domain error from cvewatch-core.
    #[error("{0}")]
    Core(#[from] CvewatchError),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                  |
    /// |------|--------------------------|
    /// | 0    | Success                  |
    /// | 1    | General / command error  |
    /// | 2    | Configuration error      |
    /// | 3    | Storage unavailable      |
    /// | 4    | Feed request failed      |
    /// | 10   | IO error                 |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 2,
            Self::Storage(_) => 3,
            Self::Feed(_) => 4,
            Self::Io(_) => 10,
            Self::JsonSerialize(_) | Self::Command(_) | Self::Core(_) => 1,
        }
    }
}

impl From<WatcherError> for CliError {
    fn from(e: WatcherError) -> Self {
        match e {
            WatcherError::Storage(_) => Self::Storage(e.to_string()),
            WatcherError::Feed { .. }
            | WatcherError::FeedStatus { .. }
            | WatcherError::FeedDecode { .. } => Self::Feed(e.to_string()),
            WatcherError::InvalidKeyword { .. } | WatcherError::Config { .. } => {
                Self::Config(e.to_string())
            }
            WatcherError::Notify(_) | WatcherError::Channel(_) => Self::Command(e.to_string()),
        }
    }
}
