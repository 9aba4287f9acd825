use thiserror::Error;

use rompatch_lib::ArchiveError;

/// Errors that can occur during CLI command execution.
#[derive(Debug, Error)]
pub(crate) enum CliError {
    /// I/O error
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// Layout, config or directory error
    #[error("{0}")]
    Archive(#[from] ArchiveError),

    /// JSON output could not be produced
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The rename plan has conflicts, nothing was renamed
    #[error("Rename aborted: {0} conflict(s) must be resolved first")]
    PlanRejected(usize),

    /// `--strict` validation found problems
    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    /// Logger setup failed
    #[error("Logger error: {0}")]
    Logger(String),
}

impl CliError {
    pub(crate) fn validation_failed(msg: impl Into<String>) -> Self {
        Self::ValidationFailed(msg.into())
    }

    pub(crate) fn logger(msg: impl Into<String>) -> Self {
        Self::Logger(msg.into())
    }
}
