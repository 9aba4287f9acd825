use thiserror::Error;

use rompatch_core::ConfigError;

/// Whole-run errors: anything that stops a command before per-record work starts.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    /// `rompatch.toml` exists but is not valid TOML
    #[error("Settings error in {path}: {source}")]
    Settings {
        path: String,
        source: toml::de::Error,
    },

    /// A required top-level directory is missing
    #[error("{kind} directory not found: {path}")]
    DirNotFound { kind: &'static str, path: String },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ArchiveError {
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn dir_not_found(kind: &'static str, path: impl Into<String>) -> Self {
        Self::DirNotFound {
            kind,
            path: path.into(),
        }
    }
}
