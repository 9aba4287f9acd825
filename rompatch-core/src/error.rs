use thiserror::Error;

/// Errors loading the systems / base-ROM config tables.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("JSON parse error in {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
}

/// Errors reading a single patch metadata file.
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    /// The file does not start with a `---` fenced front matter block
    #[error("No YAML frontmatter found in {0}")]
    NoFrontMatter(String),
    #[error("YAML parse error in {path}: {source}")]
    Parse {
        path: String,
        source: serde_yml::Error,
    },
}

impl MetadataError {
    pub fn no_front_matter(path: impl Into<String>) -> Self {
        Self::NoFrontMatter(path.into())
    }
}
