//! Error types for cform-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise while loading stack configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure (permission denied, is a directory, etc.).
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error on load — includes file path and line context from serde_yaml.
    #[error("failed to parse stack config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The stack config file did not exist at the given path.
    #[error("stack config not found at {path}")]
    NotFound { path: PathBuf },
}
