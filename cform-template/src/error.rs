//! Error types for cform-template.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise while reading, merging or writing templates.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// Filesystem error while listing or reading fragments or writing output.
    #[error("template io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The fragment uses shorthand intrinsic function tags.
    #[error(
        "found shorthand intrinsic functions: {}; use the long Fn:: form instead",
        tokens.join(", ")
    )]
    Shorthand { tokens: Vec<String> },

    /// YAML parse error for a fragment.
    #[error("failed to parse template fragment: {0}")]
    Parse(#[source] serde_yaml::Error),

    /// The fragment parsed but is not a mapping of mappings.
    #[error("unexpected template shape at '{key}': {message}")]
    Shape { key: String, message: String },

    /// An entry would not read back with the same value once written out.
    #[error("cannot reproduce '{key}' exactly in the merged template: {message}")]
    Inexact { key: String, message: String },

    /// YAML serialization error for the merged document.
    #[error("failed to serialize merged template: {0}")]
    Serialize(#[source] serde_yaml::Error),

    /// A fragment-level failure annotated with the fragment's path.
    #[error("fragment {path}: {source}")]
    Fragment {
        path: PathBuf,
        #[source]
        source: Box<TemplateError>,
    },

    /// The output file exists and overwriting was not allowed.
    #[error("output file already exists: {path}")]
    OutputExists { path: PathBuf },
}

/// Convenience constructor for [`TemplateError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> TemplateError {
    TemplateError::Io {
        path: path.into(),
        source,
    }
}
