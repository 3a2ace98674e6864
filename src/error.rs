//! Error types for stub building and export.

use thiserror::Error;

/// Errors produced while encoding or exporting stub rules.
#[derive(Debug, Error)]
pub enum StubError {
    /// The JSON encoder rejected the document.
    #[error("failed to encode stub mapping: {0}")]
    Encode(#[from] serde_json::Error),

    /// A strategy tag that is not part of the known vocabulary.
    #[error("unknown matching strategy: {0}")]
    UnknownStrategy(String),

    /// An HTTP method the mock server does not understand.
    #[error("unknown HTTP method: {0}")]
    UnknownMethod(String),

    /// A stub id that cannot be used as a mapping file name.
    #[error("invalid mapping id '{0}': must be a single file name")]
    InvalidId(String),

    /// Filesystem failure while writing mapping files.
    #[error("failed to write mapping file {path}: {source}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result alias used throughout the crate.
pub type Result<T, E = StubError> = std::result::Result<T, E>;
