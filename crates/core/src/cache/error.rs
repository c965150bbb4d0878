//! Error types for the path cache.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or persisting the cache document.
///
/// These never reach sync callers; the cache logs them and carries on.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The document exists but could not be read.
    #[error("Failed to read cache document {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The document could not be parsed.
    #[error("Cache document {path} is corrupt: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    /// The document could not be written.
    #[error("Failed to write cache document {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The in-memory mapping could not be serialized.
    #[error("Failed to serialize cache: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl CacheError {
    /// Whether the error came from a corrupt document rather than I/O.
    pub fn is_corrupt(&self) -> bool {
        matches!(self, Self::Corrupt { .. })
    }
}
