//! Error types for folder resolution.

use thiserror::Error;

/// Errors returned by a [`FolderResolver`](super::FolderResolver).
#[derive(Debug, Error)]
pub enum ResolveError {
    /// No usable metadata could be derived from the filename.
    #[error("Metadata unavailable for {filename:?}: {reason}")]
    MetadataUnavailable { filename: String, reason: String },
}

impl ResolveError {
    pub fn unavailable(filename: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MetadataUnavailable {
            filename: filename.into(),
            reason: reason.into(),
        }
    }
}
