//! Error types for the sync module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while writing or deleting link files.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The link file to delete does not exist.
    #[error("Link file not found: {path}")]
    NotFound { path: PathBuf },

    /// The path to delete lies outside the output root.
    #[error("Refusing to delete {path}: outside output root {root}")]
    OutsideRoot { path: PathBuf, root: PathBuf },

    /// The path to delete does not carry the link file extension.
    #[error("Refusing to delete {path}: not a link file")]
    NotALinkFile { path: PathBuf },

    /// No usable link file name could be derived.
    #[error("Cannot derive a link file name from {raw:?}")]
    InvalidName { raw: String },

    /// Failed to create the target folder.
    #[error("Failed to create directory: {path}")]
    DirectoryCreationFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a link file.
    #[error("Failed to write link file: {path}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to read a link file.
    #[error("Failed to read link file: {path}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to remove a link file.
    #[error("Failed to remove link file: {path}")]
    RemoveFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SyncError {
    /// Creates a write failed error.
    pub fn write_failed(path: PathBuf, source: std::io::Error) -> Self {
        Self::WriteFailed { path, source }
    }

    /// Creates a read failed error.
    pub fn read_failed(path: PathBuf, source: std::io::Error) -> Self {
        Self::ReadFailed { path, source }
    }

    /// Whether the error reports a missing link file.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Whether retrying the same operation later may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Io(_)
                | Self::DirectoryCreationFailed { .. }
                | Self::WriteFailed { .. }
                | Self::ReadFailed { .. }
                | Self::RemoveFailed { .. }
        )
    }

    /// Message including the underlying cause, for result records.
    pub fn reason(&self) -> String {
        match std::error::Error::source(self) {
            Some(source) => format!("{}: {}", self, source),
            None => self.to_string(),
        }
    }
}
