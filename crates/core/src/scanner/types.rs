//! Types for the scanner module.

use serde::Serialize;
use std::path::PathBuf;

use crate::resolver::Metadata;
use crate::types::ProxiedUrl;

/// A link file found on disk.
#[derive(Debug, Clone, Serialize)]
pub struct LinkFileDescriptor {
    /// Absolute path of the link file.
    pub path: PathBuf,
    /// Path relative to the scanned root.
    pub relative_path: PathBuf,
    pub filename: String,
    /// Stored body, trimmed.
    pub url: ProxiedUrl,
    /// First folder below the root, when the file is nested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_folder: Option<String>,
    /// First folder below `parent_folder` whose name mentions a season.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub season_folder: Option<String>,
    /// Metadata re-derived from the filename, if a resolver was set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

impl LinkFileDescriptor {
    /// The remote URL behind the proxy, if the body has the proxied shape.
    pub fn remote_url(&self) -> Option<&str> {
        self.url.remote_url()
    }
}
