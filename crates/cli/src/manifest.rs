//! Manifest files: the list of items that should exist as link files.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use strmsync_core::SyncRequest;

/// Reads a JSON array of sync requests.
pub fn load_manifest(path: &Path) -> Result<Vec<SyncRequest>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read manifest {:?}", path))?;
    serde_json::from_str(&raw).with_context(|| format!("Invalid manifest {:?}", path))
}

/// Remote URLs of every item in a manifest.
pub fn active_remote_urls(requests: &[SyncRequest]) -> HashSet<String> {
    requests.iter().map(|r| r.remote_url.clone()).collect()
}
