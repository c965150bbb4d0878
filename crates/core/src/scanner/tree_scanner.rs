//! Walkdir-based link file scanner.

use std::collections::HashSet;
use std::fs;
use std::path::{Component, Path};
use std::sync::Arc;

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use super::types::LinkFileDescriptor;
use crate::resolver::FolderResolver;
use crate::types::ProxiedUrl;

/// Walks an output root and describes every link file in it.
///
/// Per-file problems (unreadable file, walk error, metadata failure) are
/// logged and that file is skipped or left without metadata; a scan never
/// fails as a whole.
pub struct TreeScanner {
    extension: String,
    resolver: Option<Arc<dyn FolderResolver>>,
}

impl TreeScanner {
    /// Creates a scanner for files ending in `.{extension}` (any case).
    pub fn new(extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
            resolver: None,
        }
    }

    /// Re-derives metadata for each file with `resolver`.
    pub fn with_resolver(mut self, resolver: Arc<dyn FolderResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Lists link files under `root`, sorted by relative path.
    ///
    /// A missing root yields an empty list.
    pub fn scan(&self, root: &Path) -> Vec<LinkFileDescriptor> {
        info!("Scanning for link files in {}", root.display());

        if !root.is_dir() {
            debug!("Scan root {} does not exist", root.display());
            return Vec::new();
        }

        let mut found = Vec::new();
        for entry in WalkDir::new(root).follow_links(false) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry during scan: {}", e);
                    continue;
                }
            };
            if !entry.file_type().is_file() || !self.matches_extension(entry.path()) {
                continue;
            }
            if let Some(descriptor) = self.describe(root, entry.path()) {
                found.push(descriptor);
            }
        }

        found.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
        info!("Found {} link files", found.len());
        found
    }

    fn matches_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(&self.extension))
    }

    fn describe(&self, root: &Path, path: &Path) -> Option<LinkFileDescriptor> {
        let body = match fs::read_to_string(path) {
            Ok(body) => body,
            Err(e) => {
                warn!("Failed to read link file {}: {}", path.display(), e);
                return None;
            }
        };

        let relative_path = path.strip_prefix(root).ok()?.to_path_buf();
        let filename = path.file_name()?.to_string_lossy().into_owned();

        let folders: Vec<String> = relative_path
            .parent()
            .into_iter()
            .flat_map(Path::components)
            .filter_map(|c| match c {
                Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();

        let parent_folder = folders.first().cloned();
        let season_folder = folders
            .iter()
            .skip(1)
            .find(|name| name.to_lowercase().contains("season"))
            .cloned();

        let metadata = self.resolver.as_ref().and_then(|resolver| {
            resolver
                .parse(&filename)
                .map_err(|e| debug!("No metadata for {}: {}", path.display(), e))
                .ok()
        });

        Some(LinkFileDescriptor {
            path: path.to_path_buf(),
            relative_path,
            filename,
            url: ProxiedUrl::from_stored(&body),
            parent_folder,
            season_folder,
            metadata,
        })
    }
}

/// Link files whose remote URL is not in `active_remote_urls`.
///
/// Files without a recognizable proxied body are never reported.
pub fn find_stale<'a>(
    descriptors: &'a [LinkFileDescriptor],
    active_remote_urls: &HashSet<String>,
) -> Vec<&'a LinkFileDescriptor> {
    descriptors
        .iter()
        .filter(|d| {
            d.remote_url()
                .is_some_and(|remote| !active_remote_urls.contains(remote))
        })
        .collect()
}
