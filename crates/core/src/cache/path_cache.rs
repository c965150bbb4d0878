//! JSON-backed path cache.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, warn};

use super::error::CacheError;
use crate::types::{GroupKey, RelativeFolder};

/// Default file name of the cache document under the output root.
pub const DEFAULT_CACHE_FILE: &str = "processed_paths.json";

type FolderMap = BTreeMap<GroupKey, Vec<RelativeFolder>>;

/// Mapping from content group to the folders previously assigned to it.
///
/// One instance per output root. The document is read on first use and
/// written back after every mutation. Not internally synchronized: callers
/// sharing a cache across threads must serialize access (the synchronizer
/// keeps it behind a mutex).
#[derive(Debug)]
pub struct PathCache {
    root: PathBuf,
    document: PathBuf,
    entries: Option<FolderMap>,
}

impl PathCache {
    /// Creates a cache for `root` using the default document name.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_file_name(root, DEFAULT_CACHE_FILE)
    }

    /// Creates a cache for `root` stored in `root/file_name`.
    ///
    /// Nothing is read until the cache is first used.
    pub fn with_file_name(root: impl Into<PathBuf>, file_name: &str) -> Self {
        let root = root.into();
        let document = root.join(file_name);
        Self {
            root,
            document,
            entries: None,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn document_path(&self) -> &Path {
        &self.document
    }

    /// Whether the document has been read during this session.
    pub fn is_loaded(&self) -> bool {
        self.entries.is_some()
    }

    /// (Re)reads the document from disk, replacing the in-memory mapping.
    ///
    /// Never fails: a missing document is an empty cache, and an unreadable
    /// or corrupt one is logged and treated as empty.
    pub fn load(&mut self) -> &FolderMap {
        let entries = match read_document(&self.document) {
            Ok(entries) => {
                debug!(
                    "Loaded path cache {} ({} groups)",
                    self.document.display(),
                    entries.len()
                );
                entries
            }
            Err(e) => {
                warn!("{}; starting with an empty path cache", e);
                FolderMap::new()
            }
        };
        self.entries.insert(entries)
    }

    fn entries(&mut self) -> &mut FolderMap {
        if self.entries.is_none() {
            self.load();
        }
        self.entries.get_or_insert_with(FolderMap::new)
    }

    /// Records `folder` for `group`, persisting the cache if it changed.
    ///
    /// Returns true if the folder was not already recorded. A persistence
    /// failure is logged; the in-memory mapping keeps the new entry for the
    /// rest of the session.
    pub fn record(&mut self, group: &GroupKey, folder: &RelativeFolder) -> bool {
        let folders = self.entries().entry(group.clone()).or_default();
        if folders.contains(folder) {
            return false;
        }
        folders.push(folder.clone());

        match self.persist() {
            Ok(()) => debug!("Recorded {} -> {} in path cache", group, folder),
            Err(e) => warn!("{}; keeping path cache in memory only", e),
        }
        true
    }

    /// Folders recorded for `group`, in the order they were recorded.
    pub fn lookup(&mut self, group: &GroupKey) -> Vec<RelativeFolder> {
        self.entries().get(group).cloned().unwrap_or_default()
    }

    /// Whether `folder` is recorded for `group`.
    pub fn contains(&mut self, group: &GroupKey, folder: &RelativeFolder) -> bool {
        self.entries()
            .get(group)
            .is_some_and(|folders| folders.contains(folder))
    }

    /// First recorded folder of `group` that exists on disk and holds a file
    /// named `filename`.
    ///
    /// Stale entries (folder or file gone) are skipped, not removed.
    pub fn find_existing_folder_containing(
        &mut self,
        group: &GroupKey,
        filename: &str,
    ) -> Option<RelativeFolder> {
        let root = self.root.clone();
        self.entries().get(group)?.iter().find_map(|folder| {
            let dir = folder.to_path(&root);
            (dir.is_dir() && dir.join(filename).is_file()).then(|| folder.clone())
        })
    }

    /// All groups with at least one recorded folder.
    pub fn groups(&mut self) -> Vec<GroupKey> {
        self.entries().keys().cloned().collect()
    }

    pub fn len(&mut self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&mut self) -> bool {
        self.entries().is_empty()
    }

    /// Writes the whole mapping to disk.
    ///
    /// The document is written to a sibling temporary file and renamed into
    /// place, so readers never observe a partial document.
    pub fn persist(&self) -> Result<(), CacheError> {
        let empty = FolderMap::new();
        let entries = self.entries.as_ref().unwrap_or(&empty);
        let json = serde_json::to_string_pretty(entries)?;

        let write_err = |source| CacheError::Write {
            path: self.document.clone(),
            source,
        };

        if let Some(parent) = self.document.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }

        let tmp = self.document.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(write_err)?;
        if let Err(e) = fs::rename(&tmp, &self.document) {
            let _ = fs::remove_file(&tmp);
            return Err(write_err(e));
        }
        Ok(())
    }
}

/// Reads and parses a cache document.
///
/// Entries whose value is not an array, and array items that are not valid
/// relative folders, are skipped so newer or hand-edited documents still
/// load.
fn read_document(path: &Path) -> Result<FolderMap, CacheError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(FolderMap::new()),
        Err(e) => {
            return Err(CacheError::Read {
                path: path.to_path_buf(),
                source: e,
            })
        }
    };

    let corrupt = |reason: String| CacheError::Corrupt {
        path: path.to_path_buf(),
        reason,
    };

    let value: Value = serde_json::from_str(&raw).map_err(|e| corrupt(e.to_string()))?;
    let Value::Object(object) = value else {
        return Err(corrupt("top-level value is not an object".to_string()));
    };

    let mut entries = FolderMap::new();
    for (key, value) in object {
        let Value::Array(items) = value else {
            warn!("Ignoring path cache entry {:?}: not an array", key);
            continue;
        };

        let mut folders: Vec<RelativeFolder> = Vec::with_capacity(items.len());
        for item in items {
            match item.as_str().and_then(RelativeFolder::parse) {
                Some(folder) if !folders.contains(&folder) => folders.push(folder),
                Some(_) => {}
                None => warn!("Ignoring invalid folder {} for group {:?}", item, key),
            }
        }

        if !folders.is_empty() {
            entries.insert(GroupKey::new(key), folders);
        }
    }

    Ok(entries)
}
