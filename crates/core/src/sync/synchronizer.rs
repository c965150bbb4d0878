//! Link file synchronizer.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

use tracing::{debug, info, warn};

use super::config::SyncConfig;
use super::error::SyncError;
use super::types::{
    DeleteResult, PruneReport, SyncAction, SyncReport, SyncRequest, SyncResult, SyncStatus,
};
use crate::cache::PathCache;
use crate::config::Config;
use crate::resolver::{FolderResolver, ReleaseNameParser};
use crate::sanitize::sanitize;
use crate::scanner::{find_stale, LinkFileDescriptor, TreeScanner};
use crate::types::{GroupKey, LinkFileName, ProxiedUrl, RelativeFolder};

/// Where a request's link file goes, before cache reconciliation.
#[derive(Debug)]
struct Layout {
    folder: RelativeFolder,
    filename: LinkFileName,
}

/// Folders and files a dry-run batch would have created.
///
/// Stands in for the cache records and files a real run would leave behind,
/// so later items in the same batch resolve to the paths a real run would
/// use. Lives for one batch and is never persisted.
#[derive(Debug, Default)]
struct DryRunPlan {
    files: HashMap<GroupKey, Vec<(RelativeFolder, String)>>,
}

impl DryRunPlan {
    fn add(
        &mut self,
        group: Option<&GroupKey>,
        folder: &RelativeFolder,
        filename: &LinkFileName,
    ) {
        if let Some(group) = group {
            self.files
                .entry(group.clone())
                .or_default()
                .push((folder.clone(), filename.as_str().to_string()));
        }
    }

    fn folder_holding(&self, group: &GroupKey, filename: &str) -> Option<RelativeFolder> {
        self.files
            .get(group)?
            .iter()
            .find(|(_, name)| name == filename)
            .map(|(folder, _)| folder.clone())
    }

    fn has_folder(&self, group: &GroupKey, folder: &RelativeFolder) -> bool {
        self.files
            .get(group)
            .is_some_and(|files| files.iter().any(|(f, _)| f == folder))
    }
}

/// Creates, updates, deletes and scans link files under one output root.
///
/// Owns the [`PathCache`] for its root. All operations take `&self`; cache
/// access is serialized through an internal mutex so one synchronizer can
/// be shared across threads.
pub struct LinkSynchronizer {
    config: SyncConfig,
    resolver: Option<Arc<dyn FolderResolver>>,
    cache: Mutex<PathCache>,
}

impl LinkSynchronizer {
    /// Creates a synchronizer with the bundled release-name resolver.
    pub fn new(config: SyncConfig) -> Self {
        let cache = PathCache::with_file_name(&config.root, &config.cache_file);
        Self {
            config,
            resolver: Some(Arc::new(ReleaseNameParser::default())),
            cache: Mutex::new(cache),
        }
    }

    /// Creates a synchronizer from the application config.
    ///
    /// Metadata-driven layout is skipped when `resolver.enabled` is false.
    pub fn from_config(config: &Config) -> Self {
        let sync = Self::new(SyncConfig::from(config));
        if config.resolver.enabled {
            sync.with_resolver(Arc::new(ReleaseNameParser::new(config.resolver.clone())))
        } else {
            sync.without_resolver()
        }
    }

    /// Replaces the folder resolver.
    pub fn with_resolver(mut self, resolver: Arc<dyn FolderResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Disables metadata-driven layout; every request uses the flat layout.
    pub fn without_resolver(mut self) -> Self {
        self.resolver = None;
        self
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn root(&self) -> &Path {
        &self.config.root
    }

    fn cache(&self) -> MutexGuard<'_, PathCache> {
        // A panic while holding the lock leaves the cache usable: every
        // mutation is a single push followed by a persist.
        self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Folders recorded in the path cache for `group`.
    pub fn cached_folders(&self, group: &GroupKey) -> Vec<RelativeFolder> {
        self.cache().lookup(group)
    }

    /// Creates or refreshes the link file for one request.
    ///
    /// Never fails: problems are reported as [`SyncStatus::Error`] so a batch
    /// keeps going. In a dry run nothing on disk is touched, the path cache
    /// included.
    pub fn sync(&self, request: &SyncRequest, dry_run: bool) -> SyncResult {
        self.sync_planned(request, dry_run, &mut DryRunPlan::default())
    }

    fn sync_planned(
        &self,
        request: &SyncRequest,
        dry_run: bool,
        plan: &mut DryRunPlan,
    ) -> SyncResult {
        let layout = match self.layout(request) {
            Ok(layout) => layout,
            Err(e) => {
                warn!("Cannot sync {}: {}", request.content_id, e);
                return SyncResult {
                    content_id: request.content_id.clone(),
                    path: None,
                    status: SyncStatus::Error { reason: e.reason() },
                };
            }
        };

        let url = ProxiedUrl::new(&self.config.proxy_base_url, &request.remote_url);

        let mut cache = self.cache();
        let folder = assign_folder(
            &mut cache,
            plan,
            request.group_key.as_ref(),
            layout.folder,
            &layout.filename,
        );
        let target = folder.to_path(&self.config.root).join(layout.filename.as_str());

        let result = |status| SyncResult {
            content_id: request.content_id.clone(),
            path: Some(target.clone()),
            status,
        };

        let current = match read_current(&target) {
            Ok(current) => current,
            Err(e) => {
                warn!("{}", e.reason());
                return result(SyncStatus::Error { reason: e.reason() });
            }
        };

        if current.as_ref() == Some(&url) {
            debug!("Link file up to date: {}", target.display());
            if dry_run {
                plan.add(request.group_key.as_ref(), &folder, &layout.filename);
            } else {
                record(&mut cache, request.group_key.as_ref(), &folder);
            }
            return result(SyncStatus::Skipped {
                reason: "file exists with same URL".to_string(),
            });
        }

        let action = if current.is_some() {
            SyncAction::Update
        } else {
            SyncAction::Create
        };

        if dry_run {
            info!("Would {} link file: {}", action.as_str(), target.display());
            plan.add(request.group_key.as_ref(), &folder, &layout.filename);
            return result(SyncStatus::DryRun { action });
        }

        if let Err(e) = write_link(&target, &url) {
            warn!("{}", e.reason());
            return result(SyncStatus::Error { reason: e.reason() });
        }
        record(&mut cache, request.group_key.as_ref(), &folder);

        match action {
            SyncAction::Create => info!("Created link file: {}", target.display()),
            SyncAction::Update => info!("Updated link file: {}", target.display()),
        }
        result(SyncStatus::Success { action })
    }

    /// Syncs a batch of requests in order.
    ///
    /// A dry-run batch reports the same paths a real run of the batch
    /// would write.
    pub fn sync_all(&self, requests: &[SyncRequest], dry_run: bool) -> SyncReport {
        let start = Instant::now();
        let mut report = SyncReport::default();
        let mut plan = DryRunPlan::default();

        for request in requests {
            report.push(self.sync_planned(request, dry_run, &mut plan));
        }

        report.duration_ms = start.elapsed().as_millis() as u64;
        info!(
            created = report.created,
            updated = report.updated,
            skipped = report.skipped,
            dry_run = report.dry_run,
            errors = report.errors,
            duration_ms = report.duration_ms,
            "Sync finished"
        );
        report
    }

    /// Deletes one link file and, if that left its folder empty, the folder.
    ///
    /// Relative paths are resolved against the output root. Only files with
    /// the link extension inside the output root are accepted. Only the
    /// immediate parent is considered, and never the output root itself.
    pub fn delete(&self, path: &Path) -> Result<DeleteResult, SyncError> {
        let path = if path.is_relative() {
            self.config.root.join(path)
        } else {
            path.to_path_buf()
        };

        let is_link = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(&self.config.extension));
        if !is_link {
            return Err(SyncError::NotALinkFile { path });
        }

        match fs::symlink_metadata(&path) {
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!("Link file does not exist: {}", path.display());
                return Err(SyncError::NotFound { path });
            }
            Err(e) => return Err(SyncError::read_failed(path, e)),
        }

        if !self.is_inside_root(&path) {
            return Err(SyncError::OutsideRoot {
                path,
                root: self.config.root.clone(),
            });
        }

        fs::remove_file(&path).map_err(|source| SyncError::RemoveFailed {
            path: path.clone(),
            source,
        })?;
        info!("Deleted link file: {}", path.display());

        let removed_parent = path
            .parent()
            .filter(|parent| !self.is_root(parent))
            .and_then(remove_if_empty);

        Ok(DeleteResult {
            path,
            removed_parent,
        })
    }

    /// Lists every link file under the output root.
    pub fn scan(&self) -> Vec<LinkFileDescriptor> {
        let mut scanner = TreeScanner::new(&self.config.extension);
        if let Some(resolver) = &self.resolver {
            scanner = scanner.with_resolver(resolver.clone());
        }
        scanner.scan(&self.config.root)
    }

    /// Deletes link files whose remote URL is not in `active_remote_urls`.
    pub fn prune(&self, active_remote_urls: &HashSet<String>, dry_run: bool) -> PruneReport {
        let descriptors = self.scan();
        let mut report = PruneReport {
            dry_run,
            ..Default::default()
        };

        for stale in find_stale(&descriptors, active_remote_urls) {
            if dry_run {
                info!("Would delete stale link file: {}", stale.path.display());
                report.removed.push(stale.path.clone());
                continue;
            }
            match self.delete(&stale.path) {
                Ok(deleted) => report.removed.push(deleted.path),
                Err(e) => {
                    warn!("{}", e.reason());
                    report.failed.push((stale.path.clone(), e.reason()));
                }
            }
        }

        info!(
            removed = report.removed.len(),
            failed = report.failed.len(),
            dry_run,
            "Prune finished"
        );
        report
    }

    /// Computes folder and filename, preferring the resolver's layout.
    fn layout(&self, request: &SyncRequest) -> Result<Layout, SyncError> {
        if let Some(resolver) = &self.resolver {
            match resolver.parse(&request.raw_filename) {
                Ok(metadata) => {
                    let filename =
                        LinkFileName::new(&resolver.base_filename(&metadata), &self.config.extension);
                    if !filename.stem().is_empty() {
                        let segments =
                            resolver.folder_segments(&metadata, request.group_key.as_ref());
                        return Ok(Layout {
                            folder: RelativeFolder::from_segments(segments),
                            filename,
                        });
                    }
                    debug!(
                        "Resolver {} gave an empty filename for {:?}; using flat layout",
                        resolver.name(),
                        request.raw_filename
                    );
                }
                Err(e) => debug!("{}; using flat layout", e),
            }
        }
        self.flat_layout(request)
    }

    /// `<release name>/<raw filename>.<ext>`.
    fn flat_layout(&self, request: &SyncRequest) -> Result<Layout, SyncError> {
        let filename = LinkFileName::new(&request.raw_filename, &self.config.extension);
        if filename.stem().is_empty() {
            return Err(SyncError::InvalidName {
                raw: request.raw_filename.clone(),
            });
        }

        let folder_name = [
            request.release_name.as_deref(),
            request.group_key.as_ref().map(GroupKey::as_str),
            Some(request.content_id.as_str()),
        ]
        .into_iter()
        .flatten()
        .map(sanitize)
        .find(|name| !name.is_empty());

        let folder = match folder_name {
            Some(name) => RelativeFolder::root().join(&name),
            None => RelativeFolder::root(),
        };
        Ok(Layout { folder, filename })
    }

    /// Whether the folder holding `path` lies under the output root, after
    /// resolving symlinks and `..` in both.
    fn is_inside_root(&self, path: &Path) -> bool {
        let Some(parent) = path.parent() else {
            return false;
        };
        match (parent.canonicalize(), self.config.root.canonicalize()) {
            (Ok(parent), Ok(root)) => parent.starts_with(root),
            _ => false,
        }
    }

    fn is_root(&self, dir: &Path) -> bool {
        match (dir.canonicalize(), self.config.root.canonicalize()) {
            (Ok(dir), Ok(root)) => dir == root,
            _ => dir == self.config.root,
        }
    }
}

/// Applies folder reuse and one-level nesting for grouped requests.
///
/// - A recorded folder that already holds the file wins (in a dry run, so
///   does a folder the batch already planned the file into).
/// - A computed folder already recorded for the group gets the file nested
///   one level down, under the filename stem.
/// - Otherwise the computed folder is used as is.
fn assign_folder(
    cache: &mut PathCache,
    plan: &DryRunPlan,
    group: Option<&GroupKey>,
    computed: RelativeFolder,
    filename: &LinkFileName,
) -> RelativeFolder {
    let Some(group) = group else {
        return computed;
    };

    if let Some(existing) = cache.find_existing_folder_containing(group, filename.as_str()) {
        return existing;
    }
    if let Some(planned) = plan.folder_holding(group, filename.as_str()) {
        return planned;
    }

    if cache.contains(group, &computed) || plan.has_folder(group, &computed) {
        let nested = computed.join(filename.stem());
        debug!(
            "Folder {} already used by {}; nesting into {}",
            computed, group, nested
        );
        return nested;
    }

    computed
}

fn record(cache: &mut PathCache, group: Option<&GroupKey>, folder: &RelativeFolder) {
    if let Some(group) = group {
        cache.record(group, folder);
    }
}

/// Reads the stored URL of an existing link file.
fn read_current(path: &Path) -> Result<Option<ProxiedUrl>, SyncError> {
    match fs::read_to_string(path) {
        Ok(body) => Ok(Some(ProxiedUrl::from_stored(&body))),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(SyncError::read_failed(path.to_path_buf(), e)),
    }
}

fn write_link(path: &Path, url: &ProxiedUrl) -> Result<(), SyncError> {
    if let Some(parent) = path.parent() {
        if !parent.is_dir() {
            fs::create_dir_all(parent).map_err(|source| SyncError::DirectoryCreationFailed {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }
    fs::write(path, url.as_str()).map_err(|e| SyncError::write_failed(path.to_path_buf(), e))
}

/// Removes `dir` if it is empty; failures are logged, not returned.
fn remove_if_empty(dir: &Path) -> Option<PathBuf> {
    let is_empty = match fs::read_dir(dir) {
        Ok(mut entries) => entries.next().is_none(),
        Err(e) => {
            warn!("Cannot inspect {}: {}", dir.display(), e);
            return None;
        }
    };
    if !is_empty {
        return None;
    }

    match fs::remove_dir(dir) {
        Ok(()) => {
            info!("Removed empty directory: {}", dir.display());
            Some(dir.to_path_buf())
        }
        Err(e) => {
            warn!("Failed to remove empty directory {}: {}", dir.display(), e);
            None
        }
    }
}
