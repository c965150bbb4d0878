//! Sync lifecycle integration tests.
//!
//! These tests drive the synchronizer with the bundled release-name parser
//! against a real temporary output tree:
//! - Idempotence (create -> skip -> update)
//! - No duplicate or runaway nested folders across runs
//! - Dry runs leave the tree byte-for-byte unchanged
//! - Recovery from a corrupt path cache
//! - Deletion and pruning cleanup

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;

use tempfile::TempDir;
use walkdir::WalkDir;

use strmsync_core::{
    cache::DEFAULT_CACHE_FILE,
    testing::{fixtures, MockResolver},
    GroupKey, LinkSynchronizer, PathCache, RelativeFolder, SyncAction, SyncConfig, SyncRequest,
    SyncStatus,
};

const EPISODE_1: &str = "Show.Name.S01E01.1080p.WEB-DL.x264-GRP.mkv";
const EPISODE_2: &str = "Show.Name.S01E02.1080p.WEB-DL.x264-GRP.mkv";
const MOVIE: &str = "Film.Title.2019.1080p.BluRay.x264-GRP.mkv";

/// Test helper owning the output root.
struct TestHarness {
    sync: LinkSynchronizer,
    temp_dir: TempDir,
}

impl TestHarness {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let sync = LinkSynchronizer::new(SyncConfig::new(temp_dir.path()));
        Self { sync, temp_dir }
    }

    fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// A fresh synchronizer on the same root, as a later process run would be.
    fn restart(&mut self) {
        self.sync = LinkSynchronizer::new(SyncConfig::new(self.root()));
    }

    /// Every file under the root with its contents.
    fn snapshot(&self) -> BTreeMap<PathBuf, String> {
        WalkDir::new(self.root())
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file())
            .map(|e| {
                let relative = e.path().strip_prefix(self.root()).unwrap().to_path_buf();
                (relative, fs::read_to_string(e.path()).unwrap())
            })
            .collect()
    }

    fn link_files(&self) -> Vec<PathBuf> {
        self.snapshot()
            .into_keys()
            .filter(|p| p.extension().is_some_and(|e| e == "strm"))
            .collect()
    }
}

fn episode_path() -> PathBuf {
    PathBuf::from("TV Shows/Show Name/Season 01 [T1]/Show Name S01E01 [1080p, WEB-DL].strm")
}

// =============================================================================
// Idempotence
// =============================================================================

#[test]
fn test_create_skip_update() {
    let harness = TestHarness::new();
    let request = fixtures::grouped_request("f1", EPISODE_1, "T1");

    let first = harness.sync.sync(&request, false);
    assert_eq!(
        first.status,
        SyncStatus::Success {
            action: SyncAction::Create
        }
    );
    assert_eq!(first.path, Some(harness.root().join(episode_path())));
    assert_eq!(
        fs::read_to_string(harness.root().join(episode_path())).unwrap(),
        fixtures::proxied("https://cdn.example/f1")
    );

    let before = harness.snapshot();
    let second = harness.sync.sync(&request, false);
    assert!(matches!(second.status, SyncStatus::Skipped { .. }));
    assert_eq!(second.path, first.path);
    assert_eq!(harness.snapshot(), before);

    let mut moved = request.clone();
    moved.remote_url = "https://mirror.example/f1".to_string();
    let third = harness.sync.sync(&moved, false);
    assert_eq!(
        third.status,
        SyncStatus::Success {
            action: SyncAction::Update
        }
    );
    assert_eq!(third.path, first.path);
    assert_eq!(
        fs::read_to_string(harness.root().join(episode_path())).unwrap(),
        fixtures::proxied("https://mirror.example/f1")
    );
}

#[test]
fn test_link_body_has_no_trailing_newline() {
    let harness = TestHarness::new();
    harness
        .sync
        .sync(&fixtures::grouped_request("m1", MOVIE, "T2"), false);

    let body = fs::read_to_string(
        harness
            .root()
            .join("Movies/1080p/Film Title (2019) [T2]/Film Title (2019) [1080p, BluRay].strm"),
    )
    .unwrap();
    assert_eq!(
        body,
        "http://127.0.0.1:5000/stream?link=https://cdn.example/m1"
    );
}

// =============================================================================
// No duplication
// =============================================================================

#[test]
fn test_repeated_runs_do_not_duplicate() {
    let mut harness = TestHarness::new();
    let requests = vec![
        fixtures::grouped_request("f1", EPISODE_1, "T1"),
        fixtures::grouped_request("f2", EPISODE_2, "T1"),
        fixtures::grouped_request("m1", MOVIE, "T2"),
    ];

    let report = harness.sync.sync_all(&requests, false);
    assert_eq!(report.created, 3);
    let files = harness.link_files();
    assert_eq!(files.len(), 3);

    let cached_before = harness.sync.cached_folders(&GroupKey::from("T1"));

    for _ in 0..3 {
        harness.restart();
        let report = harness.sync.sync_all(&requests, false);
        assert_eq!(report.skipped, 3);
        assert_eq!(report.created + report.updated + report.errors, 0);
    }

    assert_eq!(harness.link_files(), files);
    assert_eq!(harness.sync.cached_folders(&GroupKey::from("T1")), cached_before);
}

#[test]
fn test_nesting_is_at_most_one_level() {
    let harness = TestHarness::new();
    harness
        .sync
        .sync(&fixtures::grouped_request("f1", EPISODE_1, "T1"), false);
    let second = harness
        .sync
        .sync(&fixtures::grouped_request("f2", EPISODE_2, "T1"), false);

    let season = RelativeFolder::parse("TV Shows/Show Name/Season 01 [T1]").unwrap();
    let nested = season.join("Show Name S01E02 [1080p, WEB-DL]");
    assert_eq!(
        second.path,
        Some(
            nested
                .to_path(harness.root())
                .join("Show Name S01E02 [1080p, WEB-DL].strm")
        )
    );

    let folders = harness.sync.cached_folders(&GroupKey::from("T1"));
    assert_eq!(folders, vec![season.clone(), nested.clone()]);
    for folder in &folders {
        assert!(folder.depth() <= season.depth() + 1);
    }
}

#[test]
fn test_existing_assignment_survives_layout_change() {
    let mut harness = TestHarness::new();
    let request = fixtures::grouped_request("f1", EPISODE_1, "T1");
    harness.sync.sync(&request, false);

    // A later run computes a different folder for the same file name; the
    // recorded folder that already holds the file wins.
    harness.sync = LinkSynchronizer::new(SyncConfig::new(harness.root())).with_resolver(Arc::new(
        MockResolver::new()
            .with_segments(["Others"])
            .with_base_filename("Show Name S01E01 [1080p, WEB-DL]"),
    ));
    let result = harness.sync.sync(&request, false);

    assert!(matches!(result.status, SyncStatus::Skipped { .. }));
    assert_eq!(result.path, Some(harness.root().join(episode_path())));
    assert!(!harness.root().join("Others").exists());
}

#[test]
fn test_externally_deleted_folder_is_recreated() {
    let mut harness = TestHarness::new();
    let request = fixtures::grouped_request("f1", EPISODE_1, "T1");
    harness.sync.sync(&request, false);

    fs::remove_dir_all(harness.root().join("TV Shows")).unwrap();
    harness.restart();

    let result = harness.sync.sync(&request, false);
    // The recorded folder is the computed one, so the file goes back in
    // one level down rather than into a new top-level folder.
    assert_eq!(
        result.status,
        SyncStatus::Success {
            action: SyncAction::Create
        }
    );
    assert_eq!(harness.link_files().len(), 1);
    assert!(result.path.unwrap().starts_with(harness.root().join("TV Shows/Show Name")));
}

// =============================================================================
// Dry run
// =============================================================================

#[test]
fn test_dry_run_on_empty_root_writes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("library");
    let sync = LinkSynchronizer::new(SyncConfig::new(&root));

    let report = sync.sync_all(
        &[
            fixtures::grouped_request("f1", EPISODE_1, "T1"),
            fixtures::grouped_request("m1", MOVIE, "T2"),
        ],
        true,
    );
    assert_eq!(report.dry_run, 2);
    assert!(!root.exists());
}

#[test]
fn test_dry_run_reports_update_without_writing() {
    let harness = TestHarness::new();
    let request = fixtures::grouped_request("f1", EPISODE_1, "T1");
    harness.sync.sync(&request, false);
    let before = harness.snapshot();

    let mut moved = request.clone();
    moved.remote_url = "https://mirror.example/f1".to_string();
    let result = harness.sync.sync(&moved, true);

    assert_eq!(
        result.status,
        SyncStatus::DryRun {
            action: SyncAction::Update
        }
    );
    assert_eq!(harness.snapshot(), before);
}

#[test]
fn test_dry_run_preview_matches_real_run() {
    let harness = TestHarness::new();
    let batch = [
        fixtures::grouped_request("f1", EPISODE_1, "T1"),
        fixtures::grouped_request("f2", EPISODE_2, "T1"),
    ];

    let preview = harness.sync.sync_all(&batch, true);
    assert!(harness.link_files().is_empty());

    let real = harness.sync.sync_all(&batch, false);
    let preview_paths: Vec<_> = preview.results.iter().map(|r| r.path.clone()).collect();
    let real_paths: Vec<_> = real.results.iter().map(|r| r.path.clone()).collect();
    assert_eq!(preview_paths, real_paths);
    assert_eq!(real.created, 2);
}

// =============================================================================
// Cache resilience
// =============================================================================

#[test]
fn test_corrupt_cache_is_recovered() {
    let harness = TestHarness::new();
    fs::write(harness.root().join(DEFAULT_CACHE_FILE), "{\"T1\": [oops").unwrap();

    let result = harness
        .sync
        .sync(&fixtures::grouped_request("f1", EPISODE_1, "T1"), false);
    assert_eq!(result.path, Some(harness.root().join(episode_path())));

    let raw = fs::read_to_string(harness.root().join(DEFAULT_CACHE_FILE)).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(
        value,
        serde_json::json!({"T1": ["TV Shows/Show Name/Season 01 [T1]"]})
    );
}

#[test]
fn test_cache_document_is_shared_across_runs() {
    let harness = TestHarness::new();
    harness
        .sync
        .sync(&fixtures::grouped_request("m1", MOVIE, "T2"), false);

    let mut cache = PathCache::new(harness.root());
    assert_eq!(
        cache.lookup(&GroupKey::from("T2")),
        vec![RelativeFolder::parse("Movies/1080p/Film Title (2019) [T2]").unwrap()]
    );
}

// =============================================================================
// Deletion and pruning
// =============================================================================

#[test]
fn test_delete_cleans_up_folder() {
    let harness = TestHarness::new();
    let result = harness
        .sync
        .sync(&fixtures::grouped_request("m1", MOVIE, "T2"), false);
    let path = result.path.unwrap();

    let deleted = harness.sync.delete(&path).unwrap();
    assert_eq!(deleted.path, path);
    assert_eq!(
        deleted.removed_parent,
        Some(harness.root().join("Movies/1080p/Film Title (2019) [T2]"))
    );
    // Single level only.
    assert!(harness.root().join("Movies/1080p").is_dir());

    let again = harness.sync.delete(&path).unwrap_err();
    assert!(again.is_not_found());
}

#[test]
fn test_prune_keeps_active_items() {
    let harness = TestHarness::new();
    let requests = vec![
        fixtures::grouped_request("f1", EPISODE_1, "T1"),
        fixtures::grouped_request("m1", MOVIE, "T2"),
    ];
    harness.sync.sync_all(&requests, false);

    let active: HashSet<String> = ["https://cdn.example/f1".to_string()].into_iter().collect();
    let report = harness.sync.prune(&active, false);

    assert_eq!(report.removed.len(), 1);
    assert_eq!(harness.link_files(), vec![episode_path()]);
}

#[test]
fn test_scan_sees_synced_files() {
    let harness = TestHarness::new();
    harness
        .sync
        .sync(&fixtures::grouped_request("f1", EPISODE_1, "T1"), false);

    let found = harness.sync.scan();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].relative_path, episode_path());
    assert_eq!(found[0].parent_folder.as_deref(), Some("TV Shows"));
    assert_eq!(found[0].season_folder.as_deref(), Some("Season 01 [T1]"));
    assert_eq!(found[0].remote_url(), Some("https://cdn.example/f1"));
}

// =============================================================================
// Concurrency
// =============================================================================

#[test]
fn test_shared_synchronizer_across_threads() {
    let harness = TestHarness::new();
    let sync = Arc::new(LinkSynchronizer::new(SyncConfig::new(harness.root())));

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let sync = Arc::clone(&sync);
            thread::spawn(move || {
                let request = SyncRequest::new(
                    format!("f{}", i),
                    format!("https://cdn.example/{}", i),
                    format!("Show.Name.S02E0{}.720p.HDTV.mkv", i + 1),
                )
                .with_group_key(format!("G{}", i));
                sync.sync(&request, false)
            })
        })
        .collect();

    for handle in handles {
        let result = handle.join().unwrap();
        assert!(!result.status.is_error(), "{:?}", result);
    }

    let mut cache = PathCache::new(harness.root());
    assert_eq!(cache.len(), 4);
}
