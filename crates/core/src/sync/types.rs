//! Types for the sync module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::types::GroupKey;

/// A single link file to create or refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncRequest {
    /// Identifier of the content item (for tracking and flat layout).
    pub content_id: String,
    /// Remote URL the link file should point at (through the proxy).
    pub remote_url: String,
    /// Raw release filename, used for layout and naming.
    pub raw_filename: String,
    /// Content group the item belongs to (enables folder reuse).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_key: Option<GroupKey>,
    /// Release name, used as the flat-layout folder.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_name: Option<String>,
}

impl SyncRequest {
    pub fn new(
        content_id: impl Into<String>,
        remote_url: impl Into<String>,
        raw_filename: impl Into<String>,
    ) -> Self {
        Self {
            content_id: content_id.into(),
            remote_url: remote_url.into(),
            raw_filename: raw_filename.into(),
            group_key: None,
            release_name: None,
        }
    }

    pub fn with_group_key(mut self, key: impl Into<GroupKey>) -> Self {
        self.group_key = Some(key.into());
        self
    }

    pub fn with_release_name(mut self, name: impl Into<String>) -> Self {
        self.release_name = Some(name.into());
        self
    }
}

/// What a write did (or would do) to the target file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncAction {
    /// The link file did not exist.
    Create,
    /// The link file existed with a different body.
    Update,
}

impl SyncAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
        }
    }
}

/// Outcome of syncing one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SyncStatus {
    /// The link file was written.
    Success { action: SyncAction },
    /// The link file already had the expected body.
    Skipped { reason: String },
    /// Dry run; nothing was written.
    DryRun { action: SyncAction },
    /// The request failed.
    Error { reason: String },
}

impl SyncStatus {
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    /// Short label used in logs and summaries.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Success { .. } => "success",
            Self::Skipped { .. } => "skipped",
            Self::DryRun { .. } => "dry_run",
            Self::Error { .. } => "error",
        }
    }
}

/// Per-request result record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncResult {
    /// Content item the result belongs to.
    pub content_id: String,
    /// Target link file path, when one could be computed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    #[serde(flatten)]
    pub status: SyncStatus,
}

/// Aggregated outcome of a batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncReport {
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
    pub dry_run: usize,
    pub errors: usize,
    /// Duration in milliseconds.
    pub duration_ms: u64,
    pub results: Vec<SyncResult>,
}

impl SyncReport {
    /// Adds one result to the counters.
    pub fn push(&mut self, result: SyncResult) {
        match &result.status {
            SyncStatus::Success {
                action: SyncAction::Create,
            } => self.created += 1,
            SyncStatus::Success {
                action: SyncAction::Update,
            } => self.updated += 1,
            SyncStatus::Skipped { .. } => self.skipped += 1,
            SyncStatus::DryRun { .. } => self.dry_run += 1,
            SyncStatus::Error { .. } => self.errors += 1,
        }
        self.results.push(result);
    }

    pub fn total(&self) -> usize {
        self.results.len()
    }

    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }
}

/// Result of deleting one link file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteResult {
    /// The removed link file.
    pub path: PathBuf,
    /// The parent folder, if it was left empty and removed as well.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub removed_parent: Option<PathBuf>,
}

/// Outcome of removing stale link files.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PruneReport {
    /// Link files that were removed (or would be, in a dry run).
    pub removed: Vec<PathBuf>,
    /// Link files that could not be removed, with the reason.
    pub failed: Vec<(PathBuf, String)>,
    pub dry_run: bool,
}
