//! Link file synchronization.
//!
//! [`LinkSynchronizer`] turns a [`SyncRequest`] (content id, remote URL, raw
//! filename, optional group key) into a link file under the output root,
//! and keeps repeated runs idempotent:
//!
//! - unchanged body: `skipped`, nothing written
//! - different body: `update`
//! - no file yet: `create`
//!
//! For grouped requests the [`PathCache`](crate::cache::PathCache) keeps a
//! group's files in the folders it was first given, even if the computed
//! layout changes later. A second file landing in an already recorded
//! folder is nested one level down under its own stem.
//!
//! # Example
//!
//! ```ignore
//! use strmsync_core::sync::{LinkSynchronizer, SyncConfig, SyncRequest};
//!
//! let sync = LinkSynchronizer::new(SyncConfig::new("/media/links"));
//! let request = SyncRequest::new("file-1", "https://cdn.example/x", "Show.S01E01.1080p.mkv")
//!     .with_group_key("torrent-1");
//!
//! let result = sync.sync(&request, false);
//! println!("{}: {:?}", result.status.label(), result.path);
//! ```

mod config;
mod error;
mod synchronizer;
mod types;

pub use config::{SyncConfig, DEFAULT_EXTENSION, DEFAULT_PROXY_BASE_URL};
pub use error::SyncError;
pub use synchronizer::LinkSynchronizer;
pub use types::{
    DeleteResult, PruneReport, SyncAction, SyncReport, SyncRequest, SyncResult, SyncStatus,
};
