//! Testing utilities and mock implementations.
//!
//! # Example
//!
//! ```rust,ignore
//! use strmsync_core::testing::{fixtures, MockResolver};
//!
//! let resolver = MockResolver::new().with_segments(["Movies", "Film"]);
//! fixtures::write_link(root, "Movies/Film/Film.strm", &fixtures::proxied("https://cdn/x"));
//! ```

mod mock_resolver;

pub use mock_resolver::MockResolver;

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::fs;
    use std::path::{Path, PathBuf};

    use crate::sync::{SyncRequest, DEFAULT_PROXY_BASE_URL};
    use crate::types::ProxiedUrl;

    /// Link body for `remote_url` behind the default proxy.
    pub fn proxied(remote_url: &str) -> String {
        ProxiedUrl::new(DEFAULT_PROXY_BASE_URL, remote_url).to_string()
    }

    /// A grouped request with a predictable remote URL.
    pub fn grouped_request(content_id: &str, raw_filename: &str, group: &str) -> SyncRequest {
        SyncRequest::new(
            content_id,
            format!("https://cdn.example/{}", content_id),
            raw_filename,
        )
        .with_group_key(group)
    }

    /// Writes a link file (and its folders) below `root`.
    pub fn write_link(root: &Path, relative: &str, body: &str) -> PathBuf {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        let _ = fs::write(&path, body);
        path
    }
}
