//! Mock folder resolver for testing.

use std::sync::{Arc, Mutex};

use crate::resolver::{FolderResolver, Metadata, ResolveError};
use crate::types::GroupKey;

/// Mock implementation of the FolderResolver trait.
///
/// Returns canned folder segments and base filename for every input, and
/// records the filenames it was asked to parse.
///
/// # Example
///
/// ```rust,ignore
/// use strmsync_core::testing::MockResolver;
///
/// let resolver = MockResolver::new()
///     .with_segments(["TV Shows", "Show", "Season 01"])
///     .with_base_filename("Show S01E01");
///
/// let sync = LinkSynchronizer::new(config).with_resolver(Arc::new(resolver.clone()));
/// sync.sync(&request, false);
///
/// assert_eq!(resolver.parsed(), vec!["Show.S01E01.mkv"]);
/// ```
#[derive(Debug, Clone)]
pub struct MockResolver {
    segments: Vec<String>,
    base_filename: Option<String>,
    fail: bool,
    /// Append ` [<group>]` to the last segment, like the bundled parser.
    tag_group: bool,
    parsed: Arc<Mutex<Vec<String>>>,
}

impl Default for MockResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl MockResolver {
    /// Create a mock resolving everything to `Others/<filename>`.
    pub fn new() -> Self {
        Self {
            segments: vec!["Others".to_string()],
            base_filename: None,
            fail: false,
            tag_group: false,
            parsed: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Folder segments returned for every filename.
    pub fn with_segments<I, S>(mut self, segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.segments = segments.into_iter().map(Into::into).collect();
        self
    }

    /// Base filename returned for every filename (default: the raw title).
    pub fn with_base_filename(mut self, base: impl Into<String>) -> Self {
        self.base_filename = Some(base.into());
        self
    }

    /// Tag the last segment with the group key.
    pub fn with_group_tag(mut self) -> Self {
        self.tag_group = true;
        self
    }

    /// Make every parse fail with `MetadataUnavailable`.
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    /// Filenames passed to `parse`, in call order.
    pub fn parsed(&self) -> Vec<String> {
        self.parsed.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

impl FolderResolver for MockResolver {
    fn name(&self) -> &str {
        "mock"
    }

    fn parse(&self, raw_filename: &str) -> Result<Metadata, ResolveError> {
        if let Ok(mut parsed) = self.parsed.lock() {
            parsed.push(raw_filename.to_string());
        }
        if self.fail {
            return Err(ResolveError::unavailable(raw_filename, "mock failure"));
        }
        Ok(Metadata::unknown(raw_filename))
    }

    fn folder_segments(&self, _metadata: &Metadata, group: Option<&GroupKey>) -> Vec<String> {
        let mut segments = self.segments.clone();
        if let (true, Some(group), Some(last)) = (self.tag_group, group, segments.last_mut()) {
            last.push_str(&format!(" [{}]", group));
        }
        segments
    }

    fn base_filename(&self, metadata: &Metadata) -> String {
        self.base_filename
            .clone()
            .unwrap_or_else(|| metadata.formatted_title.clone())
    }
}
