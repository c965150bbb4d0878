//! Trait definition for folder resolvers.

use super::error::ResolveError;
use super::types::Metadata;
use crate::types::GroupKey;

/// Derives a folder layout and base filename from a raw release filename.
///
/// Outputs are raw text; callers sanitize every segment before use.
pub trait FolderResolver: Send + Sync {
    /// Returns the name of this resolver implementation.
    fn name(&self) -> &str;

    /// Extracts structured metadata from a raw filename.
    fn parse(&self, raw_filename: &str) -> Result<Metadata, ResolveError>;

    /// Ordered folder segments below the output root.
    fn folder_segments(&self, metadata: &Metadata, group: Option<&GroupKey>) -> Vec<String>;

    /// Base filename for the link file, without extension.
    fn base_filename(&self, metadata: &Metadata) -> String;
}
