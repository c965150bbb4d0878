//! Folder resolution from raw release filenames.
//!
//! The synchronizer treats folder layout as a black box behind the
//! [`FolderResolver`] trait: it hands over a raw filename and gets back a
//! list of folder segments plus a base filename, which it then sanitizes and
//! composes. [`ReleaseNameParser`] is the bundled heuristic implementation.

mod config;
mod error;
mod release_parser;
mod traits;
mod types;

pub use config::ResolverConfig;
pub use error::ResolveError;
pub use release_parser::ReleaseNameParser;
pub use traits::FolderResolver;
pub use types::{MediaKind, Metadata};
