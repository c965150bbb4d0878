//! Persisted index of the folders assigned to each content group.
//!
//! The cache is advisory: the output tree is the source of truth, and every
//! lookup that matters is re-validated against the filesystem. A missing or
//! corrupt document is treated as an empty cache, and write failures only
//! cost durability across restarts.
//!
//! The document lives at `<root>/processed_paths.json` and maps group keys
//! to arrays of `/`-separated relative folders:
//!
//! ```json
//! {
//!   "T1": ["TV Shows/Show/Season 01 [T1]"]
//! }
//! ```

mod error;
mod path_cache;

pub use error::CacheError;
pub use path_cache::{PathCache, DEFAULT_CACHE_FILE};
