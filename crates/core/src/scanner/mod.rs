//! Discovery of existing link files under an output root.

mod tree_scanner;
mod types;

pub use tree_scanner::{find_stale, TreeScanner};
pub use types::LinkFileDescriptor;
