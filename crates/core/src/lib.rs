pub mod cache;
pub mod config;
pub mod resolver;
pub mod sanitize;
pub mod scanner;
pub mod sync;
pub mod testing;
pub mod types;

pub use cache::{CacheError, PathCache};
pub use config::{
    load_config, load_config_from_str, load_config_or_default, validate_config, Config,
    ConfigError, MAX_WATCH_INTERVAL_SECS,
};
pub use resolver::{FolderResolver, MediaKind, Metadata, ReleaseNameParser, ResolveError};
pub use sanitize::sanitize;
pub use scanner::{find_stale, LinkFileDescriptor, TreeScanner};
pub use sync::{
    DeleteResult, LinkSynchronizer, PruneReport, SyncAction, SyncConfig, SyncError, SyncReport,
    SyncRequest, SyncResult, SyncStatus,
};
pub use types::{GroupKey, LinkFileName, ProxiedUrl, RelativeFolder};
