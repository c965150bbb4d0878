//! Configuration for the link synchronizer.

use std::path::PathBuf;

use crate::cache::DEFAULT_CACHE_FILE;
use crate::config::Config;

/// Default link file extension.
pub const DEFAULT_EXTENSION: &str = "strm";

/// Default base URL of the local streaming proxy.
pub const DEFAULT_PROXY_BASE_URL: &str = "http://127.0.0.1:5000/stream";

/// Configuration for a [`LinkSynchronizer`](super::LinkSynchronizer).
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Output root holding the link tree and the cache document.
    pub root: PathBuf,
    /// Link file extension, without the dot.
    pub extension: String,
    /// File name of the path cache document under `root`.
    pub cache_file: String,
    /// Proxy endpoint; link bodies are `<proxy_base_url>?link=<remote>`.
    pub proxy_base_url: String,
}

impl SyncConfig {
    /// Creates a config for `root` with default settings.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            extension: DEFAULT_EXTENSION.to_string(),
            cache_file: DEFAULT_CACHE_FILE.to_string(),
            proxy_base_url: DEFAULT_PROXY_BASE_URL.to_string(),
        }
    }

    /// Sets the link file extension.
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Sets the cache document file name.
    pub fn with_cache_file(mut self, file_name: impl Into<String>) -> Self {
        self.cache_file = file_name.into();
        self
    }

    /// Sets the proxy base URL.
    pub fn with_proxy_base_url(mut self, url: impl Into<String>) -> Self {
        self.proxy_base_url = url.into();
        self
    }
}

impl From<&Config> for SyncConfig {
    fn from(config: &Config) -> Self {
        Self {
            root: config.output.root.clone(),
            extension: config.output.extension.clone(),
            cache_file: config.output.cache_file.clone(),
            proxy_base_url: config.proxy.base_url.clone(),
        }
    }
}
