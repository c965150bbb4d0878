use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::cache::DEFAULT_CACHE_FILE;
pub use crate::resolver::ResolverConfig;
use crate::sync::{DEFAULT_EXTENSION, DEFAULT_PROXY_BASE_URL};

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub proxy: ProxyConfig,
    #[serde(default)]
    pub resolver: ResolverConfig,
    #[serde(default)]
    pub watch: WatchConfig,
}

/// Output tree configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    /// Directory holding the link tree and the path cache.
    #[serde(default = "default_root")]
    pub root: PathBuf,
    /// Link file extension, without the dot.
    #[serde(default = "default_extension")]
    pub extension: String,
    /// Path cache file name, relative to `root`.
    #[serde(default = "default_cache_file")]
    pub cache_file: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            extension: default_extension(),
            cache_file: default_cache_file(),
        }
    }
}

fn default_root() -> PathBuf {
    PathBuf::from("./library")
}

fn default_extension() -> String {
    DEFAULT_EXTENSION.to_string()
}

fn default_cache_file() -> String {
    DEFAULT_CACHE_FILE.to_string()
}

/// Streaming proxy configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProxyConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_PROXY_BASE_URL.to_string()
}

/// Longest accepted watch interval: one year.
pub const MAX_WATCH_INTERVAL_SECS: u64 = 365 * 24 * 60 * 60;

/// Watch mode configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WatchConfig {
    /// Seconds between sync cycles.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
        }
    }
}

fn default_interval_secs() -> u64 {
    3600
}
