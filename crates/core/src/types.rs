//! Value types shared across the cache, synchronizer and scanner.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::sanitize::{is_safe_segment, sanitize};

/// Query parameter carrying the remote URL in a proxied link.
const LINK_PARAM: &str = "?link=";

/// Stable identifier of a content group (usually a torrent id).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupKey(String);

impl GroupKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for GroupKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for GroupKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A folder below the output root, stored as `/`-separated sanitized
/// segments.
///
/// Never absolute and never contains empty, `.` or `..` segments, so
/// joining it onto the root cannot escape the root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RelativeFolder(String);

impl RelativeFolder {
    /// Builds a folder from raw segments, sanitizing each one.
    ///
    /// Segments that sanitize to an empty string are dropped.
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let parts: Vec<String> = segments
            .into_iter()
            .map(|s| sanitize(s.as_ref()))
            .filter(|s| !s.is_empty())
            .collect();
        Self(parts.join("/"))
    }

    /// Parses a stored relative path (as found in the cache document).
    ///
    /// Returns `None` if any segment is empty, contains an illegal
    /// character, or is a dot segment. Backslashes are accepted as
    /// separators.
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.replace('\\', "/");
        if normalized.is_empty() || normalized == "." {
            return Some(Self::root());
        }
        let segments: Vec<&str> = normalized.split('/').collect();
        let valid = segments.iter().all(|s| is_safe_segment(s));
        valid.then(|| Self(segments.join("/")))
    }

    /// The output root itself.
    pub fn root() -> Self {
        Self(String::new())
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|s| !s.is_empty())
    }

    pub fn depth(&self) -> usize {
        self.segments().count()
    }

    /// Appends one segment (sanitized).
    pub fn join(&self, segment: &str) -> Self {
        let segment = sanitize(segment);
        if segment.is_empty() {
            return self.clone();
        }
        if self.is_root() {
            Self(segment)
        } else {
            Self(format!("{}/{}", self.0, segment))
        }
    }

    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        Some(match self.0.rsplit_once('/') {
            Some((parent, _)) => Self(parent.to_string()),
            None => Self::root(),
        })
    }

    /// True if `self` sits directly inside `other`.
    pub fn is_child_of(&self, other: &RelativeFolder) -> bool {
        self.parent().as_ref() == Some(other)
    }

    pub fn to_path(&self, root: &Path) -> PathBuf {
        self.segments().fold(root.to_path_buf(), |p, s| p.join(s))
    }
}

impl fmt::Display for RelativeFolder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            f.write_str(".")
        } else {
            f.write_str(&self.0)
        }
    }
}

impl<'de> Deserialize<'de> for RelativeFolder {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid relative folder: {raw}")))
    }
}

/// Final filename of a link file, extension included.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LinkFileName {
    name: String,
    stem: String,
}

impl LinkFileName {
    /// Sanitizes `base` and appends `.{extension}` unless `base` already
    /// ends with it (case-insensitive).
    pub fn new(base: &str, extension: &str) -> Self {
        let sanitized = sanitize(base);
        let suffix = format!(".{}", extension);
        let split = sanitized.len().saturating_sub(suffix.len());
        let has_suffix = sanitized.len() >= suffix.len()
            && sanitized.is_char_boundary(split)
            && sanitized[split..].eq_ignore_ascii_case(&suffix);
        if has_suffix {
            let stem = sanitized[..split].to_string();
            Self {
                name: sanitized,
                stem,
            }
        } else {
            Self {
                name: format!("{}{}", sanitized, suffix),
                stem: sanitized,
            }
        }
    }

    pub fn as_str(&self) -> &str {
        &self.name
    }

    /// The sanitized base name without the link extension.
    pub fn stem(&self) -> &str {
        &self.stem
    }
}

impl fmt::Display for LinkFileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A remote URL rewritten to go through the local streaming proxy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProxiedUrl(String);

impl ProxiedUrl {
    /// Builds `<proxy_base>?link=<remote_url>`.
    pub fn new(proxy_base: &str, remote_url: &str) -> Self {
        Self(format!("{}{}{}", proxy_base, LINK_PARAM, remote_url))
    }

    /// Wraps a body read back from a link file.
    pub fn from_stored(body: &str) -> Self {
        Self(body.trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The remote URL after `?link=`, if the body has that shape.
    pub fn remote_url(&self) -> Option<&str> {
        self.0
            .split_once(LINK_PARAM)
            .map(|(_, remote)| remote)
            .filter(|remote| !remote.is_empty())
    }
}

impl fmt::Display for ProxiedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
