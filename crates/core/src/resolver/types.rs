//! Types for folder resolution.

use serde::{Deserialize, Serialize};

/// Broad category of a media item, used to pick the top-level folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Movie,
    TvShow,
    Anime,
    Unknown,
}

impl MediaKind {
    /// Name of the top-level library folder for this kind.
    pub fn library_folder(&self) -> &'static str {
        match self {
            Self::Movie => "Movies",
            Self::TvShow => "TV Shows",
            Self::Anime => "Anime",
            Self::Unknown => "Others",
        }
    }
}

/// Metadata extracted from a release filename.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    /// Clean title, without year, tags or episode markers.
    pub title: String,
    pub kind: MediaKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<u16>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub seasons: Vec<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub episodes: Vec<u32>,
    /// Normalized resolution, e.g. `1080p`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
    /// Normalized source quality, e.g. `BluRay` or `WEB-DL`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<String>,
    /// Release group, if tagged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    /// Display title used as the link file base name.
    pub formatted_title: String,
}

impl Metadata {
    /// Metadata for a filename whose structure could not be recognized.
    pub fn unknown(title: impl Into<String>) -> Self {
        let title = title.into();
        Self {
            formatted_title: title.clone(),
            title,
            kind: MediaKind::Unknown,
            year: None,
            seasons: Vec::new(),
            episodes: Vec::new(),
            resolution: None,
            quality: None,
            group: None,
        }
    }

    pub fn season(&self) -> Option<u32> {
        self.seasons.first().copied()
    }

    pub fn episode(&self) -> Option<u32> {
        self.episodes.first().copied()
    }
}
