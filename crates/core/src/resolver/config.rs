//! Configuration for the release name parser.

use serde::{Deserialize, Serialize};

/// Configuration for metadata-driven folder resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Whether to derive folders from parsed metadata. When disabled, link
    /// files use a flat `<release>/<filename>` layout.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Lowercase title fragments that mark a release as anime.
    #[serde(default = "default_anime_titles")]
    pub anime_titles: Vec<String>,

    /// Lowercase release group names that mark a release as anime.
    #[serde(default = "default_anime_groups")]
    pub anime_groups: Vec<String>,
}

fn default_true() -> bool {
    true
}

fn default_anime_titles() -> Vec<String> {
    [
        "one piece",
        "dragon ball",
        "naruto",
        "attack on titan",
        "demon slayer",
        "my hero academia",
        "jujutsu kaisen",
        "bleach",
        "hunter x hunter",
        "evangelion",
        "fullmetal",
        "gintama",
        "death note",
        "sword art online",
        "cowboy bebop",
        "fairy tail",
        "jojo",
        "pokemon",
        "yu-gi-oh",
        "sailor moon",
        "boku no hero",
        "shingeki no kyojin",
        "kimetsu no yaiba",
        "berserk",
        "gundam",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_anime_groups() -> Vec<String> {
    ["subsplease", "erai-raws", "horrible", "anime time", "horriblesubs"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            anime_titles: default_anime_titles(),
            anime_groups: default_anime_groups(),
        }
    }
}

impl ResolverConfig {
    /// Enables or disables metadata-driven layout.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Adds an anime title fragment.
    pub fn with_anime_title(mut self, title: impl Into<String>) -> Self {
        self.anime_titles.push(title.into().to_lowercase());
        self
    }

    /// Adds an anime release group.
    pub fn with_anime_group(mut self, group: impl Into<String>) -> Self {
        self.anime_groups.push(group.into().to_lowercase());
        self
    }
}
