//! Heuristic release-name parser.
//!
//! Understands the common scene and fansub naming styles:
//! - `Show.S01E02.1080p.WEB-DL.x264-GROUP.mkv`
//! - `Show 1x02 720p HDTV.avi`
//! - `[Group] Show - 05 (1080p) [CRC32].mkv`
//! - `Movie.Title.2019.2160p.BluRay.REMUX-GROUP.mkv`

use once_cell::sync::Lazy;
use regex_lite::Regex;
use tracing::debug;

use super::config::ResolverConfig;
use super::error::ResolveError;
use super::traits::FolderResolver;
use super::types::{MediaKind, Metadata};
use crate::types::GroupKey;

static SEASON_EPISODE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bS(\d{1,2})\s?E(\d{1,4})(?:\s?-?\s?E(\d{1,4}))?\b")
        .expect("valid season/episode pattern")
});
static CROSS_EPISODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(\d{1,2})x(\d{2,3})\b").expect("valid NxM pattern"));
static SEASON_ONLY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:S|Season\s?)(\d{1,2})\b").expect("valid season pattern"));
static EPISODE_ONLY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:E|EP|Episode\s?)(\d{1,4})\b").expect("valid episode pattern")
});
static DASH_EPISODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s-\s(\d{1,4})(?:v\d)?\b").expect("valid dash episode pattern"));
static YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(19\d{2}|20\d{2})\b").expect("valid year pattern"));
static RESOLUTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(2160p|1080p|720p|576p|480p|4k|uhd)\b").expect("valid resolution pattern")
});
static QUALITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(blu-?ray|bdrip|brrip|web-?dl|web-?rip|hdtv|dvdrip|hdrip|remux)\b")
        .expect("valid quality pattern")
});
static LEADING_GROUP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\[([^\]]+)\]\s*").expect("valid leading group pattern"));
static TRAILING_GROUP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\S-([A-Za-z0-9]+)$").expect("valid trailing group pattern"));

/// Extensions stripped from the raw filename before parsing.
const MEDIA_EXTENSIONS: &[&str] = &[
    "mkv", "mp4", "avi", "mov", "wmv", "m4v", "webm", "ts", "m2ts", "flv", "mpg", "mpeg", "strm",
];

/// Characters trimmed from the end of an isolated title.
const TITLE_TRIM: &[char] = &[' ', '-', '(', '[', '.', '_', ','];

/// Folder resolver driven by release-name heuristics.
#[derive(Debug, Clone, Default)]
pub struct ReleaseNameParser {
    config: ResolverConfig,
}

/// Intermediate parse state before classification.
#[derive(Debug, Default)]
struct Parsed {
    title: String,
    year: Option<u16>,
    seasons: Vec<u32>,
    episodes: Vec<u32>,
    resolution: Option<String>,
    quality: Option<String>,
    group: Option<String>,
    fansub_style: bool,
}

impl ReleaseNameParser {
    pub fn new(config: ResolverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Runs the extraction passes over a normalized stem.
    fn extract(&self, stem: &str) -> Parsed {
        let mut parsed = Parsed::default();

        let mut text = stem.to_string();
        if let Some(caps) = LEADING_GROUP.captures(stem) {
            parsed.group = caps.get(1).map(|m| m.as_str().trim().to_string());
            text = stem[caps.get(0).map_or(0, |m| m.end())..].to_string();
        }
        let text = normalize(&text);

        // Earliest byte offset at which a non-title token starts.
        let mut title_end = text.len();
        let mut mark = |start: usize| title_end = title_end.min(start);

        if let Some(caps) = SEASON_EPISODE.captures(&text) {
            mark(caps.get(0).map_or(0, |m| m.start()));
            parsed.seasons.extend(capture_number(&caps, 1));
            parsed.episodes.extend(capture_number(&caps, 2));
            parsed.episodes.extend(capture_number(&caps, 3));
        } else if let Some(caps) = CROSS_EPISODE.captures(&text) {
            mark(caps.get(0).map_or(0, |m| m.start()));
            parsed.seasons.extend(capture_number(&caps, 1));
            parsed.episodes.extend(capture_number(&caps, 2));
        } else {
            if let Some(caps) = SEASON_ONLY.captures(&text) {
                mark(caps.get(0).map_or(0, |m| m.start()));
                parsed.seasons.extend(capture_number(&caps, 1));
            }
            if let Some(caps) = EPISODE_ONLY.captures(&text) {
                mark(caps.get(0).map_or(0, |m| m.start()));
                parsed.episodes.extend(capture_number(&caps, 1));
            } else if let Some(caps) = DASH_EPISODE.captures(&text) {
                let episode = capture_number(&caps, 1);
                if episode.is_some_and(|n| !(1900..=2099).contains(&n)) {
                    mark(caps.get(0).map_or(0, |m| m.start()));
                    parsed.episodes.extend(episode);
                    parsed.fansub_style = parsed.group.is_some();
                }
            }
        }

        // A year at the very start is part of the title ("1917", "2012").
        if let Some(m) = YEAR
            .captures_iter(&text)
            .filter_map(|caps| caps.get(1))
            .find(|m| m.start() > 0)
        {
            mark(m.start());
            parsed.year = m.as_str().parse().ok();
        }

        if let Some(m) = RESOLUTION.find(&text) {
            mark(m.start());
            parsed.resolution = Some(normalize_resolution(m.as_str()));
        }

        let quality = QUALITY.find(&text);
        if let Some(m) = quality {
            mark(m.start());
            parsed.quality = Some(normalize_quality(m.as_str()));
        }

        if let Some(pos) = text.find('[') {
            mark(pos);
        }

        if parsed.group.is_none() && quality.is_none_or(|m| m.end() != text.len()) {
            parsed.group = TRAILING_GROUP
                .captures(&text)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().to_string());
        }

        parsed.title = text[..title_end].trim_end_matches(TITLE_TRIM).trim().to_string();
        parsed
    }

    /// Picks the media kind from parsed markers.
    fn classify(&self, parsed: &Parsed) -> MediaKind {
        let title = parsed.title.to_lowercase();
        let anime_title = self.config.anime_titles.iter().any(|t| title.contains(t.as_str()));
        let anime_group = parsed.group.as_ref().is_some_and(|g| {
            let g = g.to_lowercase();
            self.config.anime_groups.iter().any(|known| *known == g)
        });
        let has_seasons = !parsed.seasons.is_empty();
        let has_episodes = !parsed.episodes.is_empty();

        if parsed.fansub_style || anime_group || (anime_title && has_episodes) {
            MediaKind::Anime
        } else if has_seasons || has_episodes {
            MediaKind::TvShow
        } else {
            MediaKind::Movie
        }
    }
}

impl FolderResolver for ReleaseNameParser {
    fn name(&self) -> &str {
        "release-name"
    }

    fn parse(&self, raw_filename: &str) -> Result<Metadata, ResolveError> {
        let filename = raw_filename
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(raw_filename);
        let stem = strip_media_extension(filename).trim();

        if !stem.chars().any(char::is_alphanumeric) {
            return Err(ResolveError::unavailable(raw_filename, "no usable name"));
        }

        let parsed = self.extract(stem);
        if parsed.title.is_empty() {
            debug!("Could not isolate a title in {:?}", raw_filename);
            return Ok(Metadata::unknown(normalize(stem)));
        }

        let kind = self.classify(&parsed);
        let formatted_title = format_title(kind, &parsed);

        Ok(Metadata {
            title: parsed.title,
            kind,
            year: parsed.year,
            seasons: parsed.seasons,
            episodes: parsed.episodes,
            resolution: parsed.resolution,
            quality: parsed.quality,
            group: parsed.group,
            formatted_title,
        })
    }

    fn folder_segments(&self, metadata: &Metadata, group: Option<&GroupKey>) -> Vec<String> {
        let mut segments = vec![metadata.kind.library_folder().to_string()];

        match metadata.kind {
            MediaKind::Unknown => {}
            MediaKind::TvShow | MediaKind::Anime => {
                segments.push(metadata.title.clone());
                if let Some(season) = metadata.season() {
                    segments.push(format!("Season {:02}", season));
                }
            }
            MediaKind::Movie => {
                segments.push(
                    metadata
                        .resolution
                        .clone()
                        .unwrap_or_else(|| "unknown".to_string()),
                );
                segments.push(match metadata.year {
                    Some(year) => format!("{} ({})", metadata.title, year),
                    None => metadata.title.clone(),
                });
            }
        }

        if let (Some(group), Some(last)) = (group, segments.last_mut()) {
            last.push_str(&format!(" [{}]", group));
        }

        segments
    }

    fn base_filename(&self, metadata: &Metadata) -> String {
        if metadata.formatted_title.is_empty() {
            metadata.title.clone()
        } else {
            metadata.formatted_title.clone()
        }
    }
}

/// Builds the display title used as the link file name.
fn format_title(kind: MediaKind, parsed: &Parsed) -> String {
    let tags: Vec<&str> = [parsed.resolution.as_deref(), parsed.quality.as_deref()]
        .into_iter()
        .flatten()
        .collect();
    let suffix = if tags.is_empty() {
        String::new()
    } else {
        format!(" [{}]", tags.join(", "))
    };

    let title = &parsed.title;
    let season = parsed.seasons.first();
    let episode = parsed.episodes.first();

    match (kind, season, episode) {
        (MediaKind::TvShow | MediaKind::Anime, Some(s), Some(e)) => {
            format!("{} S{:02}E{:02}{}", title, s, e, suffix)
        }
        (MediaKind::Anime, None, Some(e)) => format!("{} - {:03}{}", title, e, suffix),
        (MediaKind::TvShow, None, Some(e)) => format!("{} E{:02}{}", title, e, suffix),
        (MediaKind::TvShow, Some(s), None) => format!("{} S{:02}{}", title, s, suffix),
        (MediaKind::Movie, _, _) => match parsed.year {
            Some(year) => format!("{} ({}){}", title, year, suffix),
            None => format!("{}{}", title, suffix),
        },
        _ => format!("{}{}", title, suffix),
    }
}

fn capture_number(caps: &regex_lite::Captures<'_>, index: usize) -> Option<u32> {
    caps.get(index).and_then(|m| m.as_str().parse().ok())
}

fn strip_media_extension(filename: &str) -> &str {
    match filename.rsplit_once('.') {
        Some((stem, ext)) if MEDIA_EXTENSIONS.iter().any(|e| e.eq_ignore_ascii_case(ext)) => stem,
        _ => filename,
    }
}

/// Turns scene separators into spaces and collapses whitespace.
fn normalize(text: &str) -> String {
    text.replace(['.', '_'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn normalize_resolution(raw: &str) -> String {
    match raw.to_lowercase().as_str() {
        "4k" | "uhd" => "2160p".to_string(),
        other => other.to_string(),
    }
}

fn normalize_quality(raw: &str) -> String {
    match raw.to_lowercase().replace('-', "").as_str() {
        "bluray" => "BluRay",
        "bdrip" => "BDRip",
        "brrip" => "BRRip",
        "webdl" => "WEB-DL",
        "webrip" => "WEBRip",
        "hdtv" => "HDTV",
        "dvdrip" => "DVDRip",
        "hdrip" => "HDRip",
        "remux" => "REMUX",
        _ => return raw.to_string(),
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> ReleaseNameParser {
        ReleaseNameParser::default()
    }

    #[test]
    fn test_tv_episode() {
        let meta = parser().parse("Show.S01E01.mkv").unwrap();
        assert_eq!(meta.title, "Show");
        assert_eq!(meta.kind, MediaKind::TvShow);
        assert_eq!(meta.seasons, vec![1]);
        assert_eq!(meta.episodes, vec![1]);
        assert_eq!(meta.formatted_title, "Show S01E01");
        assert_eq!(
            parser().folder_segments(&meta, None),
            vec!["TV Shows", "Show", "Season 01"]
        );
    }

    #[test]
    fn test_tv_episode_with_tags() {
        let meta = parser()
            .parse("The.Office.US.S03E12.1080p.WEB-DL.x264-NTb.mkv")
            .unwrap();
        assert_eq!(meta.title, "The Office US");
        assert_eq!(meta.resolution.as_deref(), Some("1080p"));
        assert_eq!(meta.quality.as_deref(), Some("WEB-DL"));
        assert_eq!(meta.group.as_deref(), Some("NTb"));
        assert_eq!(meta.formatted_title, "The Office US S03E12 [1080p, WEB-DL]");
    }

    #[test]
    fn test_cross_notation() {
        let meta = parser().parse("Breaking Bad 2x05 720p HDTV.avi").unwrap();
        assert_eq!(meta.kind, MediaKind::TvShow);
        assert_eq!(meta.seasons, vec![2]);
        assert_eq!(meta.episodes, vec![5]);
        assert_eq!(meta.formatted_title, "Breaking Bad S02E05 [720p, HDTV]");
    }

    #[test]
    fn test_multi_episode() {
        let meta = parser().parse("Show.S02E03E04.mkv").unwrap();
        assert_eq!(meta.episodes, vec![3, 4]);
        assert_eq!(meta.formatted_title, "Show S02E03");
    }

    #[test]
    fn test_movie() {
        let meta = parser()
            .parse("The.Matrix.1999.1080p.BluRay.x264-GROUP.mkv")
            .unwrap();
        assert_eq!(meta.title, "The Matrix");
        assert_eq!(meta.kind, MediaKind::Movie);
        assert_eq!(meta.year, Some(1999));
        assert_eq!(meta.group.as_deref(), Some("GROUP"));
        assert_eq!(meta.formatted_title, "The Matrix (1999) [1080p, BluRay]");
        assert_eq!(
            parser().folder_segments(&meta, None),
            vec!["Movies", "1080p", "The Matrix (1999)"]
        );
    }

    #[test]
    fn test_movie_with_parenthesized_year() {
        let meta = parser().parse("Dune Part Two (2024) 4K.mkv").unwrap();
        assert_eq!(meta.title, "Dune Part Two");
        assert_eq!(meta.year, Some(2024));
        assert_eq!(meta.resolution.as_deref(), Some("2160p"));
    }

    #[test]
    fn test_leading_year_is_title() {
        let meta = parser().parse("2012.2009.1080p.mkv").unwrap();
        assert_eq!(meta.title, "2012");
        assert_eq!(meta.year, Some(2009));
    }

    #[test]
    fn test_movie_without_resolution() {
        let meta = parser().parse("random_file_name.mp4").unwrap();
        assert_eq!(meta.kind, MediaKind::Movie);
        assert_eq!(meta.title, "random file name");
        assert_eq!(
            parser().folder_segments(&meta, None),
            vec!["Movies", "unknown", "random file name"]
        );
    }

    #[test]
    fn test_fansub_anime() {
        let meta = parser()
            .parse("[SubsPlease] Frieren - 05 (1080p) [ABCD1234].mkv")
            .unwrap();
        assert_eq!(meta.title, "Frieren");
        assert_eq!(meta.kind, MediaKind::Anime);
        assert_eq!(meta.group.as_deref(), Some("SubsPlease"));
        assert_eq!(meta.episodes, vec![5]);
        assert_eq!(meta.formatted_title, "Frieren - 005 [1080p]");
        assert_eq!(parser().folder_segments(&meta, None), vec!["Anime", "Frieren"]);
    }

    #[test]
    fn test_known_anime_title() {
        let meta = parser().parse("One.Piece.E1071.720p.mkv").unwrap();
        assert_eq!(meta.kind, MediaKind::Anime);
        assert_eq!(meta.formatted_title, "One Piece - 1071 [720p]");

        let meta = parser().parse("Naruto.S02E10.mkv").unwrap();
        assert_eq!(meta.kind, MediaKind::Anime);
        assert_eq!(meta.formatted_title, "Naruto S02E10");
        assert_eq!(
            parser().folder_segments(&meta, None),
            vec!["Anime", "Naruto", "Season 02"]
        );
    }

    #[test]
    fn test_title_not_isolated_is_unknown() {
        let meta = parser().parse("S01E01.mkv").unwrap();
        assert_eq!(meta.kind, MediaKind::Unknown);
        assert_eq!(meta.title, "S01E01");
        assert_eq!(parser().folder_segments(&meta, None), vec!["Others"]);
        assert_eq!(parser().base_filename(&meta), "S01E01");
    }

    #[test]
    fn test_unusable_name_is_error() {
        assert!(parser().parse("").is_err());
        assert!(parser().parse(".mkv").is_err());
        assert!(matches!(
            parser().parse("  --  "),
            Err(ResolveError::MetadataUnavailable { .. })
        ));
    }

    #[test]
    fn test_group_key_appended_to_last_segment() {
        let meta = parser().parse("Show.S01E01.mkv").unwrap();
        let group = GroupKey::from("T1");
        assert_eq!(
            parser().folder_segments(&meta, Some(&group)),
            vec!["TV Shows", "Show", "Season 01 [T1]"]
        );

        let unknown = Metadata::unknown("x");
        assert_eq!(parser().folder_segments(&unknown, Some(&group)), vec!["Others [T1]"]);
    }

    #[test]
    fn test_directory_prefix_ignored() {
        let meta = parser().parse("Show.S01/Show.S01E02.mkv").unwrap();
        assert_eq!(meta.title, "Show");
        assert_eq!(meta.episodes, vec![2]);
    }

    #[test]
    fn test_custom_anime_group() {
        let parser = ReleaseNameParser::new(ResolverConfig::default().with_anime_group("Judas"));
        let meta = parser.parse("[Judas] Some Show S01E03.mkv").unwrap();
        assert_eq!(meta.kind, MediaKind::Anime);
        assert_eq!(meta.formatted_title, "Some Show S01E03");
    }
}
