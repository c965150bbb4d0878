//! Filesystem-safe name sanitization.
//!
//! Every folder segment and link filename passes through [`sanitize`] before
//! it touches the disk.

/// Maximum length of a sanitized name, in characters.
pub const MAX_NAME_LEN: usize = 240;

/// Characters that are illegal in file names on at least one major platform.
pub const ILLEGAL_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Replacement for illegal characters.
const PLACEHOLDER: char = '_';

/// Turns arbitrary text into a single safe path component.
///
/// - Illegal characters (`<>:"/\|?*`) become `_`
/// - Whitespace runs collapse to a single space
/// - Leading and trailing whitespace is trimmed
/// - The result is truncated to [`MAX_NAME_LEN`] characters
///
/// A result of exactly `.` or `..` is replaced by `_` so a segment can never
/// address the current or parent directory. Empty input yields an empty
/// string.
pub fn sanitize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;

    for c in text.chars() {
        if c.is_whitespace() {
            pending_space = true;
            continue;
        }
        if pending_space && !out.is_empty() {
            out.push(' ');
        }
        pending_space = false;
        out.push(if ILLEGAL_CHARS.contains(&c) { PLACEHOLDER } else { c });
    }

    if out.chars().count() > MAX_NAME_LEN {
        out = out.chars().take(MAX_NAME_LEN).collect();
    }

    if out == "." || out == ".." {
        return PLACEHOLDER.to_string();
    }

    out
}

/// Returns true if `name` can be used as a stored path segment.
///
/// Structural check only: non-empty, no illegal characters, no path
/// separators, not `.` or `..`, at most [`MAX_NAME_LEN`] characters.
/// Does not re-run [`sanitize`]: truncation happens after trimming, so a
/// sanitized name may legitimately end in a space that a second pass would
/// remove.
pub fn is_safe_segment(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(ILLEGAL_CHARS)
        && name.chars().count() <= MAX_NAME_LEN
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replaces_illegal_chars() {
        let result = sanitize(r#"a<b>c:d"e/f\g|h?i*j"#);
        assert_eq!(result, "a_b_c_d_e_f_g_h_i_j");
        assert!(!result.chars().any(|c| ILLEGAL_CHARS.contains(&c)));
    }

    #[test]
    fn test_collapses_whitespace_and_trims() {
        assert_eq!(sanitize("  Show \t Name\n\nS01  "), "Show Name S01");
    }

    #[test]
    fn test_truncates_to_max_len() {
        let long = "x".repeat(500);
        assert_eq!(sanitize(&long).chars().count(), MAX_NAME_LEN);

        let exact = "y".repeat(MAX_NAME_LEN);
        assert_eq!(sanitize(&exact), exact);
    }

    #[test]
    fn test_truncates_by_characters_not_bytes() {
        let long = "é".repeat(300);
        let result = sanitize(&long);
        assert_eq!(result.chars().count(), MAX_NAME_LEN);
    }

    #[test]
    fn test_empty_and_whitespace_only() {
        assert_eq!(sanitize(""), "");
        assert_eq!(sanitize("   \t "), "");
    }

    #[test]
    fn test_dot_segments_neutralized() {
        assert_eq!(sanitize("."), "_");
        assert_eq!(sanitize(" .. "), "_");
        assert_eq!(sanitize("..."), "...");
    }

    #[test]
    fn test_deterministic() {
        let input = "Movie: The <Sequel> (2024)";
        assert_eq!(sanitize(input), sanitize(input));
        assert_eq!(sanitize(input), "Movie_ The _Sequel_ (2024)");
        assert!(is_safe_segment(&sanitize(input)));
        assert!(!is_safe_segment(input));
    }

    #[test]
    fn test_truncation_can_leave_trailing_space() {
        let input = format!("{} tail", "a".repeat(MAX_NAME_LEN - 1));
        let result = sanitize(&input);
        assert_eq!(result, format!("{} ", "a".repeat(MAX_NAME_LEN - 1)));
        assert!(is_safe_segment(&result));
    }

    #[test]
    fn test_safe_segment_rejections() {
        assert!(!is_safe_segment(""));
        assert!(!is_safe_segment("."));
        assert!(!is_safe_segment(".."));
        assert!(!is_safe_segment("a/b"));
        assert!(!is_safe_segment(&"x".repeat(MAX_NAME_LEN + 1)));
        assert!(is_safe_segment("..."));
    }
}
