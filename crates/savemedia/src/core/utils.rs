use lazy_regex::regex;
use std::collections::HashSet;

/// Longest description snippet shown in a preview, in characters.
pub const DESCRIPTION_LIMIT: usize = 800;

/// Extracts hashtags from free text, deduplicated case-insensitively.
///
/// The first-seen casing wins and the original order is preserved, so a
/// caption tagged `#Sun ... #sun` surfaces a single `#Sun`.
///
/// # Example
///
/// ```
/// use savemedia::core::utils::extract_hashtags;
///
/// let tags = extract_hashtags("Great day! #Sun #sun #Fun");
/// assert_eq!(tags, vec!["#Sun", "#Fun"]);
/// ```
pub fn extract_hashtags(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();

    for m in regex!(r"#\w+").find_iter(text) {
        let tag = m.as_str();
        if seen.insert(tag.to_lowercase()) {
            out.push(tag.to_string());
        }
    }

    out
}

/// Caps a description at [`DESCRIPTION_LIMIT`] characters, appending `...`
/// when something was cut. Counts characters, not bytes, so multi-byte
/// text never gets split mid-codepoint.
///
/// # Example
///
/// ```
/// use savemedia::core::utils::truncate_description;
///
/// assert_eq!(truncate_description("short caption"), "short caption");
/// ```
pub fn truncate_description(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= DESCRIPTION_LIMIT {
        return trimmed.to_string();
    }

    let cut: String = trimmed.chars().take(DESCRIPTION_LIMIT).collect();
    format!("{}...", cut)
}

/// Formats a duration in seconds as `3m25s`. Zero means "unknown" for the
/// sites we probe, so it renders as an empty string rather than `0m0s`.
///
/// # Example
///
/// ```
/// use savemedia::core::utils::format_duration;
///
/// assert_eq!(format_duration(205), "3m25s");
/// assert_eq!(format_duration(0), "");
/// ```
pub fn format_duration(seconds: u64) -> String {
    if seconds == 0 {
        return String::new();
    }
    format!("{}m{}s", seconds / 60, seconds % 60)
}
