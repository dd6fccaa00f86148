//! Link detection and platform classification.
//!
//! Pure text scanning: find the first URL in a message and tag it by
//! platform. No network access happens here.

use lazy_regex::regex;
use url::Url;

/// Sites we can download from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    YouTube,
    Instagram,
}

impl Platform {
    /// Substring match on known domain fragments. Deliberately loose:
    /// `m.youtube.com`, `youtu.be` short links and `instagr.am` all hit
    /// without maintaining a host allowlist.
    pub fn detect(url: &str) -> Option<Platform> {
        if url.contains("youtube.com") || url.contains("youtu.be") {
            Some(Platform::YouTube)
        } else if url.contains("instagram.com") || url.contains("instagr.am") {
            Some(Platform::Instagram)
        } else {
            None
        }
    }

    /// Lowercase tag for logging and callback plumbing.
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::YouTube => "youtube",
            Platform::Instagram => "instagram",
        }
    }

    /// Human-facing name used in status messages.
    pub fn display_name(&self) -> &'static str {
        match self {
            Platform::YouTube => "YouTube",
            Platform::Instagram => "Instagram",
        }
    }
}

/// Outcome of scanning one inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkScan {
    /// No `http(s)://` token in the text at all.
    NoUrl,
    /// A URL was found but the domain is not one we handle.
    Unsupported(String),
    /// A URL from a supported platform, parsed and tagged.
    Supported(Url, Platform),
}

/// Returns the first URL-looking token in the text.
pub fn extract_url(text: &str) -> Option<&str> {
    regex!(r"https?://[^\s]+").find(text).map(|m| m.as_str())
}

/// Scans free text for a downloadable link.
///
/// # Example
///
/// ```
/// use savemedia::classify::{scan, LinkScan, Platform};
///
/// match scan("check this https://youtu.be/abc123") {
///     LinkScan::Supported(url, platform) => {
///         assert_eq!(url.as_str(), "https://youtu.be/abc123");
///         assert_eq!(platform, Platform::YouTube);
///     }
///     other => panic!("unexpected: {:?}", other),
/// }
/// ```
pub fn scan(text: &str) -> LinkScan {
    let Some(candidate) = extract_url(text) else {
        return LinkScan::NoUrl;
    };

    match Platform::detect(candidate) {
        Some(platform) => match Url::parse(candidate) {
            Ok(url) => LinkScan::Supported(url, platform),
            // Matched the regex but not a real URL; treat like any other
            // link we cannot handle.
            Err(_) => LinkScan::Unsupported(candidate.to_string()),
        },
        None => LinkScan::Unsupported(candidate.to_string()),
    }
}
