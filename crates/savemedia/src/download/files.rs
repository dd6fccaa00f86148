//! Artifact classification and the size gate.

use std::path::Path;

use crate::download::request::DownloadMode;

/// Extensions delivered as playable audio.
pub const AUDIO_EXTENSIONS: [&str; 4] = ["mp3", "m4a", "opus", "ogg"];

/// Extensions delivered as playable video.
pub const VIDEO_EXTENSIONS: [&str; 5] = ["mp4", "webm", "mkv", "mov", "avi"];

/// How an artifact gets delivered to the chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Audio,
    Video,
    Document,
}

impl FileKind {
    /// Classifies an artifact by extension. Audio-mode downloads are always
    /// delivered as audio regardless of what the post-processor named the
    /// file; anything with an unknown extension goes out as a document.
    pub fn classify(path: &Path, mode: DownloadMode) -> Self {
        if mode == DownloadMode::Audio {
            return Self::Audio;
        }

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        if AUDIO_EXTENSIONS.contains(&ext.as_str()) {
            Self::Audio
        } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            Self::Video
        } else {
            Self::Document
        }
    }
}

/// Binary megabytes, rounded down. Used for user-facing size reports.
pub fn size_in_mb(bytes: u64) -> u64 {
    bytes / (1024 * 1024)
}

/// Size of `path` in bytes, or `None` when the file cannot be inspected.
pub fn file_size(path: &Path) -> Option<u64> {
    std::fs::metadata(path).ok().map(|meta| meta.len())
}

/// True when the artifact must not be sent. A file that cannot be inspected
/// counts as oversized.
pub fn exceeds_size_limit(path: &Path, limit_mb: u64) -> bool {
    match file_size(path) {
        Some(bytes) => bytes as f64 / (1024.0 * 1024.0) > limit_mb as f64,
        None => true,
    }
}
