//! Structured download requests for the yt-dlp engine.
//!
//! Every engine invocation is described by a [`FetchRequest`] built from the
//! requested mode and the scratch directory, so the full argument list lives
//! in one place instead of being assembled ad hoc at call sites.

use std::path::Path;

use url::Url;

use crate::core::config;

/// Browser-like headers sent with every fetch. Some sites refuse the stock
/// yt-dlp user agent outright.
pub const REQUEST_HEADERS: [(&str, &str); 3] = [
    (
        "User-Agent",
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36",
    ),
    ("Accept", "*/*"),
    ("Accept-Language", "en-US,en;q=0.9"),
];

/// Video format preference chain, first match wins: native mp4 video+audio,
/// then a premade mp4, then whatever single stream the site still offers.
pub const VIDEO_FORMAT_CHAIN: &str = "bestvideo*[ext=mp4]+bestaudio[ext=m4a]/best[ext=mp4]/best";

/// Audio format selector. The actual mp3 comes from post-processing.
pub const AUDIO_FORMAT_CHAIN: &str = "bestaudio/best";

/// Output template relative to the scratch directory. The title is capped at
/// 120 characters so long ones cannot overflow filesystem name limits.
pub const OUTPUT_TEMPLATE: &str = "%(title).120s.%(ext)s";

/// What the user asked for: the merged video or just the soundtrack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadMode {
    Video,
    Audio,
}

impl DownloadMode {
    /// Parses the mode segment of a callback payload. Anything other than
    /// the two known verbs is rejected.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "video" => Some(Self::Video),
            "audio" => Some(Self::Audio),
            _ => None,
        }
    }

    /// Wire form used in callback payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Audio => "audio",
        }
    }
}

impl std::fmt::Display for DownloadMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully resolved engine invocation: source URL, format selection,
/// post-processing, output location and transport tweaks.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub url: Url,
    pub mode: DownloadMode,
    /// yt-dlp `--format` selector chain.
    pub format: String,
    /// Container passed to `--merge-output-format` for split A/V downloads.
    pub merge_container: Option<String>,
    /// Target codec for `--extract-audio` post-processing.
    pub audio_codec: Option<String>,
    /// Bitrate hint for the audio post-processor, e.g. `192`.
    pub audio_quality: Option<String>,
    /// Absolute output template inside the scratch directory.
    pub output_template: String,
    pub retries: u32,
    pub cookies_file: Option<String>,
}

impl FetchRequest {
    /// Builds the request for `mode`, writing into `scratch_dir`.
    pub fn new(url: Url, mode: DownloadMode, scratch_dir: &Path) -> Self {
        let output_template = scratch_dir.join(OUTPUT_TEMPLATE).to_string_lossy().into_owned();
        let cookies_file = config::COOKIES_FILE.clone();

        match mode {
            DownloadMode::Video => Self {
                url,
                mode,
                format: VIDEO_FORMAT_CHAIN.to_string(),
                merge_container: Some("mp4".to_string()),
                audio_codec: None,
                audio_quality: None,
                output_template,
                retries: config::download::YTDLP_RETRIES,
                cookies_file,
            },
            DownloadMode::Audio => Self {
                url,
                mode,
                format: AUDIO_FORMAT_CHAIN.to_string(),
                merge_container: None,
                audio_codec: Some("mp3".to_string()),
                audio_quality: Some("192".to_string()),
                output_template,
                retries: config::download::YTDLP_RETRIES,
                cookies_file,
            },
        }
    }

    /// Full yt-dlp argument list for this request.
    ///
    /// The trailing `--print after_move:filepath` makes the engine report the
    /// final artifact path on stdout after any merge or re-encode; the
    /// `%(title)s` print gives us a display title without a second probe.
    /// `--no-simulate` keeps the download running despite the prints.
    pub fn to_args(&self) -> Vec<String> {
        let mut args: Vec<String> = vec![
            "--no-playlist".into(),
            "--no-warnings".into(),
            "--retries".into(),
            self.retries.to_string(),
            "-o".into(),
            self.output_template.clone(),
            "--format".into(),
            self.format.clone(),
        ];

        if let Some(container) = &self.merge_container {
            args.push("--merge-output-format".into());
            args.push(container.clone());
        }

        if let Some(codec) = &self.audio_codec {
            args.push("--extract-audio".into());
            args.push("--audio-format".into());
            args.push(codec.clone());
            if let Some(quality) = &self.audio_quality {
                args.push("--audio-quality".into());
                args.push(quality.clone());
            }
        }

        for (name, value) in REQUEST_HEADERS {
            args.push("--add-headers".into());
            args.push(format!("{}:{}", name, value));
        }

        if let Some(cookies) = &self.cookies_file {
            args.push("--cookies".into());
            args.push(cookies.clone());
        }

        args.push("--print".into());
        args.push("%(title)s".into());
        args.push("--print".into());
        args.push("after_move:filepath".into());
        args.push("--no-simulate".into());

        args.push(self.url.to_string());
        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    fn test_url() -> Url {
        Url::parse("https://youtu.be/abc123").unwrap()
    }

    fn request(mode: DownloadMode) -> FetchRequest {
        let mut req = FetchRequest::new(test_url(), mode, &PathBuf::from("/tmp/scratch"));
        // Pin the environment-dependent field so assertions are stable.
        req.cookies_file = None;
        req
    }

    #[test]
    fn test_mode_parse_round_trip() {
        assert_eq!(DownloadMode::parse("video"), Some(DownloadMode::Video));
        assert_eq!(DownloadMode::parse("audio"), Some(DownloadMode::Audio));
        assert_eq!(DownloadMode::parse("VIDEO"), None);
        assert_eq!(DownloadMode::parse(""), None);
        assert_eq!(DownloadMode::Video.as_str(), "video");
        assert_eq!(DownloadMode::Audio.as_str(), "audio");
    }

    #[test]
    fn test_video_request_merges_into_mp4() {
        let req = request(DownloadMode::Video);
        assert_eq!(req.format, VIDEO_FORMAT_CHAIN);
        assert_eq!(req.merge_container.as_deref(), Some("mp4"));
        assert_eq!(req.audio_codec, None);

        let args = req.to_args();
        assert!(args.windows(2).any(|w| w[0] == "--merge-output-format" && w[1] == "mp4"));
        assert!(!args.iter().any(|a| a == "--extract-audio"));
    }

    #[test]
    fn test_audio_request_extracts_mp3() {
        let req = request(DownloadMode::Audio);
        assert_eq!(req.format, AUDIO_FORMAT_CHAIN);
        assert_eq!(req.merge_container, None);

        let args = req.to_args();
        assert!(args.iter().any(|a| a == "--extract-audio"));
        assert!(args.windows(2).any(|w| w[0] == "--audio-format" && w[1] == "mp3"));
        assert!(args.windows(2).any(|w| w[0] == "--audio-quality" && w[1] == "192"));
        assert!(!args.iter().any(|a| a == "--merge-output-format"));
    }

    #[test]
    fn test_output_template_lands_in_scratch_dir() {
        let req = FetchRequest::new(test_url(), DownloadMode::Video, &PathBuf::from("/tmp/scratch"));
        assert_eq!(req.output_template, "/tmp/scratch/%(title).120s.%(ext)s");
    }

    #[test]
    fn test_args_end_with_prints_and_url() {
        let args = request(DownloadMode::Video).to_args();
        let n = args.len();
        assert_eq!(args[n - 1], "https://youtu.be/abc123");
        assert_eq!(args[n - 2], "--no-simulate");
        assert_eq!(&args[n - 6..n - 2], ["--print", "%(title)s", "--print", "after_move:filepath"]);
    }

    #[test]
    fn test_cookies_file_appended_when_present() {
        let mut req = request(DownloadMode::Video);
        req.cookies_file = Some("/home/user/cookies.txt".to_string());
        let args = req.to_args();
        assert!(args.windows(2).any(|w| w[0] == "--cookies" && w[1] == "/home/user/cookies.txt"));

        let args_without = request(DownloadMode::Video).to_args();
        assert!(!args_without.iter().any(|a| a == "--cookies"));
    }

    #[test]
    fn test_headers_are_always_sent() {
        let args = request(DownloadMode::Audio).to_args();
        let header_count = args.iter().filter(|a| *a == "--add-headers").count();
        assert_eq!(header_count, REQUEST_HEADERS.len());
        assert!(args.iter().any(|a| a.starts_with("User-Agent:Mozilla/5.0")));
    }
}
