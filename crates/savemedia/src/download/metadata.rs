//! Read-only metadata probing via yt-dlp.
//!
//! The probe never downloads anything; it asks the engine to print a handful
//! of fields and parses them positionally. A failed or timed-out probe is not
//! an error for the caller, the preview simply degrades to placeholders.

use tokio::process::Command as TokioCommand;
use tokio::time::timeout;
use url::Url;

use crate::core::config;

/// Fields the probe asks yt-dlp to print, one per line. The description goes
/// last because it is the only field that may itself contain newlines.
const PROBE_TEMPLATE: &str = "%(title)s\n%(duration)s\n%(thumbnail)s\n%(uploader)s\n%(description)s";

/// Metadata for a single media item. Every field is optional; whatever the
/// probe could not determine stays `None` and the presentation layer fills in
/// placeholders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MediaInfo {
    pub title: Option<String>,
    pub duration_secs: Option<u64>,
    pub thumbnail_url: Option<String>,
    pub uploader: Option<String>,
    pub description: Option<String>,
}

/// Probes `url` without downloading. Returns `None` when the engine fails,
/// times out or is missing, so callers can always fall back to placeholders.
pub async fn probe(url: &Url) -> Option<MediaInfo> {
    let ytdl_bin = &*config::YTDL_BIN;
    let args = [
        "--print",
        PROBE_TEMPLATE,
        "--no-playlist",
        "--no-warnings",
        "--skip-download",
        url.as_str(),
    ];
    log::debug!("Probing metadata: {} {}", ytdl_bin, args.join(" "));

    let output = match timeout(
        config::download::probe_timeout(),
        TokioCommand::new(ytdl_bin).args(args).output(),
    )
    .await
    {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => {
            log::warn!("Failed to run {} for metadata probe: {}", ytdl_bin, e);
            return None;
        }
        Err(_) => {
            log::warn!(
                "Metadata probe timed out after {}s for {}",
                config::download::PROBE_TIMEOUT_SECS,
                url
            );
            return None;
        }
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        log::warn!("Metadata probe failed for {}: {}", url, stderr.trim());
        return None;
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let info = parse_probe_output(&stdout);
    log::debug!("Probe result for {}: title={:?}, duration={:?}", url, info.title, info.duration_secs);
    Some(info)
}

/// Parses the positional probe printout. yt-dlp prints `NA` for fields it
/// does not know; those become `None`.
fn parse_probe_output(stdout: &str) -> MediaInfo {
    let mut lines = stdout.splitn(5, '\n');
    let title = clean_field(lines.next());
    let duration = clean_field(lines.next()).and_then(|s| s.parse::<f64>().ok()).map(|v| v as u64);
    let thumbnail = clean_field(lines.next());
    let uploader = clean_field(lines.next());
    let description = clean_field(lines.next());

    MediaInfo {
        title,
        duration_secs: duration,
        thumbnail_url: thumbnail,
        uploader,
        description,
    }
}

fn clean_field(value: Option<&str>) -> Option<String> {
    let trimmed = value?.trim();
    if trimmed.is_empty() || trimmed == "NA" {
        None
    } else {
        Some(trimmed.to_string())
    }
}
