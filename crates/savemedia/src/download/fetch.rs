//! Runs the yt-dlp engine and locates the produced artifact.

use std::path::{Path, PathBuf};

use tokio::process::Command as TokioCommand;
use tokio::time::timeout;

use crate::core::config;
use crate::core::error::{AppError, AppResult};
use crate::download::request::{DownloadMode, FetchRequest};

/// The file the engine produced, plus the display title it printed.
#[derive(Debug, Clone)]
pub struct FetchedArtifact {
    pub path: PathBuf,
    pub title: Option<String>,
}

/// Runs `request` to completion and resolves the resulting file inside
/// `scratch_dir`. The subprocess is bounded by the configured fetch timeout.
pub async fn fetch(request: &FetchRequest, scratch_dir: &Path) -> AppResult<FetchedArtifact> {
    let ytdl_bin = &*config::YTDL_BIN;
    let args = request.to_args();
    log::info!("Starting {} download: {}", request.mode, request.url);
    log::debug!("Engine command: {} {}", ytdl_bin, args.join(" "));

    let output = match timeout(
        config::download::fetch_timeout(),
        TokioCommand::new(ytdl_bin).args(&args).output(),
    )
    .await
    {
        Ok(Ok(output)) => output,
        Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(AppError::Download(format!(
                "{} is not installed or not on PATH",
                ytdl_bin
            )));
        }
        Ok(Err(e)) => {
            return Err(AppError::Download(format!("Failed to run {}: {}", ytdl_bin, e)));
        }
        Err(_) => {
            return Err(AppError::Download(format!(
                "Download timed out after {}s",
                config::download::fetch_timeout().as_secs()
            )));
        }
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        log::error!("Engine failed for {}: {}", request.url, stderr.trim());
        return Err(AppError::Download(summarize_engine_error(&stderr)));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let (title, printed_path) = parse_engine_output(&stdout);
    let path = resolve_artifact_path(scratch_dir, printed_path.as_deref(), request.mode)?;
    log::info!("Engine produced {}", path.display());

    Ok(FetchedArtifact { path, title })
}

/// Splits the engine printout into the title line and the final file path.
///
/// The request prints `%(title)s` first and `after_move:filepath` last, so
/// after dropping blank lines the last line is the path and the first is the
/// title whenever both survived.
fn parse_engine_output(stdout: &str) -> (Option<String>, Option<String>) {
    let lines: Vec<&str> = stdout.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
    let printed_path = lines.last().map(|l| l.to_string());
    let title = if lines.len() >= 2 {
        match lines[0] {
            "NA" => None,
            t => Some(t.to_string()),
        }
    } else {
        None
    };
    (title, printed_path)
}

/// Resolves the artifact the engine left behind.
///
/// Tried in order: the printed path as-is, the printed path relative to the
/// scratch dir, the printed path with an `.mp3` extension (post-processing
/// replaces the source file after the path was printed), and finally the
/// newest file in the scratch dir.
fn resolve_artifact_path(scratch_dir: &Path, printed: Option<&str>, mode: DownloadMode) -> AppResult<PathBuf> {
    if let Some(printed) = printed {
        let direct = PathBuf::from(printed);
        if direct.is_file() {
            return Ok(direct);
        }

        let joined = scratch_dir.join(printed);
        if joined.is_file() {
            return Ok(joined);
        }

        if mode == DownloadMode::Audio {
            let converted = direct.with_extension("mp3");
            if converted.is_file() {
                return Ok(converted);
            }
        }
    }

    if let Some(newest) = newest_file_in(scratch_dir) {
        log::debug!("Printed path unusable, falling back to newest file {}", newest.display());
        return Ok(newest);
    }

    Err(AppError::Download("Engine finished but produced no output file".to_string()))
}

/// Most recently modified regular file directly inside `dir`.
fn newest_file_in(dir: &Path) -> Option<PathBuf> {
    let entries = std::fs::read_dir(dir).ok()?;
    entries
        .flatten()
        .filter(|entry| entry.path().is_file())
        .filter_map(|entry| {
            let modified = entry.metadata().ok()?.modified().ok()?;
            Some((modified, entry.path()))
        })
        .max_by_key(|(modified, _)| *modified)
        .map(|(_, path)| path)
}

/// Condenses yt-dlp stderr into one line fit for a user message. Prefers the
/// last `ERROR:` line; falls back to the last non-empty line.
fn summarize_engine_error(stderr: &str) -> String {
    let lines: Vec<&str> = stderr.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
    let picked = lines
        .iter()
        .rev()
        .find(|l| l.starts_with("ERROR:"))
        .map(|l| l.trim_start_matches("ERROR:").trim())
        .or_else(|| lines.last().copied())
        .unwrap_or("yt-dlp failed without diagnostics");

    let mut message: String = picked.chars().take(300).collect();
    if picked.chars().count() > 300 {
        message.push_str("...");
    }
    message
}
