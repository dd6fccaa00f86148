//! The download task: everything that happens after a download button press.
//!
//! Each accepted callback spawns one task. The task owns a private scratch
//! directory for the engine run and is responsible for removing it and
//! dropping the ledger entry no matter how the attempt ends.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use teloxide::prelude::*;
use teloxide::types::InputFile;
use url::Url;
use uuid::Uuid;

use crate::core::config;
use crate::core::error::{AppError, AppResult};
use crate::download::fetch::{fetch, FetchedArtifact};
use crate::download::files::{self, FileKind};
use crate::download::request::{DownloadMode, FetchRequest};
use crate::storage::{PendingRequest, RequestLedger};

/// A gated artifact ready for delivery.
#[derive(Debug)]
pub struct Artifact {
    pub path: PathBuf,
    pub kind: FileKind,
    pub title: String,
}

/// Outcome of the fetch-and-gate pipeline, before any Telegram send.
#[derive(Debug)]
pub enum Prepared {
    Ready(Artifact),
    /// The artifact exists on disk but exceeds the size ceiling. It is
    /// reported, never sent.
    TooLarge {
        measured_mb: u64,
    },
}

/// Allocates a fresh scratch directory path for one engine invocation.
pub fn scratch_dir_path() -> PathBuf {
    PathBuf::from(&*config::TEMP_FILES_DIR).join(format!("savemedia_{}", Uuid::new_v4().simple()))
}

/// Runs the engine into `scratch_dir` and applies the size gate and
/// file-kind classification to whatever comes out.
pub async fn prepare_artifact(
    url: &Url,
    mode: DownloadMode,
    scratch_dir: &Path,
    limit_mb: u64,
) -> AppResult<Prepared> {
    std::fs::create_dir_all(scratch_dir)?;

    let request = FetchRequest::new(url.clone(), mode, scratch_dir);
    let fetched = fetch(&request, scratch_dir).await?;

    if files::exceeds_size_limit(&fetched.path, limit_mb) {
        let measured_mb = files::file_size(&fetched.path).map(files::size_in_mb).unwrap_or(0);
        log::warn!(
            "Artifact {} is over the {} MB ceiling (measured {} MB)",
            fetched.path.display(),
            limit_mb,
            measured_mb
        );
        return Ok(Prepared::TooLarge { measured_mb });
    }

    let kind = FileKind::classify(&fetched.path, mode);
    let title = display_title(&fetched);
    Ok(Prepared::Ready(Artifact { path: fetched.path, kind, title }))
}

/// Caption for the delivered file: the printed title, else the file stem.
fn display_title(fetched: &FetchedArtifact) -> String {
    fetched
        .title
        .clone()
        .or_else(|| fetched.path.file_stem().map(|s| s.to_string_lossy().into_owned()))
        .unwrap_or_else(|| "File".to_string())
}

/// Removes the scratch directory and drops the ledger entry. Runs after
/// every attempt, successful or not, so no invocation leaves files behind
/// or a still-resolvable request id.
pub async fn cleanup_attempt(scratch_dir: &Path, ledger: &RequestLedger, request_id: &str) {
    if let Err(e) = std::fs::remove_dir_all(scratch_dir) {
        if e.kind() != std::io::ErrorKind::NotFound {
            log::warn!("Failed to remove scratch dir {}: {}", scratch_dir.display(), e);
        }
    }
    ledger.discard(request_id).await;
}

/// Spawns the full download flow for a consumed request and returns
/// immediately, keeping the dispatcher free for other updates.
pub fn spawn_download(
    bot: Bot,
    chat_id: ChatId,
    request_id: String,
    entry: PendingRequest,
    mode: DownloadMode,
    ledger: Arc<RequestLedger>,
) {
    tokio::spawn(async move {
        run_download(&bot, chat_id, &request_id, entry, mode, &ledger).await;
    });
}

/// One complete download attempt: progress notice, engine run, size gate,
/// delivery, failure report, then unconditional cleanup.
pub async fn run_download(
    bot: &Bot,
    chat_id: ChatId,
    request_id: &str,
    entry: PendingRequest,
    mode: DownloadMode,
    ledger: &RequestLedger,
) {
    let notice = bot
        .send_message(chat_id, format!("⏳ Downloading {} — this can take some time.", mode))
        .await
        .ok();

    let scratch_dir = scratch_dir_path();

    let result: Result<(), AppError> = async {
        match prepare_artifact(&entry.url, mode, &scratch_dir, *config::MAX_FILESIZE_MB).await? {
            Prepared::TooLarge { measured_mb } => {
                bot.send_message(chat_id, format!("⚠️ File too large ({} MB).", measured_mb)).await?;
                Ok(())
            }
            Prepared::Ready(artifact) => send_artifact(bot, chat_id, &artifact).await,
        }
    }
    .await;

    if let Err(e) = &result {
        log::error!("Download failed for chat {}: {}", chat_id, e);
        let _ = bot
            .send_message(chat_id, format!("❌ Download failed: {}", user_error_text(e)))
            .await;
    }

    if let Some(notice) = notice {
        let _ = bot.delete_message(chat_id, notice.id).await;
    }
    cleanup_attempt(&scratch_dir, ledger, request_id).await;
}

/// Delivers the artifact with the send method matching its kind.
async fn send_artifact(bot: &Bot, chat_id: ChatId, artifact: &Artifact) -> AppResult<()> {
    let input = InputFile::file(artifact.path.clone());
    match artifact.kind {
        FileKind::Audio => {
            bot.send_audio(chat_id, input).caption(&artifact.title).await?;
        }
        FileKind::Video => {
            bot.send_video(chat_id, input).caption(&artifact.title).await?;
        }
        FileKind::Document => {
            bot.send_document(chat_id, input).caption(&artifact.title).await?;
        }
    }
    log::info!("Sent {:?} {} to chat {}", artifact.kind, artifact.path.display(), chat_id);
    Ok(())
}

/// Message shown to the user when an attempt fails. Download errors carry
/// their own human-readable text; everything else falls back to `Display`.
fn user_error_text(error: &AppError) -> String {
    match error {
        AppError::Download(message) => message.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_scratch_dir_paths_are_unique() {
        let a = scratch_dir_path();
        let b = scratch_dir_path();
        assert_ne!(a, b);
        assert!(a.file_name().unwrap().to_string_lossy().starts_with("savemedia_"));
    }

    #[test]
    fn test_display_title_prefers_printed_title() {
        let fetched = FetchedArtifact {
            path: PathBuf::from("/tmp/x/clip.mp4"),
            title: Some("A Proper Title".to_string()),
        };
        assert_eq!(display_title(&fetched), "A Proper Title");
    }

    #[test]
    fn test_display_title_falls_back_to_file_stem() {
        let fetched = FetchedArtifact {
            path: PathBuf::from("/tmp/x/Saved Clip.mp4"),
            title: None,
        };
        assert_eq!(display_title(&fetched), "Saved Clip");
    }

    #[test]
    fn test_user_error_text_unwraps_download_errors() {
        let e = AppError::Download("Video unavailable".to_string());
        assert_eq!(user_error_text(&e), "Video unavailable");

        let io = AppError::Io(std::io::Error::other("disk gone"));
        assert_eq!(user_error_text(&io), "IO error: disk gone");
    }

    #[test]
    fn test_pipeline_outcomes_format_for_diagnostics() {
        let ready: AppResult<Prepared> = Ok(Prepared::Ready(Artifact {
            path: PathBuf::from("/tmp/x/clip.mp4"),
            kind: FileKind::Video,
            title: "Clip".to_string(),
        }));
        assert!(format!("{:?}", ready).contains("clip.mp4"));

        let gated = Prepared::TooLarge { measured_mb: 2047 };
        assert!(format!("{:?}", gated).contains("2047"));
    }
}
