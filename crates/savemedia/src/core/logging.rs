//! Logger initialization and startup diagnostics.

use anyhow::Result;
use simplelog::{ColorChoice, CombinedLogger, Config, LevelFilter, TermLogger, TerminalMode, WriteLogger};
use std::fs::File;

use crate::core::config;

/// Initialize logging to both the terminal and a log file.
pub fn init_logger(log_file_path: &str) -> Result<()> {
    let log_file = File::create(log_file_path).map_err(|e| anyhow::anyhow!("Failed to create log file: {}", e))?;

    CombinedLogger::init(vec![
        TermLogger::new(
            LevelFilter::Info,
            Config::default(),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        ),
        WriteLogger::new(LevelFilter::Info, Config::default(), log_file),
    ])
    .map_err(|e| anyhow::anyhow!("Failed to initialize logger: {}", e))?;

    Ok(())
}

/// Logs the effective configuration once at startup so a glance at the log
/// answers "which limits and paths is this instance running with".
pub fn log_startup_configuration() {
    log::info!("yt-dlp binary: {}", &*config::YTDL_BIN);
    log::info!("Scratch root: {}", &*config::TEMP_FILES_DIR);
    log::info!("Max file size: {} MB", *config::MAX_FILESIZE_MB);
    log::info!(
        "Ledger: ttl={}s capacity={} sweep={}s",
        *config::ledger::TTL_SECS,
        *config::ledger::CAPACITY,
        config::ledger::SWEEP_INTERVAL_SECS
    );

    match &*config::COOKIES_FILE {
        Some(path) => {
            if std::path::Path::new(path).exists() {
                log::info!("Cookies file: {}", path);
            } else {
                log::warn!("Cookies file set but not found: {}", path);
            }
        }
        None => log::info!("Cookies file: not set"),
    }

    match &*config::UPDATE_LINK {
        Some(link) => log::info!("Updates link: {}", link),
        None => log::info!("Updates link: not set"),
    }
}
