//! Environment-sourced configuration.
//!
//! Values are read once into `Lazy` statics; tunables that rarely change
//! live in nested constant groups with `Duration` helpers.

use once_cell::sync::Lazy;
use std::env;
use std::time::Duration;

/// Bot token
/// Read from BOT_TOKEN or TELOXIDE_TOKEN environment variable
/// Empty when unset; startup refuses to run without it
pub static BOT_TOKEN: Lazy<String> = Lazy::new(|| {
    env::var("BOT_TOKEN")
        .or_else(|_| env::var("TELOXIDE_TOKEN"))
        .unwrap_or_else(|_| String::new())
});

/// Optional link shown behind the "Updates" button
/// Read from UPDATE_LINK environment variable
pub static UPDATE_LINK: Lazy<Option<String>> = Lazy::new(|| {
    env::var("UPDATE_LINK")
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
});

/// Maximum file size we are willing to send, in binary megabytes
/// Read from MAX_FILESIZE_MB environment variable
/// The ceiling exists because Telegram rejects uploads past its own limit
pub static MAX_FILESIZE_MB: Lazy<u64> = Lazy::new(|| {
    env::var("MAX_FILESIZE_MB")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(1900)
});

/// Optional Netscape cookie file handed to yt-dlp
/// Read from COOKIES_FILE environment variable, tilde-expanded
pub static COOKIES_FILE: Lazy<Option<String>> = Lazy::new(|| {
    env::var("COOKIES_FILE")
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(|v| shellexpand::tilde(&v).into_owned())
});

/// Path to the yt-dlp binary
/// Read from YTDL_BIN environment variable
pub static YTDL_BIN: Lazy<String> = Lazy::new(|| env::var("YTDL_BIN").unwrap_or_else(|_| "yt-dlp".to_string()));

/// Root directory for per-download scratch directories
/// Read from TEMP_FILES_DIR environment variable
pub static TEMP_FILES_DIR: Lazy<String> =
    Lazy::new(|| env::var("TEMP_FILES_DIR").unwrap_or_else(|_| "/tmp".to_string()));

/// Log file path
/// Read from LOG_FILE_PATH environment variable
pub static LOG_FILE_PATH: Lazy<String> =
    Lazy::new(|| env::var("LOG_FILE_PATH").unwrap_or_else(|_| "savemedia.log".to_string()));

/// Download configuration
pub mod download {
    use super::{env, Duration, Lazy};

    /// Timeout for metadata probes (in seconds)
    pub const PROBE_TIMEOUT_SECS: u64 = 60;

    /// yt-dlp retry count passed with --retries
    pub const YTDLP_RETRIES: u32 = 3;

    /// Timeout for one whole fetch, override with DOWNLOAD_TIMEOUT_SECS
    /// Long enough for a multi-hundred-MB video on a slow uplink
    pub static DOWNLOAD_TIMEOUT_SECS: Lazy<u64> = Lazy::new(|| {
        env::var("DOWNLOAD_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(600)
    });

    /// Metadata probe timeout duration
    pub fn probe_timeout() -> Duration {
        Duration::from_secs(PROBE_TIMEOUT_SECS)
    }

    /// Whole-fetch timeout duration
    pub fn fetch_timeout() -> Duration {
        Duration::from_secs(*DOWNLOAD_TIMEOUT_SECS)
    }
}

/// Request ledger configuration
pub mod ledger {
    use super::{env, Duration, Lazy};

    /// How long a presented choice stays valid (in seconds)
    /// Override with LEDGER_TTL_SECS
    pub static TTL_SECS: Lazy<u64> = Lazy::new(|| {
        env::var("LEDGER_TTL_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(1800)
    });

    /// Hard cap on pending entries; the oldest entry is evicted at the cap
    /// Override with LEDGER_CAPACITY
    pub static CAPACITY: Lazy<usize> = Lazy::new(|| {
        env::var("LEDGER_CAPACITY")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(500)
    });

    /// Interval between background expiry sweeps (in seconds)
    pub const SWEEP_INTERVAL_SECS: u64 = 300;

    /// Entry time-to-live duration
    pub fn ttl() -> Duration {
        Duration::from_secs(*TTL_SECS)
    }

    /// Sweep interval duration
    pub fn sweep_interval() -> Duration {
        Duration::from_secs(SWEEP_INTERVAL_SECS)
    }
}

/// Network configuration
pub mod network {
    use super::Duration;

    /// Request timeout for the bot's HTTP client (in seconds)
    /// Generous because large uploads ride the same client
    pub const REQUEST_TIMEOUT_SECS: u64 = 900;

    /// Request timeout duration
    pub fn timeout() -> Duration {
        Duration::from_secs(REQUEST_TIMEOUT_SECS)
    }
}
