use thiserror::Error;

/// Application error type covering the failure domains we actually hit:
/// the Telegram API, the yt-dlp subprocess, and the filesystem.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Telegram API error: {0}")]
    Telegram(#[from] teloxide::RequestError),

    #[error("Download error: {0}")]
    Download(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias used throughout the crate
pub type AppResult<T> = Result<T, AppError>;

impl From<String> for AppError {
    fn from(s: String) -> Self {
        AppError::Download(s)
    }
}

impl From<&str> for AppError {
    fn from(s: &str) -> Self {
        AppError::Download(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_conversions_map_to_download() {
        let err: AppError = "yt-dlp exited with status 1".into();
        assert!(matches!(err, AppError::Download(_)));
        assert_eq!(err.to_string(), "Download error: yt-dlp exited with status 1");

        let err: AppError = String::from("merge failed").into();
        assert!(matches!(err, AppError::Download(_)));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err: AppError = io.into();
        assert!(matches!(err, AppError::Io(_)));
    }
}
