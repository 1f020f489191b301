//! Error types for HabitFlow

use thiserror::Error;

/// Errors that can occur while mutating or persisting habit state
#[derive(Debug, Error)]
pub enum HabitError {
    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("A habit named \"{0}\" already exists")]
    DuplicateHabit(String),

    #[error("Unknown habit: {0}")]
    UnknownHabit(String),

    #[error("Invalid habit name: {0}")]
    InvalidHabitName(String),

    #[error("Invalid rating {0}: must be between 1 and 5")]
    InvalidRating(u8),

    #[error("Invalid target frequency: {0}")]
    InvalidFrequency(String),

    #[error("Date parse error: {0}")]
    DateParseError(String),

    #[error("Unsupported snapshot version: {0}")]
    UnsupportedSnapshot(u32),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Remote service error: {0}")]
    Remote(#[from] RemoteError),
}

/// Errors raised by the remote HabitFlow API.
///
/// These never reach the statistics layer: the sync service turns them into
/// a local fallback.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Server error {status}: {message}")]
    Server { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Remote service unavailable")]
    Unavailable,
}

#[cfg(feature = "remote")]
impl From<reqwest::Error> for RemoteError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            RemoteError::InvalidResponse(e.to_string())
        } else {
            RemoteError::Http(e.to_string())
        }
    }
}

/// Result type for state operations
pub type Result<T> = std::result::Result<T, HabitError>;
