use std::error::Error;
use thiserror::Error;

/// Result alias for backend operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Error raised by question and leaderboard backends regardless of the
/// transport behind them.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("backend unavailable: {message}")]
    Unavailable {
        message: String,
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    #[error("backend returned an unusable payload: {0}")]
    InvalidPayload(String),
    #[error("no such resource: {0}")]
    Missing(String),
}

impl StorageError {
    /// Construct an unavailable error from any transport failure.
    pub fn unavailable(message: String, source: impl Error + Send + Sync + 'static) -> Self {
        StorageError::Unavailable {
            message,
            source: Box::new(source),
        }
    }
}
