use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("invalid input: {0}")]
    Input(String),
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("history backend error: {0}")]
    HistoryBackend(String),
    #[error("summarization error: {0}")]
    Summarization(String),
    #[error("operation cancelled")]
    Cancelled,
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl AppError {
    /// Prefixes backend diagnostics with the commit or group they concern.
    pub fn in_context(self, context: &str) -> Self {
        match self {
            AppError::HistoryBackend(message) => {
                AppError::HistoryBackend(format!("{context}: {message}"))
            }
            AppError::Summarization(message) => {
                AppError::Summarization(format!("{context}: {message}"))
            }
            other => other,
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
