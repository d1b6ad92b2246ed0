use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("language model returned an empty response")]
    EmptyResponse,
    #[error("language model returned an unreadable response: {reason}")]
    MalformedResponse { reason: String, raw: String },
    #[error("language model error: {0}")]
    LanguageModel(String),
    #[error("work API error{}: {message}", .status.map(|s| format!(" ({s})")).unwrap_or_default())]
    WorkApi {
        status: Option<u16>,
        message: String,
    },
    #[error("invalid work item: {0}")]
    InvalidDraft(String),
    #[error("identity error: {0}")]
    Identity(String),
    #[error("local storage error: {0}")]
    Storage(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl AppError {
    pub fn work_api(message: impl Into<String>) -> Self {
        AppError::WorkApi {
            status: None,
            message: message.into(),
        }
    }

    /// Raw provider text, when the failure carries it.
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            AppError::MalformedResponse { raw, .. } => Some(raw),
            _ => None,
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
