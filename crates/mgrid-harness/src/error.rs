use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, HarnessError>;

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("engine error: {0}")]
    Engine(#[from] mgrid::Error),

    #[error("scenario file does not exist: {path}")]
    MissingScenario { path: PathBuf },

    #[error("invalid scenario: {message}")]
    InvalidScenario { message: String },
}

impl HarnessError {
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::MissingScenario { .. } | Self::InvalidScenario { .. } => 2,
            Self::Engine(_) => 3,
            Self::Io(_) | Self::Json(_) => 1,
        }
    }

    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidScenario {
            message: message.into(),
        }
    }
}
