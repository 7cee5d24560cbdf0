//! Error types shared across HeadMouse crates.

use std::path::PathBuf;

/// Top-level error type for HeadMouse operations.
#[derive(Debug, thiserror::Error)]
pub enum HeadmouseError {
    #[error("Calibration error: {message}")]
    Calibration { message: String },

    #[error("Gesture error: {message}")]
    Gesture { message: String },

    #[error("Dispatch error: {message}")]
    Dispatch { message: String },

    #[error("Tracking error: {message}")]
    Tracking { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Unsupported operation: {message}")]
    Unsupported { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using HeadmouseError.
pub type HeadmouseResult<T> = Result<T, HeadmouseError>;

impl HeadmouseError {
    pub fn calibration(msg: impl Into<String>) -> Self {
        Self::Calibration {
            message: msg.into(),
        }
    }

    pub fn gesture(msg: impl Into<String>) -> Self {
        Self::Gesture {
            message: msg.into(),
        }
    }

    pub fn dispatch(msg: impl Into<String>) -> Self {
        Self::Dispatch {
            message: msg.into(),
        }
    }

    pub fn tracking(msg: impl Into<String>) -> Self {
        Self::Tracking {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported {
            message: msg.into(),
        }
    }
}
