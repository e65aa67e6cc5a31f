use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HunterError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Design process failed with return code {code}")]
    ProcessFailed { code: i32, stderr: String },

    #[error("{what} not found at {}. Design may have failed.", .path.display())]
    ArtifactMissing { what: &'static str, path: PathBuf },

    #[error("Failed to read CSV: {message}")]
    SummaryUnreadable { path: PathBuf, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, HunterError>;
