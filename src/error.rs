use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScoutError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to load catalog snapshot '{path}': {source}")]
    Snapshot {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Preferences store error: {0}")]
    Preferences(String),

    #[error("Unknown sort field: {0}")]
    UnknownField(String),

    #[error("Unknown task type: {0}")]
    UnknownTask(String),

    #[error("Search task failed: {0}")]
    Task(String),

    #[error("An unexpected error occurred: {0}")]
    Other(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, ScoutError>;
