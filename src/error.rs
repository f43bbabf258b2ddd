use thiserror::Error;

use crate::media::EngineError;

#[derive(Error, Debug)]
pub enum VidsplitError {
    #[error("Source file not found: {0}")]
    SourceNotFound(String),

    #[error("Failed to prepare workspace directory {path}: {source}")]
    WorkspacePrep {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to probe {path}: {reason}")]
    Probe { path: String, reason: String },

    #[error("Failed to extract audio to {path}")]
    AudioExtraction {
        path: String,
        #[source]
        source: EngineError,
    },

    #[error("Failed to extract video to {path}")]
    VideoExtraction {
        path: String,
        #[source]
        source: EngineError,
    },

    #[error("Invalid chunk size: {0} (must be greater than 0)")]
    InvalidChunkSize(i64),

    #[error("Invalid media duration: {0}")]
    InvalidDuration(f64),

    #[error("Failed to extract chunk {index} to {path}")]
    ChunkExtraction {
        index: usize,
        path: String,
        #[source]
        source: EngineError,
    },

    #[error("Failed to remove intermediate file {path}: {source}")]
    Cleanup {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Extraction task did not complete: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, VidsplitError>;
