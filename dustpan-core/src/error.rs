use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DustpanError {
    #[error("Path does not exist: {0}")]
    PathNotFound(PathBuf),

    #[error("Path is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Deletion worker exited without reporting a result")]
    DeleteWorkerLost,

    #[error("Status snapshot could not be serialized: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DustpanError>;
