use thiserror::Error;

use mindtrack_core::error::CoreError;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("document not found: {path}")]
    NotFound { path: String },

    #[error("invalid storage path: {0}")]
    InvalidPath(String),

    #[error("document at {path} is not a JSON object")]
    NotAnObject { path: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Document(#[from] CoreError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}
