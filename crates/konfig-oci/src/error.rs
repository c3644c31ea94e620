//! Error types for OCI bundle operations

use thiserror::Error;

/// OCI registry and bundle errors
#[derive(Debug, Error)]
pub enum OciError {
    #[error("invalid OCI reference: {reference}")]
    InvalidReference { reference: String },

    #[error("OCI registry error: {message}")]
    Registry { message: String },

    #[error("OCI push failed: {message}")]
    PushFailed { message: String },

    #[error("cannot find layer with media type {media_type:?}")]
    MissingBodyLayer { media_type: String },

    #[error("invalid bundle config: {message}")]
    InvalidConfig { message: String },

    #[error("invalid bundle archive: {message}")]
    InvalidArchive { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for OCI bundle operations
pub type Result<T> = std::result::Result<T, OciError>;
