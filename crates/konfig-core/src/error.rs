//! Core error types

use thiserror::Error;

/// Import resolution and packaging errors
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("could not open import {import:?}, no match locally or in search paths. Tried: {}", tried.join("; "))]
    ImportNotFound { import: String, tried: Vec<String> },

    #[error("no transport registered for scheme {scheme:?} in {url}")]
    UnsupportedScheme { url: String, scheme: String },

    #[error("import of {url} is not valid UTF-8 (use importbin for binary content)")]
    NonUtf8Import { url: String },

    #[error("\"binary://\" url prefix requires the --alpha flag")]
    BinaryImportNotEnabled,

    #[error("kustomize+https:// imports are an alpha feature, please use the --alpha flag")]
    KustomizeNotEnabled,

    #[error("kustomize build of {target} failed: {message}")]
    KustomizeFailed { target: String, message: String },

    #[error("error reading {url}: {status}")]
    HttpStatus { url: String, status: String },

    #[error("invalid data URL: {reason}")]
    InvalidDataUrl { reason: String },

    #[error("fetching {url}: {message}")]
    TransportFailed { url: String, message: String },

    #[error("cannot bundle {url}: only file:// imports can be packaged")]
    UnbundlableScheme { url: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
