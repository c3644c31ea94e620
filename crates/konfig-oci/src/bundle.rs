//! Bundle wire format
//!
//! A published bundle is two blobs behind an OCI manifest: a small JSON
//! config record and a gzip-compressed tar body holding the packaged
//! closure under archive-relative names.

use std::collections::HashMap;
use std::io::Read;

use flate2::read::GzDecoder;
use serde::{Deserialize, Serialize};
use tar::Archive;

use crate::error::{OciError, Result};

/// Media type of the bundle body layer (gzip-compressed tar).
pub const BUNDLE_BODY_MEDIA_TYPE: &str = "application/vnd.konfig.bundle.tar+gzip";

/// Media type of the bundle config blob.
pub const BUNDLE_CONFIG_MEDIA_TYPE: &str = "application/vnd.konfig.bundle.config.v1+json";

/// The bundle config record.
///
/// `entrypoint` is the archive-relative name of the root program;
/// `metadata` is an arbitrary JSON object contributed at pack time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BundleConfig {
    pub entrypoint: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

/// A fetched bundle, expanded into an in-memory file map.
#[derive(Debug)]
pub struct Bundle {
    config: BundleConfig,
    files: HashMap<String, Vec<u8>>,
}

impl Bundle {
    /// Expand a bundle body archive.
    pub fn from_archive(config: BundleConfig, body: &[u8]) -> Result<Self> {
        Ok(Self {
            config,
            files: slurp_tar(body)?,
        })
    }

    pub fn config(&self) -> &BundleConfig {
        &self.config
    }

    /// Bytes of one archived file, by archive-relative name.
    pub fn open(&self, path: &str) -> Option<&[u8]> {
        self.files.get(path).map(Vec::as_slice)
    }

    /// Archived file names, sorted.
    pub fn file_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.files.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Read every regular file out of a tar+gzip archive in a single pass.
fn slurp_tar(body: &[u8]) -> Result<HashMap<String, Vec<u8>>> {
    let mut archive = Archive::new(GzDecoder::new(std::io::Cursor::new(body)));
    let mut files = HashMap::new();

    let entries = archive.entries().map_err(|e| OciError::InvalidArchive {
        message: e.to_string(),
    })?;
    for entry in entries {
        let mut entry = entry.map_err(|e| OciError::InvalidArchive {
            message: e.to_string(),
        })?;
        if !entry.header().entry_type().is_file() {
            continue;
        }
        let path = entry
            .path()
            .map_err(|e| OciError::InvalidArchive {
                message: e.to_string(),
            })?
            .to_string_lossy()
            .to_string();
        let mut data = Vec::new();
        entry.read_to_end(&mut data)?;
        files.insert(path, data);
    }
    Ok(files)
}
