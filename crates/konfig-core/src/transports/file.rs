//! Local filesystem transport

use async_trait::async_trait;
use url::Url;

use crate::error::{CoreError, Result};
use crate::transport::{Fetched, Transport};

/// Serves `file://` locations straight from disk.
#[derive(Debug, Default)]
pub struct FileTransport;

impl FileTransport {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Transport for FileTransport {
    async fn fetch(&mut self, url: &Url) -> Result<Fetched> {
        let path = url.to_file_path().map_err(|_| CoreError::InvalidUrl {
            url: url.to_string(),
            reason: "not a local file path".to_string(),
        })?;
        match std::fs::read(&path) {
            Ok(body) => Ok(Fetched::content(body)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Fetched::NotFound),
            Err(e) => Err(e.into()),
        }
    }
}
