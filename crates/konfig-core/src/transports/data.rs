//! Inline literal transport
//!
//! `data:,<percent-encoded-source>` carries the source text in the URL
//! itself. The found-at location is reported as the process working
//! directory so that relative imports inside the literal resolve against
//! where the tool was invoked.

use async_trait::async_trait;
use percent_encoding::percent_decode_str;
use url::Url;

use crate::error::{CoreError, Result};
use crate::location;
use crate::transport::{Fetched, Transport};

/// Decodes `data:,` locations.
#[derive(Debug, Default)]
pub struct DataTransport;

impl DataTransport {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Transport for DataTransport {
    async fn fetch(&mut self, url: &Url) -> Result<Fetched> {
        let opaque = url.path();
        let (encoding, data) = opaque.split_once(',').ok_or_else(|| {
            CoreError::InvalidDataUrl {
                reason: "missing ','".to_string(),
            }
        })?;
        if !encoding.is_empty() {
            return Err(CoreError::InvalidDataUrl {
                reason: format!("unsupported encoding {encoding:?}"),
            });
        }
        let body = percent_decode_str(data).collect::<Vec<u8>>();
        Ok(Fetched::Content {
            body,
            found_at: Some(location::cwd_url()?),
        })
    }
}
