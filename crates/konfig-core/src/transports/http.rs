//! HTTP/HTTPS transport

use async_trait::async_trait;
use reqwest::StatusCode;
use url::Url;

use crate::error::{CoreError, Result};
use crate::transport::{Fetched, Transport};

/// Fetches `http://` and `https://` locations with a GET request.
///
/// A 404 is a soft not-found (the resolver advances to the next candidate);
/// any other non-2xx status aborts the resolve call.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch(&mut self, url: &Url) -> Result<Fetched> {
        let response = self.client.get(url.clone()).send().await?;
        tracing::debug!("GET {} -> {}", url, response.status());
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(Fetched::NotFound);
        }
        if !response.status().is_success() {
            return Err(CoreError::HttpStatus {
                url: url.to_string(),
                status: response.status().to_string(),
            });
        }
        let body = response.bytes().await?;
        Ok(Fetched::content(body.to_vec()))
    }
}
