//! Embedded stdlib transport
//!
//! `internal:///` serves the language's standard library out of a read-only
//! asset table compiled into the binary. Process-wide immutable state, no
//! lifecycle. Always placed last on the default search path.

use async_trait::async_trait;
use url::Url;

use crate::error::Result;
use crate::transport::{Fetched, Transport};

static ASSETS: phf::Map<&'static str, &'static str> = phf::phf_map! {
    "konfig.libsonnet" => include_str!("../../assets/konfig.libsonnet"),
    "kutils.libsonnet" => include_str!("../../assets/kutils.libsonnet"),
};

/// Look up an embedded asset by its bare name.
pub fn asset(name: &str) -> Option<&'static str> {
    ASSETS.get(name).copied()
}

/// Serves `internal:///` locations from the embedded asset table.
#[derive(Debug, Default)]
pub struct InternalTransport;

impl InternalTransport {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Transport for InternalTransport {
    async fn fetch(&mut self, url: &Url) -> Result<Fetched> {
        let name = url.path().trim_start_matches('/');
        match ASSETS.get(name) {
            Some(body) => Ok(Fetched::content(body.as_bytes().to_vec())),
            None => Ok(Fetched::NotFound),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_serves_embedded_assets() {
        let mut transport = InternalTransport::new();
        let url = Url::parse("internal:///konfig.libsonnet").unwrap();
        match transport.fetch(&url).await.unwrap() {
            Fetched::Content { body, .. } => {
                assert_eq!(body, asset("konfig.libsonnet").unwrap().as_bytes());
            }
            Fetched::NotFound => panic!("expected embedded asset"),
        }
    }

    #[tokio::test]
    async fn test_unknown_asset_is_not_found() {
        let mut transport = InternalTransport::new();
        let url = Url::parse("internal:///nope.libsonnet").unwrap();
        assert!(matches!(
            transport.fetch(&url).await.unwrap(),
            Fetched::NotFound
        ));
    }
}
