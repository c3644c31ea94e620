//! Registry bundle reader
//!
//! The `oci://` transport: turns a published bundle back into resolvable
//! import content. The first fetch of a package reference pulls and expands
//! the whole bundle; every file inside it is then served out of memory for
//! the life of the resolver.

use std::collections::HashMap;

use async_trait::async_trait;
use konfig_core::{CoreError, Fetched, Transport};
use oci_distribution::client::{Client, ClientConfig, ClientProtocol};
use oci_distribution::Reference;
use url::Url;

use crate::bundle::{Bundle, BundleConfig, BUNDLE_BODY_MEDIA_TYPE, BUNDLE_CONFIG_MEDIA_TYPE};
use crate::credentials;
use crate::error::OciError;
use crate::reference;

/// Registry-backed transport serving files out of published bundles.
///
/// The bundle cache is keyed by package reference (registry + repository +
/// tag-or-digest), one entry per bundle however many files it serves.
pub struct OciTransport {
    client: Client,
    bundles: HashMap<String, Bundle>,
}

impl OciTransport {
    /// HTTPS transport, the default.
    pub fn new() -> Self {
        Self::with_protocol(ClientProtocol::Https)
    }

    /// Plain-HTTP transport for insecure registries.
    pub fn insecure() -> Self {
        Self::with_protocol(ClientProtocol::Http)
    }

    fn with_protocol(protocol: ClientProtocol) -> Self {
        Self {
            client: Client::new(ClientConfig {
                protocol,
                ..Default::default()
            }),
            bundles: HashMap::new(),
        }
    }

    async fn fetch_bundle(&self, package: &str) -> Result<Bundle, OciError> {
        let image_ref =
            Reference::try_from(package).map_err(|e| OciError::InvalidReference {
                reference: format!("{package}: {e}"),
            })?;
        let auth = credentials::registry_auth(image_ref.registry());

        let image = self
            .client
            .pull(
                &image_ref,
                &auth,
                vec![BUNDLE_BODY_MEDIA_TYPE, BUNDLE_CONFIG_MEDIA_TYPE],
            )
            .await
            .map_err(|e| OciError::Registry {
                message: format!("pulling {package}: {e}"),
            })?;

        let config: BundleConfig =
            serde_json::from_slice(&image.config.data).map_err(|e| OciError::InvalidConfig {
                message: e.to_string(),
            })?;

        let body = image
            .layers
            .iter()
            .find(|layer| layer.media_type == BUNDLE_BODY_MEDIA_TYPE)
            .ok_or_else(|| OciError::MissingBodyLayer {
                media_type: BUNDLE_BODY_MEDIA_TYPE.to_string(),
            })?;

        Bundle::from_archive(config, &body.data)
    }
}

impl Default for OciTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for OciTransport {
    fn normalize(&self, url: Url) -> Url {
        reference::normalize(&url)
    }

    async fn fetch(&mut self, url: &Url) -> konfig_core::Result<Fetched> {
        let (package, inner) = reference::split(url);

        if !self.bundles.contains_key(&package) {
            let bundle =
                self.fetch_bundle(&package)
                    .await
                    .map_err(|e| CoreError::TransportFailed {
                        url: url.to_string(),
                        message: e.to_string(),
                    })?;
            tracing::debug!("cached bundle {} ({} files)", package, bundle.len());
            self.bundles.insert(package.clone(), bundle);
        }
        let bundle = &self.bundles[&package];

        if inner.is_empty() {
            let entrypoint = bundle.config().entrypoint.as_str();
            // An empty entrypoint would synthesize `import ""`, which
            // resolves right back to this bundle root.
            if entrypoint.is_empty() {
                return Err(CoreError::TransportFailed {
                    url: url.to_string(),
                    message: "bundle config must carry a non-empty \"entrypoint\" to import the bundle root"
                        .to_string(),
                });
            }
            // Content synthesis rather than a redirect: the evaluator
            // re-enters the resolver with this bundle URL as the referring
            // location, so the entrypoint's own relative imports work.
            let expr = format!("import {}", serde_json::to_string(entrypoint)?);
            return Ok(Fetched::content(expr.into_bytes()));
        }

        match bundle.open(&inner) {
            Some(bytes) => Ok(Fetched::content(bytes.to_vec())),
            None => Ok(Fetched::NotFound),
        }
    }
}
