//! Registry publisher
//!
//! Pushes a packaged bundle to an OCI registry: body and config as
//! content-addressable blobs under the konfig media types, referenced by an
//! image manifest (schema version 2) tagged with the requested reference.

use std::collections::BTreeMap;

use oci_distribution::client::{Client, ClientConfig, ClientProtocol, Config, ImageLayer};
use oci_distribution::manifest::OciImageManifest;
use oci_distribution::Reference;
use sha2::{Digest, Sha256};

use crate::bundle::{BundleConfig, BUNDLE_BODY_MEDIA_TYPE, BUNDLE_CONFIG_MEDIA_TYPE};
use crate::credentials;
use crate::error::{OciError, Result};

/// Outcome of a successful push.
#[derive(Debug, Clone)]
pub struct PushedBundle {
    /// URL of the pushed manifest.
    pub manifest_url: String,
    /// Content digest of the bundle body blob.
    pub body_digest: String,
}

/// OCI registry publisher for packaged bundles.
pub struct Publisher {
    client: Client,
}

impl Publisher {
    /// `insecure` selects plain HTTP instead of HTTPS.
    pub fn new(insecure: bool) -> Self {
        let protocol = if insecure {
            ClientProtocol::Http
        } else {
            ClientProtocol::Https
        };
        Self {
            client: Client::new(ClientConfig {
                protocol,
                ..Default::default()
            }),
        }
    }

    /// Push `body` and `config` to `reference` (e.g. `ghcr.io/org/app:v1`).
    pub async fn push_bundle(
        &self,
        reference: &str,
        body: Vec<u8>,
        config: &BundleConfig,
    ) -> Result<PushedBundle> {
        let image_ref =
            Reference::try_from(reference).map_err(|e| OciError::InvalidReference {
                reference: format!("{reference}: {e}"),
            })?;
        let auth = credentials::registry_auth(image_ref.registry());

        let body_digest = sha256_digest(&body);
        let config_blob = serde_json::to_vec(config)?;

        let layers = vec![ImageLayer::new(
            body,
            BUNDLE_BODY_MEDIA_TYPE.to_string(),
            None,
        )];
        let oci_config = Config::new(config_blob, BUNDLE_CONFIG_MEDIA_TYPE.to_string(), None);
        let manifest = bundle_manifest(&layers, &oci_config);

        let response = self
            .client
            .push(&image_ref, &layers, oci_config, &auth, Some(manifest))
            .await
            .map_err(|e| OciError::PushFailed {
                message: e.to_string(),
            })?;

        Ok(PushedBundle {
            manifest_url: response.manifest_url,
            body_digest,
        })
    }
}

/// Build the bundle manifest: schema version 2, one body layer, constant
/// provenance annotations (identical bundles must produce identical
/// manifests).
fn bundle_manifest(layers: &[ImageLayer], config: &Config) -> OciImageManifest {
    let mut annotations = BTreeMap::new();
    annotations.insert(
        "org.opencontainers.image.created".to_string(),
        "1970-01-01T00:00:00Z".to_string(),
    );
    annotations.insert(
        "org.opencontainers.image.revision".to_string(),
        "unknown".to_string(),
    );
    annotations.insert(
        "org.opencontainers.image.source".to_string(),
        "konfig pack".to_string(),
    );
    OciImageManifest::build(layers, config, Some(annotations.into_iter().collect()))
}

/// `sha256:<hex>` content digest of a blob.
pub fn sha256_digest(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("sha256:{}", hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_digest() {
        let digest = sha256_digest(b"hello world");
        assert!(digest.starts_with("sha256:"));
        assert_eq!(digest.len(), 7 + 64);
        assert_eq!(
            digest,
            "sha256:b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn test_bundle_manifest_shape() {
        let layers = vec![ImageLayer::new(
            b"archive-bytes".to_vec(),
            BUNDLE_BODY_MEDIA_TYPE.to_string(),
            None,
        )];
        let config = Config::new(
            br#"{"entrypoint":"main.jsonnet"}"#.to_vec(),
            BUNDLE_CONFIG_MEDIA_TYPE.to_string(),
            None,
        );
        let manifest = bundle_manifest(&layers, &config);

        assert_eq!(manifest.schema_version, 2);
        assert_eq!(manifest.config.media_type, BUNDLE_CONFIG_MEDIA_TYPE);
        assert_eq!(manifest.layers.len(), 1);
        assert_eq!(manifest.layers[0].media_type, BUNDLE_BODY_MEDIA_TYPE);
        assert!(manifest.layers[0].digest.starts_with("sha256:"));

        let annotations = manifest.annotations.as_ref().unwrap();
        assert_eq!(
            annotations["org.opencontainers.image.created"],
            "1970-01-01T00:00:00Z"
        );
        assert_eq!(annotations["org.opencontainers.image.source"], "konfig pack");
    }

    #[test]
    fn test_identical_bundles_produce_identical_manifests() {
        let build = || {
            let layers = vec![ImageLayer::new(
                b"same-bytes".to_vec(),
                BUNDLE_BODY_MEDIA_TYPE.to_string(),
                None,
            )];
            let config = Config::new(
                br#"{"entrypoint":"main.jsonnet"}"#.to_vec(),
                BUNDLE_CONFIG_MEDIA_TYPE.to_string(),
                None,
            );
            serde_json::to_string(&bundle_manifest(&layers, &config)).unwrap()
        };
        assert_eq!(build(), build());
    }
}
