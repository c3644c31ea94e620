//! Konfig OCI - bundle distribution over OCI registries
//!
//! This crate moves packaged configuration bundles through OCI-compliant
//! registries:
//!
//! - **Publisher**: pushes a bundle body + config record as
//!   content-addressable blobs behind a schema-version-2 manifest
//! - **Registry bundle reader**: an `oci://` transport for the resolver
//!   that pulls a published bundle once and serves its files from memory
//! - **Reference handling**: `oci://host/repo:tag[/inner/path]` splitting
//!   and normalization, with `:`/`@` tag and digest delimiters kept apart
//!   from the inner-path separator
//! - **Credentials**: docker `config.json`, anonymous fallback
//!
//! A bundle is wire-compatible with any generic registry client: the
//! custom media types keep it from being mistaken for a container image.

pub mod bundle;
pub mod credentials;
pub mod error;
pub mod publish;
pub mod reference;
pub mod transport;

pub use bundle::{Bundle, BundleConfig, BUNDLE_BODY_MEDIA_TYPE, BUNDLE_CONFIG_MEDIA_TYPE};
pub use error::{OciError, Result};
pub use publish::{sha256_digest, PushedBundle, Publisher};
pub use transport::OciTransport;
