//! Konfig Core - import resolution and bundle packaging
//!
//! This crate provides the import machinery behind Konfig, the declarative
//! Kubernetes configuration tool:
//!
//! - **Universal resolver**: one entry point for every import statement,
//!   with an ordered search path and a session-lifetime content cache
//! - **Transports**: local files, HTTP(S), the embedded stdlib, inline
//!   `data:,` literals, and an alpha kustomize passthrough; the OCI bundle
//!   transport plugs in from `konfig-oci`
//! - **Dependency closure**: a pre-evaluation walk of everything a root
//!   program transitively imports
//! - **Bundle packaging**: the closure serialized as a deterministic
//!   tar+gzip archive with common-prefix-stripped entry names
//!
//! ## Concurrency contract
//!
//! A `UniversalImporter` is owned by exactly one evaluation session. Its
//! caches are unsynchronized and never invalidated; concurrent sessions
//! must each construct their own resolver rather than share one behind a
//! lock, which would only trade a data race for cross-session staleness.

pub mod cache;
pub mod candidates;
pub mod deps;
pub mod error;
pub mod location;
pub mod pack;
pub mod resolver;
pub mod transport;
pub mod transports;

pub use cache::ContentCache;
pub use deps::{find_dependencies, scan_imports, ImportKind, ImportStatement};
pub use error::{CoreError, Result};
pub use pack::{bundle_dependencies, bundle_metadata, PackedBundle, PACK_METADATA_KEY};
pub use resolver::{Contents, Resolved, UniversalImporter};
pub use transport::{Fetched, Transport};
