//! Universal import resolver
//!
//! The single entry point the evaluator calls for every import statement.
//! Orchestrates candidate expansion, the scheme → transport table, and the
//! process-lifetime content cache.
//!
//! A real-world example:
//! - `https://raw.githubusercontent.com/ksonnet/ksonnet-lib/master` is on
//!   your search path.
//! - A local file evaluates `import "ksonnet.beta.2/k.libsonnet"`.
//! - If the file is not found next to the importing file, the search path is
//!   followed and the library is downloaded from the raw URL.
//! - The downloaded `k.libsonnet` in turn contains `import "k8s.libsonnet"`,
//!   which resolves relative to where the first file was actually found and
//!   is downloaded from the same tree.

use std::collections::HashMap;

use url::Url;

use crate::cache::{cache_key, ContentCache};
use crate::candidates;
use crate::error::{CoreError, Result};
use crate::transport::{Fetched, Transport};
use crate::transports::{
    DataTransport, FileTransport, HttpTransport, InternalTransport, KustomizeTransport,
};

/// Resolved import payload.
///
/// Binary imports carry raw bytes; text imports are validated UTF-8. The
/// artifact formats downstream (tar+gzip bundles) are unaffected by this
/// in-process representation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Contents {
    Text(String),
    Binary(Vec<u8>),
}

impl Contents {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Contents::Text(s) => s.as_bytes(),
            Contents::Binary(b) => b,
        }
    }

    /// Text payload, if this is a text import.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Contents::Text(s) => Some(s),
            Contents::Binary(_) => None,
        }
    }
}

/// Content plus the location it was found at.
///
/// The evaluator re-enters the resolver with `found_at` as the referring
/// location for every nested import discovered inside `contents`.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub contents: Contents,
    pub found_at: String,
}

/// Multi-transport import resolver with an ordered search path and a
/// process-lifetime cache.
///
/// One instance per evaluation session: the caches are unsynchronized and
/// never invalidated, so sessions that must observe fresh content construct
/// a new resolver instead of reusing this one.
pub struct UniversalImporter {
    search_urls: Vec<Url>,
    transports: HashMap<String, Box<dyn Transport>>,
    cache: ContentCache,
    alpha: bool,
}

impl UniversalImporter {
    /// Create a resolver with the built-in transports registered.
    ///
    /// `search_urls` entries denote directory-like bases and are consulted
    /// in order after the referring file's own directory. `alpha` unlocks
    /// experimental import forms (`binary://`, `kustomize+https://`).
    pub fn new(search_urls: Vec<Url>, alpha: bool) -> Self {
        let mut importer = Self {
            search_urls,
            transports: HashMap::new(),
            cache: ContentCache::new(),
            alpha,
        };
        importer.register_transport("file", Box::new(FileTransport::new()));
        let http = HttpTransport::new();
        importer.register_transport("http", Box::new(http.clone()));
        importer.register_transport("https", Box::new(http));
        importer.register_transport("internal", Box::new(InternalTransport::new()));
        importer.register_transport("data", Box::new(DataTransport::new()));
        importer.register_transport("kustomize+https", Box::new(KustomizeTransport::new(alpha)));
        importer
    }

    /// Register (or replace) the transport handling `scheme`.
    pub fn register_transport(&mut self, scheme: &str, transport: Box<dyn Transport>) {
        self.transports.insert(scheme.to_string(), transport);
    }

    pub fn alpha(&self) -> bool {
        self.alpha
    }

    pub fn search_urls(&self) -> &[Url] {
        &self.search_urls
    }

    /// Resolve one import statement.
    ///
    /// `imported_from` is the found-at location of the importing file;
    /// `imported_path` is the literal import string; `binary` selects a raw
    /// byte import (`importbin`) over a UTF-8 text import.
    pub async fn resolve(
        &mut self,
        imported_from: &str,
        imported_path: &str,
        binary: bool,
    ) -> Result<Resolved> {
        tracing::debug!("importing {:?} from {:?}", imported_path, imported_from);

        let mut binary = binary;
        let mut imported_path = imported_path;
        if let Some(stripped) = imported_path.strip_prefix("binary://") {
            if !self.alpha {
                return Err(CoreError::BinaryImportNotEnabled);
            }
            tracing::warn!(
                "`import 'binary://file.tgz'` is deprecated, use `importbin './file.tgz'` instead"
            );
            binary = true;
            imported_path = stripped;
        }

        let candidates = candidates::expand(imported_from, imported_path, &self.search_urls)?;

        let mut tried = Vec::new();
        for candidate in candidates {
            let scheme = candidate.scheme().to_string();
            let transport =
                self.transports
                    .get_mut(&scheme)
                    .ok_or_else(|| CoreError::UnsupportedScheme {
                        url: candidate.to_string(),
                        scheme: scheme.clone(),
                    })?;
            let candidate = transport.normalize(candidate);

            let key = cache_key(candidate.as_str(), binary);
            if let Some(hit) = self.cache.get(&key) {
                return Ok(hit.clone());
            }

            tried.push(key.clone());
            match transport.fetch(&candidate).await? {
                Fetched::NotFound => continue,
                Fetched::Content { body, found_at } => {
                    let contents = if binary {
                        Contents::Binary(body)
                    } else {
                        let text = String::from_utf8(body).map_err(|_| {
                            CoreError::NonUtf8Import {
                                url: candidate.to_string(),
                            }
                        })?;
                        Contents::Text(text)
                    };
                    let found_at = match found_at {
                        Some(url) => url.to_string(),
                        None => key.clone(),
                    };
                    let resolved = Resolved { contents, found_at };
                    self.cache.insert(key, resolved.clone());
                    return Ok(resolved);
                }
            }
        }

        Err(CoreError::ImportNotFound {
            import: imported_path.to_string(),
            tried,
        })
    }

    /// Number of cached entries, mostly useful for diagnostics.
    pub fn cached_imports(&self) -> usize {
        self.cache.len()
    }
}
