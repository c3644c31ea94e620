//! Transport capability: one handler per URL scheme
//!
//! The resolver keeps a table of scheme → transport. Each transport turns a
//! fully resolved location into bytes or a not-found signal; anything else
//! it reports is fatal to the whole resolve call.

use async_trait::async_trait;
use url::Url;

use crate::error::Result;

/// Outcome of a single transport fetch.
#[derive(Debug)]
pub enum Fetched {
    /// This candidate has no content; the resolver moves on to the next one.
    NotFound,
    /// Content was found.
    Content {
        body: Vec<u8>,
        /// Found-at override. `None` means the candidate URL itself is the
        /// location the content was found at (the common case). The data
        /// transport reports the working directory here so nested relative
        /// imports inside a literal resolve sensibly.
        found_at: Option<Url>,
    },
}

impl Fetched {
    /// Content at the candidate location itself.
    pub fn content(body: Vec<u8>) -> Self {
        Fetched::Content {
            body,
            found_at: None,
        }
    }
}

/// A protocol handler for one (or more) URL schemes.
#[async_trait]
pub trait Transport: Send {
    /// Canonicalize a candidate URL before cache lookup and fetch.
    ///
    /// The registry transport uses this to append a trailing slash to
    /// package references without an inner path, so relative imports inside
    /// the bundle resolve against the bundle root.
    fn normalize(&self, url: Url) -> Url {
        url
    }

    /// Fetch the content at `url`.
    ///
    /// Errors are fatal to the resolve call; a missing resource must be
    /// reported as `Fetched::NotFound` so the resolver can try the next
    /// candidate.
    async fn fetch(&mut self, url: &Url) -> Result<Fetched>;
}
