//! Process-lifetime content cache
//!
//! Keyed by the exact candidate URL string. Binary imports get a
//! distinguishing key suffix: the same location imported once as text and
//! once as binary yields two independent entries, never each other's value.
//! Entries are never evicted; the cache lives and dies with one resolver.

use std::collections::HashMap;

use crate::resolver::Resolved;

const BINARY_KEY_SUFFIX: &str = "##binaryImport";

/// Compute the cache key for a candidate URL.
pub fn cache_key(url: &str, binary: bool) -> String {
    if binary {
        format!("{url}{BINARY_KEY_SUFFIX}")
    } else {
        url.to_string()
    }
}

/// Strip the binary-import marker from a found-at string, if present.
pub fn strip_binary_suffix(found_at: &str) -> &str {
    found_at.strip_suffix(BINARY_KEY_SUFFIX).unwrap_or(found_at)
}

/// Resolved-content cache owned by a single resolver instance.
///
/// Unsynchronized on purpose: the resolver is driven from one evaluation
/// session at a time, and sessions that need fresh content must construct a
/// fresh resolver rather than share this map.
#[derive(Debug, Default)]
pub struct ContentCache {
    entries: HashMap<String, Resolved>,
}

impl ContentCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Resolved> {
        self.entries.get(key)
    }

    pub fn insert(&mut self, key: String, resolved: Resolved) {
        self.entries.insert(key, resolved);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_suffix() {
        assert_eq!(cache_key("file:///a.tgz", false), "file:///a.tgz");
        assert_eq!(cache_key("file:///a.tgz", true), "file:///a.tgz##binaryImport");
    }

    #[test]
    fn test_strip_binary_suffix() {
        assert_eq!(strip_binary_suffix("file:///a.tgz##binaryImport"), "file:///a.tgz");
        assert_eq!(strip_binary_suffix("file:///a.tgz"), "file:///a.tgz");
    }
}
