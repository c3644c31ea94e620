//! Candidate expansion for import resolution
//!
//! Pure step: no I/O happens here. Given the referring location and an
//! import string, produce the ordered list of absolute locations the
//! resolver will try.

use url::Url;

use crate::error::{CoreError, Result};

/// Expand an import string into an ordered list of candidate URLs.
///
/// An import that parses as an absolute URL bypasses the search path
/// entirely and is the sole candidate. A relative import resolves first
/// against the referring location, then against every search path entry in
/// configured order. Search path entries denote directories and must carry a
/// trailing slash for relative resolution to behave.
pub fn expand(imported_from: &str, imported_path: &str, search_urls: &[Url]) -> Result<Vec<Url>> {
    match Url::parse(imported_path) {
        Ok(absolute) => return Ok(vec![absolute]),
        Err(url::ParseError::RelativeUrlWithoutBase) => {}
        Err(e) => {
            return Err(CoreError::InvalidUrl {
                url: imported_path.to_string(),
                reason: e.to_string(),
            });
        }
    }

    let base = Url::parse(imported_from).map_err(|e| CoreError::InvalidUrl {
        url: imported_from.to_string(),
        reason: format!("invalid import dir: {e}"),
    })?;

    let mut candidates = Vec::with_capacity(search_urls.len() + 1);
    candidates.push(join(&base, imported_path)?);
    for search_url in search_urls {
        candidates.push(join(search_url, imported_path)?);
    }
    Ok(candidates)
}

fn join(base: &Url, relative: &str) -> Result<Url> {
    base.join(relative).map_err(|e| CoreError::InvalidUrl {
        url: relative.to_string(),
        reason: format!("cannot resolve against {base}: {e}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn search(urls: &[&str]) -> Vec<Url> {
        urls.iter().map(|u| Url::parse(u).unwrap()).collect()
    }

    #[test]
    fn test_relative_import_ordering() {
        let candidates = expand(
            "file:///a/b/c.ext",
            "d.ext",
            &search(&["file:///lib/"]),
        )
        .unwrap();
        let got: Vec<_> = candidates.iter().map(Url::as_str).collect();
        assert_eq!(got, vec!["file:///a/b/d.ext", "file:///lib/d.ext"]);
    }

    #[test]
    fn test_absolute_import_bypasses_search_path() {
        let candidates = expand(
            "file:///a/b/c.ext",
            "https://x/y.ext",
            &search(&["file:///lib/", "https://mirror.example.com/vendor/"]),
        )
        .unwrap();
        let got: Vec<_> = candidates.iter().map(Url::as_str).collect();
        assert_eq!(got, vec!["https://x/y.ext"]);
    }

    #[test]
    fn test_parent_segments_collapse() {
        let candidates = expand("file:///a/b/c.ext", "../d.ext", &[]).unwrap();
        assert_eq!(candidates[0].as_str(), "file:///a/d.ext");
    }

    #[test]
    fn test_search_path_order_is_preserved() {
        let candidates = expand(
            "https://example.com/app/main.jsonnet",
            "k.libsonnet",
            &search(&["file:///first/", "file:///second/", "internal:///"]),
        )
        .unwrap();
        let got: Vec<_> = candidates.iter().map(Url::as_str).collect();
        assert_eq!(
            got,
            vec![
                "https://example.com/app/k.libsonnet",
                "file:///first/k.libsonnet",
                "file:///second/k.libsonnet",
                "internal:///k.libsonnet",
            ]
        );
    }

    #[test]
    fn test_invalid_referrer_is_an_error() {
        let err = expand("not a url", "d.ext", &[]).unwrap_err();
        assert!(matches!(err, CoreError::InvalidUrl { .. }));
    }
}
