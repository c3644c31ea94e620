//! Locations: absolute, scheme-qualified addresses for importable content
//!
//! Every import is identified by a `url::Url`. Local paths given on the
//! command line are turned into `file://` URLs before they enter the
//! resolver; everything downstream only ever sees URLs.

use std::path::Path;

use percent_encoding::{percent_encode, AsciiSet, CONTROLS};
use url::Url;

use crate::error::{CoreError, Result};

/// Schemes recognized in import strings and on the command line.
const URL_PREFIXES: &[&str] = &[
    "http://",
    "https://",
    "oci://",
    "file://",
    "internal://",
    "kustomize+https://",
    "data:,",
];

/// Returns true if the string already looks like a URL rather than a path.
pub fn is_url(s: &str) -> bool {
    URL_PREFIXES.iter().any(|p| s.starts_with(p))
}

/// Turn a command-line path-or-URL into an absolute URL.
///
/// Paths are absolutized against the current working directory.
pub fn to_url(path_or_url: &str) -> Result<Url> {
    if is_url(path_or_url) {
        return Url::parse(path_or_url).map_err(|e| CoreError::InvalidUrl {
            url: path_or_url.to_string(),
            reason: e.to_string(),
        });
    }
    path_to_url(Path::new(path_or_url))
}

/// Turn a filesystem path into a `file://` URL.
pub fn path_to_url(path: &Path) -> Result<Url> {
    let abs = std::path::absolute(path)?;
    Url::from_file_path(&abs).map_err(|_| CoreError::InvalidUrl {
        url: abs.display().to_string(),
        reason: "not representable as a file URL".to_string(),
    })
}

/// The current working directory as a directory URL (trailing slash).
///
/// Used as the synthetic found-at location for `data:,` literals so that
/// relative imports inside a literal resolve against the invoking directory.
pub fn cwd_url() -> Result<Url> {
    let cwd = std::env::current_dir()?;
    Url::from_directory_path(&cwd).map_err(|_| CoreError::InvalidUrl {
        url: cwd.display().to_string(),
        reason: "not representable as a file URL".to_string(),
    })
}

// Percent-encode everything a data URL cannot carry verbatim.
const DATA_ESCAPES: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Wrap literal source text into a `data:,` URL.
pub fn to_data_url(code: &str) -> String {
    format!("data:,{}", percent_encode(code.as_bytes(), DATA_ESCAPES))
}
