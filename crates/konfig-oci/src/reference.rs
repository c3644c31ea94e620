//! Bundle URL handling
//!
//! An `oci://` import location encodes `<packageRef>[/<innerPath>]`, where
//! packageRef is `host/repository` plus a `:tag`, an `@digest`, or both.
//! The tag/digest delimiters must not be mistaken for the inner-path
//! separator: the inner path starts at the first `/` after the
//! tag-or-digest component.

use url::Url;

/// Split a bundle URL into (package reference, inner path).
///
/// The package reference comes back without the `oci://` prefix, ready to
/// hand to the registry client; the inner path is empty for bundle-root
/// references.
pub fn split(url: &Url) -> (String, String) {
    let after_tag = url.path().split_once(':').map(|(_, a)| a).unwrap_or("");
    let inner = after_tag.split_once('/').map(|(_, p)| p).unwrap_or("");

    let full = url.as_str();
    let trimmed = full.strip_suffix(&format!("/{inner}")).unwrap_or(full);
    let base = trimmed.strip_prefix("oci://").unwrap_or(trimmed).to_string();
    (base, inner.to_string())
}

/// Append a trailing slash to a bundle URL that has no inner path.
///
/// Relative imports inside a bundle resolve against the bundle URL; without
/// the trailing slash, `import "x"` from `oci://host/pkg:v1` would resolve
/// next to `pkg:v1` instead of inside it.
pub fn normalize(url: &Url) -> Url {
    let after_tag = url.path().split_once(':').map(|(_, a)| a).unwrap_or("");
    if after_tag.contains('/') {
        return url.clone();
    }
    let mut normalized = url.clone();
    normalized.set_path(&format!("{}/", url.path()));
    normalized
}
