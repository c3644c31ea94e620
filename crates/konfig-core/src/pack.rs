//! Bundle packaging
//!
//! Turns a root program's transitive import closure into a portable
//! tar+gzip archive plus the entrypoint name the registry config record
//! carries. Archive entry names strip the longest common directory prefix
//! shared by the whole closure.

use flate2::write::GzEncoder;
use flate2::Compression;
use tar::{Builder, Header};
use url::Url;

use crate::deps::find_dependencies;
use crate::error::{CoreError, Result};
use crate::resolver::UniversalImporter;

/// Key under which the packing tool records its identity in bundle metadata.
pub const PACK_METADATA_KEY: &str = "pack.konfig.dev/v1alpha1";

/// A packaged closure: raw archive bytes plus the entrypoint's
/// archive-relative name.
#[derive(Debug, Clone)]
pub struct PackedBundle {
    pub body: Vec<u8>,
    pub entrypoint: String,
}

/// Package `root` and every location transitively imported from it.
///
/// Closure members are re-resolved through `importer`, so the archived
/// bytes are exactly the bytes evaluation would consume (and resolutions
/// are served from the session cache where evaluation already ran).
pub async fn bundle_dependencies(
    importer: &mut UniversalImporter,
    root: &Url,
) -> Result<PackedBundle> {
    let urls = closure(importer, root).await?;
    let paths: Vec<&str> = urls.iter().map(Url::path).collect();
    let (names, entrypoint) = short_names(&paths, root.path());

    let encoder = GzEncoder::new(Vec::new(), Compression::default());
    let mut builder = Builder::new(encoder);
    for (url, name) in urls.iter().zip(&names) {
        // Binary-mode resolve: raw bytes, byte-for-byte what was imported.
        let resolved = importer.resolve(".", url.as_str(), true).await?;
        append_bytes(&mut builder, name, resolved.contents.as_bytes())?;
    }
    let encoder = builder.into_inner()?;
    let body = encoder.finish()?;

    Ok(PackedBundle { body, entrypoint })
}

/// The sorted packaging closure: transitive dependencies plus the root.
///
/// Embedded stdlib locations are dropped (always available to any
/// consumer); anything that is not a local file cannot be captured in a
/// self-contained archive and is a hard error.
async fn closure(importer: &mut UniversalImporter, root: &Url) -> Result<Vec<Url>> {
    let deps = find_dependencies(importer, std::slice::from_ref(root)).await?;

    let mut urls = Vec::with_capacity(deps.len() + 1);
    for url in deps {
        match url.scheme() {
            "internal" => continue,
            "file" => urls.push(url),
            _ => {
                return Err(CoreError::UnbundlableScheme {
                    url: url.to_string(),
                })
            }
        }
    }
    urls.push(root.clone());
    urls.sort_by(|a, b| a.as_str().cmp(b.as_str()));
    urls.dedup();
    Ok(urls)
}

/// Strip the common directory prefix from every closure path; returns the
/// stripped names (same order as `paths`) and the root's stripped name.
fn short_names(paths: &[&str], root_path: &str) -> (Vec<String>, String) {
    let prefix = common_path_prefix(paths);
    let names = paths
        .iter()
        .map(|p| p.strip_prefix(&prefix).unwrap_or(p).to_string())
        .collect();
    let entrypoint = root_path
        .strip_prefix(&prefix)
        .unwrap_or(root_path)
        .to_string();
    (names, entrypoint)
}

/// Common directory part shared by `paths` (sorted), trailing `/` included.
///
/// A single-path closure uses the path's own containing directory, even
/// though the multi-path case computes the longest shared directory;
/// downstream tooling depends on the existing naming.
fn common_path_prefix(paths: &[&str]) -> String {
    match paths {
        [] => String::new(),
        [only] => {
            let dir = match only.rfind('/') {
                Some(i) => &only[..i],
                None => "",
            };
            format!("{dir}/")
        }
        _ => {
            let first = paths[0].as_bytes();
            let last = paths[paths.len() - 1].as_bytes();
            let mut last_slash = 0;
            for i in 0..first.len().min(last.len()) {
                if first[i] == b'/' {
                    last_slash = i;
                }
                if first[i] != last[i] {
                    break;
                }
            }
            paths[0][..=last_slash].to_string()
        }
    }
}

fn append_bytes<W: std::io::Write>(
    builder: &mut Builder<W>,
    name: &str,
    content: &[u8],
) -> Result<()> {
    let mut header = Header::new_gnu();
    header.set_size(content.len() as u64);
    header.set_mode(0o644);
    header.set_mtime(0); // Reproducible builds: use epoch time
    header.set_cksum();
    builder.append_data(&mut header, name, content)?;
    Ok(())
}

/// Default bundle metadata: the packing tool's identity and version.
pub fn default_metadata() -> serde_json::Value {
    serde_json::json!({
        PACK_METADATA_KEY: { "version": env!("CARGO_PKG_VERSION") }
    })
}

/// Merge an optional program-contributed metadata object over the default.
/// Top-level fields from the program win.
pub fn bundle_metadata(program_metadata: Option<serde_json::Value>) -> serde_json::Value {
    let mut base = default_metadata();
    if let (serde_json::Value::Object(map), Some(serde_json::Value::Object(extra))) =
        (&mut base, program_metadata)
    {
        for (key, value) in extra {
            map.insert(key, value);
        }
    }
    base
}
