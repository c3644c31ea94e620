//! Registry pull integration tests
//!
//! Mock just enough of the OCI distribution protocol to exercise the
//! bundle reader end to end: manifest resolution, config decode, body
//! extraction, and the resolver-facing import semantics.

use konfig_core::{location, pack, Contents, CoreError, UniversalImporter};
use konfig_oci::{
    sha256_digest, BundleConfig, OciTransport, BUNDLE_BODY_MEDIA_TYPE, BUNDLE_CONFIG_MEDIA_TYPE,
};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MANIFEST_MEDIA_TYPE: &str = "application/vnd.oci.image.manifest.v1+json";

/// Mount manifest + blob routes for one repository serving `body`/`config`.
async fn mount_bundle(server: &MockServer, repository: &str, tag: &str, config: &[u8], body: &[u8]) {
    let config_digest = sha256_digest(config);
    let body_digest = sha256_digest(body);

    let manifest = serde_json::json!({
        "schemaVersion": 2,
        "mediaType": MANIFEST_MEDIA_TYPE,
        "config": {
            "mediaType": BUNDLE_CONFIG_MEDIA_TYPE,
            "digest": config_digest,
            "size": config.len(),
        },
        "layers": [{
            "mediaType": BUNDLE_BODY_MEDIA_TYPE,
            "digest": body_digest,
            "size": body.len(),
        }],
    });
    let manifest_bytes = serde_json::to_vec(&manifest).unwrap();
    let manifest_digest = sha256_digest(&manifest_bytes);

    Mock::given(method("GET"))
        .and(path("/v2/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .mount(server)
        .await;
    for verb in ["GET", "HEAD"] {
        Mock::given(method(verb))
            .and(path(format!("/v2/{repository}/manifests/{tag}")))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("Content-Type", MANIFEST_MEDIA_TYPE)
                    .insert_header("Docker-Content-Digest", manifest_digest.as_str())
                    .set_body_bytes(manifest_bytes.clone()),
            )
            .mount(server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path(format!("/v2/{repository}/blobs/{config_digest}")))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(config.to_vec()))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/v2/{repository}/blobs/{body_digest}")))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.to_vec()))
        .mount(server)
        .await;
}

fn registry_host(server: &MockServer) -> String {
    server.uri().trim_start_matches("http://").to_string()
}

fn importer_with_oci() -> UniversalImporter {
    let mut importer = UniversalImporter::new(vec![], false);
    importer.register_transport("oci", Box::new(OciTransport::insecure()));
    importer
}

/// Package a local program, serve it from the mock registry, and check
/// round-trip fidelity: the bundle root resolves to an entrypoint import
/// and every inner file is byte-identical to its local original.
#[tokio::test]
async fn test_published_bundle_round_trip() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("main.jsonnet"),
        "local lib = import 'lib.libsonnet'; { app: lib.name }",
    )
    .unwrap();
    std::fs::write(dir.path().join("lib.libsonnet"), "{ name: 'guestbook' }").unwrap();

    // Pack the closure the same way `konfig pack` would.
    let mut local = UniversalImporter::new(vec![], false);
    let root = location::path_to_url(&dir.path().join("main.jsonnet")).unwrap();
    let bundle = pack::bundle_dependencies(&mut local, &root).await.unwrap();
    assert_eq!(bundle.entrypoint, "main.jsonnet");

    let config = serde_json::to_vec(&BundleConfig {
        entrypoint: bundle.entrypoint.clone(),
        metadata: Some(pack::bundle_metadata(None)),
    })
    .unwrap();

    let server = MockServer::start().await;
    mount_bundle(&server, "demo/guestbook", "v1", &config, &bundle.body).await;
    let host = registry_host(&server);

    let mut importer = importer_with_oci();

    // Bundle root: synthesized entrypoint import, found at the normalized
    // (trailing-slash) bundle URL.
    let root_ref = format!("oci://{host}/demo/guestbook:v1");
    let resolved = importer.resolve(".", &root_ref, false).await.unwrap();
    assert_eq!(
        resolved.contents.as_text(),
        Some("import \"main.jsonnet\"")
    );
    assert_eq!(resolved.found_at, format!("{root_ref}/"));

    // The entrypoint import the evaluator would issue next.
    let entry = importer
        .resolve(&resolved.found_at, "main.jsonnet", false)
        .await
        .unwrap();
    let local_main = std::fs::read(dir.path().join("main.jsonnet")).unwrap();
    assert_eq!(entry.contents.as_bytes(), local_main.as_slice());

    // A nested relative import resolves inside the same bundle and is
    // byte-identical to the original file.
    let nested = importer
        .resolve(&entry.found_at, "lib.libsonnet", false)
        .await
        .unwrap();
    let local_lib = std::fs::read(dir.path().join("lib.libsonnet")).unwrap();
    assert_eq!(nested.contents.as_bytes(), local_lib.as_slice());
    assert_eq!(nested.found_at, format!("{root_ref}/lib.libsonnet"));
}

/// One bundle serves many files: the registry is hit once per package
/// reference, not once per file.
#[tokio::test]
async fn test_bundle_fetched_once_per_reference() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("a.jsonnet"), "{ a: 1 }").unwrap();
    std::fs::write(dir.path().join("b.jsonnet"), "{ b: 2 }").unwrap();

    std::fs::write(
        dir.path().join("root.jsonnet"),
        "[import 'a.jsonnet', import 'b.jsonnet']",
    )
    .unwrap();

    let mut local = UniversalImporter::new(vec![], false);
    let root = location::path_to_url(&dir.path().join("root.jsonnet")).unwrap();
    let bundle = pack::bundle_dependencies(&mut local, &root).await.unwrap();

    let config = serde_json::to_vec(&BundleConfig {
        entrypoint: bundle.entrypoint.clone(),
        metadata: None,
    })
    .unwrap();

    let server = MockServer::start().await;
    mount_bundle(&server, "demo/multi", "v2", &config, &bundle.body).await;
    let host = registry_host(&server);

    let mut importer = importer_with_oci();
    let base = format!("oci://{host}/demo/multi:v2/");
    let a = importer.resolve(".", &format!("{base}a.jsonnet"), false).await.unwrap();
    let b = importer.resolve(".", &format!("{base}b.jsonnet"), false).await.unwrap();
    assert_eq!(a.contents.as_text(), Some("{ a: 1 }"));
    assert_eq!(b.contents.as_text(), Some("{ b: 2 }"));

    let manifest_requests = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.url.path().contains("/manifests/"))
        .count();
    assert_eq!(manifest_requests, 1);
}

/// A path miss inside a found bundle is a soft not-found, surfaced as the
/// aggregated candidates error.
#[tokio::test]
async fn test_inner_path_miss() {
    let server = MockServer::start().await;
    let body = {
        // Minimal one-file bundle.
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("main.jsonnet"), "{}").unwrap();
        let mut local = UniversalImporter::new(vec![], false);
        let root = location::path_to_url(&dir.path().join("main.jsonnet")).unwrap();
        pack::bundle_dependencies(&mut local, &root).await.unwrap().body
    };
    let config =
        serde_json::to_vec(&BundleConfig { entrypoint: "main.jsonnet".into(), metadata: None })
            .unwrap();
    mount_bundle(&server, "demo/tiny", "v1", &config, &body).await;
    let host = registry_host(&server);

    let mut importer = importer_with_oci();
    let err = importer
        .resolve(".", &format!("oci://{host}/demo/tiny:v1/absent.jsonnet"), false)
        .await
        .unwrap_err();
    match err {
        CoreError::ImportNotFound { tried, .. } => {
            assert_eq!(tried, vec![format!("oci://{host}/demo/tiny:v1/absent.jsonnet")]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

/// Importing the root of a bundle whose config has an empty entrypoint must
/// fail rather than loop on a self-import.
#[tokio::test]
async fn test_empty_entrypoint_guard() {
    let server = MockServer::start().await;
    let body = {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("main.jsonnet"), "{}").unwrap();
        let mut local = UniversalImporter::new(vec![], false);
        let root = location::path_to_url(&dir.path().join("main.jsonnet")).unwrap();
        pack::bundle_dependencies(&mut local, &root).await.unwrap().body
    };
    let config =
        serde_json::to_vec(&BundleConfig { entrypoint: String::new(), metadata: None }).unwrap();
    mount_bundle(&server, "demo/rootless", "v1", &config, &body).await;
    let host = registry_host(&server);

    let mut importer = importer_with_oci();
    let err = importer
        .resolve(".", &format!("oci://{host}/demo/rootless:v1"), false)
        .await
        .unwrap_err();
    match err {
        CoreError::TransportFailed { message, .. } => {
            assert!(message.contains("entrypoint"), "message: {message}");
        }
        other => panic!("unexpected error: {other}"),
    }
}

/// Binary imports of bundle files go through the same transport but land
/// in a distinct cache entry with raw bytes.
#[tokio::test]
async fn test_binary_import_from_bundle() {
    let server = MockServer::start().await;
    let (body, payload) = {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("main.jsonnet"), "importbin 'blob.bin'").unwrap();
        std::fs::write(dir.path().join("blob.bin"), b"raw-bytes").unwrap();
        let mut local = UniversalImporter::new(vec![], false);
        let root = location::path_to_url(&dir.path().join("main.jsonnet")).unwrap();
        let bundle = pack::bundle_dependencies(&mut local, &root).await.unwrap();
        (bundle.body, b"raw-bytes".to_vec())
    };
    let config =
        serde_json::to_vec(&BundleConfig { entrypoint: "main.jsonnet".into(), metadata: None })
            .unwrap();
    mount_bundle(&server, "demo/blobby", "v3", &config, &body).await;
    let host = registry_host(&server);

    let mut importer = importer_with_oci();
    let resolved = importer
        .resolve(".", &format!("oci://{host}/demo/blobby:v3/blob.bin"), true)
        .await
        .unwrap();
    assert_eq!(resolved.contents, Contents::Binary(payload));
    assert!(resolved.found_at.ends_with("##binaryImport"));
}
