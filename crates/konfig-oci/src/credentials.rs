//! Registry credentials from the docker credential store
//!
//! Reads `~/.docker/config.json` (or `$DOCKER_CONFIG/config.json`). No
//! custom credential format: whatever `docker login` wrote is what gets
//! used, with anonymous access as the fallback.

use std::collections::HashMap;
use std::path::PathBuf;

use base64::Engine;
use oci_distribution::secrets::RegistryAuth;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
struct DockerConfigFile {
    #[serde(default)]
    auths: HashMap<String, DockerAuthEntry>,
}

#[derive(Debug, Default, Deserialize)]
struct DockerAuthEntry {
    auth: Option<String>,
    username: Option<String>,
    password: Option<String>,
}

/// Resolve credentials for `registry` from the local docker config.
pub fn registry_auth(registry: &str) -> RegistryAuth {
    match config_path() {
        Some(path) => auth_from_file(&path, registry),
        None => RegistryAuth::Anonymous,
    }
}

fn config_path() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var("DOCKER_CONFIG") {
        return Some(PathBuf::from(dir).join("config.json"));
    }
    dirs::home_dir().map(|home| home.join(".docker").join("config.json"))
}

fn auth_from_file(path: &std::path::Path, registry: &str) -> RegistryAuth {
    let raw = match std::fs::read(path) {
        Ok(raw) => raw,
        Err(_) => return RegistryAuth::Anonymous,
    };
    let config: DockerConfigFile = match serde_json::from_slice(&raw) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!("unreadable docker config {}: {}", path.display(), e);
            return RegistryAuth::Anonymous;
        }
    };

    let entry = config
        .auths
        .iter()
        .find(|(host, _)| host_matches(host, registry))
        .map(|(_, entry)| entry);
    match entry {
        Some(entry) => resolve_entry(entry),
        None => RegistryAuth::Anonymous,
    }
}

fn resolve_entry(entry: &DockerAuthEntry) -> RegistryAuth {
    if let Some(auth) = &entry.auth {
        if let Ok(decoded) = base64::engine::general_purpose::STANDARD.decode(auth) {
            if let Ok(credentials) = String::from_utf8(decoded) {
                if let Some((user, pass)) = credentials.split_once(':') {
                    return RegistryAuth::Basic(user.to_string(), pass.to_string());
                }
            }
        }
        tracing::warn!("ignoring malformed auth entry in docker config");
        return RegistryAuth::Anonymous;
    }
    if let (Some(user), Some(pass)) = (&entry.username, &entry.password) {
        return RegistryAuth::Basic(user.clone(), pass.clone());
    }
    RegistryAuth::Anonymous
}

/// Match a docker config key (`ghcr.io`, `https://index.docker.io/v1/`)
/// against a bare registry host.
fn host_matches(key: &str, registry: &str) -> bool {
    if key == registry {
        return true;
    }
    let stripped = key
        .strip_prefix("https://")
        .or_else(|| key.strip_prefix("http://"))
        .unwrap_or(key);
    let host = stripped.split('/').next().unwrap_or(stripped);
    host == registry
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn write_config(dir: &TempDir, body: &str) -> PathBuf {
        let path = dir.path().join("config.json");
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_basic_auth_from_auth_field() {
        let dir = TempDir::new().unwrap();
        let encoded = base64::engine::general_purpose::STANDARD.encode("alice:s3cret");
        let path = write_config(
            &dir,
            &format!(r#"{{"auths": {{"ghcr.io": {{"auth": "{encoded}"}}}}}}"#),
        );
        match auth_from_file(&path, "ghcr.io") {
            RegistryAuth::Basic(user, pass) => {
                assert_eq!(user, "alice");
                assert_eq!(pass, "s3cret");
            }
            _ => panic!("expected basic auth"),
        }
    }

    #[test]
    fn test_docker_hub_style_key() {
        let dir = TempDir::new().unwrap();
        let encoded = base64::engine::general_purpose::STANDARD.encode("bob:hunter2");
        let path = write_config(
            &dir,
            &format!(r#"{{"auths": {{"https://index.docker.io/v1/": {{"auth": "{encoded}"}}}}}}"#),
        );
        assert!(matches!(
            auth_from_file(&path, "index.docker.io"),
            RegistryAuth::Basic(_, _)
        ));
    }

    #[test]
    fn test_unknown_registry_is_anonymous() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, r#"{"auths": {}}"#);
        assert!(matches!(
            auth_from_file(&path, "gcr.io"),
            RegistryAuth::Anonymous
        ));
    }

    #[test]
    fn test_missing_or_garbage_config_is_anonymous() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            auth_from_file(&dir.path().join("absent.json"), "gcr.io"),
            RegistryAuth::Anonymous
        ));
        let path = write_config(&dir, "not json");
        assert!(matches!(
            auth_from_file(&path, "gcr.io"),
            RegistryAuth::Anonymous
        ));
    }
}
