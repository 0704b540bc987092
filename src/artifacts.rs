use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::config::DashboardConfig;
use crate::error::ConfigError;
use crate::schema::SCHEMA_VERSION;

/// Contents of `manifest.json`, written when the artifacts are exported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub schema_version: String,
    pub model_sha256: String,
    pub background_sha256: String,
}

/// What [`ArtifactStore::verify`] found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verification {
    /// Digests and schema version match the manifest
    Verified,
    /// No manifest; files exist but were not checked
    Unchecked,
}

/// Resolves and checks the on-disk artifacts.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    model_path: PathBuf,
    background_path: PathBuf,
    manifest_path: PathBuf,
}

impl ArtifactStore {
    pub fn new(config: &DashboardConfig) -> Self {
        Self {
            model_path: config.model_path(),
            background_path: config.background_path(),
            manifest_path: config.manifest_path(),
        }
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    pub fn background_path(&self) -> &Path {
        &self.background_path
    }

    pub fn manifest_path(&self) -> &Path {
        &self.manifest_path
    }

    /// Reads the manifest, or `None` when there is none.
    pub fn manifest(&self) -> Result<Option<Manifest>, ConfigError> {
        if !self.manifest_path.exists() {
            return Ok(None);
        }
        let text = fs::read_to_string(&self.manifest_path)?;
        serde_json::from_str(&text)
            .map(Some)
            .map_err(|e| ConfigError::Invalid {
                what: "artifact manifest".into(),
                path: self.manifest_path.clone(),
                reason: e.to_string(),
            })
    }

    /// Checks that both artifacts exist and, when a manifest is present, that
    /// their digests and the schema version match it.
    pub fn verify(&self) -> Result<Verification, ConfigError> {
        for path in [&self.model_path, &self.background_path] {
            if !path.exists() {
                log::error!("Missing artifact {:?}", path);
                return Err(ConfigError::MissingArtifact(path.clone()));
            }
        }

        let manifest = match self.manifest()? {
            Some(manifest) => manifest,
            None => {
                log::warn!(
                    "No manifest at {:?}, skipping artifact checksum verification",
                    self.manifest_path
                );
                return Ok(Verification::Unchecked);
            }
        };

        if manifest.schema_version != SCHEMA_VERSION {
            return Err(ConfigError::SchemaMismatch(format!(
                "artifacts were built for schema '{}', this build uses '{}'",
                manifest.schema_version, SCHEMA_VERSION
            )));
        }
        verify_file(&self.model_path, &manifest.model_sha256, "model")?;
        verify_file(&self.background_path, &manifest.background_sha256, "background")?;

        log::info!("Artifacts verified against {:?}", self.manifest_path);
        Ok(Verification::Verified)
    }
}

/// Lowercase hex SHA-256 of the file at `path`.
pub fn file_digest(path: &Path) -> Result<String, ConfigError> {
    let bytes = fs::read(path)?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(format!("{:x}", hasher.finalize()))
}

fn verify_file(path: &Path, expected: &str, file_type: &str) -> Result<(), ConfigError> {
    log::debug!("Verifying {} file {:?}", file_type, path);
    let actual = file_digest(path)?;
    if !actual.eq_ignore_ascii_case(expected.trim()) {
        log::error!("{} hash mismatch: expected {}, got {}", file_type, expected, actual);
        return Err(ConfigError::ChecksumMismatch {
            file_type: file_type.to_string(),
            expected: expected.to_string(),
            actual,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_with_files() -> (TempDir, ArtifactStore) {
        let dir = tempfile::tempdir().unwrap();
        let mut config = DashboardConfig::default();
        config.artifacts.dir = Some(dir.path().to_path_buf());
        fs::write(config.model_path(), b"model bytes").unwrap();
        fs::write(config.background_path(), b"background bytes").unwrap();
        let store = ArtifactStore::new(&config);
        (dir, store)
    }

    fn write_manifest(store: &ArtifactStore, manifest: &Manifest) {
        fs::write(store.manifest_path(), serde_json::to_string(manifest).unwrap()).unwrap();
    }

    #[test]
    fn test_digest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty");
        fs::write(&path, b"").unwrap();
        assert_eq!(
            file_digest(&path).unwrap(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_missing_manifest_is_unchecked() {
        let (_dir, store) = store_with_files();
        assert_eq!(store.verify().unwrap(), Verification::Unchecked);
    }

    #[test]
    fn test_missing_artifact() {
        let (_dir, store) = store_with_files();
        fs::remove_file(store.background_path()).unwrap();
        assert!(matches!(store.verify(), Err(ConfigError::MissingArtifact(p)) if p == store.background_path()));
    }

    #[test]
    fn test_missing_model_is_reported_first() {
        let (_dir, store) = store_with_files();
        fs::remove_file(store.model_path()).unwrap();
        fs::remove_file(store.background_path()).unwrap();
        assert!(matches!(store.verify(), Err(ConfigError::MissingArtifact(p)) if p == store.model_path()));
    }

    #[test]
    fn test_matching_manifest() {
        let (_dir, store) = store_with_files();
        let manifest = Manifest {
            schema_version: SCHEMA_VERSION.to_string(),
            model_sha256: file_digest(store.model_path()).unwrap(),
            background_sha256: file_digest(store.background_path()).unwrap().to_uppercase(),
        };
        write_manifest(&store, &manifest);
        assert_eq!(store.verify().unwrap(), Verification::Verified);
    }

    #[test]
    fn test_checksum_mismatch() {
        let (_dir, store) = store_with_files();
        let manifest = Manifest {
            schema_version: SCHEMA_VERSION.to_string(),
            model_sha256: "00".repeat(32),
            background_sha256: file_digest(store.background_path()).unwrap(),
        };
        write_manifest(&store, &manifest);
        match store.verify() {
            Err(ConfigError::ChecksumMismatch { file_type, .. }) => assert_eq!(file_type, "model"),
            other => panic!("expected checksum mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_schema_version_mismatch() {
        let (_dir, store) = store_with_files();
        let manifest = Manifest {
            schema_version: "german-credit-v0".to_string(),
            model_sha256: file_digest(store.model_path()).unwrap(),
            background_sha256: file_digest(store.background_path()).unwrap(),
        };
        write_manifest(&store, &manifest);
        assert!(matches!(store.verify(), Err(ConfigError::SchemaMismatch(_))));
    }

    #[test]
    fn test_malformed_manifest() {
        let (_dir, store) = store_with_files();
        fs::write(store.manifest_path(), "{ not json").unwrap();
        assert!(matches!(store.verify(), Err(ConfigError::Invalid { .. })));
    }
}
