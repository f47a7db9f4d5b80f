//! Manifest loading and persistence
//!
//! This module provides:
//! - ManifestStore bound to a project directory
//! - Dry-run mode support (no actual file modifications)
//! - A single full rewrite of package.json per run

use crate::error::ManifestError;
use crate::manifest::Manifest;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// File name of the project manifest
pub const MANIFEST_FILENAME: &str = "package.json";

/// Reads and writes the package.json of one project
#[derive(Debug, Clone)]
pub struct ManifestStore {
    /// Path to package.json
    path: PathBuf,
    /// Whether to run in dry-run mode (no file modifications)
    dry_run: bool,
}

impl ManifestStore {
    /// Create a store for `<project_dir>/package.json`
    pub fn new(project_dir: &Path, dry_run: bool) -> Self {
        Self {
            path: project_dir.join(MANIFEST_FILENAME),
            dry_run,
        }
    }

    /// Path of the manifest file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check if this store is in dry-run mode
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Load the manifest
    pub fn load(&self) -> Result<Manifest, ManifestError> {
        load(&self.path)
    }

    /// Persist the manifest. Returns whether the file was written; in
    /// dry-run mode nothing is written.
    pub fn save(&self, manifest: &Manifest) -> Result<bool, ManifestError> {
        if self.dry_run {
            debug!(path = %self.path.display(), "dry run, manifest not written");
            return Ok(false);
        }
        save(&self.path, manifest)?;
        Ok(true)
    }
}

/// Load and parse a manifest file
pub fn load(path: &Path) -> Result<Manifest, ManifestError> {
    let content = fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => ManifestError::not_found(path),
        _ => ManifestError::read_error(path, e),
    })?;
    Manifest::parse(&content, path)
}

/// Rewrite a manifest file with the full document
pub fn save(path: &Path, manifest: &Manifest) -> Result<(), ManifestError> {
    let content = manifest
        .to_pretty_string()
        .map_err(|e| ManifestError::write_error(path, std::io::Error::other(e)))?;
    fs::write(path, content).map_err(|e| ManifestError::write_error(path, e))?;
    info!(path = %path.display(), "manifest written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_manifest(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join(MANIFEST_FILENAME);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_store_path() {
        let store = ManifestStore::new(Path::new("/project"), false);
        assert_eq!(store.path(), Path::new("/project/package.json"));
        assert!(!store.is_dry_run());
    }

    #[test]
    fn test_load_missing_manifest() {
        let dir = TempDir::new().unwrap();
        let err = ManifestStore::new(dir.path(), false).load().unwrap_err();
        assert!(matches!(err, ManifestError::NotFound { .. }));
    }

    #[test]
    fn test_load_invalid_manifest() {
        let dir = TempDir::new().unwrap();
        write_manifest(&dir, "{ broken");
        let err = ManifestStore::new(dir.path(), false).load().unwrap_err();
        assert!(matches!(err, ManifestError::JsonParseError { .. }));
    }

    #[test]
    fn test_save_rewrites_file() {
        let dir = TempDir::new().unwrap();
        let path = write_manifest(&dir, r#"{"dependencies": {"react": "18.2.0"}}"#);
        let store = ManifestStore::new(dir.path(), false);

        let mut manifest = store.load().unwrap();
        manifest.set_range("react", "^19.1.0");
        assert!(store.save(&manifest).unwrap());

        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(
            written,
            "{\n  \"dependencies\": {\n    \"react\": \"^19.1.0\"\n  }\n}\n"
        );
    }

    #[test]
    fn test_dry_run_does_not_write() {
        let dir = TempDir::new().unwrap();
        let original = r#"{"dependencies": {"react": "18.2.0"}}"#;
        let path = write_manifest(&dir, original);
        let store = ManifestStore::new(dir.path(), true);

        let mut manifest = store.load().unwrap();
        manifest.set_range("react", "^19.1.0");
        assert!(!store.save(&manifest).unwrap());
        assert_eq!(fs::read_to_string(&path).unwrap(), original);
    }

    #[test]
    fn test_save_into_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join(MANIFEST_FILENAME);
        let err = save(&path, &Manifest::default()).unwrap_err();
        assert!(matches!(err, ManifestError::WriteError { .. }));
    }
}
