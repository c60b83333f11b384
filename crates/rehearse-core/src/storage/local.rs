//! Directory-backed object store
//!
//! Maps keys to paths under a root directory. Used by tests and the CLI;
//! a production deployment substitutes a real object-store client behind
//! the same trait.

use std::fs;
use std::path::{Path, PathBuf};

use super::{ObjectStore, StorageError};

/// Stores objects as plain files under a root directory.
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn object_path(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }

    fn io_error(key: &str, e: std::io::Error) -> StorageError {
        StorageError::Io {
            key: key.to_string(),
            detail: e.to_string(),
        }
    }
}

impl ObjectStore for LocalStore {
    fn put(&self, local: &Path, key: &str) -> Result<(), StorageError> {
        let dest = self.object_path(key);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(|e| Self::io_error(key, e))?;
        }
        fs::copy(local, &dest).map_err(|e| Self::io_error(key, e))?;
        log::debug!("stored {} as {}", local.display(), key);
        Ok(())
    }

    fn get(&self, key: &str, local: &Path) -> Result<(), StorageError> {
        let src = self.object_path(key);
        if !src.is_file() {
            return Err(StorageError::NotFound(key.to_string()));
        }
        fs::copy(&src, local).map_err(|e| Self::io_error(key, e))?;
        log::debug!("retrieved {} to {}", key, local.display());
        Ok(())
    }

    fn presign(&self, key: &str, _expiry_secs: u64) -> Result<String, StorageError> {
        // Local files need no expiring credentials
        let path = self.object_path(key);
        if !path.is_file() {
            return Err(StorageError::NotFound(key.to_string()));
        }
        Ok(format!("file://{}", path.display()))
    }

    fn delete(&self, key: &str) -> Result<(), StorageError> {
        let path = self.object_path(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Self::io_error(key, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_get_roundtrip() {
        let root = tempfile::tempdir().unwrap();
        let work = tempfile::tempdir().unwrap();
        let src = work.path().join("data.bin");
        fs::write(&src, b"bytes").unwrap();

        let store = LocalStore::new(root.path());
        store.put(&src, "run1/data.bin").unwrap();

        let fetched = work.path().join("fetched.bin");
        store.get("run1/data.bin", &fetched).unwrap();
        assert_eq!(fs::read(&fetched).unwrap(), b"bytes");
    }

    #[test]
    fn test_get_missing_key() {
        let root = tempfile::tempdir().unwrap();
        let store = LocalStore::new(root.path());
        let err = store
            .get("absent", &root.path().join("x"))
            .unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }

    #[test]
    fn test_presign_existing_object() {
        let root = tempfile::tempdir().unwrap();
        let work = tempfile::tempdir().unwrap();
        let src = work.path().join("data.bin");
        fs::write(&src, b"x").unwrap();

        let store = LocalStore::new(root.path());
        store.put(&src, "run/data.bin").unwrap();

        let url = store.presign("run/data.bin", 3600).unwrap();
        assert!(url.starts_with("file://"));
        assert!(url.ends_with("run/data.bin"));
        assert!(store.presign("missing", 3600).is_err());
    }

    #[test]
    fn test_delete_is_idempotent() {
        let root = tempfile::tempdir().unwrap();
        let work = tempfile::tempdir().unwrap();
        let src = work.path().join("data.bin");
        fs::write(&src, b"x").unwrap();

        let store = LocalStore::new(root.path());
        store.put(&src, "k").unwrap();
        store.delete("k").unwrap();
        // Already gone - still fine
        store.delete("k").unwrap();
        assert!(matches!(
            store.get("k", &work.path().join("y")),
            Err(StorageError::NotFound(_))
        ));
    }
}
