//! Object storage boundary
//!
//! The pipeline retrieves input bundles and delivers output bundles
//! through this trait. The real backing store lives outside this crate;
//! a client is constructed once per process and passed into the run
//! explicitly - there is no ambient global client.

mod local;

pub use local::LocalStore;

use std::path::Path;

use thiserror::Error;

/// Default lifetime of a presigned retrieval URL
pub const DEFAULT_PRESIGN_EXPIRY_SECS: u64 = 3600;

/// Storage operation errors
#[derive(Error, Debug)]
pub enum StorageError {
    /// No object under the requested key
    #[error("object not found: {0}")]
    NotFound(String),

    /// Transfer or backend failure
    #[error("storage operation failed for {key}: {detail}")]
    Io { key: String, detail: String },
}

/// Minimal object-store interface: upload, download, presign, remove.
pub trait ObjectStore: Send + Sync {
    /// Upload the file at `local` under `key`.
    fn put(&self, local: &Path, key: &str) -> Result<(), StorageError>;

    /// Download the object under `key` to `local`.
    fn get(&self, key: &str, local: &Path) -> Result<(), StorageError>;

    /// A URL under which `key` can be retrieved for `expiry_secs`.
    fn presign(&self, key: &str, expiry_secs: u64) -> Result<String, StorageError>;

    /// Remove the object under `key`; succeeds if it is already gone.
    fn delete(&self, key: &str) -> Result<(), StorageError>;
}
