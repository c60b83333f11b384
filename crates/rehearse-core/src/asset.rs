//! Audio asset handles
//!
//! An asset is a single audio file owned by the current run's working
//! directory. Loudness is measured lazily and cached per instance; once set
//! it is never recomputed.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// A single audio file participating in a run.
///
/// Assets are shared across mix jobs as `Arc<AudioAsset>`; the file bytes
/// are read-only for the lifetime of the run.
#[derive(Debug, Clone)]
pub struct AudioAsset {
    /// Identifier: the file's basename (e.g. "trumpet.wav")
    id: String,
    /// Absolute or run-relative path to the file
    path: PathBuf,
    /// Mean loudness in dBFS, filled in by the first measurement
    loudness_db: OnceLock<f32>,
}

impl AudioAsset {
    /// Create an asset handle for a file path.
    ///
    /// The id is derived from the path's basename.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let id = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();
        Self {
            id,
            path,
            loudness_db: OnceLock::new(),
        }
    }

    /// The asset's identifier (file basename).
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Path to the underlying file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Cached loudness, if it has been measured.
    pub fn cached_loudness_db(&self) -> Option<f32> {
        self.loudness_db.get().copied()
    }

    /// Store a measured loudness value, returning the cached value.
    ///
    /// The first stored value wins; later calls return it unchanged.
    pub(crate) fn cache_loudness_db(&self, db: f32) -> f32 {
        *self.loudness_db.get_or_init(|| db)
    }
}

impl std::fmt::Display for AudioAsset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id)
    }
}
