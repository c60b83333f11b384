//! Render/measure engine capability
//!
//! The mixing core never touches codecs directly; it talks to an engine
//! through this trait. `combine` accepts an arbitrary number of inputs -
//! if a backend can only mix pairwise it chains internally, invisibly to
//! callers. `measure` returns a typed loudness value; there is no
//! diagnostic-text parsing anywhere in the pipeline.

mod wav;

pub use wav::WavMixEngine;

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::asset::AudioAsset;

/// Errors that can occur inside the render/measure engine
#[derive(Error, Debug)]
pub enum EngineError {
    /// Input path does not point at a readable file
    #[error("asset not found: {0}")]
    AssetNotFound(PathBuf),

    /// Input exists but cannot be decoded
    #[error("asset unreadable: {path}: {detail}")]
    AssetUnreadable { path: PathBuf, detail: String },

    /// Inputs to a combine disagree on sample rate or channel count
    #[error("input format mismatch: {0}")]
    FormatMismatch(String),

    /// The mixed output could not be written
    #[error("failed to write mix output {path}: {detail}")]
    EncodeFailed { path: PathBuf, detail: String },

    /// The engine itself cannot be invoked; fatal to the enclosing job
    #[error("render engine unavailable: {0}")]
    Unavailable(String),
}

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

/// One input to a combine operation: an asset and the gain applied to it
/// before summation.
#[derive(Debug, Clone, Copy)]
pub struct MixInput<'a> {
    pub asset: &'a AudioAsset,
    pub gain_db: f32,
}

impl<'a> MixInput<'a> {
    /// An input mixed at its original level.
    pub fn unity(asset: &'a AudioAsset) -> Self {
        Self {
            asset,
            gain_db: 0.0,
        }
    }

    /// An input attenuated (or boosted) by `gain_db`.
    pub fn with_gain(asset: &'a AudioAsset, gain_db: f32) -> Self {
        Self { asset, gain_db }
    }
}

/// Capability interface over the audio engine.
///
/// Implementations must be callable from multiple worker threads at once.
pub trait MixEngine: Send + Sync {
    /// Combine all inputs into a single signal written to `dest`.
    ///
    /// Each input is scaled by its own gain before summation;
    /// `post_gain_db` is then applied uniformly to the combined signal.
    /// The result's duration equals the longest input, shorter inputs
    /// contributing silence once exhausted, with no fade at dropout.
    fn combine(
        &self,
        inputs: &[MixInput<'_>],
        post_gain_db: f32,
        dest: &Path,
    ) -> EngineResult<AudioAsset>;

    /// Mean loudness of the file at `path`, in dBFS (0 = full scale).
    ///
    /// Deterministic given the file bytes; no side effects.
    fn measure(&self, path: &Path) -> EngineResult<f32>;
}
