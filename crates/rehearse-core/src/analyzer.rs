//! Loudness measurement
//!
//! Front-end over the engine's `measure` capability. Mean loudness is
//! expressed in dBFS (0 dB = full scale, quieter is more negative) and is
//! cached on the asset: each asset is measured at most once per run.

use std::sync::Arc;

use crate::asset::AudioAsset;
use crate::engine::{EngineResult, MixEngine};

/// Measures and caches per-asset loudness.
pub struct LoudnessAnalyzer {
    engine: Arc<dyn MixEngine>,
}

impl LoudnessAnalyzer {
    pub fn new(engine: Arc<dyn MixEngine>) -> Self {
        Self { engine }
    }

    /// Mean loudness of `asset` in dBFS.
    ///
    /// The first call decodes and measures the file; later calls return
    /// the cached value without touching the bytes again.
    pub fn measure(&self, asset: &AudioAsset) -> EngineResult<f32> {
        if let Some(db) = asset.cached_loudness_db() {
            return Ok(db);
        }
        let db = self.engine.measure(asset.path())?;
        log::debug!("measured {}: {:.2} dBFS", asset.id(), db);
        Ok(asset.cache_loudness_db(db))
    }
}

/// Convert decibels to a linear gain factor
///
/// 1.0 = unity, 2.0 ~= +6 dB, 0.5 ~= -6 dB.
#[inline]
pub fn db_to_linear(db: f32) -> f32 {
    10.0_f32.powf(db / 20.0)
}

/// Convert a linear gain factor to decibels
#[inline]
pub fn linear_to_db(linear: f32) -> f32 {
    20.0 * linear.log10()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::WavMixEngine;
    use crate::test_util::write_sine_wav;

    #[test]
    fn test_db_to_linear() {
        // Unity gain
        assert!((db_to_linear(0.0) - 1.0).abs() < 0.001);

        // +6 dB ~= 2x
        assert!((db_to_linear(6.0) - 1.995).abs() < 0.01);

        // -6 dB ~= 0.5x
        assert!((db_to_linear(-6.0) - 0.501).abs() < 0.01);

        // +20 dB = 10x
        assert!((db_to_linear(20.0) - 10.0).abs() < 0.001);
    }

    #[test]
    fn test_linear_to_db() {
        assert!((linear_to_db(1.0) - 0.0).abs() < 0.001);
        assert!((linear_to_db(10.0) - 20.0).abs() < 0.001);
    }

    #[test]
    fn test_db_linear_roundtrip() {
        for db in [-12.0, -6.0, 0.0, 6.0, 12.0] {
            let back = linear_to_db(db_to_linear(db));
            assert!((db - back).abs() < 0.001, "roundtrip failed for {} dB", db);
        }
    }

    #[test]
    fn test_measure_fills_asset_cache() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        write_sine_wav(&path, 440.0, 0.5, 0.5);

        let analyzer = LoudnessAnalyzer::new(Arc::new(WavMixEngine::new()));
        let asset = AudioAsset::new(&path);
        assert_eq!(asset.cached_loudness_db(), None);

        let first = analyzer.measure(&asset).unwrap();
        assert_eq!(asset.cached_loudness_db(), Some(first));

        // Cached: deleting the file no longer matters
        std::fs::remove_file(&path).unwrap();
        assert_eq!(analyzer.measure(&asset).unwrap(), first);
    }
}
