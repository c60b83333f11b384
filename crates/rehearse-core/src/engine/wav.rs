//! WAV-backed mix engine
//!
//! Default implementation of [`MixEngine`] over the pipeline's fixed
//! container. Reads 16/24/32-bit integer and 32-bit float WAV, sums with
//! linear gains to the duration of the longest input, and writes 32-bit
//! float WAV so intermediate mixes never clip before the correction pass.

use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use super::{EngineError, EngineResult, MixEngine, MixInput};
use crate::analyzer::db_to_linear;
use crate::asset::AudioAsset;

/// Loudness reported for digital silence, instead of -inf
pub const SILENCE_FLOOR_DB: f32 = -120.0;

/// Mixes WAV files in memory.
///
/// Stateless; a single instance is shared across all worker threads.
#[derive(Debug, Default)]
pub struct WavMixEngine;

impl WavMixEngine {
    pub fn new() -> Self {
        Self
    }
}

/// Decoded audio: interleaved f32 samples plus the source format
struct DecodedAudio {
    samples: Vec<f32>,
    channels: u16,
    sample_rate: u32,
}

fn read_audio(path: &Path) -> EngineResult<DecodedAudio> {
    if !path.is_file() {
        return Err(EngineError::AssetNotFound(path.to_path_buf()));
    }

    let unreadable = |detail: String| EngineError::AssetUnreadable {
        path: path.to_path_buf(),
        detail,
    };

    let mut reader = WavReader::open(path).map_err(|e| unreadable(e.to_string()))?;
    let spec = reader.spec();

    let samples: Vec<f32> = match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Float, 32) => reader
            .samples::<f32>()
            .collect::<Result<_, _>>()
            .map_err(|e| unreadable(e.to_string()))?,
        (SampleFormat::Int, bits @ (16 | 24 | 32)) => {
            let scale = 1.0 / (1i64 << (bits - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 * scale))
                .collect::<Result<_, _>>()
                .map_err(|e| unreadable(e.to_string()))?
        }
        (format, bits) => {
            return Err(unreadable(format!(
                "unsupported sample format: {:?} {}-bit",
                format, bits
            )))
        }
    };

    Ok(DecodedAudio {
        samples,
        channels: spec.channels,
        sample_rate: spec.sample_rate,
    })
}

impl MixEngine for WavMixEngine {
    fn combine(
        &self,
        inputs: &[MixInput<'_>],
        post_gain_db: f32,
        dest: &Path,
    ) -> EngineResult<AudioAsset> {
        if inputs.is_empty() {
            return Err(EngineError::FormatMismatch(
                "combine requires at least one input".into(),
            ));
        }

        let decoded: Vec<(DecodedAudio, f32)> = inputs
            .iter()
            .map(|input| Ok((read_audio(input.asset.path())?, input.gain_db)))
            .collect::<EngineResult<_>>()?;

        // All inputs must share one format; the ingestion boundary
        // guarantees a single container but not matching stream layouts.
        let (first, _) = &decoded[0];
        let (channels, sample_rate) = (first.channels, first.sample_rate);
        for (audio, _) in &decoded {
            if audio.channels != channels || audio.sample_rate != sample_rate {
                return Err(EngineError::FormatMismatch(format!(
                    "expected {}ch @ {}Hz, found {}ch @ {}Hz",
                    channels, sample_rate, audio.channels, audio.sample_rate
                )));
            }
        }

        // Sum to the longest input; shorter inputs drop out to silence.
        let out_len = decoded
            .iter()
            .map(|(audio, _)| audio.samples.len())
            .max()
            .unwrap_or(0);
        let mut mixed = vec![0.0f32; out_len];
        for (audio, gain_db) in &decoded {
            let gain = db_to_linear(*gain_db);
            for (acc, &sample) in mixed.iter_mut().zip(audio.samples.iter()) {
                *acc += sample * gain;
            }
        }

        let post_gain = db_to_linear(post_gain_db);
        if post_gain != 1.0 {
            for sample in &mut mixed {
                *sample *= post_gain;
            }
        }

        let spec = WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };
        let encode_failed = |detail: String| EngineError::EncodeFailed {
            path: dest.to_path_buf(),
            detail,
        };
        let mut writer = WavWriter::create(dest, spec).map_err(|e| encode_failed(e.to_string()))?;
        for &sample in &mixed {
            writer
                .write_sample(sample)
                .map_err(|e| encode_failed(e.to_string()))?;
        }
        writer.finalize().map_err(|e| encode_failed(e.to_string()))?;

        log::debug!(
            "combined {} inputs into {} ({} frames, post gain {:+.2} dB)",
            inputs.len(),
            dest.display(),
            out_len / channels.max(1) as usize,
            post_gain_db
        );

        Ok(AudioAsset::new(dest))
    }

    fn measure(&self, path: &Path) -> EngineResult<f32> {
        let audio = read_audio(path)?;
        if audio.samples.is_empty() {
            return Ok(SILENCE_FLOOR_DB);
        }

        let sum_squares: f64 = audio.samples.iter().map(|&s| (s as f64) * (s as f64)).sum();
        let rms = (sum_squares / audio.samples.len() as f64).sqrt();
        if rms <= 0.0 {
            return Ok(SILENCE_FLOOR_DB);
        }

        Ok((20.0 * rms.log10()).max(SILENCE_FLOOR_DB as f64) as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{write_silence_wav, write_sine_wav};

    #[test]
    fn test_measure_sine_level() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sine.wav");
        // Amplitude 0.5 sine: RMS = 0.5/sqrt(2), mean level ~= -9.03 dBFS
        write_sine_wav(&path, 440.0, 0.5, 1.0);

        let engine = WavMixEngine::new();
        let db = engine.measure(&path).unwrap();
        assert!((db - (-9.03)).abs() < 0.1, "measured {} dB", db);
    }

    #[test]
    fn test_measure_silence_floor() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("silence.wav");
        write_silence_wav(&path, 0.5);

        let engine = WavMixEngine::new();
        assert_eq!(engine.measure(&path).unwrap(), SILENCE_FLOOR_DB);
    }

    #[test]
    fn test_measure_missing_file() {
        let engine = WavMixEngine::new();
        let err = engine.measure(Path::new("/nonexistent/x.wav")).unwrap_err();
        assert!(matches!(err, EngineError::AssetNotFound(_)));
    }

    #[test]
    fn test_combine_pads_shorter_inputs() {
        let dir = tempfile::tempdir().unwrap();
        let long = dir.path().join("long.wav");
        let short = dir.path().join("short.wav");
        write_sine_wav(&long, 440.0, 0.25, 2.0);
        write_sine_wav(&short, 220.0, 0.25, 1.0);

        let long_asset = AudioAsset::new(&long);
        let short_asset = AudioAsset::new(&short);
        let engine = WavMixEngine::new();
        let dest = dir.path().join("mix.wav");
        engine
            .combine(
                &[
                    MixInput::unity(&long_asset),
                    MixInput::unity(&short_asset),
                ],
                0.0,
                &dest,
            )
            .unwrap();

        // Output duration equals the longest input
        let reader = WavReader::open(&dest).unwrap();
        assert_eq!(reader.duration(), 2 * crate::test_util::TEST_SAMPLE_RATE);
    }

    #[test]
    fn test_combine_applies_post_gain() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src.wav");
        write_sine_wav(&src, 440.0, 0.5, 1.0);
        let asset = AudioAsset::new(&src);

        let engine = WavMixEngine::new();
        let dest = dir.path().join("quieter.wav");
        engine
            .combine(&[MixInput::unity(&asset)], -6.0, &dest)
            .unwrap();

        let before = engine.measure(&src).unwrap();
        let after = engine.measure(&dest).unwrap();
        assert!((before - after - 6.0).abs() < 0.05);
    }

    #[test]
    fn test_combine_rejects_rate_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.wav");
        let b = dir.path().join("b.wav");
        write_sine_wav(&a, 440.0, 0.5, 0.2);
        crate::test_util::write_sine_wav_at_rate(&b, 440.0, 0.5, 0.2, 22050);

        let asset_a = AudioAsset::new(&a);
        let asset_b = AudioAsset::new(&b);
        let engine = WavMixEngine::new();
        let err = engine
            .combine(
                &[MixInput::unity(&asset_a), MixInput::unity(&asset_b)],
                0.0,
                &dir.path().join("mix.wav"),
            )
            .unwrap_err();
        assert!(matches!(err, EngineError::FormatMismatch(_)));
    }
}
