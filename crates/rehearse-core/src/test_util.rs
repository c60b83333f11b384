//! Shared test fixtures: tiny WAV files generated on the fly.

use std::f32::consts::TAU;
use std::path::Path;

use hound::{SampleFormat, WavSpec, WavWriter};

pub const TEST_SAMPLE_RATE: u32 = 44100;

/// Write a mono 32-bit float sine wave.
pub fn write_sine_wav(path: &Path, freq: f32, amplitude: f32, secs: f32) {
    write_sine_wav_at_rate(path, freq, amplitude, secs, TEST_SAMPLE_RATE);
}

pub fn write_sine_wav_at_rate(
    path: &Path,
    freq: f32,
    amplitude: f32,
    secs: f32,
    sample_rate: u32,
) {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };
    let mut writer = WavWriter::create(path, spec).unwrap();
    let frames = (secs * sample_rate as f32) as u32;
    for i in 0..frames {
        let t = i as f32 / sample_rate as f32;
        writer.write_sample(amplitude * (TAU * freq * t).sin()).unwrap();
    }
    writer.finalize().unwrap();
}

/// Write a mono 32-bit float file of digital silence.
pub fn write_silence_wav(path: &Path, secs: f32) {
    write_sine_wav(path, 440.0, 0.0, secs);
}
