//! # hindi-tts
//!
//! A small HTTP text-to-speech service for Hindi backed by a Piper ONNX voice.
//!
//! ## Features
//!
//! - **Piper TTS**: ONNX voices with espeak-ng phonemization (`piper` feature)
//! - **Indic text normalization**: punctuation-aware tokenization before synthesis
//! - **HTTP API**: `/`, `/ping`, `/output` and `/generate` served with axum
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::path::PathBuf;
//! use hindi_tts::{engines::piper::PiperEngine, SynthesisEngine};
//!
//! let mut engine = PiperEngine::new();
//! engine.load_model(&PathBuf::from("models/hi_IN-pratham-medium.onnx"))?;
//!
//! let result = engine.synthesize("नमस्ते दुनिया", None)?;
//! result.write_wav(&PathBuf::from("output.wav"))?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod engines;
pub mod error;
pub mod server;
pub mod service;
pub mod text;

use std::io::{Seek, Write};
use std::path::Path;

pub use error::{StartupError, SynthesisError};
pub use service::{AudioService, ServiceConfig, ServiceConfigBuilder};

/// Boxed error returned across the [`SynthesisEngine`] boundary.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The result of a synthesis (text-to-speech) operation.
///
/// Contains raw f32 audio samples and the sample rate of the output audio.
#[derive(Debug)]
pub struct SynthesisResult {
    /// Raw audio samples as f32 values
    pub samples: Vec<f32>,
    /// Sample rate of the audio (22050 for medium Piper voices)
    pub sample_rate: u32,
}

impl SynthesisResult {
    /// WAV layout used for every payload: mono, 16-bit integer PCM.
    pub fn wav_spec(&self) -> hound::WavSpec {
        hound::WavSpec {
            channels: 1,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        }
    }

    /// Convert the samples to 16-bit PCM.
    ///
    /// Audio is peak-normalized before quantization; near-silent output is
    /// not amplified beyond a 0.01 peak.
    pub fn to_pcm16(&self) -> Vec<i16> {
        let peak = self
            .samples
            .iter()
            .fold(0.0f32, |acc, s| acc.max(s.abs()))
            .max(0.01);
        let scale = i16::MAX as f32 / peak;

        self.samples
            .iter()
            .map(|&s| (s * scale).clamp(i16::MIN as f32, i16::MAX as f32) as i16)
            .collect()
    }

    /// Write the audio to a 16-bit PCM WAV file.
    pub fn write_wav(&self, path: &Path) -> Result<(), BoxError> {
        let writer = hound::WavWriter::create(path, self.wav_spec())?;
        self.write_samples(writer)
    }

    /// Write the audio as a 16-bit PCM WAV stream into any seekable writer.
    pub fn write_wav_to<W: Write + Seek>(&self, writer: W) -> Result<(), BoxError> {
        let writer = hound::WavWriter::new(writer, self.wav_spec())?;
        self.write_samples(writer)
    }

    fn write_samples<W: Write + Seek>(
        &self,
        mut writer: hound::WavWriter<W>,
    ) -> Result<(), BoxError> {
        for sample in self.to_pcm16() {
            writer.write_sample(sample)?;
        }
        writer.finalize()?;
        Ok(())
    }

    /// Duration of the audio in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// Common interface for text-to-speech synthesis engines.
///
/// This trait defines the standard operations that all synthesis engines must support.
/// Each engine may have different parameter types for model loading and inference configuration.
pub trait SynthesisEngine {
    /// Parameters for configuring inference behavior (speaker, scales, etc.)
    type SynthesisParams;
    /// Parameters for configuring model loading (config path, threads, etc.)
    type ModelParams: Default;

    /// Load a model from the specified path using default parameters.
    fn load_model(&mut self, model_path: &Path) -> Result<(), BoxError> {
        self.load_model_with_params(model_path, Self::ModelParams::default())
    }

    /// Load a model from the specified path with custom parameters.
    fn load_model_with_params(
        &mut self,
        model_path: &Path,
        params: Self::ModelParams,
    ) -> Result<(), BoxError>;

    /// Unload the currently loaded model and free associated resources.
    fn unload_model(&mut self);

    /// Synthesize speech from the given text.
    fn synthesize(
        &mut self,
        text: &str,
        params: Option<Self::SynthesisParams>,
    ) -> Result<SynthesisResult, BoxError>;

    /// Synthesize speech from the given text and write to a WAV file.
    ///
    /// Default implementation calls `synthesize()` then `SynthesisResult::write_wav()`.
    fn synthesize_to_file(
        &mut self,
        text: &str,
        wav_path: &Path,
        params: Option<Self::SynthesisParams>,
    ) -> Result<(), BoxError> {
        self.synthesize(text, params)?.write_wav(wav_path)
    }
}

#[cfg(test)]
mod tests {
    use super::SynthesisResult;
    use std::io::Cursor;

    #[test]
    fn pcm16_is_peak_normalized() {
        let result = SynthesisResult {
            samples: vec![0.0, 0.25, -0.5],
            sample_rate: 22050,
        };
        assert_eq!(result.to_pcm16(), vec![0, 16383, -32767]);
    }

    #[test]
    fn quiet_audio_is_not_amplified_past_floor() {
        let result = SynthesisResult {
            samples: vec![0.001],
            sample_rate: 22050,
        };
        assert_eq!(result.to_pcm16(), vec![3276]);
    }

    #[test]
    fn wav_stream_has_riff_header_and_pcm16_format() {
        let result = SynthesisResult {
            samples: vec![0.1; 2205],
            sample_rate: 22050,
        };
        let mut cursor = Cursor::new(Vec::new());
        result.write_wav_to(&mut cursor).unwrap();
        let bytes = cursor.into_inner();

        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(&bytes[8..12], b"WAVE");

        let reader = hound::WavReader::new(Cursor::new(bytes)).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.bits_per_sample, 16);
        assert_eq!(spec.sample_format, hound::SampleFormat::Int);
        assert_eq!(reader.len(), 2205);
        assert!((result.duration_secs() - 0.1).abs() < 1e-9);
    }
}
