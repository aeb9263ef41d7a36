use std::path::Path;

use ndarray::Array2;
use ort::execution_providers::CPUExecutionProvider;
use ort::inputs;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::TensorRef;

use super::config::VoiceConfig;
use super::phonemizer::{phonemes_to_ids, phonemize, split_sentences, EspeakConfig};

#[derive(thiserror::Error, Debug)]
pub enum PiperError {
    #[error("ONNX runtime error: {0}")]
    Ort(#[from] ort::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Array shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),
    #[error(
        "espeak-ng not found. Install: Linux: `sudo apt-get install espeak-ng`, \
         macOS: `brew install espeak-ng`, Windows: https://espeak-ng.org/download"
    )]
    EspeakNotFound,
    #[error("Phonemization failed: {0}")]
    PhonemizerFailed(String),
    #[error("Speaker {0} not found; voice has {1} speaker(s)")]
    SpeakerNotFound(u32, u32),
    #[error("Model not loaded. Call load_model() first.")]
    ModelNotLoaded,
    #[error("Invalid voice config: {0}")]
    Config(String),
}

/// Scales and speaker for a single inference run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scales {
    pub noise_scale: f32,
    pub length_scale: f32,
    pub noise_w: f32,
    pub speaker_id: u32,
}

/// Internal Piper ONNX model state.
pub struct PiperModel {
    session: Session,
    config: VoiceConfig,
    /// True if the graph declares a `sid` input (multi-speaker voices)
    has_sid_input: bool,
}

impl PiperModel {
    /// Load a Piper voice from its `.onnx` model and `.onnx.json` config.
    pub fn load(
        onnx_path: &Path,
        config_path: &Path,
        num_threads: Option<usize>,
    ) -> Result<Self, PiperError> {
        if !onnx_path.exists() {
            return Err(PiperError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Model file not found at {}", onnx_path.display()),
            )));
        }
        if !config_path.exists() {
            return Err(PiperError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Voice config not found at {}", config_path.display()),
            )));
        }

        log::info!("Loading Piper voice config from {}", config_path.display());
        let config = VoiceConfig::load(config_path)?;

        log::info!("Loading Piper model from {}", onnx_path.display());
        let session = init_session(onnx_path, num_threads)?;
        let has_sid_input = detect_sid_input(&session);

        log::info!(
            "Detected: sample_rate={}, espeak_voice='{}', speakers={}, sid_input={}",
            config.sample_rate,
            config.espeak_voice,
            config.num_speakers,
            has_sid_input
        );

        Ok(Self {
            session,
            config,
            has_sid_input,
        })
    }

    pub fn config(&self) -> &VoiceConfig {
        &self.config
    }

    /// Synthesize audio from text, one sentence at a time.
    pub fn synthesize_text(
        &mut self,
        text: &str,
        scales: Scales,
        espeak: &EspeakConfig,
    ) -> Result<Vec<f32>, PiperError> {
        if scales.speaker_id >= self.config.num_speakers.max(1) {
            return Err(PiperError::SpeakerNotFound(
                scales.speaker_id,
                self.config.num_speakers,
            ));
        }

        let phonemes = phonemize(text, &self.config.espeak_voice, espeak)?;
        if phonemes.is_empty() {
            log::warn!("No phonemes produced for text: {text:?}");
            return Ok(vec![]);
        }

        let mut combined = Vec::new();
        for sentence in split_sentences(&phonemes) {
            let ids = phonemes_to_ids(&sentence, &self.config.phoneme_id_map);
            log::debug!("Synthesizing sentence with {} phoneme ids", ids.len());
            let mut audio = self.synthesize_ids(&ids, scales)?;
            normalize_peak(&mut audio);
            combined.extend_from_slice(&audio);
        }

        Ok(combined)
    }

    /// Run ONNX inference on a single sentence of phoneme ids.
    fn synthesize_ids(&mut self, ids: &[i64], scales: Scales) -> Result<Vec<f32>, PiperError> {
        let input = Array2::from_shape_vec((1, ids.len()), ids.to_vec())?;
        let input_lengths = ndarray::arr1(&[ids.len() as i64]);
        let scales_arr = ndarray::arr1(&[scales.noise_scale, scales.length_scale, scales.noise_w]);

        let output = if self.has_sid_input {
            let sid = ndarray::arr1(&[scales.speaker_id as i64]);
            let inputs = inputs![
                "input" => TensorRef::from_array_view(input.view())?,
                "input_lengths" => TensorRef::from_array_view(input_lengths.view())?,
                "scales" => TensorRef::from_array_view(scales_arr.view())?,
                "sid" => TensorRef::from_array_view(sid.view())?,
            ];
            self.session.run(inputs)?
        } else {
            let inputs = inputs![
                "input" => TensorRef::from_array_view(input.view())?,
                "input_lengths" => TensorRef::from_array_view(input_lengths.view())?,
                "scales" => TensorRef::from_array_view(scales_arr.view())?,
            ];
            self.session.run(inputs)?
        };

        // Waveform is the first output, shaped [1, 1, 1, samples]
        let first_output = output
            .iter()
            .next()
            .ok_or_else(|| PiperError::Ort(ort::Error::new("No output from model")))?;
        let waveform = first_output.1.try_extract_array::<f32>()?;

        Ok(waveform.iter().copied().collect())
    }
}

/// Scale one sentence's audio to a unit peak, so each sentence is quantized
/// at full 16-bit range. Near-silent audio is not amplified beyond a 0.01 peak.
fn normalize_peak(audio: &mut [f32]) {
    let peak = audio
        .iter()
        .fold(0.0f32, |acc, s| acc.max(s.abs()))
        .max(0.01);
    for sample in audio.iter_mut() {
        *sample /= peak;
    }
}

fn init_session(onnx_path: &Path, num_threads: Option<usize>) -> Result<Session, PiperError> {
    let providers = vec![CPUExecutionProvider::default().build()];

    let mut builder = Session::builder()?
        .with_optimization_level(GraphOptimizationLevel::Level3)?
        .with_execution_providers(providers)?;

    if let Some(threads) = num_threads {
        builder = builder.with_intra_threads(threads)?;
    }

    Ok(builder.commit_from_file(onnx_path)?)
}

/// Detect whether the graph takes a speaker id input.
fn detect_sid_input(session: &Session) -> bool {
    for input in session.inputs() {
        if input.name() == "sid" {
            return true;
        }
    }
    false
}
