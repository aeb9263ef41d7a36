use std::path::{Path, PathBuf};

use crate::config::voice_config_path;
use crate::{BoxError, SynthesisEngine, SynthesisResult};

use super::config::VoiceConfig;
use super::model::{PiperError, PiperModel, Scales};
use super::phonemizer::EspeakConfig;

/// Parameters for configuring Piper model loading.
#[derive(Debug, Clone, Default)]
pub struct PiperModelParams {
    /// Path to the voice config. `None` uses `<model path>.json`,
    /// e.g. `hi_IN-pratham-medium.onnx.json`.
    pub config_path: Option<PathBuf>,
    /// Number of CPU threads to use for inference.
    /// `None` uses the ORT default (typically all available cores).
    pub num_threads: Option<usize>,
}

/// Parameters for configuring a Piper synthesis request.
///
/// Every `None` falls back to the voice config's `inference` section.
#[derive(Debug, Clone, Default)]
pub struct PiperInferenceParams {
    pub speaker_id: Option<u32>,
    /// Phoneme duration multiplier; larger is slower speech.
    pub length_scale: Option<f32>,
    pub noise_scale: Option<f32>,
    pub noise_w: Option<f32>,
}

impl PiperInferenceParams {
    fn resolve(&self, config: &VoiceConfig) -> Scales {
        Scales {
            noise_scale: self.noise_scale.unwrap_or(config.inference.noise_scale),
            length_scale: self.length_scale.unwrap_or(config.inference.length_scale),
            noise_w: self.noise_w.unwrap_or(config.inference.noise_w),
            speaker_id: self.speaker_id.unwrap_or(0),
        }
    }
}

/// Piper text-to-speech engine.
///
/// Uses a Piper VITS voice exported to ONNX. Requires espeak-ng for
/// phonemization.
///
/// ```rust,no_run
/// use hindi_tts::{SynthesisEngine, engines::piper::PiperEngine};
/// use std::path::PathBuf;
///
/// let mut engine = PiperEngine::new();
/// engine.load_model(&PathBuf::from("models/hi_IN-pratham-medium.onnx"))?;
/// let result = engine.synthesize("नमस्ते", None)?;
/// # Ok::<(), Box<dyn std::error::Error + Send + Sync>>(())
/// ```
pub struct PiperEngine {
    model: Option<PiperModel>,
    model_path: Option<PathBuf>,
    espeak: EspeakConfig,
    defaults: PiperInferenceParams,
}

impl Default for PiperEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl PiperEngine {
    /// Create a new engine that uses `espeak-ng` from PATH.
    pub fn new() -> Self {
        Self {
            model: None,
            model_path: None,
            espeak: EspeakConfig::default(),
            defaults: PiperInferenceParams::default(),
        }
    }

    /// Create a new engine with explicit espeak-ng binary and data paths.
    ///
    /// Either path can be `None` to fall back to the system default.
    pub fn with_espeak(bin_path: Option<PathBuf>, data_path: Option<PathBuf>) -> Self {
        let mut engine = Self::new();
        engine.espeak = EspeakConfig { bin_path, data_path };
        engine
    }

    /// Set the parameters used when `synthesize` is called with `None`.
    pub fn with_default_params(mut self, defaults: PiperInferenceParams) -> Self {
        self.defaults = defaults;
        self
    }

    /// Sample rate of the loaded voice.
    pub fn sample_rate(&self) -> Option<u32> {
        self.model.as_ref().map(|m| m.config().sample_rate)
    }

    pub fn model_path(&self) -> Option<&Path> {
        self.model_path.as_deref()
    }
}

impl Drop for PiperEngine {
    fn drop(&mut self) {
        self.unload_model();
    }
}

impl SynthesisEngine for PiperEngine {
    type SynthesisParams = PiperInferenceParams;
    type ModelParams = PiperModelParams;

    fn load_model_with_params(
        &mut self,
        model_path: &Path,
        params: Self::ModelParams,
    ) -> Result<(), BoxError> {
        let config_path = params
            .config_path
            .unwrap_or_else(|| voice_config_path(model_path));
        let model = PiperModel::load(model_path, &config_path, params.num_threads)?;
        self.model = Some(model);
        self.model_path = Some(model_path.to_path_buf());
        Ok(())
    }

    fn unload_model(&mut self) {
        self.model = None;
        self.model_path = None;
    }

    fn synthesize(
        &mut self,
        text: &str,
        params: Option<Self::SynthesisParams>,
    ) -> Result<SynthesisResult, BoxError> {
        let model = self.model.as_mut().ok_or(PiperError::ModelNotLoaded)?;

        let p = params.unwrap_or_else(|| self.defaults.clone());
        let scales = p.resolve(model.config());
        let samples = model.synthesize_text(text, scales, &self.espeak)?;

        Ok(SynthesisResult {
            samples,
            sample_rate: model.config().sample_rate,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{PiperEngine, PiperInferenceParams, PiperModelParams};
    use crate::engines::piper::config::VoiceConfig;
    use crate::SynthesisEngine;

    #[test]
    fn explicit_params_override_voice_defaults() {
        let config = VoiceConfig::from_json(
            r#"{"audio": {"sample_rate": 22050},
                "inference": {"noise_scale": 0.5, "length_scale": 1.0, "noise_w": 0.6},
                "phoneme_id_map": {}}"#,
        )
        .unwrap();
        let scales = PiperInferenceParams {
            length_scale: Some(1.3),
            ..Default::default()
        }
        .resolve(&config);
        assert_eq!(scales.length_scale, 1.3);
        assert_eq!(scales.noise_scale, 0.5);
        assert_eq!(scales.noise_w, 0.6);
        assert_eq!(scales.speaker_id, 0);
    }

    #[test]
    fn synthesize_without_model_fails() {
        let mut engine = PiperEngine::new();
        let err = engine.synthesize("नमस्ते", None).unwrap_err();
        assert!(err.to_string().contains("Model not loaded"));
    }

    #[test]
    fn missing_model_file_fails_to_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = PiperEngine::new();
        let err = engine
            .load_model_with_params(&dir.path().join("missing.onnx"), PiperModelParams::default())
            .unwrap_err();
        assert!(err.to_string().contains("Model file not found"));
        assert!(engine.model_path().is_none());
        assert!(engine.sample_rate().is_none());
    }
}
