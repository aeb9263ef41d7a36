use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use super::model::PiperError;

/// Voice configuration shipped next to a Piper model as `<model>.onnx.json`.
#[derive(Debug, Clone)]
pub struct VoiceConfig {
    pub sample_rate: u32,
    /// espeak-ng voice used for phonemization (e.g. `"hi"`).
    pub espeak_voice: String,
    pub inference: InferenceDefaults,
    pub num_speakers: u32,
    pub language_code: Option<String>,
    pub phoneme_id_map: HashMap<char, Vec<i64>>,
}

/// Default synthesis scales from the `inference` section.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct InferenceDefaults {
    #[serde(default = "default_noise_scale")]
    pub noise_scale: f32,
    #[serde(default = "default_length_scale")]
    pub length_scale: f32,
    #[serde(default = "default_noise_w")]
    pub noise_w: f32,
}

impl Default for InferenceDefaults {
    fn default() -> Self {
        Self {
            noise_scale: default_noise_scale(),
            length_scale: default_length_scale(),
            noise_w: default_noise_w(),
        }
    }
}

fn default_noise_scale() -> f32 {
    0.667
}

fn default_length_scale() -> f32 {
    1.0
}

fn default_noise_w() -> f32 {
    0.8
}

#[derive(Deserialize)]
struct RawConfig {
    audio: RawAudio,
    #[serde(default)]
    espeak: Option<RawEspeak>,
    #[serde(default)]
    inference: InferenceDefaults,
    #[serde(default = "default_num_speakers")]
    num_speakers: u32,
    #[serde(default)]
    language: Option<RawLanguage>,
    phoneme_id_map: HashMap<String, Vec<i64>>,
}

#[derive(Deserialize)]
struct RawAudio {
    sample_rate: u32,
}

#[derive(Deserialize)]
struct RawEspeak {
    voice: String,
}

#[derive(Deserialize)]
struct RawLanguage {
    code: String,
}

fn default_num_speakers() -> u32 {
    1
}

impl VoiceConfig {
    /// Load the voice configuration from a `.onnx.json` file.
    pub fn load(config_path: &Path) -> Result<Self, PiperError> {
        let content = std::fs::read_to_string(config_path)?;
        Self::from_json(&content)
    }

    /// Parse the voice configuration from its JSON text.
    pub fn from_json(content: &str) -> Result<Self, PiperError> {
        let raw: RawConfig = serde_json::from_str(content)
            .map_err(|e| PiperError::Config(format!("Failed to parse JSON: {e}")))?;

        if raw.audio.sample_rate == 0 {
            return Err(PiperError::Config("audio.sample_rate must be positive".to_string()));
        }

        let mut phoneme_id_map = HashMap::with_capacity(raw.phoneme_id_map.len());
        for (k, ids) in raw.phoneme_id_map {
            let mut chars = k.chars();
            let ch = chars
                .next()
                .ok_or_else(|| PiperError::Config(format!("Empty key in phoneme_id_map: {k:?}")))?;
            if chars.next().is_some() {
                return Err(PiperError::Config(format!(
                    "phoneme_id_map key {k:?} must be a single character"
                )));
            }
            phoneme_id_map.insert(ch, ids);
        }

        let espeak_voice = match raw.espeak {
            Some(espeak) => espeak.voice,
            None => {
                log::warn!("Voice config has no espeak section, defaulting to 'hi'");
                "hi".to_string()
            }
        };

        Ok(Self {
            sample_rate: raw.audio.sample_rate,
            espeak_voice,
            inference: raw.inference,
            num_speakers: raw.num_speakers,
            language_code: raw.language.map(|l| l.code),
            phoneme_id_map,
        })
    }
}
