//! Piper text-to-speech engine implementation.
//!
//! This module provides a Piper-based synthesis engine that runs a Piper VITS
//! voice exported to ONNX. The engine uses espeak-ng for phonemization.
//!
//! # System Requirements
//!
//! **espeak-ng** must be installed on your system:
//! - **Linux**: `sudo apt-get install espeak-ng`
//! - **macOS**: `brew install espeak-ng`
//! - **Windows**: Download installer from <https://espeak-ng.org/download>
//!
//! # Model Layout
//!
//! ```text
//! models/
//! ├── hi_IN-pratham-medium.onnx        # VITS voice (22050 Hz, mono)
//! └── hi_IN-pratham-medium.onnx.json   # sample rate, espeak voice, phoneme_id_map
//! ```
//!
//! Download links:
//! - Voices: <https://huggingface.co/rhasspy/piper-voices>
//!
//! # Examples
//!
//! ```rust,no_run
//! use hindi_tts::{SynthesisEngine, engines::piper::{PiperEngine, PiperInferenceParams}};
//! use std::path::PathBuf;
//!
//! let mut engine = PiperEngine::new();
//! engine.load_model(&PathBuf::from("models/hi_IN-pratham-medium.onnx"))?;
//!
//! let params = PiperInferenceParams {
//!     length_scale: Some(1.1),
//!     ..Default::default()
//! };
//!
//! engine.synthesize_to_file("नमस्ते दुनिया", &PathBuf::from("out.wav"), Some(params))?;
//! # Ok::<(), Box<dyn std::error::Error + Send + Sync>>(())
//! ```

pub mod config;
pub mod engine;
pub mod model;
pub mod phonemizer;

pub use config::VoiceConfig;
pub use engine::{PiperEngine, PiperInferenceParams, PiperModelParams};
pub use model::PiperError;
