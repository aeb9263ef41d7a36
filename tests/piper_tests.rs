//! End-to-end checks against a real Piper voice.
//!
//! Set `TTS_MODEL_PATH` to a Piper `.onnx` voice (with its `.onnx.json` next
//! to it) and install espeak-ng to run these; otherwise they skip.

#![cfg(feature = "piper")]

use std::path::PathBuf;
use std::process::Command;

use hindi_tts::engines::piper::{PiperEngine, PiperInferenceParams};
use hindi_tts::{AudioService, ServiceConfigBuilder, SynthesisEngine};

fn load_engine() -> Option<PiperEngine> {
    let model = PathBuf::from(std::env::var_os("TTS_MODEL_PATH")?);
    if Command::new("espeak-ng").arg("--version").output().is_err() {
        println!("Skipping Piper test: espeak-ng not installed");
        return None;
    }

    let mut engine = PiperEngine::new();
    match engine.load_model(&model) {
        Ok(()) => Some(engine),
        Err(e) => {
            println!("Skipping Piper test: could not load model: {e}");
            None
        }
    }
}

#[test]
fn synthesizes_hindi_sentence() {
    let Some(mut engine) = load_engine() else {
        return;
    };

    let result = engine
        .synthesize("हेलो, यह एक टेस्ट है।", None)
        .expect("synthesis should succeed");
    assert!(!result.samples.is_empty());
    assert_eq!(Some(result.sample_rate), engine.sample_rate());
    assert!(result.duration_secs() > 0.3);
}

#[test]
fn slower_length_scale_makes_longer_audio() {
    let Some(mut engine) = load_engine() else {
        return;
    };
    let text = "यह एक लंबा वाक्य है जिसे धीरे बोला जाएगा।";

    let normal = engine
        .synthesize(
            text,
            Some(PiperInferenceParams {
                length_scale: Some(1.0),
                noise_w: Some(0.0),
                ..Default::default()
            }),
        )
        .unwrap();
    let slow = engine
        .synthesize(
            text,
            Some(PiperInferenceParams {
                length_scale: Some(1.5),
                noise_w: Some(0.0),
                ..Default::default()
            }),
        )
        .unwrap();

    assert!(slow.samples.len() > normal.samples.len());
}

#[test]
fn service_produces_wav_from_real_voice() {
    let Some(engine) = load_engine() else {
        return;
    };
    let scratch = tempfile::tempdir().unwrap();
    let config = ServiceConfigBuilder::default()
        .scratch_dir(scratch.path())
        .build()
        .unwrap();
    let service = AudioService::new(engine, config);

    let audio = service.generate_audio("नमस्ते दुनिया").unwrap();

    assert_eq!(&audio[0..4], b"RIFF");
    assert!(audio.len() > 44);
    assert!(std::fs::read_dir(scratch.path()).unwrap().next().is_none());
}
