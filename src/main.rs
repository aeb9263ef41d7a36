//! Hindi TTS server
//!
//! Loads the Piper voice once, then serves `/`, `/ping`, `/output` and
//! `/generate` until interrupted.

use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;

use hindi_tts::config::Args;
use hindi_tts::engines::piper::{PiperEngine, PiperInferenceParams, PiperModelParams};
use hindi_tts::{AudioService, StartupError, SynthesisEngine};

fn load_voice(args: &Args) -> Result<PiperEngine, StartupError> {
    let config_path = args.config_path();
    if !args.model.exists() {
        return Err(StartupError::ModelNotFound(args.model.clone()));
    }
    if !config_path.exists() {
        return Err(StartupError::ConfigNotFound(config_path));
    }

    let mut engine = PiperEngine::with_espeak(args.espeak_bin.clone(), args.espeak_data.clone())
        .with_default_params(PiperInferenceParams {
            speaker_id: None,
            length_scale: args.length_scale,
            noise_scale: args.noise_scale,
            noise_w: args.noise_w,
        });

    let params = PiperModelParams {
        config_path: Some(config_path),
        num_threads: args.num_threads,
    };
    engine
        .load_model_with_params(&args.model, params)
        .map_err(|e| StartupError::ModelLoad(e.to_string()))?;
    Ok(engine)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&args.log_level))
        .init();

    let load_start = Instant::now();
    let engine = match load_voice(&args) {
        Ok(engine) => engine,
        Err(e) => {
            log::error!("Failed to load Piper TTS: {e}");
            return Err(e).context("startup aborted");
        }
    };
    log::info!(
        "Piper TTS model {} loaded successfully in {:.2?} (sample rate: {}Hz)",
        args.model.display(),
        load_start.elapsed(),
        engine.sample_rate().unwrap_or_default()
    );

    let service = AudioService::new(engine, args.service_config());
    hindi_tts::server::serve(service, &args.bind_addr()).await
}
