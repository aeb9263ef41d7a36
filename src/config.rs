//! Command-line and environment configuration for the server binary.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;

use crate::service::ServiceConfig;
use crate::text::DEFAULT_LANGUAGE;

/// Default Piper voice bundled with the container image.
pub const DEFAULT_MODEL_PATH: &str = "/app/models/hi_IN-pratham-medium.onnx";

/// Resolve the voice config path that Piper ships next to a model.
pub fn voice_config_path(model_path: &Path) -> PathBuf {
    let mut name = model_path.as_os_str().to_owned();
    name.push(".json");
    PathBuf::from(name)
}

/// Hindi text-to-speech HTTP server backed by a Piper voice
#[derive(Parser, Debug, Clone)]
#[command(name = "hindi-tts-server", author, version, about, long_about = None)]
pub struct Args {
    /// Path to the Piper ONNX voice model
    #[arg(long, env = "TTS_MODEL_PATH", default_value = DEFAULT_MODEL_PATH)]
    pub model: PathBuf,

    /// Path to the voice config (default: <model>.json)
    #[arg(long, env = "TTS_CONFIG_PATH")]
    pub config: Option<PathBuf>,

    /// Host to bind
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 5000)]
    pub port: u16,

    /// Tokenizer language tag
    #[arg(long, default_value = DEFAULT_LANGUAGE)]
    pub language: String,

    /// Directory for scratch WAV files (default: system temp dir)
    #[arg(long, env = "TTS_SCRATCH_DIR")]
    pub scratch_dir: Option<PathBuf>,

    /// Fail a request whose synthesis takes longer than this many seconds
    #[arg(long)]
    pub synthesis_timeout_secs: Option<u64>,

    /// Number of ONNX Runtime intra-op threads
    #[arg(long)]
    pub num_threads: Option<usize>,

    /// espeak-ng binary (default: espeak-ng from PATH)
    #[arg(long, env = "ESPEAK_NG_BIN")]
    pub espeak_bin: Option<PathBuf>,

    /// espeak-ng data directory
    #[arg(long, env = "ESPEAK_NG_DATA")]
    pub espeak_data: Option<PathBuf>,

    /// Phoneme length multiplier (overrides the voice config)
    #[arg(long)]
    pub length_scale: Option<f32>,

    /// Generator noise (overrides the voice config)
    #[arg(long)]
    pub noise_scale: Option<f32>,

    /// Phoneme width noise (overrides the voice config)
    #[arg(long)]
    pub noise_w: Option<f32>,

    /// Log level used when RUST_LOG is unset
    #[arg(short, long, default_value = "info")]
    pub log_level: String,
}

impl Args {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Voice config path, defaulting to the file next to the model.
    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(|| voice_config_path(&self.model))
    }

    pub fn service_config(&self) -> ServiceConfig {
        ServiceConfig {
            language: self.language.clone(),
            scratch_dir: self.scratch_dir.clone(),
            synthesis_timeout: self.synthesis_timeout_secs.map(Duration::from_secs),
        }
    }
}
