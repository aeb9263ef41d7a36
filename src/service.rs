//! Audio generation: normalize, synthesize, package as WAV.
//!
//! [`AudioService`] owns the loaded voice for the lifetime of the process.
//! Calls into the engine are serialized behind a mutex, and each call writes
//! to its own scratch file which is removed before the call returns.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use derive_builder::Builder;

use crate::error::SynthesisError;
use crate::text::{TextNormalizer, DEFAULT_LANGUAGE};
use crate::SynthesisEngine;

/// Settings for [`AudioService`].
#[derive(Debug, Clone, Builder)]
#[builder(default)]
pub struct ServiceConfig {
    /// Tokenizer language tag.
    #[builder(setter(into))]
    pub language: String,
    /// Directory for scratch WAV files. `None` uses the system temp dir.
    #[builder(setter(into, strip_option))]
    pub scratch_dir: Option<PathBuf>,
    /// Upper bound on one synthesis call made through the async entry point.
    #[builder(setter(strip_option))]
    pub synthesis_timeout: Option<Duration>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            language: DEFAULT_LANGUAGE.to_string(),
            scratch_dir: None,
            synthesis_timeout: None,
        }
    }
}

/// Turns text into complete in-memory WAV files using one loaded engine.
pub struct AudioService<E: SynthesisEngine> {
    engine: Mutex<E>,
    normalizer: TextNormalizer,
    scratch_dir: PathBuf,
    synthesis_timeout: Option<Duration>,
}

impl<E: SynthesisEngine> AudioService<E> {
    /// Wrap an already loaded engine.
    pub fn new(engine: E, config: ServiceConfig) -> Self {
        Self {
            engine: Mutex::new(engine),
            normalizer: TextNormalizer::new(config.language),
            scratch_dir: config.scratch_dir.unwrap_or_else(std::env::temp_dir),
            synthesis_timeout: config.synthesis_timeout,
        }
    }

    pub fn normalizer(&self) -> &TextNormalizer {
        &self.normalizer
    }

    pub fn scratch_dir(&self) -> &std::path::Path {
        &self.scratch_dir
    }

    /// Generate a complete WAV file for `text`.
    ///
    /// Blocks the calling thread for the duration of synthesis, including
    /// the wait for any synthesis already in progress.
    pub fn generate_audio(&self, text: &str) -> Result<Vec<u8>, SynthesisError> {
        match self.render(text) {
            Ok(audio) => {
                log::info!(
                    "Audio generated successfully for text: {text} ({} bytes)",
                    audio.len()
                );
                Ok(audio)
            }
            Err(e) => {
                log::error!("Error generating audio: {e}");
                Err(e)
            }
        }
    }

    fn render(&self, text: &str) -> Result<Vec<u8>, SynthesisError> {
        let processed = self.normalizer.normalize(text);
        log::debug!("Normalized text: {processed}");

        // Removed on drop, including every early return below.
        let scratch = tempfile::Builder::new()
            .prefix("tts-")
            .suffix(".wav")
            .tempfile_in(&self.scratch_dir)?;

        {
            let mut engine = self.engine.lock().map_err(|_| SynthesisError::Poisoned)?;
            engine
                .synthesize_to_file(&processed, scratch.path(), None)
                .map_err(|e| SynthesisError::Engine(e.to_string()))?;
        }

        let audio = std::fs::read(scratch.path())?;
        scratch.close()?;
        Ok(audio)
    }
}

impl<E> AudioService<E>
where
    E: SynthesisEngine + Send + 'static,
{
    /// Run [`generate_audio`](Self::generate_audio) on the blocking pool,
    /// bounded by the configured timeout.
    ///
    /// On timeout the worker keeps running to completion in the background
    /// and still removes its scratch file.
    pub async fn generate_audio_async(
        self: Arc<Self>,
        text: String,
    ) -> Result<Vec<u8>, SynthesisError> {
        let limit = self.synthesis_timeout;
        let task = tokio::task::spawn_blocking(move || self.generate_audio(&text));

        let joined = match limit {
            Some(limit) => tokio::time::timeout(limit, task).await.map_err(|_| {
                log::error!("Synthesis timed out after {limit:?}");
                SynthesisError::Timeout(limit)
            })?,
            None => task.await,
        };

        joined.map_err(|e| SynthesisError::Worker(e.to_string()))?
    }
}

#[cfg(test)]
mod tests {
    use super::{AudioService, ServiceConfig, ServiceConfigBuilder};
    use crate::error::SynthesisError;
    use crate::{BoxError, SynthesisEngine, SynthesisResult};
    use std::path::Path;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// Records the text it receives and fails on demand.
    #[derive(Default)]
    struct RecordingEngine {
        seen: Arc<Mutex<Vec<String>>>,
        delay: Option<Duration>,
    }

    impl SynthesisEngine for RecordingEngine {
        type SynthesisParams = ();
        type ModelParams = ();

        fn load_model_with_params(&mut self, _: &Path, _: ()) -> Result<(), BoxError> {
            Ok(())
        }

        fn unload_model(&mut self) {}

        fn synthesize(&mut self, text: &str, _: Option<()>) -> Result<SynthesisResult, BoxError> {
            self.seen.lock().unwrap().push(text.to_string());
            if let Some(delay) = self.delay {
                std::thread::sleep(delay);
            }
            match text {
                "fail" => Err("engine fault".into()),
                "panic" => panic!("engine crashed"),
                _ => Ok(SynthesisResult {
                    samples: vec![0.5; 100 * text.chars().count()],
                    sample_rate: 16000,
                }),
            }
        }
    }

    fn service_in(dir: &Path, engine: RecordingEngine) -> AudioService<RecordingEngine> {
        let config = ServiceConfigBuilder::default()
            .scratch_dir(dir)
            .build()
            .unwrap();
        AudioService::new(engine, config)
    }

    fn scratch_files(dir: &Path) -> usize {
        std::fs::read_dir(dir).unwrap().count()
    }

    #[test]
    fn default_config_targets_hindi_and_temp_dir() {
        let config = ServiceConfig::default();
        assert_eq!(config.language, "hi");
        assert!(config.scratch_dir.is_none());
        assert!(config.synthesis_timeout.is_none());

        let service = AudioService::new(RecordingEngine::default(), config);
        assert_eq!(service.scratch_dir(), std::env::temp_dir());
        assert_eq!(service.normalizer().language(), "hi");
    }

    #[test]
    fn generates_wav_from_normalized_text() {
        let dir = tempfile::tempdir().unwrap();
        let engine = RecordingEngine::default();
        let seen = Arc::clone(&engine.seen);
        let service = service_in(dir.path(), engine);

        let audio = service.generate_audio("नमस्ते,दुनिया").unwrap();

        assert_eq!(&audio[0..4], b"RIFF");
        assert_eq!(seen.lock().unwrap().as_slice(), ["नमस्ते , दुनिया"]);
        assert_eq!(scratch_files(dir.path()), 0);
    }

    #[test]
    fn engine_failure_surfaces_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let service = service_in(dir.path(), RecordingEngine::default());

        let err = service.generate_audio("fail").unwrap_err();

        assert!(matches!(&err, SynthesisError::Engine(msg) if msg == "engine fault"));
        assert_eq!(scratch_files(dir.path()), 0);
    }

    #[test]
    fn missing_scratch_dir_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let service = service_in(&dir.path().join("gone"), RecordingEngine::default());

        assert!(matches!(
            service.generate_audio("नमस्ते"),
            Err(SynthesisError::Io(_))
        ));
    }

    #[test]
    fn engine_panic_poisons_later_calls() {
        let dir = tempfile::tempdir().unwrap();
        let service = service_in(dir.path(), RecordingEngine::default());

        let crashed = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            service.generate_audio("panic")
        }));
        assert!(crashed.is_err());

        assert!(matches!(
            service.generate_audio("नमस्ते"),
            Err(SynthesisError::Poisoned)
        ));
        assert_eq!(scratch_files(dir.path()), 0);
    }

    #[tokio::test]
    async fn async_generation_runs_on_blocking_pool() {
        let dir = tempfile::tempdir().unwrap();
        let service = Arc::new(service_in(dir.path(), RecordingEngine::default()));

        let audio = service.generate_audio_async("नमस्ते".to_string()).await.unwrap();
        assert_eq!(&audio[0..4], b"RIFF");
    }

    #[tokio::test]
    async fn slow_synthesis_times_out_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let engine = RecordingEngine {
            delay: Some(Duration::from_millis(300)),
            ..Default::default()
        };
        let seen = Arc::clone(&engine.seen);
        let config = ServiceConfigBuilder::default()
            .scratch_dir(dir.path())
            .synthesis_timeout(Duration::from_millis(20))
            .build()
            .unwrap();
        let service = Arc::new(AudioService::new(engine, config));

        let err = Arc::clone(&service)
            .generate_audio_async("नमस्ते".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, SynthesisError::Timeout(d) if d == Duration::from_millis(20)));

        // The abandoned worker finishes on its own and removes its scratch file.
        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        while scratch_files(dir.path()) > 0 || seen.lock().unwrap().is_empty() {
            assert!(tokio::time::Instant::now() < deadline, "worker never finished");
            tokio::time::sleep(Duration::from_millis(20)).await;
        }

        // The engine lock was released, so a call without the timeout succeeds.
        let worker = Arc::clone(&service);
        let audio = tokio::task::spawn_blocking(move || worker.generate_audio("ठीक"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(&audio[0..4], b"RIFF");
        assert_eq!(seen.lock().unwrap().len(), 2);
        assert_eq!(scratch_files(dir.path()), 0);
    }
}
