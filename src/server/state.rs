use std::sync::Arc;

use crate::service::AudioService;
use crate::SynthesisEngine;

/// Shared handler state: the single loaded voice behind its service.
pub struct AppState<E: SynthesisEngine> {
    pub service: Arc<AudioService<E>>,
}

impl<E: SynthesisEngine> AppState<E> {
    pub fn new(service: AudioService<E>) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

impl<E: SynthesisEngine> Clone for AppState<E> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
        }
    }
}
