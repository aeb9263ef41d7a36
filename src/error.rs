use std::path::PathBuf;
use std::time::Duration;

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

/// Failures that stop the process before it serves any request.
#[derive(thiserror::Error, Debug)]
pub enum StartupError {
    #[error("Model file not found at {}", .0.display())]
    ModelNotFound(PathBuf),
    #[error("Voice config not found at {}", .0.display())]
    ConfigNotFound(PathBuf),
    #[error("Failed to load voice model: {0}")]
    ModelLoad(String),
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
}

/// Failure while turning text into a WAV payload.
#[derive(thiserror::Error, Debug)]
pub enum SynthesisError {
    #[error("{0}")]
    Engine(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("synthesis engine is unavailable after an earlier panic")]
    Poisoned,
    #[error("synthesis timed out after {0:?}")]
    Timeout(Duration),
    #[error("synthesis worker failed: {0}")]
    Worker(String),
}

impl IntoResponse for SynthesisError {
    fn into_response(self) -> Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            format!("Error: {self}"),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::SynthesisError;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use std::time::Duration;

    #[tokio::test]
    async fn synthesis_error_maps_to_plain_text_500() {
        let response = SynthesisError::Engine("espeak-ng exited with code 1".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"Error: espeak-ng exited with code 1");
    }

    #[test]
    fn timeout_message_names_duration() {
        let err = SynthesisError::Timeout(Duration::from_secs(30));
        assert_eq!(err.to_string(), "synthesis timed out after 30s");
    }
}
