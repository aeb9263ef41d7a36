use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::Deserialize;

use crate::server::state::AppState;
use crate::SynthesisEngine;

/// Sentence synthesized by `/output` when no text is given.
pub const DEFAULT_TEXT: &str = "हेलो, यह एक टेस्ट है।";

pub const INDEX_HTML: &str = r#"
    <h2>✅ Piper TTS Hindi Ready</h2>
    <p>Use <code>GET /output?text=हेलो+यह+एक+टेस्ट+है</code> to download/play audio.</p>
    <p>Or <code>POST /generate</code> with JSON body {"text": "हेलो यह एक टेस्ट है"}</p>
    <p>Try <a href="/output">/output</a> for a test audio.</p>
    "#;

const MISSING_TEXT: &str = "Bad Request: Missing text";

pub async fn index() -> Html<&'static str> {
    log::info!("Accessing home route");
    Html(INDEX_HTML)
}

pub async fn ping() -> &'static str {
    log::info!("Ping route accessed");
    "OK"
}

#[derive(Debug, Deserialize)]
pub struct OutputQuery {
    text: Option<String>,
}

pub async fn output<E>(
    State(state): State<AppState<E>>,
    Query(query): Query<OutputQuery>,
) -> Response
where
    E: SynthesisEngine + Send + 'static,
{
    log::info!("Accessing output route");
    let text = query
        .text
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| DEFAULT_TEXT.to_string());

    synthesize_response(state, text, "output").await
}

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    text: String,
}

pub async fn generate<E>(
    State(state): State<AppState<E>>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Response
where
    E: SynthesisEngine + Send + 'static,
{
    log::info!("Accessing generate route");
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            log::error!("Bad Request: Missing text ({rejection})");
            return (StatusCode::BAD_REQUEST, MISSING_TEXT).into_response();
        }
    };

    synthesize_response(state, request.text, "generate").await
}

async fn synthesize_response<E>(state: AppState<E>, text: String, route: &str) -> Response
where
    E: SynthesisEngine + Send + 'static,
{
    match state.service.generate_audio_async(text).await {
        Ok(audio) => wav_attachment(audio),
        Err(e) => {
            log::error!("Error in {route} route: {e}");
            e.into_response()
        }
    }
}

fn wav_attachment(audio: Vec<u8>) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "audio/wav"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"output.wav\""),
        ],
        audio,
    )
        .into_response()
}
