use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use bytes::Bytes;
use tracing::{error, info, instrument, warn};

use super::dto::{SpeechRequest, Synthesis, FALLBACK_MODEL_ID};
use crate::{
    error::{ApiError, UpstreamError},
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new().route("/text-to-speech", post(text_to_speech))
}

/// POST /text-to-speech
#[instrument(skip(state, body), fields(body_len = body.len()))]
pub async fn text_to_speech(State(state): State<AppState>, body: Bytes) -> Result<Response, ApiError> {
    let request: SpeechRequest = serde_json::from_slice(&body)
        .map_err(|_| ApiError::BadRequest("Invalid request body".into()))?;

    if state.config.upstream.elevenlabs_api_key.is_none() {
        error!("speech requested without ElevenLabs credentials");
        return Err(ApiError::NotConfigured("ElevenLabs API key not configured".into()));
    }
    let Some(text) = request.text() else {
        return Err(ApiError::BadRequest("Text is required".into()));
    };

    let mut synthesis = Synthesis {
        text: text.to_string(),
        voice_id: request.voice_id().to_string(),
        model_id: request.model_id().to_string(),
    };

    let audio = match state.speech.synthesize(&synthesis).await {
        Ok(audio) => Ok(audio),
        Err(e) if e.status() == Some(StatusCode::UNAUTHORIZED) => Err(e),
        Err(e) if is_model_rejection(&e) && synthesis.model_id != FALLBACK_MODEL_ID => {
            warn!(error = %e, model = %synthesis.model_id, "model rejected; retrying with fallback");
            synthesis.model_id = FALLBACK_MODEL_ID.to_string();
            state.speech.synthesize(&synthesis).await
        }
        Err(e) => Err(e),
    }
    .map_err(speech_error)?;

    info!(bytes = audio.len(), model = %synthesis.model_id, "speech generated");
    Ok((
        [
            (header::CONTENT_TYPE, "audio/mpeg".to_string()),
            (header::CONTENT_LENGTH, audio.len().to_string()),
        ],
        audio,
    )
        .into_response())
}

fn is_model_rejection(err: &UpstreamError) -> bool {
    err.status().is_some() && (err.mentions("model") || err.mentions("deprecated"))
}

fn speech_error(err: UpstreamError) -> ApiError {
    match err {
        UpstreamError::MissingCredential(service) => {
            ApiError::NotConfigured(format!("{service} API key not configured"))
        }
        UpstreamError::Unauthorized { status, .. } if status == StatusCode::UNAUTHORIZED => {
            warn!("speech service rejected API key");
            ApiError::Upstream {
                status,
                message: "Invalid API key. Please check your ElevenLabs API key.".into(),
                details: None,
            }
        }
        other => {
            error!(error = %other, "speech generation failed");
            ApiError::Internal(format!("Failed to generate speech: {other}"))
        }
    }
}
