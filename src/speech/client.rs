use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{header, Client};
use tracing::debug;

use super::dto::{Synthesis, SynthesisBody, VoiceSettings};
use crate::{
    error::UpstreamError,
    upstream::{bytes_body, endpoint},
};

const SERVICE: &str = "ElevenLabs";

/// Text-to-speech service.
#[async_trait]
pub trait SpeechApi: Send + Sync {
    /// Returns MPEG audio for the given text.
    async fn synthesize(&self, request: &Synthesis) -> Result<Bytes, UpstreamError>;
}

#[derive(Clone)]
pub struct ElevenLabsClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
}

impl ElevenLabsClient {
    pub fn new(http: Client, base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            api_key,
        }
    }
}

#[async_trait]
impl SpeechApi for ElevenLabsClient {
    async fn synthesize(&self, request: &Synthesis) -> Result<Bytes, UpstreamError> {
        let key = self
            .api_key
            .as_deref()
            .ok_or(UpstreamError::MissingCredential(SERVICE))?;
        let url = endpoint(
            &self.base_url,
            &format!("v1/text-to-speech/{}", urlencoding::encode(&request.voice_id)),
        );
        debug!(%url, model = %request.model_id, chars = request.text.len(), "requesting speech");

        let response = self
            .http
            .post(&url)
            .header("xi-api-key", key)
            .header(header::ACCEPT, "audio/mpeg")
            .json(&SynthesisBody {
                text: &request.text,
                model_id: &request.model_id,
                voice_settings: VoiceSettings::default(),
            })
            .send()
            .await?;
        bytes_body(SERVICE, response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_key_fails_without_request() {
        let client = ElevenLabsClient::new(Client::new(), "http://127.0.0.1:9", None);
        let err = client
            .synthesize(&Synthesis {
                text: "hello".into(),
                voice_id: "v".into(),
                model_id: "m".into(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "ElevenLabs API key not configured");
    }
}
