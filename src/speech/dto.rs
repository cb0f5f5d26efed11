use serde::{Deserialize, Serialize};

pub const DEFAULT_VOICE_ID: &str = "21m00Tcm4TlvDq8ikWAM";
pub const DEFAULT_MODEL_ID: &str = "eleven_turbo_v2_5";
/// Tried once when the primary model is rejected.
pub const FALLBACK_MODEL_ID: &str = "eleven_turbo_v2";

/// Body of `POST /api/text-to-speech`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpeechRequest {
    pub text: Option<String>,
    pub voice_id: Option<String>,
    pub model_id: Option<String>,
}

impl SpeechRequest {
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref().filter(|t| !t.trim().is_empty())
    }

    pub fn voice_id(&self) -> &str {
        self.voice_id
            .as_deref()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(DEFAULT_VOICE_ID)
    }

    pub fn model_id(&self) -> &str {
        self.model_id
            .as_deref()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(DEFAULT_MODEL_ID)
    }
}

/// One synthesis call as sent upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Synthesis {
    pub text: String,
    pub voice_id: String,
    pub model_id: String,
}

#[derive(Debug, Serialize)]
pub struct VoiceSettings {
    pub stability: f32,
    pub similarity_boost: f32,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            stability: 0.5,
            similarity_boost: 0.75,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SynthesisBody<'a> {
    pub text: &'a str,
    pub model_id: &'a str,
    pub voice_settings: VoiceSettings,
}
