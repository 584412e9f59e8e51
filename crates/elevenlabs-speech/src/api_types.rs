//! ElevenLabs API request and response types.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use speech_core::{CreditBalance, Voice, VoiceSettings};

/// Body of `POST /v1/text-to-speech/{voice_id}`.
#[derive(Debug, Clone, Serialize)]
pub struct TextToSpeechRequest<'a> {
    pub text: &'a str,
    pub model_id: &'a str,
    pub voice_settings: VoiceSettingsPayload,
}

/// Voice settings as the API expects them.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct VoiceSettingsPayload {
    pub stability: f32,
    pub similarity_boost: f32,
    pub style: f32,
    pub use_speaker_boost: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<f32>,
}

impl From<&VoiceSettings> for VoiceSettingsPayload {
    fn from(settings: &VoiceSettings) -> Self {
        Self {
            stability: settings.stability,
            similarity_boost: settings.similarity_boost,
            style: settings.style,
            use_speaker_boost: settings.use_speaker_boost,
            speed: settings.speed,
        }
    }
}

/// Response of `GET /v1/voices`.
#[derive(Debug, Clone, Deserialize)]
pub struct VoicesResponse {
    pub voices: Vec<ApiVoice>,
}

/// A voice as listed by the API.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiVoice {
    pub voice_id: String,
    pub name: Option<String>,
    pub category: Option<String>,
    #[serde(default)]
    pub labels: HashMap<String, String>,
    pub preview_url: Option<String>,
    #[serde(default)]
    pub verified_languages: Vec<VerifiedLanguage>,
}

/// A language the provider has verified for a voice.
#[derive(Debug, Clone, Deserialize)]
pub struct VerifiedLanguage {
    pub language: String,
    pub accent: Option<String>,
}

impl From<ApiVoice> for Voice {
    fn from(voice: ApiVoice) -> Self {
        let verified = voice.verified_languages.first();
        let language = voice
            .labels
            .get("language")
            .cloned()
            .or_else(|| verified.map(|v| v.language.clone()));
        let accent = voice
            .labels
            .get("accent")
            .cloned()
            .or_else(|| verified.and_then(|v| v.accent.clone()));

        Voice {
            name: voice.name.unwrap_or_else(|| voice.voice_id.clone()),
            voice_id: voice.voice_id,
            category: voice.category,
            language,
            accent,
            preview_url: voice.preview_url,
        }
    }
}

/// Response of `GET /v1/user/subscription` (fields we use).
#[derive(Debug, Clone, Deserialize)]
pub struct SubscriptionResponse {
    pub character_count: i64,
    pub character_limit: i64,
    pub next_character_count_reset_unix: Option<i64>,
}

impl From<SubscriptionResponse> for CreditBalance {
    fn from(subscription: SubscriptionResponse) -> Self {
        let reset_date = subscription
            .next_character_count_reset_unix
            .and_then(|secs| chrono::DateTime::from_timestamp(secs, 0))
            .map(|date| date.to_rfc3339_opts(chrono::SecondsFormat::Secs, true));

        CreditBalance {
            remaining: (subscription.character_limit - subscription.character_count).max(0),
            total: subscription.character_limit,
            reset_date,
        }
    }
}

/// Error body. `detail` is either a string or a `{status, message}` object.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    pub detail: ApiErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ApiErrorDetail {
    Structured {
        status: Option<String>,
        message: Option<String>,
    },
    Text(String),
}

impl ApiErrorDetail {
    pub fn status(&self) -> Option<&str> {
        match self {
            ApiErrorDetail::Structured { status, .. } => status.as_deref(),
            ApiErrorDetail::Text(_) => None,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            ApiErrorDetail::Structured { message, .. } => message.as_deref(),
            ApiErrorDetail::Text(text) => Some(text),
        }
    }
}
