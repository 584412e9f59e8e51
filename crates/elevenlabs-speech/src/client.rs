//! ElevenLabsSpeech implementation using the ElevenLabs HTTP API.

use std::time::Duration;

use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Client, Response, StatusCode};
use speech_core::{
    async_trait, CreditBalance, SpeechError, SpeechSynthesizer, Voice, VoiceSettings,
};
use tracing::{debug, info, warn};

use crate::api_types::{
    ApiErrorBody, SubscriptionResponse, TextToSpeechRequest, VoiceSettingsPayload, VoicesResponse,
};
use crate::config::ElevenLabsConfig;

/// Longest provider message carried into an error.
const MAX_ERROR_MESSAGE_CHARS: usize = 300;

/// A speech provider backed by the ElevenLabs API.
///
/// The provider performs exactly one HTTP call per trait method and never
/// retries; failures are classified so the caller can decide.
pub struct ElevenLabsSpeech {
    client: Client,
    config: ElevenLabsConfig,
}

impl ElevenLabsSpeech {
    /// Create a new provider with the given configuration.
    pub fn new(config: ElevenLabsConfig) -> Result<Self, SpeechError> {
        if config.api_key.trim().is_empty() {
            return Err(SpeechError::Configuration("API key is empty".to_string()));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                SpeechError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        info!(
            "ElevenLabs speech initialized with model: {}, format: {}, max chars: {}",
            config.model_id, config.output_format, config.max_chars_per_request
        );

        Ok(Self { client, config })
    }

    /// Create a provider from environment variables.
    ///
    /// See [`ElevenLabsConfig::from_env`] for required environment variables.
    pub fn from_env() -> Result<Self, SpeechError> {
        Self::new(ElevenLabsConfig::from_env()?)
    }

    /// Get the configuration.
    pub fn config(&self) -> &ElevenLabsConfig {
        &self.config
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, SpeechError> {
        let url = format!("{}{}", self.config.api_url, path);
        let response = self
            .client
            .get(&url)
            .header("xi-api-key", &self.config.api_key)
            .send()
            .await
            .map_err(transport_error)?;

        let response = check_status(response).await?;
        response
            .json()
            .await
            .map_err(|e| SpeechError::Unavailable(format!("Failed to parse response: {}", e)))
    }
}

#[async_trait]
impl SpeechSynthesizer for ElevenLabsSpeech {
    async fn synthesize(
        &self,
        voice_id: &str,
        text: &str,
        settings: &VoiceSettings,
    ) -> Result<Vec<u8>, SpeechError> {
        if !is_valid_voice_id(voice_id) {
            return Err(SpeechError::InvalidInput(format!(
                "invalid voice id: {:?}",
                voice_id
            )));
        }
        let chars = text.chars().count();
        if chars > self.config.max_chars_per_request {
            return Err(SpeechError::InvalidInput(format!(
                "text has {} characters, limit is {}",
                chars, self.config.max_chars_per_request
            )));
        }

        let url = format!("{}/v1/text-to-speech/{}", self.config.api_url, voice_id);
        let request = TextToSpeechRequest {
            text,
            model_id: &self.config.model_id,
            voice_settings: VoiceSettingsPayload::from(settings),
        };

        debug!("Sending text-to-speech request: {:?}", request);

        let response = self
            .client
            .post(&url)
            .query(&[("output_format", self.config.output_format.as_str())])
            .header("xi-api-key", &self.config.api_key)
            .header("Accept", "audio/mpeg")
            .json(&request)
            .send()
            .await
            .map_err(transport_error)?;

        let response = check_status(response).await?;
        let audio = response
            .bytes()
            .await
            .map_err(|e| SpeechError::Unavailable(format!("Failed to read audio: {}", e)))?;

        debug!(voice_id, chars, bytes = audio.len(), "Received audio");
        Ok(audio.to_vec())
    }

    async fn list_voices(&self) -> Result<Vec<Voice>, SpeechError> {
        let response: VoicesResponse = self.get_json("/v1/voices").await?;
        Ok(response.voices.into_iter().map(Voice::from).collect())
    }

    async fn remaining_credits(&self) -> Result<CreditBalance, SpeechError> {
        let response: SubscriptionResponse = self.get_json("/v1/user/subscription").await?;
        Ok(CreditBalance::from(response))
    }

    fn max_chars_per_request(&self) -> usize {
        self.config.max_chars_per_request
    }

    fn name(&self) -> &str {
        "ElevenLabs"
    }
}

/// Map a failing ElevenLabs response onto a [`SpeechError`].
///
/// - 429 is a rate limit, with `retry_after` from the header
/// - 402, or 401/403 whose detail status is `quota_exceeded`, is quota exhaustion
/// - 5xx is provider unavailability
/// - anything else is a rejection carrying the provider message
pub fn classify_error(status: u16, retry_after: Option<Duration>, body: &str) -> SpeechError {
    let detail = serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .map(|parsed| parsed.detail);
    let detail_status = detail.as_ref().and_then(|d| d.status());
    let message = detail
        .as_ref()
        .and_then(|d| d.message())
        .unwrap_or(body)
        .trim();
    let message = truncate(message, MAX_ERROR_MESSAGE_CHARS);

    match status {
        429 => SpeechError::RateLimited { retry_after },
        402 => SpeechError::QuotaExceeded(message),
        401 | 403 if detail_status == Some("quota_exceeded") => SpeechError::QuotaExceeded(message),
        500..=599 => SpeechError::Unavailable(format!("HTTP {}: {}", status, message)),
        _ => SpeechError::Rejected { status, message },
    }
}

/// Parse a `Retry-After` header given in seconds.
fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

async fn check_status(response: Response) -> Result<Response, SpeechError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let retry_after = parse_retry_after(response.headers());
    let body = response.text().await.unwrap_or_default();
    let error = classify_error(status.as_u16(), retry_after, &body);

    if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        warn!("ElevenLabs request failed ({}): {}", status.as_u16(), error);
    } else {
        debug!("ElevenLabs request rejected ({}): {}", status.as_u16(), error);
    }
    Err(error)
}

fn transport_error(e: reqwest::Error) -> SpeechError {
    if e.is_timeout() {
        SpeechError::Unavailable("request timed out".to_string())
    } else {
        SpeechError::Unavailable(format!("Failed to send request: {}", e))
    }
}

fn is_valid_voice_id(voice_id: &str) -> bool {
    !voice_id.is_empty()
        && voice_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}…", &text[..idx]),
        None => text.to_string(),
    }
}
