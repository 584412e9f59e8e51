//! Failing provider - every call returns the same error.

use async_trait::async_trait;
use speech_core::{CreditBalance, SpeechError, SpeechSynthesizer, Voice, VoiceSettings};

/// A provider that fails every call with a fixed error.
///
/// Useful for exercising error mapping and cleanup paths.
#[derive(Debug, Clone)]
pub struct FailingSpeech {
    error: SpeechError,
}

impl FailingSpeech {
    pub fn new(error: SpeechError) -> Self {
        Self { error }
    }

    /// Fail with [`SpeechError::Unavailable`].
    pub fn unavailable() -> Self {
        Self::new(SpeechError::Unavailable("provider offline".to_string()))
    }

    /// Fail with [`SpeechError::QuotaExceeded`].
    pub fn quota_exceeded() -> Self {
        Self::new(SpeechError::QuotaExceeded("no credits left".to_string()))
    }
}

#[async_trait]
impl SpeechSynthesizer for FailingSpeech {
    async fn synthesize(
        &self,
        _voice_id: &str,
        _text: &str,
        _settings: &VoiceSettings,
    ) -> Result<Vec<u8>, SpeechError> {
        Err(self.error.clone())
    }

    async fn list_voices(&self) -> Result<Vec<Voice>, SpeechError> {
        Err(self.error.clone())
    }

    async fn remaining_credits(&self) -> Result<CreditBalance, SpeechError> {
        Err(self.error.clone())
    }

    fn max_chars_per_request(&self) -> usize {
        4500
    }

    fn name(&self) -> &str {
        "FailingSpeech"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use speech_core::SpeechErrorKind;

    #[tokio::test]
    async fn test_every_call_fails_with_same_kind() {
        let speech = FailingSpeech::quota_exceeded();

        let err = speech
            .synthesize("v", "hola", &VoiceSettings::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), SpeechErrorKind::QuotaExceeded);

        let err = speech.remaining_credits().await.unwrap_err();
        assert_eq!(err.kind(), SpeechErrorKind::QuotaExceeded);
    }
}
