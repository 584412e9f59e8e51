//! Delayed provider - wraps another provider with artificial latency.

use std::time::Duration;

use async_trait::async_trait;
use speech_core::{CreditBalance, SpeechError, SpeechSynthesizer, Voice, VoiceSettings};
use tokio::time::sleep;

/// A provider that wraps another provider and delays each synthesis call.
///
/// Useful for holding an episode in GENERATING while a second request races it.
pub struct DelayedSpeech<S: SpeechSynthesizer> {
    inner: S,
    delay: Duration,
}

impl<S: SpeechSynthesizer> DelayedSpeech<S> {
    /// Create a new DelayedSpeech wrapping the given provider.
    pub fn new(inner: S, delay: Duration) -> Self {
        Self { inner, delay }
    }

    /// Create a provider with a delay in milliseconds.
    pub fn with_millis(inner: S, millis: u64) -> Self {
        Self::new(inner, Duration::from_millis(millis))
    }

    /// Get the wrapped provider.
    pub fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<S: SpeechSynthesizer> SpeechSynthesizer for DelayedSpeech<S> {
    async fn synthesize(
        &self,
        voice_id: &str,
        text: &str,
        settings: &VoiceSettings,
    ) -> Result<Vec<u8>, SpeechError> {
        sleep(self.delay).await;
        self.inner.synthesize(voice_id, text, settings).await
    }

    async fn list_voices(&self) -> Result<Vec<Voice>, SpeechError> {
        self.inner.list_voices().await
    }

    async fn remaining_credits(&self) -> Result<CreditBalance, SpeechError> {
        self.inner.remaining_credits().await
    }

    fn max_chars_per_request(&self) -> usize {
        self.inner.max_chars_per_request()
    }

    fn name(&self) -> &str {
        "DelayedSpeech"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ScriptedSpeech;
    use std::time::Instant;

    #[tokio::test]
    async fn test_delayed_speech() {
        let speech = DelayedSpeech::with_millis(ScriptedSpeech::new(), 100);

        let start = Instant::now();
        let audio = speech
            .synthesize("v", "test", &VoiceSettings::default())
            .await
            .unwrap();
        let elapsed = start.elapsed();

        assert_eq!(audio, b"<test>");
        assert!(elapsed >= Duration::from_millis(100));
        assert_eq!(speech.inner().call_count(), 1);
    }

    #[tokio::test]
    async fn test_provider_name() {
        let speech = DelayedSpeech::with_millis(ScriptedSpeech::new(), 0);
        assert_eq!(speech.name(), "DelayedSpeech");
    }
}
