//! The SpeechSynthesizer trait definition.

use async_trait::async_trait;

use crate::error::SpeechError;
use crate::voice::{CreditBalance, Voice, VoiceSettings};

/// A text-to-speech provider.
///
/// Implementations wrap a hosted API or a fake for tests. This trait is
/// object-safe and is shared as `Arc<dyn SpeechSynthesizer>`.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize one request worth of text into audio bytes.
    ///
    /// `text` must already fit within [`max_chars_per_request`]; use
    /// [`crate::generate_speech`] for longer input.
    ///
    /// [`max_chars_per_request`]: SpeechSynthesizer::max_chars_per_request
    async fn synthesize(
        &self,
        voice_id: &str,
        text: &str,
        settings: &VoiceSettings,
    ) -> Result<Vec<u8>, SpeechError>;

    /// List every voice available to the account.
    async fn list_voices(&self) -> Result<Vec<Voice>, SpeechError>;

    /// Credits left in the current billing period.
    async fn remaining_credits(&self) -> Result<CreditBalance, SpeechError>;

    /// Largest text, in characters, accepted by a single request.
    fn max_chars_per_request(&self) -> usize;

    /// Get a human-readable name for this provider.
    fn name(&self) -> &str;
}
