//! Long-text synthesis on top of a single-request provider.

use crate::error::SpeechError;
use crate::text::{chunk_text, clean_script, truncate_at_word_boundary};
use crate::trait_def::SpeechSynthesizer;
use crate::voice::{Voice, VoiceSettings};

/// Longest text, in characters, sent for a voice preview.
pub const PREVIEW_MAX_CHARS: usize = 500;

/// Synthesize text of any length into one audio stream.
///
/// The text is split into chunks that fit the provider's per-request limit,
/// synthesized one after another and concatenated in order. The first failing
/// chunk aborts the whole operation with its error; no partial audio is
/// returned. `text` should already be cleaned with [`clean_script`].
pub async fn generate_speech<S>(
    synth: &S,
    voice_id: &str,
    text: &str,
    settings: &VoiceSettings,
) -> Result<Vec<u8>, SpeechError>
where
    S: SpeechSynthesizer + ?Sized,
{
    if voice_id.trim().is_empty() {
        return Err(SpeechError::InvalidInput("voice id is required".to_string()));
    }

    let chunks = chunk_text(text, synth.max_chars_per_request());
    if chunks.is_empty() {
        return Err(SpeechError::InvalidInput("text is empty".to_string()));
    }

    tracing::debug!(
        provider = synth.name(),
        voice_id,
        chunks = chunks.len(),
        "Synthesizing speech"
    );

    let mut audio = Vec::new();
    for (index, chunk) in chunks.iter().enumerate() {
        let bytes = synth
            .synthesize(voice_id, chunk, settings)
            .await
            .inspect_err(|e| {
                tracing::warn!(
                    provider = synth.name(),
                    chunk = index,
                    "Speech chunk failed: {}",
                    e
                );
            })?;
        audio.extend_from_slice(&bytes);
    }

    tracing::info!(
        provider = synth.name(),
        chunks = chunks.len(),
        bytes = audio.len(),
        "Speech synthesized"
    );
    Ok(audio)
}

/// Synthesize a short sample of a script with the given voice.
///
/// The script is cleaned and truncated to [`PREVIEW_MAX_CHARS`] at a word
/// boundary before synthesis.
pub async fn generate_preview<S>(
    synth: &S,
    text: &str,
    voice_id: &str,
    settings: &VoiceSettings,
) -> Result<Vec<u8>, SpeechError>
where
    S: SpeechSynthesizer + ?Sized,
{
    let cleaned = clean_script(text);
    let sample = truncate_at_word_boundary(&cleaned, PREVIEW_MAX_CHARS);
    generate_speech(synth, voice_id, sample, settings).await
}

/// Voices that speak Spanish.
pub async fn spanish_voices<S>(synth: &S) -> Result<Vec<Voice>, SpeechError>
where
    S: SpeechSynthesizer + ?Sized,
{
    let voices = synth.list_voices().await?;
    Ok(voices.into_iter().filter(Voice::is_spanish).collect())
}
