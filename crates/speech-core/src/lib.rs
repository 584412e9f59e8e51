//! Core trait and types for speech synthesis providers.
//!
//! This crate provides the shared interface for all speech providers used by
//! the podcast pipeline. It defines:
//!
//! - [`SpeechSynthesizer`] - The trait that all providers must implement
//! - [`Voice`] / [`VoiceSettings`] / [`CreditBalance`] - Provider-neutral types
//! - [`SpeechError`] - Structured failures (rate limit, quota, unavailable)
//! - [`text`] - Script cleaning, duration and credit estimation, chunking
//! - [`generate_speech`] / [`generate_preview`] - Long-text synthesis helpers
//!
//! # Example
//!
//! ```rust
//! use speech_core::{async_trait, CreditBalance, SpeechError, SpeechSynthesizer, Voice, VoiceSettings};
//!
//! struct Silence;
//!
//! #[async_trait]
//! impl SpeechSynthesizer for Silence {
//!     async fn synthesize(
//!         &self,
//!         _voice_id: &str,
//!         _text: &str,
//!         _settings: &VoiceSettings,
//!     ) -> Result<Vec<u8>, SpeechError> {
//!         Ok(Vec::new())
//!     }
//!
//!     async fn list_voices(&self) -> Result<Vec<Voice>, SpeechError> {
//!         Ok(Vec::new())
//!     }
//!
//!     async fn remaining_credits(&self) -> Result<CreditBalance, SpeechError> {
//!         Ok(CreditBalance::unlimited())
//!     }
//!
//!     fn max_chars_per_request(&self) -> usize {
//!         4500
//!     }
//!
//!     fn name(&self) -> &str {
//!         "Silence"
//!     }
//! }
//! ```

mod error;
mod synthesis;
pub mod text;
mod trait_def;
mod voice;

pub use error::{SpeechError, SpeechErrorKind};
pub use synthesis::{generate_preview, generate_speech, spanish_voices, PREVIEW_MAX_CHARS};
pub use text::{chunk_text, clean_script, estimate_credits, estimate_duration_secs};
pub use trait_def::SpeechSynthesizer;
pub use voice::{CreditBalance, Voice, VoiceSettings};

// Re-export async_trait for convenience
pub use async_trait::async_trait;
