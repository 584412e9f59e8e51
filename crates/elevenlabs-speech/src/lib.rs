//! ElevenLabs text-to-speech provider.
//!
//! This crate implements [`SpeechSynthesizer`] on top of the ElevenLabs HTTP
//! API. It covers synthesis, the voice catalogue and the subscription credit
//! balance, and maps provider failures onto [`SpeechError`] kinds so callers
//! can tell a rate limit from an exhausted quota.
//!
//! # Usage
//!
//! ```rust,no_run
//! use elevenlabs_speech::ElevenLabsSpeech;
//! use speech_core::{generate_speech, VoiceSettings};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let speech = ElevenLabsSpeech::from_env()?;
//!     let audio = generate_speech(&speech, "voice-id", "Hola a todos.", &VoiceSettings::default()).await?;
//!     std::fs::write("hola.mp3", audio)?;
//!     Ok(())
//! }
//! ```

mod api_types;
mod client;
mod config;

pub use client::{classify_error, ElevenLabsSpeech};
pub use config::{ElevenLabsConfig, ElevenLabsConfigBuilder};

// Re-export speech-core types for convenience
pub use speech_core::{async_trait, CreditBalance, SpeechError, SpeechSynthesizer, Voice, VoiceSettings};
